//! Configuration for redline.
//!
//! Settings come from `$XDG_CONFIG_HOME/redline/config.toml` (falling back to
//! `~/.config/redline/config.toml`), then command-line flags override them.
//! A missing file means defaults; a malformed one is reported and defaults are
//! used, so a config typo never prevents startup.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

/// Settings read from the config file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    /// Base URL of the sentence provider.
    pub server_url: String,
    /// Path parameter of the next-sentence endpoint.
    pub reviewer_id: u32,
    /// Per-request timeout; `0` disables it.
    pub request_timeout_secs: u64,
    /// Load the next sentence automatically once a submission is acknowledged.
    pub advance_after_submit: bool,
    /// Directory receiving `redline.log`.
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            server_url: redline_core::provider::DEFAULT_BASE_URL.to_owned(),
            reviewer_id: 1,
            request_timeout_secs: 30,
            advance_after_submit: false,
            log_dir: PathBuf::from(".redline"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Config {
    /// Loads the config file at `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                })
            }
        };
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// Returns the path to the redline config file.
///
/// Prefers `$XDG_CONFIG_HOME/redline/config.toml`; falls back to
/// `~/.config/redline/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("redline").join("config.toml")
}

/// Review sentences from the sentence service in the terminal.
#[derive(Debug, Parser)]
#[command(name = "redline", version, about)]
pub struct Cli {
    /// Config file to read instead of the XDG default.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the sentence provider.
    #[arg(long, env = "REDLINE_SERVER")]
    pub server: Option<String>,

    /// Reviewer id passed to the next-sentence endpoint.
    #[arg(long)]
    pub reviewer: Option<u32>,

    /// Color theme (dark, catppuccin-mocha).
    #[arg(long)]
    pub theme: Option<String>,

    /// Directory for the log file.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Fetch the next sentence after each successful submission.
    #[arg(long)]
    pub advance: bool,
}

impl Cli {
    /// Overrides `config` with every flag that was given.
    pub fn apply(&self, config: &mut Config) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(reviewer) = self.reviewer {
            config.reviewer_id = reviewer;
        }
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
        if self.advance {
            config.advance_after_submit = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url = \"http://review.internal:9000\"").unwrap();
        writeln!(file, "reviewer_id = 3").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server_url, "http://review.internal:9000");
        assert_eq!(config.reviewer_id, 3);
        assert_eq!(config.theme, "catppuccin-mocha");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reviewer_id = \"not a number\"").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from([
            "redline",
            "--server",
            "http://other:8000",
            "--reviewer",
            "9",
            "--advance",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.server_url, "http://other:8000");
        assert_eq!(config.reviewer_id, 9);
        assert!(config.advance_after_submit);
        assert_eq!(config.theme, "catppuccin-mocha");
    }
}
