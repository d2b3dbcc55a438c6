//! Tracing setup for redline.
//!
//! The TUI owns stderr, so log output goes to `<log_dir>/redline.log` through a
//! non-blocking appender. `RUST_LOG` overrides the default filter.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "redline=info,redline_core=info";
const LOG_FILE: &str = "redline.log";

/// Installs the global subscriber writing to `log_dir`.
///
/// The returned guard flushes buffered lines when dropped; keep it alive until
/// the process exits.
///
/// # Errors
///
/// Returns `Err` if `log_dir` cannot be created.
pub fn init(log_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .try_init();

    Ok(guard)
}
