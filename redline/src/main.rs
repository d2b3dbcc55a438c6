//! redline: review machine-generated sentences in the terminal.
//!
//! Entry point for the `redline` binary. Wires together configuration
//! (`config`), logging (`logging`), the terminal lifecycle (`tui`), the unified
//! event bus (`event`), the provider dispatcher (`net`), and the UI (`ui`).
//!
//! # Startup sequence
//!
//! 1. Parse flags and load the config file. Read-only, safe before terminal init.
//! 2. Start file logging. The TUI owns stderr, so nothing is logged there.
//! 3. Build the HTTP provider. A bad base URL aborts before the screen changes.
//! 4. `install_panic_hook()`, `register_sigterm()`, `init_tui()`.
//! 5. Spawn the event task and the provider dispatcher, then request the first
//!    sentence and the progress counts.
//!
//! `restore_tui()` runs after the event loop on every non-panic exit path; draw
//! errors break out of the loop and are returned after the terminal is restored.

mod app;
mod config;
mod event;
mod logging;
mod net;
mod theme;
mod tui;
mod ui;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;
use redline_core::{HttpSentenceProvider, ProviderConfig, SentenceProvider};
use tracing::{info, warn};

use crate::event::AppEvent;
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Step 1: configuration. A broken file is reported once logging is up.
    let cli = config::Cli::parse();
    let path = cli.config.clone().unwrap_or_else(config::config_path);
    let (mut config, config_error) = match config::Config::load(&path) {
        Ok(c) => (c, None),
        Err(e) => (config::Config::default(), Some(e)),
    };
    cli.apply(&mut config);

    // Step 2: logging. The guard must outlive the event loop.
    let _log_guard = logging::init(&config.log_dir)?;
    if let Some(e) = config_error {
        warn!(error = %e, "using default configuration");
    }
    info!(server = %config.server_url, reviewer = config.reviewer_id, "starting");

    let theme = theme::Theme::from_name(&config.theme);

    // Step 3: provider.
    let provider = HttpSentenceProvider::new(ProviderConfig {
        base_url: config.server_url.clone(),
        timeout_secs: config.request_timeout_secs,
        ..ProviderConfig::default()
    })
    .map_err(std::io::Error::other)?;
    let provider: Arc<dyn SentenceProvider> = Arc::new(provider);

    // Step 4: terminal.
    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    // Step 5: event bus and dispatcher.
    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let (request_tx, request_rx) = tokio::sync::mpsc::unbounded_channel();
    net::spawn_dispatcher(provider, request_rx, handler.tx.clone());
    let mut rx = handler.rx;

    let mut state = app::AppState::new(config.reviewer_id, config.advance_after_submit);
    state.requests = Some(request_tx);
    state.request_next();
    state.request_progress();

    // Exits only via `break`, so `restore_tui()` below is always reached.
    let mut outcome = Ok(());
    'event_loop: loop {
        tokio::select! {
            // Heartbeat so SIGTERM is noticed even when no events arrive.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            outcome = Err(e);
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        if handle_mouse(mouse, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    // ratatui picks up the new size on the next Render.
                    Some(AppEvent::Resize(_, _)) => {}
                    Some(AppEvent::Tick) => state.tick(),
                    Some(AppEvent::Provider(result)) => state.apply_provider_result(*result),
                    Some(AppEvent::Quit) | None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;
    info!("exiting");
    outcome
}
