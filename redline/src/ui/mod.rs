//! UI rendering module for redline.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic and the one-row bars live in
//! `layout.rs`; each panel has its own module.

mod changes;
mod help;
pub mod keybindings;
mod layout;
mod tokens;

use ratatui::{
    Frame,
    text::Line,
    widgets::{Paragraph, Wrap},
};

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, panel_block, render_header, render_status_bar};

/// Renders one complete frame.
///
/// Token rects are rebuilt while drawing the candidate panel so the next mouse
/// click is hit-tested against what is actually on screen.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let areas = compute_layout(frame);

    render_header(frame, areas.header, state, theme);

    frame.render_widget(panel_block(" Original ", false, theme), areas.original);
    let original = match state.session.record() {
        Some(_) => Line::raw(state.session.original()),
        None if state.loading => Line::raw("Fetching..."),
        None => Line::raw("Press n to fetch a sentence."),
    };
    frame.render_widget(
        Paragraph::new(original).wrap(Wrap { trim: false }),
        inner_rect(areas.original),
    );

    tokens::render_candidate(frame, areas.candidate, state, theme);
    changes::render_changes(frame, areas.changes, state, theme);
    render_status_bar(frame, areas.status_bar, state, theme);

    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::ConfirmQuit => help::render_confirm_quit(frame, theme),
        Mode::Notice => {
            let message = state.notice.as_deref().unwrap_or("Something went wrong.");
            help::render_notice(frame, theme, message);
        }
        Mode::Normal | Mode::Edit => {}
    }
}
