//! Keybinding dispatcher for redline.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop whether to continue or quit. The dispatcher
//! branches first on `state.mode` so that each mode has an isolated handler.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tui_textarea::{Input, Key};

use crate::app::{AppState, Mode};

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    // Ctrl-C always exits, whatever mode is active.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }
    match state.mode {
        Mode::Normal => handle_normal(key, state),
        Mode::Edit => handle_edit(key, state),
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
        Mode::Notice => handle_notice(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => state.cursor_left(),
        KeyCode::Char('l') | KeyCode::Right => state.cursor_right(),
        KeyCode::Char('0') | KeyCode::Home => state.cursor_first(),
        KeyCode::Char('$') | KeyCode::End => state.cursor_last(),

        KeyCode::Char('x') | KeyCode::Char(' ') | KeyCode::Enter => state.redact_selected(),
        KeyCode::Char('u') => state.undo(),
        KeyCode::Char('e') | KeyCode::Char('i') => state.begin_edit(),
        KeyCode::Char('r') => state.revert(),

        KeyCode::Char('s') => state.request_submit(),
        KeyCode::Char('n') => state.request_next(),

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            if state.has_unsaved_changes() {
                state.mode = Mode::ConfirmQuit;
            } else {
                return KeyAction::Quit;
            }
        }
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Edit mode
// ---------------------------------------------------------------------------

/// Enter and Esc close the editor; every other key goes to the text area.
fn handle_edit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Enter => state.commit_edit(),
        KeyCode::Esc => state.cancel_edit(),
        _ => {
            state.edit.input(to_input(key));
        }
    }
    KeyAction::Continue
}

/// Converts a crossterm key into the text area's backend-agnostic input.
///
/// Keys the editor has no use for become `Key::Null`, which it ignores.
fn to_input(key: KeyEvent) -> Input {
    let code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => Key::Null,
    };
    Input {
        key: code,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    }
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

/// `y` confirms the quit; `n` or `Esc` goes back to reviewing.
fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

/// The notice blocks every other key until it is acknowledged.
fn handle_notice(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        state.dismiss_notice();
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click on a word redacts it; the wheel scrolls the help overlay.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if state.mode == Mode::Normal => {
            if let Some(position) = state.token_at(mouse.column, mouse.row) {
                state.redact_at(position);
            }
        }
        MouseEventKind::ScrollUp if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_sub(3);
        }
        MouseEventKind::ScrollDown if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_add(3);
        }
        _ => {}
    }
    KeyAction::Continue
}
