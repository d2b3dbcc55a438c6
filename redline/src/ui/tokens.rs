//! Candidate panel renderer for redline.
//!
//! Words are laid out left to right and wrapped at the panel width, one
//! `Span` per word. Each word's screen rect is cached in `AppState` so mouse
//! clicks can be mapped back to a token position. While the free-text editor
//! is open the tokens are not drawn; the edit box takes the panel instead.

use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use redline_core::WordToken;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Drawn in place of an empty token so it can still be selected.
const EMPTY_TOKEN: &str = "·";

/// Where one token lands inside the panel, in panel-relative cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSlot {
    pub position: usize,
    pub row: u16,
    pub col: u16,
    pub width: u16,
}

pub fn token_label(token: &WordToken) -> &str {
    if token.text.is_empty() { EMPTY_TOKEN } else { &token.text }
}

/// Flows labels into rows of at most `width` cells, one blank cell between words.
///
/// A label wider than the panel gets a row to itself and is clipped.
pub fn layout_tokens(labels: &[&str], width: u16) -> Vec<TokenSlot> {
    if width == 0 {
        return Vec::new();
    }
    let mut slots = Vec::with_capacity(labels.len());
    let (mut row, mut col) = (0u16, 0u16);
    for (position, label) in labels.iter().enumerate() {
        let w = u16::try_from(Span::raw(*label).width()).unwrap_or(u16::MAX).clamp(1, width);
        if col > 0 && col.saturating_add(w) > width {
            row += 1;
            col = 0;
        }
        slots.push(TokenSlot { position, row, col, width: w });
        col = col.saturating_add(w).saturating_add(1);
    }
    slots
}

/// Renders the candidate panel: tokens in normal modes, the edit box in `Edit`.
pub fn render_candidate(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let editing = state.mode == Mode::Edit;
    let title = if editing {
        " Edit  Enter commit · Esc cancel "
    } else {
        " Candidate "
    };
    frame.render_widget(panel_block(title, true, theme), area);
    let inner = inner_rect(area);
    state.token_rects.clear();

    if editing {
        render_edit_box(frame, inner, state);
        return;
    }

    if state.session.record().is_none() {
        let msg = if state.loading {
            "Fetching sentence..."
        } else {
            "No sentence loaded. Press n to fetch one."
        };
        frame.render_widget(Paragraph::new(Line::raw(msg)), inner);
        return;
    }

    let tokens = state.session.tokens();
    let labels: Vec<&str> = tokens.iter().map(token_label).collect();
    let slots = layout_tokens(&labels, inner.width);

    // Keep the cursor's row on screen.
    let cursor_row = slots.get(state.cursor).map(|s| s.row).unwrap_or(0);
    let first_row = cursor_row.saturating_sub(inner.height.saturating_sub(1));

    let mut rects = Vec::with_capacity(slots.len());
    for slot in &slots {
        if slot.row < first_row || slot.row - first_row >= inner.height {
            continue;
        }
        let rect = Rect::new(inner.x + slot.col, inner.y + (slot.row - first_row), slot.width, 1);
        let token = &tokens[slot.position];
        let mut style = if token.redacted {
            Style::default().fg(theme.token_redacted).add_modifier(Modifier::BOLD)
        } else if token.text.is_empty() {
            Style::default().fg(theme.token_empty)
        } else {
            Style::default().fg(theme.token_word)
        };
        if slot.position == state.cursor {
            style = style.bg(theme.token_cursor_bg).add_modifier(Modifier::UNDERLINED);
        }
        frame.render_widget(Span::styled(labels[slot.position], style), rect);
        rects.push((rect, slot.position));
    }
    state.token_rects = rects;
}

/// Draws the cursor line of the text area, scrolled so the cursor stays visible.
///
/// The text area holds the editing state; drawing goes through this crate's
/// ratatui so it shares the panel's buffer.
fn render_edit_box(frame: &mut Frame, inner: Rect, state: &AppState) {
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let (row, col) = state.edit.cursor();
    let line = state.edit.lines().get(row).map(String::as_str).unwrap_or("");
    let start = col.saturating_sub(usize::from(inner.width.saturating_sub(1)));
    let shown: String = line.chars().skip(start).take(usize::from(inner.width)).collect();

    frame.render_widget(Paragraph::new(Line::raw(shown)), inner);
    let x = inner.x + u16::try_from(col - start).unwrap_or(0);
    frame.set_cursor_position(Position { x, y: inner.y });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_flow_onto_one_row_when_they_fit() {
        let slots = layout_tokens(&["The", "cat", "sat"], 20);
        assert_eq!(
            slots.iter().map(|s| (s.row, s.col)).collect::<Vec<_>>(),
            vec![(0, 0), (0, 4), (0, 8)]
        );
    }

    #[test]
    fn words_wrap_at_panel_width() {
        // "alpha beta" is 10 cells; "gamma" would end at 16 > 12.
        let slots = layout_tokens(&["alpha", "beta", "gamma"], 12);
        assert_eq!(slots[1].row, 0);
        assert_eq!(slots[2].row, 1);
        assert_eq!(slots[2].col, 0);
    }

    #[test]
    fn oversized_word_is_clipped_to_width() {
        let slots = layout_tokens(&["a", "supercalifragilistic"], 8);
        assert_eq!(slots[1].row, 1);
        assert_eq!(slots[1].width, 8);
    }

    #[test]
    fn empty_token_renders_as_placeholder() {
        let token = WordToken { position: 1, text: String::new(), redacted: false };
        assert_eq!(token_label(&token), EMPTY_TOKEN);
        assert_eq!(layout_tokens(&[EMPTY_TOKEN], 5)[0].width, 1);
    }

    #[test]
    fn zero_width_panel_yields_no_slots() {
        assert!(layout_tokens(&["a"], 0).is_empty());
    }
}
