//! Changes panel renderer for redline.
//!
//! Shows a word-level diff of the original sentence against the current
//! candidate text. Removed words are struck through, inserted words are bold.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use similar::{ChangeTag, TextDiff};

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Word counts for the panel title. Whitespace runs are not counted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

/// Builds the styled spans for the word diff of `original` → `current`.
pub fn diff_spans(original: &str, current: &str, theme: &Theme) -> (Vec<Span<'static>>, DiffStats) {
    let diff = TextDiff::from_words(original, current);
    let mut spans = Vec::new();
    let mut stats = DiffStats::default();

    for change in diff.iter_all_changes() {
        let text = change.value().to_owned();
        let is_word = !text.trim().is_empty();
        let span = match change.tag() {
            ChangeTag::Delete => {
                stats.removed += usize::from(is_word);
                Span::styled(
                    text,
                    Style::default().fg(theme.diff_removed).add_modifier(Modifier::CROSSED_OUT),
                )
            }
            ChangeTag::Insert => {
                stats.added += usize::from(is_word);
                Span::styled(
                    text,
                    Style::default().fg(theme.diff_added).add_modifier(Modifier::BOLD),
                )
            }
            ChangeTag::Equal => Span::styled(text, Style::default().fg(theme.diff_context)),
        };
        spans.push(span);
    }
    (spans, stats)
}

pub fn render_changes(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let inner = inner_rect(area);
    if state.session.record().is_none() {
        frame.render_widget(panel_block(" Changes ", false, theme), area);
        return;
    }

    let current = state.session.current_text();
    let (spans, stats) = diff_spans(state.session.original(), &current, theme);
    let title = if stats == DiffStats::default() {
        " Changes (none) ".to_owned()
    } else {
        format!(" Changes +{} -{} ", stats.added, stats.removed)
    };

    frame.render_widget(panel_block(&title, false, theme), area);
    frame.render_widget(
        Paragraph::new(Line::from(spans)).wrap(Wrap { trim: false }),
        inner,
    );
}
