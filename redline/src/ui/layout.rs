//! Layout engine for redline.
//!
//! Pure layout arithmetic plus the two one-row bars. Called inside
//! `terminal.draw()` on every render so every frame reflects the current
//! terminal size.
//!
//! The three content panels are stacked vertically with `Spacing::Overlap(1)`;
//! combined with `MergeStrategy::Fuzzy` adjacent borders share a row and their
//! junction characters merge.

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, FeedbackKind, Mode};
use crate::theme::Theme;

/// Screen regions for one frame.
pub struct Areas {
    pub header: Rect,
    pub original: Rect,
    pub candidate: Rect,
    pub changes: Rect,
    pub status_bar: Rect,
}

/// Splits the frame into header, the three stacked panels, and the status bar.
///
/// The returned rects are valid only for the current draw closure.
pub fn compute_layout(frame: &Frame) -> Areas {
    let [header, main_area, status_bar] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [original, candidate, changes] = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Fill(1),
        Constraint::Percentage(30),
    ])
    .spacing(Spacing::Overlap(1))
    .areas(main_area);

    Areas { header, original, candidate, changes, status_bar }
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Returns a rect of `percent_x` × `percent_y` centred in `area`.
pub fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Builds a bordered `Block` for a panel.
///
/// The active panel gets a thick border in `border_active`.
pub fn panel_block<'a>(title: &'a str, is_active: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_active {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_active { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the one-row header: which sentence is loaded and overall progress.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let mut spans = vec![Span::styled(
        " redline ",
        Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD),
    )];

    match state.session.record() {
        Some(record) => spans.push(Span::raw(format!(
            " sentence {}  note {}  #{}",
            record.id, record.note_id, record.index
        ))),
        None => spans.push(Span::raw(" no sentence loaded")),
    }
    if let Some(progress) = state.progress {
        spans.push(Span::styled(
            format!("   reviewed {}/{}", progress.finalized, progress.total),
            Style::default().fg(theme.border_inactive),
        ));
    }
    if state.loading {
        spans.push(Span::styled("   fetching...", Style::default().fg(theme.feedback_info)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the 1-row status bar at the bottom of the terminal.
///
/// Always shows a mode indicator, followed by an unsaved marker and the
/// current feedback message when there is one.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Edit => (" EDIT ", theme.status_mode_insert),
        Mode::Normal | Mode::ConfirmQuit | Mode::HelpOverlay | Mode::Notice => {
            (" NORMAL ", theme.status_mode_normal)
        }
    };

    let mut spans = vec![Span::styled(
        mode_text,
        Style::default().fg(mode_fg).add_modifier(Modifier::BOLD),
    )];

    if state.session.is_dirty() {
        spans.push(Span::raw(" [+]"));
    } else if state.session.last_submitted().is_some() {
        spans.push(Span::styled(" saved", Style::default().fg(theme.feedback_success)));
    }
    if state.submitting {
        spans.push(Span::raw(" submitting..."));
    }

    if let Some(fb) = &state.feedback {
        let color = match fb.kind {
            FeedbackKind::Info => theme.feedback_info,
            FeedbackKind::Success => theme.feedback_success,
            FeedbackKind::Failure => theme.feedback_failure,
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(fb.text.clone(), Style::default().fg(color)));
    } else {
        spans.push(Span::raw("  ? for help"));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
