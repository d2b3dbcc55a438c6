//! Modal overlays for redline: the help screen, the quit confirmation, and the
//! blocking notice.
//!
//! Each overlay erases its area with `Clear` and then draws a bordered
//! `Paragraph` on top, all inside the same `terminal.draw()` closure as the
//! panels underneath.

use ratatui::{
    Frame,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;
use crate::ui::layout::centered_rect;

/// Renders the help overlay, scrolled by `help_scroll` rows.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    // Too small to be readable; skip rather than draw a zero-height box.
    if frame.area().width < 40 || frame.area().height < 8 {
        return;
    }
    let area = centered_rect(frame.area(), 80, 80);
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Help  j/k scroll, ? or Esc to close ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        area,
    );
}

fn build_help_text() -> Text<'static> {
    let heading = |s: &'static str| Line::styled(s, Style::default().add_modifier(Modifier::BOLD));
    Text::from(vec![
        heading("Words"),
        Line::from("  h / ←, l / →   Previous / next word"),
        Line::from("  0 / $          First / last word"),
        Line::from("  x, Enter, Space  Redact the selected word"),
        Line::from("  click          Redact the clicked word"),
        Line::from("  u              Undo the last redaction"),
        Line::from("  r              Revert to the original sentence"),
        Line::from(""),
        heading("Editing"),
        Line::from("  e / i          Edit the sentence as free text"),
        Line::from("  Enter          Commit the edit (clears undo history)"),
        Line::from("  Esc            Discard the edit"),
        Line::from("  Home / End     Start / end of line"),
        Line::from(""),
        heading("Review"),
        Line::from("  s              Submit the current text as final"),
        Line::from("  n              Fetch the next sentence"),
        Line::from(""),
        heading("General"),
        Line::from("  ?              Toggle this help"),
        Line::from("  q / Esc        Quit (asks first when there are unsaved changes)"),
        Line::from("  Ctrl-c         Quit immediately"),
    ])
}

/// Renders the unsaved-changes quit confirmation.
pub fn render_confirm_quit(frame: &mut Frame, theme: &Theme) {
    let text = Text::from(vec![
        Line::from("This sentence has unsubmitted changes."),
        Line::from(""),
        Line::from("Quit anyway?  y / n"),
    ]);
    render_dialog(frame, " Quit ", text, Style::default().fg(theme.feedback_failure));
}

/// Renders the blocking notice carrying `message`.
pub fn render_notice(frame: &mut Frame, theme: &Theme, message: &str) {
    let text = Text::from(vec![
        Line::from(message.to_owned()),
        Line::from(""),
        Line::styled("Press Enter to dismiss", Style::default().fg(theme.border_inactive)),
    ]);
    render_dialog(frame, " Notice ", text, Style::default().fg(theme.feedback_failure));
}

fn render_dialog(frame: &mut Frame, title: &str, text: Text<'_>, border: Style) {
    let area = centered_rect(frame.area(), 60, 30);
    if area.height < 3 {
        return;
    }
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text)
            .block(Block::bordered().title(title).border_style(border))
            .wrap(Wrap { trim: true }),
        area,
    );
}
