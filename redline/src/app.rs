//! Central application state for redline.
//!
//! This module owns all mutable UI state: the current mode, the review session,
//! the token cursor, the free-text editor, and transient feedback. No ratatui
//! rendering logic lives here. `app.rs` is pure state that is read by the render
//! module and mutated by the keybinding dispatcher and provider results.

use ratatui::layout::Rect;
use redline_core::{ReviewError, ReviewPhase, ReviewProgress, ReviewSession};
use tokio::sync::mpsc::UnboundedSender;
use tui_textarea::{CursorMove, TextArea};
use tracing::{debug, error, info, warn};

use crate::net::{ProviderRequest, ProviderResult};

/// Logic ticks (4 Hz) a feedback message stays visible.
const FEEDBACK_TICKS: u8 = 12;

/// Editor mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Word-level review: cursor movement, redact, undo.
    #[default]
    Normal,
    /// Free-text edit box is open over the tokens.
    Edit,
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
    /// Quit-confirmation dialog shown when the sentence has unsubmitted changes.
    ConfirmQuit,
    /// Blocking notification that must be dismissed (fetch failures).
    Notice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Info,
    Success,
    Failure,
}

/// Transient status-bar message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub text: String,
    pub ticks_left: u8,
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    /// Mode to return to when the notice is dismissed.
    pub mode_before_notice: Mode,
    pub session: ReviewSession,
    /// Position of the selected token.
    pub cursor: usize,
    /// Free-text editor; only meaningful in `Mode::Edit`.
    pub edit: TextArea<'static>,
    pub help_scroll: u16,

    pub feedback: Option<Feedback>,
    pub notice: Option<String>,
    pub progress: Option<ReviewProgress>,

    /// True while the latest fetch is in flight.
    pub loading: bool,
    /// True while the latest submit is in flight.
    pub submitting: bool,
    /// Sequence number of the latest fetch; older results are discarded.
    pub fetch_seq: u64,
    /// Sequence number of the latest submit; older results only get logged.
    pub submit_seq: u64,

    /// Screen rects of the visible tokens, cached after each render for mouse hits.
    pub token_rects: Vec<(Rect, usize)>,

    pub reviewer_id: u32,
    pub advance_after_submit: bool,
    /// Request channel to the provider dispatcher. `None` in tests that do not care.
    pub requests: Option<UnboundedSender<ProviderRequest>>,
}

impl AppState {
    pub fn new(reviewer_id: u32, advance_after_submit: bool) -> Self {
        Self {
            mode: Mode::default(),
            mode_before_notice: Mode::default(),
            session: ReviewSession::new(),
            cursor: 0,
            edit: TextArea::default(),
            help_scroll: 0,
            feedback: None,
            notice: None,
            progress: None,
            loading: false,
            submitting: false,
            fetch_seq: 0,
            submit_seq: 0,
            token_rects: Vec::new(),
            reviewer_id,
            advance_after_submit,
            requests: None,
        }
    }

    /// Ages the feedback message; called on every logic tick.
    pub fn tick(&mut self) {
        if let Some(fb) = self.feedback.as_mut() {
            fb.ticks_left = fb.ticks_left.saturating_sub(1);
            if fb.ticks_left == 0 {
                self.feedback = None;
            }
        }
    }

    pub fn set_feedback(&mut self, kind: FeedbackKind, text: impl Into<String>) {
        self.feedback = Some(Feedback {
            kind,
            text: text.into(),
            ticks_left: FEEDBACK_TICKS,
        });
    }

    /// Shows a blocking notice on top of the current mode.
    pub fn show_notice(&mut self, text: impl Into<String>) {
        if self.mode != Mode::Notice {
            self.mode_before_notice = self.mode;
        }
        self.notice = Some(text.into());
        self.mode = Mode::Notice;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
        self.mode = self.mode_before_notice;
    }

    // -----------------------------------------------------------------------
    // Word-level operations
    // -----------------------------------------------------------------------

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let last = self.session.tokens().len().saturating_sub(1);
        self.cursor = (self.cursor + 1).min(last);
    }

    pub fn cursor_first(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_last(&mut self) {
        self.cursor = self.session.tokens().len().saturating_sub(1);
    }

    /// Redacts the word at `position` and moves the cursor there.
    pub fn redact_at(&mut self, position: usize) {
        self.cursor = position;
        match self.session.redact(position) {
            Ok(()) => {}
            // Redacted words are inert, like a disabled control.
            Err(ReviewError::AlreadyRedacted(_)) => {}
            Err(e) => self.set_feedback(FeedbackKind::Failure, e.to_string()),
        }
    }

    pub fn redact_selected(&mut self) {
        self.redact_at(self.cursor);
    }

    pub fn undo(&mut self) {
        match self.session.undo() {
            Ok(Some(event)) => self.cursor = event.position,
            Ok(None) => {}
            Err(e) => self.set_feedback(FeedbackKind::Failure, e.to_string()),
        }
    }

    pub fn revert(&mut self) {
        match self.session.revert_to_original() {
            Ok(()) => {
                self.clamp_cursor();
                self.set_feedback(FeedbackKind::Info, "Reverted to original");
            }
            Err(e) => self.set_feedback(FeedbackKind::Failure, e.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Free-text editing
    // -----------------------------------------------------------------------

    pub fn begin_edit(&mut self) {
        match self.session.enter_edit_mode() {
            Ok(text) => {
                self.edit = TextArea::from([text]);
                self.edit.move_cursor(CursorMove::End);
                self.mode = Mode::Edit;
            }
            Err(e) => self.set_feedback(FeedbackKind::Failure, e.to_string()),
        }
    }

    /// Text currently in the editor, as one line.
    pub fn edit_text(&self) -> String {
        self.edit.lines().join(" ")
    }

    pub fn commit_edit(&mut self) {
        let text = self.edit_text();
        match self.session.commit_edit(&text) {
            Ok(()) => {
                self.mode = Mode::Normal;
                self.clamp_cursor();
            }
            Err(e) => {
                warn!(error = %e, "edit commit rejected");
                self.set_feedback(FeedbackKind::Failure, e.to_string());
                self.mode = Mode::Normal;
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        if let Err(e) = self.session.cancel_edit() {
            debug!(error = %e, "cancel outside editor");
        }
        self.mode = Mode::Normal;
    }

    // -----------------------------------------------------------------------
    // Provider requests
    // -----------------------------------------------------------------------

    /// Asks the provider for the next sentence. Supersedes any fetch in flight.
    pub fn request_next(&mut self) {
        self.fetch_seq += 1;
        self.loading = true;
        self.send(ProviderRequest::FetchNext {
            seq: self.fetch_seq,
            reviewer_id: self.reviewer_id,
        });
    }

    /// Serializes the current tokens and sends them as the final sentence.
    pub fn request_submit(&mut self) {
        let submission = match self.session.prepare_submission() {
            Ok(s) => s,
            Err(e) => {
                self.set_feedback(FeedbackKind::Failure, e.to_string());
                return;
            }
        };
        self.submit_seq += 1;
        self.submitting = true;
        self.set_feedback(FeedbackKind::Info, format!("Submitting sentence {}...", submission.id));
        self.send(ProviderRequest::Submit {
            seq: self.submit_seq,
            submission,
        });
    }

    pub fn request_progress(&mut self) {
        self.send(ProviderRequest::Progress);
    }

    fn send(&mut self, request: ProviderRequest) {
        let Some(tx) = self.requests.as_ref() else {
            return;
        };
        if tx.send(request).is_err() {
            error!("provider dispatcher is gone");
            self.loading = false;
            self.submitting = false;
            self.set_feedback(FeedbackKind::Failure, "Provider unavailable");
        }
    }

    /// Applies a provider outcome delivered through the event bus.
    pub fn apply_provider_result(&mut self, result: ProviderResult) {
        match result {
            ProviderResult::Fetched { seq, result } => {
                if seq != self.fetch_seq {
                    debug!(seq, latest = self.fetch_seq, "stale fetch result discarded");
                    return;
                }
                self.loading = false;
                match result {
                    Ok(record) => {
                        info!(id = %record.id, "sentence loaded");
                        let id = record.id.clone();
                        self.session.load(record);
                        self.cursor = 0;
                        if self.mode == Mode::Edit {
                            self.mode = Mode::Normal;
                        }
                        if self.mode_before_notice == Mode::Edit {
                            self.mode_before_notice = Mode::Normal;
                        }
                        self.set_feedback(FeedbackKind::Info, format!("Loaded sentence {}", id));
                    }
                    Err(e) => {
                        error!(error = %e, "fetch failed");
                        self.show_notice(e.to_string());
                    }
                }
            }
            ProviderResult::Submitted { seq, submission, result } => {
                let latest = seq == self.submit_seq;
                if latest {
                    self.submitting = false;
                }
                match result {
                    Ok(ack) => {
                        info!(id = %submission.id, message = ?ack.message, "submission acknowledged");
                        if !latest {
                            // A newer submit decides the saved state; this text may be outdated.
                            debug!(seq, latest = self.submit_seq, "stale acknowledgement not recorded");
                            return;
                        }
                        self.session.mark_submitted(&submission);
                        self.set_feedback(
                            FeedbackKind::Success,
                            format!("Sentence {} saved", submission.id),
                        );
                        self.request_progress();
                        if self.advance_after_submit {
                            self.request_next();
                        }
                    }
                    Err(e) => {
                        error!(id = %submission.id, error = %e, "submit failed");
                        if latest {
                            self.set_feedback(FeedbackKind::Failure, e.to_string());
                        }
                    }
                }
            }
            ProviderResult::Progress(result) => match result {
                Ok(progress) => self.progress = Some(progress),
                Err(e) => warn!(error = %e, "progress refresh failed"),
            },
        }
    }

    /// True when quitting would drop changes the provider has not acknowledged.
    pub fn has_unsaved_changes(&self) -> bool {
        self.session.is_dirty() || self.session.phase() == ReviewPhase::Editing
    }

    /// Returns the token position under a screen cell, if any.
    pub fn token_at(&self, col: u16, row: u16) -> Option<usize> {
        let pos = ratatui::layout::Position { x: col, y: row };
        self.token_rects
            .iter()
            .find(|(rect, _)| rect.contains(pos))
            .map(|&(_, position)| position)
    }

    fn clamp_cursor(&mut self) {
        let last = self.session.tokens().len().saturating_sub(1);
        self.cursor = self.cursor.min(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::{Acknowledgement, Error, RecordId, SentenceRecord};
    use tokio::sync::mpsc;

    fn record(id: i64, original: &str) -> SentenceRecord {
        SentenceRecord {
            id: RecordId::Int(id),
            note_id: RecordId::Int(1),
            index: 0,
            original_sentence: original.to_owned(),
            llm_sentence: None,
            final_sentence: None,
        }
    }

    fn wired() -> (AppState, mpsc::UnboundedReceiver<ProviderRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(1, false);
        state.requests = Some(tx);
        (state, rx)
    }

    fn texts(state: &AppState) -> Vec<String> {
        state.session.tokens().iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn only_latest_fetch_updates_session() {
        let (mut state, mut rx) = wired();
        state.request_next();
        state.request_next();
        assert_eq!(
            rx.try_recv().unwrap(),
            ProviderRequest::FetchNext { seq: 1, reviewer_id: 1 }
        );

        state.apply_provider_result(ProviderResult::Fetched {
            seq: 2,
            result: Ok(record(2, "newest one")),
        });
        state.apply_provider_result(ProviderResult::Fetched {
            seq: 1,
            result: Ok(record(1, "older one")),
        });

        assert_eq!(state.session.active_id(), Some(&RecordId::Int(2)));
        assert!(!state.loading);
    }

    #[test]
    fn fetch_failure_shows_notice_and_keeps_session() {
        let (mut state, _rx) = wired();
        state.session.load(record(5, "keep this"));
        state.redact_at(1);

        state.request_next();
        state.apply_provider_result(ProviderResult::Fetched {
            seq: state.fetch_seq,
            result: Err(Error::FetchFailed("No unreviewed sentences left".to_owned())),
        });

        assert_eq!(state.mode, Mode::Notice);
        assert!(state.notice.as_deref().unwrap().contains("No unreviewed"));
        assert_eq!(texts(&state), ["keep", "[REDACT]"]);

        state.dismiss_notice();
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn submit_failure_is_non_blocking_and_keeps_tokens() {
        let (mut state, mut rx) = wired();
        state.session.load(record(8, "call John"));
        state.redact_at(1);
        state.request_submit();

        let Ok(ProviderRequest::Submit { seq, submission }) = rx.try_recv() else {
            panic!("expected a submit request");
        };
        assert_eq!(submission.final_sentence, "call [REDACT]");

        state.apply_provider_result(ProviderResult::Submitted {
            seq,
            submission,
            result: Err(Error::SubmitFailed("500 Internal Server Error".to_owned())),
        });
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(state.feedback.as_ref().unwrap().kind, FeedbackKind::Failure);
        assert_eq!(texts(&state), ["call", "[REDACT]"]);
        assert!(state.has_unsaved_changes());
    }

    #[test]
    fn acknowledged_submit_refreshes_progress_and_can_advance() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(4, true);
        state.requests = Some(tx);
        state.session.load(record(3, "fine as is"));
        state.request_submit();
        let Ok(ProviderRequest::Submit { seq, submission }) = rx.try_recv() else {
            panic!("expected a submit request");
        };

        state.apply_provider_result(ProviderResult::Submitted {
            seq,
            submission,
            result: Ok(Acknowledgement::default()),
        });

        assert_eq!(state.session.last_submitted(), Some("fine as is"));
        assert_eq!(rx.try_recv().unwrap(), ProviderRequest::Progress);
        assert_eq!(
            rx.try_recv().unwrap(),
            ProviderRequest::FetchNext { seq: 1, reviewer_id: 4 }
        );
    }

    #[test]
    fn stale_submit_result_does_not_touch_feedback() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(1, true);
        state.requests = Some(tx);
        state.session.load(record(9, "call John now"));

        state.redact_at(1);
        state.request_submit();
        let Ok(ProviderRequest::Submit { seq: first_seq, submission: first }) = rx.try_recv() else {
            panic!("expected a submit request");
        };
        state.redact_at(2);
        state.request_submit();
        let Ok(ProviderRequest::Submit { seq: second_seq, .. }) = rx.try_recv() else {
            panic!("expected a submit request");
        };
        assert!(first_seq < second_seq);
        let before = state.feedback.clone();

        state.apply_provider_result(ProviderResult::Submitted {
            seq: first_seq,
            submission: first.clone(),
            result: Err(Error::SubmitFailed("503 Service Unavailable".to_owned())),
        });
        assert_eq!(state.feedback, before);
        assert!(state.submitting);

        state.apply_provider_result(ProviderResult::Submitted {
            seq: first_seq,
            submission: first,
            result: Ok(Acknowledgement::default()),
        });
        assert_eq!(state.feedback, before);
        // No progress refresh and no advance to the next sentence.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn late_acknowledgement_does_not_replace_newer_saved_text() {
        let (mut state, mut rx) = wired();
        state.session.load(record(9, "call John now"));

        state.redact_at(1);
        state.request_submit();
        let Ok(ProviderRequest::Submit { seq: old_seq, submission: old }) = rx.try_recv() else {
            panic!("expected a submit request");
        };
        state.redact_at(2);
        state.request_submit();
        let Ok(ProviderRequest::Submit { seq: new_seq, submission: new }) = rx.try_recv() else {
            panic!("expected a submit request");
        };

        state.apply_provider_result(ProviderResult::Submitted {
            seq: new_seq,
            submission: new,
            result: Ok(Acknowledgement::default()),
        });
        state.apply_provider_result(ProviderResult::Submitted {
            seq: old_seq,
            submission: old,
            result: Ok(Acknowledgement::default()),
        });

        assert_eq!(state.session.last_submitted(), Some("call [REDACT] [REDACT]"));
        assert!(!state.session.is_dirty());
    }

    #[test]
    fn submit_without_sentence_reports_failure() {
        let (mut state, mut rx) = wired();
        state.request_submit();
        assert!(rx.try_recv().is_err());
        assert_eq!(state.feedback.as_ref().unwrap().kind, FeedbackKind::Failure);
    }

    #[test]
    fn feedback_expires_after_ticks() {
        let mut state = AppState::new(1, false);
        state.set_feedback(FeedbackKind::Info, "hello");
        for _ in 0..FEEDBACK_TICKS - 1 {
            state.tick();
        }
        assert!(state.feedback.is_some());
        state.tick();
        assert!(state.feedback.is_none());
    }

    #[test]
    fn edit_round_trip_through_buffer() {
        let mut state = AppState::new(1, false);
        state.session.load(record(1, "The cat sat"));
        state.redact_at(1);
        state.begin_edit();
        assert_eq!(state.mode, Mode::Edit);
        assert_eq!(state.edit_text(), "The [REDACT] sat");
        assert_eq!(state.edit.cursor(), (0, 16));

        state.edit = TextArea::from(["A dog ran "]);
        state.commit_edit();
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(texts(&state), ["A", "dog", "ran"]);
        assert!(state.session.history().is_empty());
    }

    #[test]
    fn token_hit_testing_uses_cached_rects() {
        let mut state = AppState::new(1, false);
        state.token_rects = vec![
            (Rect::new(2, 3, 3, 1), 0),
            (Rect::new(6, 3, 5, 1), 1),
        ];
        assert_eq!(state.token_at(7, 3), Some(1));
        assert_eq!(state.token_at(5, 3), None);
        assert_eq!(state.token_at(2, 4), None);
    }
}
