//! The sentence review state manager.
//!
//! `ReviewSession` owns the sentence currently under review: the active record,
//! its word tokens, and the redaction undo history. The token sequence is the
//! authoritative model. Every way of replacing the editable text (initial load,
//! edit commit, revert) funnels through [`ReviewSession::render_editable`], which
//! rebuilds the tokens from scratch and clears the history, so the history can
//! never refer to a token that no longer exists.

use tracing::debug;

use crate::error::ReviewError;
use crate::types::{
    RecordId, RedactionEvent, SentenceRecord, Submission, WordToken, REDACTION_MARKER,
};

/// Separator used both to split the editable text and to serialize it back.
const SEPARATOR: char = ' ';

/// Lifecycle phase of a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    /// No record has been loaded yet.
    #[default]
    Empty,
    /// Tokens are visible and accept redact / undo.
    Loaded,
    /// The free-text editor is open; tokens are hidden but kept.
    Editing,
}

/// In-memory state for the one sentence currently being reviewed.
#[derive(Debug, Default)]
pub struct ReviewSession {
    record: Option<SentenceRecord>,
    original: String,
    tokens: Vec<WordToken>,
    history: Vec<RedactionEvent>,
    phase: ReviewPhase,
    /// Text at load time or at the last acknowledged submission.
    baseline: String,
    last_submitted: Option<String>,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `record` the active sentence.
    ///
    /// The read-only original display is set verbatim; the editable text is
    /// chosen by [`SentenceRecord::initial_text`].
    pub fn load(&mut self, record: SentenceRecord) {
        debug!(id = %record.id, note_id = %record.note_id, index = record.index, "loading sentence");
        let text = record.initial_text().to_owned();
        self.original = record.original_sentence.clone();
        self.record = Some(record);
        self.last_submitted = None;
        self.phase = ReviewPhase::Loaded;
        self.render_editable(&text);
        self.baseline = self.current_text();
    }

    /// Rebuilds the tokens from `text` and clears the undo history.
    ///
    /// Splits on single ASCII spaces without filtering empty segments, so a
    /// run of two spaces yields an empty token between them.
    pub fn render_editable(&mut self, text: &str) {
        self.history.clear();
        self.tokens = text
            .split(SEPARATOR)
            .enumerate()
            .map(|(position, word)| WordToken {
                position,
                text: word.to_owned(),
                redacted: false,
            })
            .collect();
    }

    /// Replaces the word at `position` with the redaction marker.
    ///
    /// # Errors
    ///
    /// Fails without touching state when no sentence is loaded, the editor is
    /// open, `position` is out of range, or the word is already redacted.
    pub fn redact(&mut self, position: usize) -> Result<(), ReviewError> {
        self.require_word_mode()?;
        let token = self
            .tokens
            .get_mut(position)
            .ok_or(ReviewError::NoSuchToken(position))?;
        if token.redacted {
            return Err(ReviewError::AlreadyRedacted(position));
        }
        let original_text = std::mem::replace(&mut token.text, REDACTION_MARKER.to_owned());
        token.redacted = true;
        debug!(position, "redacted word");
        self.history.push(RedactionEvent { position, original_text });
        Ok(())
    }

    /// Reverses the most recent redaction.
    ///
    /// Returns `Ok(None)` without any effect when the history is empty.
    ///
    /// # Errors
    ///
    /// Fails when no sentence is loaded or the editor is open.
    pub fn undo(&mut self) -> Result<Option<RedactionEvent>, ReviewError> {
        self.require_word_mode()?;
        let Some(event) = self.history.pop() else {
            return Ok(None);
        };
        if let Some(token) = self.tokens.get_mut(event.position) {
            token.text = event.original_text.clone();
            token.redacted = false;
        }
        debug!(position = event.position, "undid redaction");
        Ok(Some(event))
    }

    /// Opens the free-text editor and returns the text to edit.
    ///
    /// Redactions are baked in: the returned text contains the marker, not the
    /// original words.
    pub fn enter_edit_mode(&mut self) -> Result<String, ReviewError> {
        self.require_word_mode()?;
        self.phase = ReviewPhase::Editing;
        Ok(self.current_text())
    }

    /// Replaces the whole sentence with `new_text` (trimmed).
    ///
    /// Allowed whether or not the editor is open; always discards the undo
    /// history.
    pub fn commit_edit(&mut self, new_text: &str) -> Result<(), ReviewError> {
        self.require_active()?;
        self.render_editable(new_text.trim());
        self.phase = ReviewPhase::Loaded;
        Ok(())
    }

    /// Closes the editor leaving the tokens as they were.
    pub fn cancel_edit(&mut self) -> Result<(), ReviewError> {
        if self.phase != ReviewPhase::Editing {
            return Err(ReviewError::NotEditing);
        }
        self.phase = ReviewPhase::Loaded;
        Ok(())
    }

    /// Restores the editable text to the original display text (trimmed).
    pub fn revert_to_original(&mut self) -> Result<(), ReviewError> {
        self.require_active()?;
        let original = self.original.trim().to_owned();
        self.render_editable(&original);
        self.phase = ReviewPhase::Loaded;
        Ok(())
    }

    /// Serializes the tokens into a submission for the active record.
    ///
    /// Calling this again after a failed submission yields the same text, since
    /// nothing is rolled back.
    pub fn prepare_submission(&self) -> Result<Submission, ReviewError> {
        let record = self.record.as_ref().ok_or(ReviewError::NoActiveSession)?;
        Ok(Submission {
            id: record.id.clone(),
            final_sentence: self.current_text(),
        })
    }

    /// Records that the provider acknowledged `submission`.
    ///
    /// Ignored when the submission belongs to a record that is no longer active.
    pub fn mark_submitted(&mut self, submission: &Submission) {
        if self.active_id() != Some(&submission.id) {
            debug!(id = %submission.id, "acknowledgement for inactive sentence ignored");
            return;
        }
        self.baseline = submission.final_sentence.clone();
        self.last_submitted = Some(submission.final_sentence.clone());
    }

    /// Current token texts joined by the render-time separators, trimmed.
    pub fn current_text(&self) -> String {
        let mut out = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            out.push_str(&token.text);
        }
        out.trim().to_owned()
    }

    /// True when the current text differs from the text at load time or at the
    /// last acknowledged submission.
    pub fn is_dirty(&self) -> bool {
        self.record.is_some() && self.current_text() != self.baseline
    }

    pub fn phase(&self) -> ReviewPhase {
        self.phase
    }

    pub fn record(&self) -> Option<&SentenceRecord> {
        self.record.as_ref()
    }

    pub fn active_id(&self) -> Option<&RecordId> {
        self.record.as_ref().map(|r| &r.id)
    }

    /// The read-only original text, exactly as fetched.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn tokens(&self) -> &[WordToken] {
        &self.tokens
    }

    /// Undo history, oldest first; the last element is undone next.
    pub fn history(&self) -> &[RedactionEvent] {
        &self.history
    }

    pub fn last_submitted(&self) -> Option<&str> {
        self.last_submitted.as_deref()
    }

    fn require_active(&self) -> Result<(), ReviewError> {
        match self.phase {
            ReviewPhase::Empty => Err(ReviewError::NoActiveSession),
            _ => Ok(()),
        }
    }

    fn require_word_mode(&self) -> Result<(), ReviewError> {
        match self.phase {
            ReviewPhase::Empty => Err(ReviewError::NoActiveSession),
            ReviewPhase::Editing => Err(ReviewError::EditInProgress),
            ReviewPhase::Loaded => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(original: &str, llm: Option<&str>) -> SentenceRecord {
        SentenceRecord {
            id: RecordId::Int(1),
            note_id: RecordId::Int(10),
            index: 0,
            original_sentence: original.to_owned(),
            llm_sentence: llm.map(str::to_owned),
            final_sentence: None,
        }
    }

    fn loaded(text: &str) -> ReviewSession {
        let mut s = ReviewSession::new();
        s.load(record(text, None));
        s
    }

    fn texts(s: &ReviewSession) -> Vec<&str> {
        s.tokens().iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn load_uses_candidate_but_keeps_original_display() {
        let mut s = ReviewSession::new();
        s.load(record("Seen by Dr Smith", Some("Seen by [REDACTED]")));
        assert_eq!(s.original(), "Seen by Dr Smith");
        assert_eq!(texts(&s), ["Seen", "by", "[REDACTED]"]);
        assert_eq!(s.phase(), ReviewPhase::Loaded);
        assert!(!s.is_dirty());
    }

    #[test]
    fn redact_then_undo_restores_exact_text() {
        let mut s = loaded("alpha beta gamma");
        for p in 0..3 {
            let before = s.tokens()[p].text.clone();
            s.redact(p).unwrap();
            assert_eq!(s.tokens()[p].text, REDACTION_MARKER);
            assert!(s.tokens()[p].redacted);
            s.undo().unwrap();
            assert_eq!(s.tokens()[p].text, before);
            assert!(!s.tokens()[p].redacted);
        }
    }

    #[test]
    fn undo_follows_redaction_order_not_position_order() {
        let mut s = loaded("a b c d e");
        s.redact(3).unwrap();
        s.redact(0).unwrap();
        s.redact(4).unwrap();

        assert_eq!(s.undo().unwrap().map(|e| e.position), Some(4));
        assert_eq!(texts(&s), ["[REDACT]", "b", "c", "[REDACT]", "e"]);
        assert_eq!(s.undo().unwrap().map(|e| e.position), Some(0));
        assert_eq!(s.undo().unwrap().map(|e| e.position), Some(3));
        assert_eq!(texts(&s), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut s = loaded("one two");
        let tokens_before = s.tokens().to_vec();
        assert_eq!(s.undo().unwrap(), None);
        assert_eq!(s.tokens(), tokens_before.as_slice());
        assert!(s.history().is_empty());
    }

    #[test]
    fn second_redaction_of_same_word_is_rejected() {
        let mut s = loaded("one two");
        s.redact(1).unwrap();
        assert_eq!(s.redact(1), Err(ReviewError::AlreadyRedacted(1)));
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history()[0].original_text, "two");
    }

    #[test]
    fn redact_out_of_range_is_rejected() {
        let mut s = loaded("one");
        assert_eq!(s.redact(5), Err(ReviewError::NoSuchToken(5)));
    }

    #[test]
    fn operations_before_load_report_no_session() {
        let mut s = ReviewSession::new();
        assert_eq!(s.redact(0), Err(ReviewError::NoActiveSession));
        assert_eq!(s.undo(), Err(ReviewError::NoActiveSession));
        assert_eq!(s.commit_edit("x"), Err(ReviewError::NoActiveSession));
        assert_eq!(s.revert_to_original(), Err(ReviewError::NoActiveSession));
        assert_eq!(s.prepare_submission(), Err(ReviewError::NoActiveSession));
        assert!(!s.is_dirty());
    }

    #[test]
    fn commit_edit_clears_history() {
        let mut s = loaded("one two three");
        s.redact(0).unwrap();
        s.redact(2).unwrap();
        s.commit_edit("brand new text").unwrap();
        assert!(s.history().is_empty());
        assert_eq!(s.undo().unwrap(), None);
        assert_eq!(texts(&s), ["brand", "new", "text"]);
    }

    #[test]
    fn commit_edit_round_trips_trimmed_text() {
        let mut s = loaded("x");
        for text in ["  padded words  ", "single", "double  space", "", "tail "] {
            s.commit_edit(text).unwrap();
            assert_eq!(s.current_text(), text.trim(), "round trip of {text:?}");
        }
    }

    #[test]
    fn double_spaces_yield_empty_tokens() {
        let s = loaded("a  b");
        assert_eq!(texts(&s), ["a", "", "b"]);
        assert_eq!(s.current_text(), "a  b");
    }

    #[test]
    fn edit_mode_bakes_in_redactions_and_blocks_word_ops() {
        let mut s = loaded("call John today");
        s.redact(1).unwrap();
        let text = s.enter_edit_mode().unwrap();
        assert_eq!(text, "call [REDACT] today");
        assert_eq!(s.phase(), ReviewPhase::Editing);
        assert_eq!(s.redact(0), Err(ReviewError::EditInProgress));
        assert_eq!(s.undo(), Err(ReviewError::EditInProgress));

        s.cancel_edit().unwrap();
        assert_eq!(s.phase(), ReviewPhase::Loaded);
        assert_eq!(s.undo().unwrap().map(|e| e.original_text), Some("John".to_owned()));
    }

    #[test]
    fn cancel_outside_editor_is_rejected() {
        let mut s = loaded("x");
        assert_eq!(s.cancel_edit(), Err(ReviewError::NotEditing));
    }

    #[test]
    fn revert_restores_trimmed_original_and_clears_history() {
        let mut s = ReviewSession::new();
        s.load(record(" Seen by Dr Smith ", Some("Seen by [REDACTED]")));
        s.redact(0).unwrap();
        s.revert_to_original().unwrap();
        assert_eq!(texts(&s), ["Seen", "by", "Dr", "Smith"]);
        assert!(s.history().is_empty());
        assert!(s.is_dirty());
    }

    #[test]
    fn failed_submission_can_be_prepared_again() {
        let mut s = loaded("keep me");
        s.redact(1).unwrap();
        let first = s.prepare_submission().unwrap();
        let second = s.prepare_submission().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.final_sentence, "keep [REDACT]");
        assert_eq!(s.tokens()[1].text, REDACTION_MARKER);
    }

    #[test]
    fn acknowledged_submission_resets_dirty_flag() {
        let mut s = loaded("one two");
        s.redact(0).unwrap();
        assert!(s.is_dirty());
        let submission = s.prepare_submission().unwrap();
        s.mark_submitted(&submission);
        assert!(!s.is_dirty());
        assert_eq!(s.last_submitted(), Some("[REDACT] two"));
        assert_eq!(s.phase(), ReviewPhase::Loaded);
    }

    #[test]
    fn acknowledgement_for_other_record_is_ignored() {
        let mut s = loaded("one two");
        s.redact(0).unwrap();
        s.mark_submitted(&Submission {
            id: RecordId::Int(99),
            final_sentence: "whatever".to_owned(),
        });
        assert!(s.last_submitted().is_none());
        assert!(s.is_dirty());
    }

    #[test]
    fn loading_a_new_record_resets_everything() {
        let mut s = loaded("one two");
        s.redact(0).unwrap();
        s.enter_edit_mode().unwrap();
        s.load(record("three four", None));
        assert_eq!(s.phase(), ReviewPhase::Loaded);
        assert!(s.history().is_empty());
        assert_eq!(texts(&s), ["three", "four"]);
    }
}
