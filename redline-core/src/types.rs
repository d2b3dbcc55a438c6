//! Data model shared by the review session and the sentence provider.
//!
//! `SentenceRecord` mirrors the provider's JSON shape. `WordToken` and
//! `RedactionEvent` are derived, in-memory only, and never sent over the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The literal marker that replaces a redacted word's text.
pub const REDACTION_MARKER: &str = "[REDACT]";

/// Opaque identifier used by the provider for sentences and notes.
///
/// The service currently emits integers, but nothing in the client interprets
/// the value beyond equality and display, so string ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_owned())
    }
}

/// One unit of review work as served by the sentence provider.
///
/// Immutable once fetched. `llm_sentence` is the machine-generated candidate;
/// `final_sentence` is set once a reviewer has approved a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub id: RecordId,
    pub note_id: RecordId,
    pub index: i64,
    pub original_sentence: String,
    #[serde(default)]
    pub llm_sentence: Option<String>,
    #[serde(default)]
    pub final_sentence: Option<String>,
}

impl SentenceRecord {
    /// Returns the text the reviewer starts editing from.
    ///
    /// Precedence is `final_sentence`, then `llm_sentence`, then
    /// `original_sentence`. Blank values count as absent.
    pub fn initial_text(&self) -> &str {
        present(&self.final_sentence)
            .or_else(|| present(&self.llm_sentence))
            .unwrap_or(&self.original_sentence)
    }

    /// True when the record already carries a non-blank approved sentence.
    pub fn is_finalized(&self) -> bool {
        present(&self.final_sentence).is_some()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// A single word of the editable sentence.
///
/// `position` is stable for the lifetime of one rendering; every call to
/// `ReviewSession::render_editable` rebuilds the whole sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordToken {
    pub position: usize,
    /// Displayed text: the word itself, or [`REDACTION_MARKER`] while redacted.
    pub text: String,
    pub redacted: bool,
}

/// Undo-history entry recorded each time a word is redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionEvent {
    pub position: usize,
    pub original_text: String,
}

/// The serialized final text for one record, ready to send to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: RecordId,
    pub final_sentence: String,
}

/// Success body returned by the provider after a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

/// How many sentences the provider holds and how many are already approved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewProgress {
    pub total: usize,
    pub finalized: usize,
}

impl ReviewProgress {
    pub fn from_records(records: &[SentenceRecord]) -> Self {
        Self {
            total: records.len(),
            finalized: records.iter().filter(|r| r.is_finalized()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(llm: Option<&str>, fin: Option<&str>) -> SentenceRecord {
        SentenceRecord {
            id: RecordId::Int(7),
            note_id: RecordId::Int(2),
            index: 0,
            original_sentence: "Seen by Dr Smith".to_owned(),
            llm_sentence: llm.map(str::to_owned),
            final_sentence: fin.map(str::to_owned),
        }
    }

    #[test]
    fn initial_text_prefers_final_then_llm_then_original() {
        assert_eq!(
            record(Some("Seen by [REDACTED]"), Some("Seen by Dr [REDACT]")).initial_text(),
            "Seen by Dr [REDACT]"
        );
        assert_eq!(record(Some("Seen by [REDACTED]"), None).initial_text(), "Seen by [REDACTED]");
        assert_eq!(record(None, None).initial_text(), "Seen by Dr Smith");
    }

    #[test]
    fn blank_candidates_fall_through() {
        assert_eq!(record(Some("  "), Some("")).initial_text(), "Seen by Dr Smith");
    }

    #[test]
    fn deserializes_provider_json_with_nulls() {
        let json = serde_json::json!({
            "id": 12,
            "note_id": 3,
            "index": 4,
            "original_sentence": "The cat sat",
            "llm_sentence": null,
            "final_sentence": null
        });
        let rec: SentenceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(rec.id, RecordId::Int(12));
        assert_eq!(rec.note_id.to_string(), "3");
        assert!(rec.llm_sentence.is_none());
        assert!(!rec.is_finalized());
    }

    #[test]
    fn string_ids_are_accepted() {
        let json = serde_json::json!({
            "id": "s-1",
            "note_id": "n-1",
            "index": 0,
            "original_sentence": "x"
        });
        let rec: SentenceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(rec.id, RecordId::from("s-1"));
    }

    #[test]
    fn progress_counts_non_blank_finals() {
        let records = vec![
            record(None, Some("done")),
            record(None, Some("   ")),
            record(Some("candidate"), None),
        ];
        let progress = ReviewProgress::from_records(&records);
        assert_eq!(progress, ReviewProgress { total: 3, finalized: 1 });
    }
}
