//! Persisted profiles and draw records.
//!
//! Records wrap a generated report or draw with a stable id and a timestamp.
//! They are created on submit/draw, updated in place on rename or note edit,
//! and deleted explicitly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::tarot::SpreadId;
use super::profile::BirthProfileInput;
use super::report::{FiveElementState, TopicResult, ZiweiReport};
use super::tarot::{TarotCardResult, TarotDraw};

/// Generate a fresh record id.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A saved Ziwei profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZiweiProfile {
    /// Stable id.
    pub id: String,
    /// Nickname shown in the profile switcher.
    pub name: String,
    /// Form input the report was generated from.
    pub input: BirthProfileInput,
    /// Topic results.
    pub results: Vec<TopicResult>,
    /// Report summary.
    pub summary: String,
    /// Element rows; legacy records may lack them.
    #[serde(default = "FiveElementState::neutral_table")]
    pub five_elements: Vec<FiveElementState>,
    /// Free-text notes keyed by topic label.
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
    /// Last update, epoch milliseconds.
    pub updated_at: i64,
}

impl ZiweiProfile {
    /// Create a profile with a fresh id from a generated report.
    ///
    /// An empty input name becomes 未命名.
    pub fn new(input: BirthProfileInput, report: ZiweiReport) -> Self {
        Self::with_id(new_record_id(), input, report)
    }

    /// Create (or regenerate) a profile under an existing id.
    pub fn with_id(id: impl Into<String>, input: BirthProfileInput, report: ZiweiReport) -> Self {
        let name = if input.name.is_empty() {
            "未命名".to_string()
        } else {
            input.name.clone()
        };
        Self {
            id: id.into(),
            name,
            input,
            results: report.results,
            summary: report.summary,
            five_elements: report.five_elements,
            notes: BTreeMap::new(),
            updated_at: now_millis(),
        }
    }

    /// Keep notes from a previous version of this profile.
    pub fn with_notes(mut self, notes: BTreeMap<String, String>) -> Self {
        self.notes = notes;
        self
    }

    /// The report part of the profile.
    pub fn report(&self) -> ZiweiReport {
        ZiweiReport {
            results: self.results.clone(),
            summary: self.summary.clone(),
            five_elements: self.five_elements.clone(),
        }
    }

    /// Note for a topic, empty if none.
    pub fn note(&self, topic: &str) -> &str {
        self.notes.get(topic).map(String::as_str).unwrap_or("")
    }
}

/// A saved tarot draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TarotRecord {
    /// Stable id.
    pub id: String,
    /// Topic label (editable; acts as the record's tag).
    pub topic: String,
    /// Spread used.
    pub spread: SpreadId,
    /// Whether reversal was allowed.
    #[serde(default)]
    pub allow_reverse: bool,
    /// Drawn cards; incomplete entries are dropped when read back.
    #[serde(default, deserialize_with = "super::tarot::deserialize_cards")]
    pub cards: Vec<TarotCardResult>,
    /// Draw summary.
    pub summary: String,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
}

impl TarotRecord {
    /// Create a record with a fresh id from a completed draw.
    pub fn new(topic: impl Into<String>, spread: SpreadId, allow_reverse: bool, draw: TarotDraw) -> Self {
        Self {
            id: new_record_id(),
            topic: topic.into(),
            spread,
            allow_reverse,
            cards: draw.cards,
            summary: draw.summary,
            created_at: now_millis(),
        }
    }

    /// Drop incomplete cards. Returns `None` when no card survives.
    pub fn sanitized(mut self) -> Option<Self> {
        self.cards.retain(TarotCardResult::is_complete);
        if self.cards.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
