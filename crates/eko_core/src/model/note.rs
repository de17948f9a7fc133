//! Note domain model.
//!
//! Notes share the task list mechanics (section, priority, star, active) but
//! carry no due date, completion or recurrence.

use crate::model::task::{default_section, default_true, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one note inside a profile list.
pub type NoteId = Uuid;

const PREVIEW_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(deserialize_with = "crate::model::list_id::deserialize")]
    pub id: NoteId,
    /// Serialized as `note` to match stored profile documents.
    #[serde(rename = "note")]
    pub text: String,
    #[serde(default = "default_section")]
    pub section: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Creates an active, medium-priority note with a fresh id.
    pub fn new(text: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            section: section.into(),
            active: true,
            priority: Priority::Medium,
            labels: Vec::new(),
            starred: false,
            created_at: Utc::now(),
        }
    }

    /// First line of the note, capped for list rows.
    pub fn preview(&self) -> String {
        self.text
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(PREVIEW_MAX_CHARS)
            .collect()
    }

    pub fn normalize_loaded(&mut self) {
        if self.section.trim().is_empty() {
            self.section = default_section();
        }
    }
}
