//! Task domain model.
//!
//! # Responsibility
//! - Define the task record stored inside a profile's task list.
//! - Define the declarative recurrence rule attached to repeating tasks.
//!
//! # Invariants
//! - A task is "completed" only for the calendar day in `last_completed`;
//!   [`Task::normalize_loaded`] re-derives the flag on every load.
//! - `Recurrence::interval` is at least 1 after normalization.
//! - Weekday indices use 0 = Sunday through 6 = Saturday.

use crate::model::section::DEFAULT_SECTION_ID;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one task inside a profile list.
pub type TaskId = Uuid;

/// Shared priority scale for tasks and notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort rank, higher first.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Repeat period of a recurrence rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Declarative "how often does this repeat" rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

const MAX_DAY_OF_MONTH: u8 = 31;
const MAX_WEEKDAY: u8 = 6;

fn default_interval() -> u32 {
    1
}

impl Default for Recurrence {
    fn default() -> Self {
        Self::new(RecurrenceKind::None, 1)
    }
}

impl Recurrence {
    pub fn new(kind: RecurrenceKind, interval: u32) -> Self {
        Self {
            kind,
            interval: interval.max(1),
            days_of_week: None,
            day_of_month: None,
            end_date: None,
        }
    }

    /// Switches the period, seeding period-specific defaults from `today`.
    ///
    /// Weekly rules start on today's weekday and monthly rules on today's day
    /// of month. Interval and end date carry over.
    pub fn with_kind(&self, kind: RecurrenceKind, today: NaiveDate) -> Self {
        Self {
            kind,
            interval: self.interval.max(1),
            days_of_week: (kind == RecurrenceKind::Weekly)
                .then(|| vec![today.weekday().num_days_from_sunday() as u8]),
            day_of_month: (kind == RecurrenceKind::Monthly).then(|| today.day() as u8),
            end_date: self.end_date,
        }
    }

    /// Returns whether this rule actually repeats.
    pub fn is_active(&self) -> bool {
        self.kind != RecurrenceKind::None
    }

    /// Clamps out-of-range inputs the way the recurrence editor does.
    ///
    /// - `interval` is raised to 1.
    /// - `day_of_month` is clamped into `1..=31`.
    /// - Weekdays outside `0..=6` are dropped, duplicates removed, and an
    ///   empty set collapses to `None`.
    pub fn normalized(mut self) -> Self {
        self.interval = self.interval.max(1);
        self.day_of_month = self
            .day_of_month
            .map(|day| day.clamp(1, MAX_DAY_OF_MONTH));
        self.days_of_week = self.days_of_week.and_then(|days| {
            let mut days = days
                .into_iter()
                .filter(|day| *day <= MAX_WEEKDAY)
                .collect::<Vec<_>>();
            days.sort_unstable();
            days.dedup();
            (!days.is_empty()).then_some(days)
        });
        self
    }
}

/// One entry of a profile's task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "crate::model::list_id::deserialize")]
    pub id: TaskId,
    /// Serialized as `task` to match stored profile documents.
    #[serde(rename = "task")]
    pub text: String,
    #[serde(default = "default_section")]
    pub section: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub starred: bool,
    /// Entries stored without one load as the Unix epoch and sort oldest.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<NaiveDate>,
}

pub(crate) fn default_section() -> String {
    DEFAULT_SECTION_ID.to_string()
}

pub(crate) fn default_true() -> bool {
    true
}

impl Task {
    /// Creates an active, medium-priority task with a fresh id.
    pub fn new(text: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            section: section.into(),
            active: true,
            completed: false,
            priority: Priority::Medium,
            due_date: None,
            labels: Vec::new(),
            starred: false,
            created_at: Utc::now(),
            recurrence: None,
            last_completed: None,
        }
    }

    /// Completed-for-today view of the task.
    pub fn is_completed_on(&self, today: NaiveDate) -> bool {
        self.completed && self.last_completed == Some(today)
    }

    /// Open task whose due date has passed.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.is_completed_on(today) && self.due_date.is_some_and(|due| due < today)
    }

    /// Re-derives load-time defaults.
    ///
    /// - Blank sections fall back to the default section.
    /// - `completed` is true only when `last_completed` is today.
    /// - A `none` recurrence is dropped.
    pub fn normalize_loaded(&mut self, today: NaiveDate) {
        if self.section.trim().is_empty() {
            self.section = default_section();
        }
        self.completed = self.last_completed == Some(today);
        if self.recurrence.as_ref().is_some_and(|rule| !rule.is_active()) {
            self.recurrence = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, Recurrence, RecurrenceKind, Task};
    use chrono::{DateTime, NaiveDate, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn deserializes_sparse_profile_entry_with_defaults() {
        let raw = r#"{"id":"6f1c2a4e-8f0b-4a55-9a3e-0d4f5b0e8a11","task":"call back"}"#;
        let task: Task = serde_json::from_str(raw).expect("sparse task should parse");
        assert_eq!(task.section, "all");
        assert!(task.active);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.labels.is_empty());
        assert!(task.recurrence.is_none());
    }

    #[test]
    fn missing_created_at_is_stable_across_loads() {
        let raw = r#"{"id":"1718000000000","task":"legacy"}"#;
        let first: Task = serde_json::from_str(raw).expect("legacy task should parse");
        let second: Task = serde_json::from_str(raw).expect("legacy task should parse");
        assert_eq!(first.created_at, DateTime::<Utc>::default());
        assert_eq!(first, second);
        assert_eq!(first.id, Uuid::from_u128(1_718_000_000_000));

        let numeric: Task = serde_json::from_str(r#"{"id":1718000000000,"task":"legacy"}"#)
            .expect("numeric id should parse");
        assert_eq!(numeric.id, first.id);
        assert!(serde_json::from_str::<Task>(r#"{"id":"abc","task":"x"}"#).is_err());
    }

    #[test]
    fn serializes_with_profile_document_field_names() {
        let mut task = Task::new("ship it", "personal");
        task.due_date = Some(date(2024, 3, 1));
        let value = serde_json::to_value(&task).expect("task should serialize");
        assert_eq!(value["task"], "ship it");
        assert_eq!(value["dueDate"], "2024-03-01");
        assert!(value.get("lastCompleted").is_none());
    }

    #[test]
    fn normalize_loaded_only_keeps_completion_for_today() {
        let today = date(2024, 5, 10);
        let mut stale = Task::new("stale", "");
        stale.completed = true;
        stale.last_completed = Some(date(2024, 5, 9));
        stale.normalize_loaded(today);
        assert!(!stale.completed);
        assert_eq!(stale.section, "all");

        let mut fresh = Task::new("fresh", "all");
        fresh.last_completed = Some(today);
        fresh.normalize_loaded(today);
        assert!(fresh.completed);
    }

    #[test]
    fn with_kind_seeds_weekday_and_day_of_month() {
        // 2024-05-10 is a Friday.
        let today = date(2024, 5, 10);
        let weekly = Recurrence::default().with_kind(RecurrenceKind::Weekly, today);
        assert_eq!(weekly.days_of_week, Some(vec![5]));
        assert_eq!(weekly.day_of_month, None);

        let monthly = weekly.with_kind(RecurrenceKind::Monthly, today);
        assert_eq!(monthly.day_of_month, Some(10));
        assert_eq!(monthly.days_of_week, None);
    }

    #[test]
    fn normalized_clamps_editor_inputs() {
        let rule = Recurrence {
            kind: RecurrenceKind::Weekly,
            interval: 0,
            days_of_week: Some(vec![3, 9, 1, 3]),
            day_of_month: Some(40),
            end_date: None,
        }
        .normalized();
        assert_eq!(rule.interval, 1);
        assert_eq!(rule.days_of_week, Some(vec![1, 3]));
        assert_eq!(rule.day_of_month, Some(31));
    }
}
