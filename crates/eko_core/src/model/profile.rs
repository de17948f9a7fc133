//! Aggregate profile record that owns a user's sections, tasks and notes.
//!
//! # Invariants
//! - Lists are written as whole documents; `revision` increases by one on
//!   every accepted write and guards against lost updates.
//! - Task and note ids are unique within their list.

use crate::model::note::Note;
use crate::model::section::Section;
use crate::model::task::Task;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Profile id as issued by the identity provider.
pub type ProfileId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub id: ProfileId,
    pub sections: Vec<Section>,
    pub tasks: Vec<Task>,
    pub notes: Vec<Note>,
    /// Optimistic concurrency token for list writes.
    pub revision: i64,
}

impl ProfileRecord {
    /// Empty profile at revision 0.
    pub fn empty(id: impl Into<ProfileId>) -> Self {
        Self {
            id: id.into(),
            sections: Vec::new(),
            tasks: Vec::new(),
            notes: Vec::new(),
            revision: 0,
        }
    }

    /// Applies load-time defaults to every task and note.
    pub fn normalize_loaded(&mut self, today: NaiveDate) {
        for task in &mut self.tasks {
            task.normalize_loaded(today);
        }
        for note in &mut self.notes {
            note.normalize_loaded();
        }
    }
}

/// Whole-list replacement request; `None` leaves a list untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileUpdate<'a> {
    pub sections: Option<&'a [Section]>,
    pub tasks: Option<&'a [Task]>,
    pub notes: Option<&'a [Note]>,
}

impl<'a> ProfileUpdate<'a> {
    pub fn tasks(tasks: &'a [Task]) -> Self {
        Self {
            tasks: Some(tasks),
            ..Self::default()
        }
    }

    pub fn notes(notes: &'a [Note]) -> Self {
        Self {
            notes: Some(notes),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_none() && self.tasks.is_none() && self.notes.is_none()
    }

    /// Checks list-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if let Some(tasks) = self.tasks {
            let mut seen = HashSet::with_capacity(tasks.len());
            for task in tasks {
                if !seen.insert(task.id) {
                    return Err(ProfileValidationError::DuplicateTaskId(task.id));
                }
                if task.text.trim().is_empty() {
                    return Err(ProfileValidationError::BlankTaskText(task.id));
                }
            }
        }
        if let Some(notes) = self.notes {
            let mut seen = HashSet::with_capacity(notes.len());
            for note in notes {
                if !seen.insert(note.id) {
                    return Err(ProfileValidationError::DuplicateNoteId(note.id));
                }
                if note.text.trim().is_empty() {
                    return Err(ProfileValidationError::BlankNoteText(note.id));
                }
            }
        }
        if let Some(sections) = self.sections {
            let mut seen = HashSet::with_capacity(sections.len());
            for section in sections {
                if section.id.trim().is_empty() || !seen.insert(section.id.as_str()) {
                    return Err(ProfileValidationError::InvalidSectionId(section.id.clone()));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    DuplicateTaskId(Uuid),
    DuplicateNoteId(Uuid),
    BlankTaskText(Uuid),
    BlankNoteText(Uuid),
    InvalidSectionId(String),
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTaskId(id) => write!(f, "duplicate task id: {id}"),
            Self::DuplicateNoteId(id) => write!(f, "duplicate note id: {id}"),
            Self::BlankTaskText(id) => write!(f, "task text must not be blank: {id}"),
            Self::BlankNoteText(id) => write!(f, "note text must not be blank: {id}"),
            Self::InvalidSectionId(id) => write!(f, "invalid or duplicate section id: `{id}`"),
        }
    }
}

impl Error for ProfileValidationError {}

#[cfg(test)]
mod tests {
    use super::{ProfileUpdate, ProfileValidationError};
    use crate::model::section::Section;
    use crate::model::task::Task;

    #[test]
    fn validate_rejects_duplicate_task_ids() {
        let task = Task::new("one", "all");
        let tasks = vec![task.clone(), task.clone()];
        let err = ProfileUpdate::tasks(&tasks)
            .validate()
            .expect_err("duplicate ids must be rejected");
        assert_eq!(err, ProfileValidationError::DuplicateTaskId(task.id));
    }

    #[test]
    fn validate_rejects_duplicate_section_ids() {
        let sections = vec![Section::new("work", "Work"), Section::new("work", "Work 2")];
        let update = ProfileUpdate {
            sections: Some(&sections),
            ..ProfileUpdate::default()
        };
        assert!(matches!(
            update.validate(),
            Err(ProfileValidationError::InvalidSectionId(_))
        ));
    }
}
