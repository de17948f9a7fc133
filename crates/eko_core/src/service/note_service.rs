//! Note board use-cases.
//!
//! # Responsibility
//! - Hold the signed-in user's notes as a working copy.
//! - Back the notes list page and the note edit page.
//!
//! # Invariants
//! - Same write discipline as the task board: stage, write under the
//!   loaded revision, then swap in the staged copy.

use crate::identity::IdentityProvider;
use crate::model::note::{Note, NoteId};
use crate::model::profile::{ProfileId, ProfileRecord, ProfileUpdate};
use crate::model::section::{available_sections, Section};
use crate::model::task::Priority;
use crate::query::pipeline::{run_note_query, NoteQuery, Page};
use crate::query::selection::Selection;
use crate::repo::profile_repo::ProfileRepository;
use crate::repo::RepoError;
use crate::service::board::{ensure_known_section, load_profile, required_text, BoardError};
use log::{error, info};

/// Full replacement payload from the note edit page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEdit {
    pub text: String,
    pub priority: Priority,
    pub section: String,
    pub starred: bool,
    pub active: bool,
}

impl From<&Note> for NoteEdit {
    fn from(note: &Note) -> Self {
        Self {
            text: note.text.clone(),
            priority: note.priority,
            section: note.section.clone(),
            starred: note.starred,
            active: note.active,
        }
    }
}

/// Working copy of one profile's notes.
pub struct NoteBoard<R: ProfileRepository> {
    repo: R,
    profile_id: ProfileId,
    revision: i64,
    custom_sections: Vec<Section>,
    notes: Vec<Note>,
}

impl<R: ProfileRepository> NoteBoard<R> {
    pub fn load(repo: R, identity: &dyn IdentityProvider) -> Result<Self, BoardError> {
        let profile = load_profile(&repo, identity)?;
        let mut board = Self {
            repo,
            profile_id: profile.id.clone(),
            revision: 0,
            custom_sections: Vec::new(),
            notes: Vec::new(),
        };
        board.replace_from(profile);
        Ok(board)
    }

    pub fn refresh(&mut self) -> Result<(), BoardError> {
        let profile = self
            .repo
            .get_profile(&self.profile_id)?
            .ok_or_else(|| RepoError::not_found("profile", &self.profile_id))?;
        self.replace_from(profile);
        Ok(())
    }

    fn replace_from(&mut self, profile: ProfileRecord) {
        info!(
            "event=board_load module=service status=ok board=notes revision={} count={}",
            profile.revision,
            profile.notes.len()
        );
        self.revision = profile.revision;
        self.custom_sections = profile.sections;
        self.notes = profile.notes;
        for note in &mut self.notes {
            note.normalize_loaded();
        }
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get_note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn sections(&self) -> Vec<Section> {
        available_sections(&self.custom_sections)
    }

    pub fn view(&self, query: &NoteQuery) -> Page<Note> {
        run_note_query(&self.notes, query)
    }

    pub fn add_note(&mut self, text: &str, section: &str) -> Result<Note, BoardError> {
        let text = required_text(text, "note", "Note")?;
        ensure_known_section(section, &self.custom_sections)?;
        let note = Note::new(text, section);
        let mut next = self.notes.clone();
        next.push(note.clone());
        self.commit(next)?;
        Ok(note)
    }

    pub fn toggle_star(&mut self, id: NoteId) -> Result<bool, BoardError> {
        self.mutate_note(id, |note| {
            note.starred = !note.starred;
            note.starred
        })
    }

    pub fn toggle_active(&mut self, id: NoteId) -> Result<bool, BoardError> {
        self.mutate_note(id, |note| {
            note.active = !note.active;
            note.active
        })
    }

    pub fn change_section(&mut self, id: NoteId, section: &str) -> Result<(), BoardError> {
        ensure_known_section(section, &self.custom_sections)?;
        self.mutate_note(id, |note| note.section = section.to_string())
    }

    /// Replaces every editable field and returns the stored note.
    pub fn update_note(&mut self, id: NoteId, edit: NoteEdit) -> Result<Note, BoardError> {
        let text = required_text(&edit.text, "note", "Note")?;
        ensure_known_section(&edit.section, &self.custom_sections)?;
        self.mutate_note(id, |note| {
            note.text = text;
            note.priority = edit.priority;
            note.section = edit.section;
            note.starred = edit.starred;
            note.active = edit.active;
            note.clone()
        })
    }

    pub fn delete_note(&mut self, id: NoteId) -> Result<(), BoardError> {
        if self.get_note(id).is_none() {
            return Err(BoardError::ItemNotFound(id));
        }
        let next = self
            .notes
            .iter()
            .filter(|note| note.id != id)
            .cloned()
            .collect();
        self.commit(next)
    }

    pub fn bulk_delete(&mut self, selection: &mut Selection) -> Result<usize, BoardError> {
        if selection.is_empty() {
            return Ok(0);
        }
        let next = self
            .notes
            .iter()
            .filter(|note| !selection.contains(&note.id))
            .cloned()
            .collect::<Vec<_>>();
        let removed = self.notes.len() - next.len();
        self.commit(next)?;
        selection.clear();
        Ok(removed)
    }

    pub fn bulk_move(
        &mut self,
        selection: &mut Selection,
        target: &str,
    ) -> Result<usize, BoardError> {
        ensure_known_section(target, &self.custom_sections)?;
        if selection.is_empty() {
            return Ok(0);
        }
        let mut next = self.notes.clone();
        let mut moved = 0;
        for note in next.iter_mut().filter(|note| selection.contains(&note.id)) {
            note.section = target.to_string();
            moved += 1;
        }
        self.commit(next)?;
        selection.clear();
        Ok(moved)
    }

    fn mutate_note<T>(
        &mut self,
        id: NoteId,
        apply: impl FnOnce(&mut Note) -> T,
    ) -> Result<T, BoardError> {
        let mut next = self.notes.clone();
        let note = next
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or(BoardError::ItemNotFound(id))?;
        let outcome = apply(note);
        self.commit(next)?;
        Ok(outcome)
    }

    fn commit(&mut self, next: Vec<Note>) -> Result<(), BoardError> {
        match self
            .repo
            .update_lists(&self.profile_id, self.revision, ProfileUpdate::notes(&next))
        {
            Ok(revision) => {
                info!(
                    "event=board_persist module=service status=ok board=notes revision={} count={}",
                    revision,
                    next.len()
                );
                self.revision = revision;
                self.notes = next;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=board_persist module=service status=error board=notes revision={} error={}",
                    self.revision, err
                );
                Err(err.into())
            }
        }
    }
}
