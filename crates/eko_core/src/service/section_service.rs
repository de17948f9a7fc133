//! Custom section management.
//!
//! # Invariants
//! - Default sections can be neither added nor removed.
//! - Removing a section moves its tasks and notes to `all` in the same
//!   revision-checked write that drops the section.

use crate::identity::IdentityProvider;
use crate::model::field::FieldError;
use crate::model::profile::{ProfileRecord, ProfileUpdate};
use crate::model::section::{
    available_sections, is_default_section, slugify_section_id, Section, DEFAULT_SECTION_ID,
};
use crate::repo::profile_repo::ProfileRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SectionError {
    MissingIdentity,
    Validation(FieldError),
    /// Id collides with an existing custom section.
    DuplicateSection(String),
    /// Id belongs to a built-in section.
    ReservedSection(String),
    SectionNotFound(String),
    Repo(RepoError),
}

impl Display for SectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentity => write!(f, "no signed-in user"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateSection(id) => write!(f, "section already exists: `{id}`"),
            Self::ReservedSection(id) => write!(f, "section is built in: `{id}`"),
            Self::SectionNotFound(id) => write!(f, "section not found: `{id}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SectionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Section catalogue of the signed-in user's profile.
pub struct SectionService<R: ProfileRepository> {
    repo: R,
    profile_id: String,
}

impl<R: ProfileRepository> SectionService<R> {
    pub fn new(repo: R, identity: &dyn IdentityProvider) -> Result<Self, SectionError> {
        let profile_id = identity
            .current_user_id()
            .ok_or(SectionError::MissingIdentity)?;
        Ok(Self { repo, profile_id })
    }

    /// Defaults followed by custom sections.
    pub fn list(&self) -> Result<Vec<Section>, SectionError> {
        Ok(available_sections(&self.profile()?.sections))
    }

    /// Adds a custom section whose id is the slug of `name`.
    pub fn add_section(&self, name: &str) -> Result<Section, SectionError> {
        let name = name.trim();
        let id = slugify_section_id(name);
        if id.is_empty() {
            return Err(SectionError::Validation(FieldError::required(
                "name",
                "Section name",
            )));
        }
        if is_default_section(&id) {
            return Err(SectionError::ReservedSection(id));
        }

        let profile = self.profile()?;
        if profile.sections.iter().any(|section| section.id == id) {
            return Err(SectionError::DuplicateSection(id));
        }

        let section = Section::new(id, name);
        let mut sections = profile.sections.clone();
        sections.push(section.clone());
        let revision = self.repo.update_lists(
            &self.profile_id,
            profile.revision,
            ProfileUpdate {
                sections: Some(&sections),
                ..ProfileUpdate::default()
            },
        )?;
        info!(
            "event=section_write module=service status=ok action=add revision={revision} count={}",
            sections.len()
        );
        Ok(section)
    }

    /// Drops a custom section and rehomes its tasks and notes.
    ///
    /// Returns how many tasks and notes moved.
    pub fn remove_section(&self, id: &str) -> Result<usize, SectionError> {
        if is_default_section(id) {
            return Err(SectionError::ReservedSection(id.to_string()));
        }
        let mut profile = self.profile()?;
        let before = profile.sections.len();
        profile.sections.retain(|section| section.id != id);
        if profile.sections.len() == before {
            return Err(SectionError::SectionNotFound(id.to_string()));
        }

        let mut moved = 0;
        for task in profile.tasks.iter_mut().filter(|task| task.section == id) {
            task.section = DEFAULT_SECTION_ID.to_string();
            moved += 1;
        }
        for note in profile.notes.iter_mut().filter(|note| note.section == id) {
            note.section = DEFAULT_SECTION_ID.to_string();
            moved += 1;
        }

        let revision = self.repo.update_lists(
            &self.profile_id,
            profile.revision,
            ProfileUpdate {
                sections: Some(&profile.sections),
                tasks: Some(&profile.tasks),
                notes: Some(&profile.notes),
            },
        )?;
        info!(
            "event=section_write module=service status=ok action=remove revision={revision} moved={moved}"
        );
        Ok(moved)
    }

    fn profile(&self) -> Result<ProfileRecord, SectionError> {
        Ok(self.repo.ensure_profile(&self.profile_id)?)
    }
}
