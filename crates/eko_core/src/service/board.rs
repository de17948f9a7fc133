//! Pieces shared by the task and note boards.

use crate::identity::IdentityProvider;
use crate::model::field::FieldError;
use crate::model::profile::ProfileRecord;
use crate::model::section::{available_sections, Section};
use crate::repo::profile_repo::ProfileRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for board mutations.
#[derive(Debug)]
pub enum BoardError {
    /// No signed-in user to load a profile for.
    MissingIdentity,
    /// Rejected user input, tagged with the offending field.
    Validation(FieldError),
    /// Target task or note is not in the working copy.
    ItemNotFound(Uuid),
    /// Section id is not in the available set.
    UnknownSection(String),
    /// Persistence-layer failure; the working copy was left unchanged.
    Repo(RepoError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentity => write!(f, "no signed-in user"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::UnknownSection(id) => write!(f, "unknown section: `{id}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BoardError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<FieldError> for BoardError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value)
    }
}

impl BoardError {
    /// Whether a refresh is the right recovery (someone else wrote first).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Repo(RepoError::RevisionConflict { .. }))
    }
}

/// Resolves the signed-in user and loads (or creates) their profile.
pub(crate) fn load_profile<R: ProfileRepository>(
    repo: &R,
    identity: &dyn IdentityProvider,
) -> Result<ProfileRecord, BoardError> {
    let profile_id = identity
        .current_user_id()
        .ok_or(BoardError::MissingIdentity)?;
    Ok(repo.ensure_profile(&profile_id)?)
}

pub(crate) fn ensure_known_section(section: &str, custom: &[Section]) -> Result<(), BoardError> {
    if available_sections(custom)
        .iter()
        .any(|candidate| candidate.id == section)
    {
        return Ok(());
    }
    Err(BoardError::UnknownSection(section.to_string()))
}

/// Trimmed, non-blank text or a `required` field error.
pub(crate) fn required_text(
    value: &str,
    field: &'static str,
    label: &str,
) -> Result<String, BoardError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::required(field, label).into());
    }
    Ok(trimmed.to_string())
}
