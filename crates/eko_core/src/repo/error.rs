//! Shared repository error type.

use crate::db::DbError;
use crate::model::profile::ProfileValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ProfileValidationError),
    Db(DbError),
    /// Target row does not exist.
    NotFound { entity: &'static str, id: String },
    /// Write presented a stale profile revision.
    RevisionConflict {
        profile_id: String,
        expected: i64,
        actual: i64,
    },
    /// Persisted data cannot be converted into a valid record.
    InvalidData(String),
    /// Record could not be encoded for storage.
    Serialization(serde_json::Error),
    /// Connection schema is missing a required table.
    MissingRequiredTable(&'static str),
}

impl RepoError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::RevisionConflict {
                profile_id,
                expected,
                actual,
            } => write!(
                f,
                "profile {profile_id} changed concurrently: expected revision {expected}, found {actual}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Serialization(err) => write!(f, "failed to encode record: {err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::NotFound { .. }
            | Self::RevisionConflict { .. }
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ProfileValidationError> for RepoError {
    fn from(value: ProfileValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
