//! Blog post model.

use crate::model::field::{non_blank, FieldError};
use crate::model::profile::ProfileId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BlogId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: BlogId,
    /// Author profile; only the author may edit or delete.
    pub profile_id: ProfileId,
    pub title: String,
    pub content: String,
    pub image_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/edit form payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub image_link: Option<String>,
}

impl BlogDraft {
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.title.trim().is_empty() {
            return Err(FieldError::required("title", "Title"));
        }
        if self.content.trim().is_empty() {
            return Err(FieldError::required("content", "Content"));
        }
        Ok(())
    }

    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            image_link: non_blank(self.image_link.as_deref()),
        }
    }
}
