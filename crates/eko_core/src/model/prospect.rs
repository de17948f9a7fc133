//! CRM prospect model.
//!
//! # Responsibility
//! - Define the prospect record and its eight-stage sales pipeline.
//! - Validate create/edit form input at field level.
//!
//! # Invariants
//! - `company_name` and `email` are never blank on persisted rows.
//! - `converted_at` is set once `is_migrated` flips to true.

use crate::model::field::{non_blank, FieldError};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProspectId = Uuid;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("valid email regex")
});

/// Sales pipeline stage. Labels carry their ordinal prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProspectStatus {
    #[default]
    New,
    Contacted,
    Engaged,
    Interested,
    SalesCall,
    Qualified,
    Negotiations,
    Signed,
}

impl ProspectStatus {
    pub const ALL: [ProspectStatus; 8] = [
        Self::New,
        Self::Contacted,
        Self::Engaged,
        Self::Interested,
        Self::SalesCall,
        Self::Qualified,
        Self::Negotiations,
        Self::Signed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::New => "1. new",
            Self::Contacted => "2. contacted",
            Self::Engaged => "3. engaged",
            Self::Interested => "4. interested",
            Self::SalesCall => "5. salescall",
            Self::Qualified => "6. qualified",
            Self::Negotiations => "7. negotiations",
            Self::Signed => "8. signed",
        }
    }

    /// Parses a stage label; accepts the legacy `7. negotitions` spelling.
    pub fn parse_label(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized == "7. negotitions" {
            return Some(Self::Negotiations);
        }
        Self::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: ProspectId,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub status: ProspectStatus,
    pub notes: Option<String>,
    pub is_migrated: bool,
    pub converted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/edit form payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProspectDraft {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// `None` keeps the current stage on edit and means `1. new` on create.
    pub status: Option<ProspectStatus>,
    pub notes: Option<String>,
}

impl ProspectDraft {
    /// Field-level validation; reports the first rejected field.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.company_name.trim().is_empty() {
            return Err(FieldError::required("company_name", "Company name"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FieldError::required("email", "Email"));
        }
        if !is_valid_email(email) {
            return Err(FieldError::new("email", "Invalid email address"));
        }
        Ok(())
    }

    /// Trims text fields and turns blank optionals into `None`.
    pub fn normalized(&self) -> Self {
        Self {
            company_name: self.company_name.trim().to_string(),
            contact_name: non_blank(self.contact_name.as_deref()),
            email: self.email.trim().to_string(),
            phone: non_blank(self.phone.as_deref()),
            website: non_blank(self.website.as_deref()),
            status: self.status,
            notes: non_blank(self.notes.as_deref()),
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, ProspectDraft, ProspectStatus};

    #[test]
    fn labels_round_trip_through_parse() {
        for status in ProspectStatus::ALL {
            assert_eq!(ProspectStatus::parse_label(status.label()), Some(status));
        }
        assert_eq!(
            ProspectStatus::parse_label("7. negotitions"),
            Some(ProspectStatus::Negotiations)
        );
        assert_eq!(ProspectStatus::parse_label("9. unknown"), None);
    }

    #[test]
    fn email_pattern_is_case_insensitive() {
        assert!(is_valid_email("Sales@Example.COM"));
        assert!(!is_valid_email("sales@example"));
        assert!(!is_valid_email("no-at-sign.example.com"));
    }

    #[test]
    fn validate_names_the_failing_field() {
        let draft = ProspectDraft {
            company_name: "  ".to_string(),
            email: "a@b.io".to_string(),
            ..ProspectDraft::default()
        };
        assert_eq!(draft.validate().unwrap_err().field, "company_name");

        let draft = ProspectDraft {
            company_name: "Acme".to_string(),
            email: "not-an-email".to_string(),
            ..ProspectDraft::default()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err.field, "email");
        assert_eq!(err.message, "Invalid email address");
    }
}
