//! Field-level validation error shared by form-backed records.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// One rejected form field.
///
/// `field` uses the persisted column name so UI layers can attach the message
/// to the matching input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for the common "is required" rejection.
    pub fn required(field: &'static str, label: &str) -> Self {
        Self::new(field, format!("{label} is required"))
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Error for FieldError {}

/// Returns `None` for blank input, otherwise the trimmed value.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
