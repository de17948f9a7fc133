//! Section catalogue shared by tasks and notes.
//!
//! # Invariants
//! - Default sections always come first and cannot be shadowed by custom
//!   entries with the same id.
//! - Unknown section ids display as [`UNCATEGORIZED_LABEL`].

use serde::{Deserialize, Serialize};

/// Section that means "no section filter" and doubles as the fallback home.
pub const DEFAULT_SECTION_ID: &str = "all";
pub const PERSONAL_SECTION_ID: &str = "personal";
pub const ARCHIVED_SECTION_ID: &str = "archived";
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

const DEFAULT_SECTIONS: &[(&str, &str)] = &[
    (DEFAULT_SECTION_ID, "All"),
    (PERSONAL_SECTION_ID, "Personal"),
    (ARCHIVED_SECTION_ID, "Archived"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
}

impl Section {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Returns whether `id` names one of the built-in sections.
pub fn is_default_section(id: &str) -> bool {
    DEFAULT_SECTIONS.iter().any(|(default_id, _)| *default_id == id)
}

/// Built-in sections in display order.
pub fn default_sections() -> Vec<Section> {
    DEFAULT_SECTIONS
        .iter()
        .map(|(id, name)| Section::new(*id, *name))
        .collect()
}

/// Defaults followed by custom sections that do not reuse a default id.
pub fn available_sections(custom: &[Section]) -> Vec<Section> {
    let mut sections = default_sections();
    sections.extend(
        custom
            .iter()
            .filter(|section| !is_default_section(section.id.as_str()))
            .cloned(),
    );
    sections
}

/// Display name for a section id, falling back to "Uncategorized".
pub fn section_display_name<'a>(id: &str, available: &'a [Section]) -> &'a str {
    available
        .iter()
        .find(|section| section.id == id)
        .map_or(UNCATEGORIZED_LABEL, |section| section.name.as_str())
}

/// Derives a section id from a user-entered name.
///
/// Trims, lowercases and replaces each whitespace run with `-`.
pub fn slugify_section_id(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
