//! Domain model for the dashboard core.
//!
//! # Responsibility
//! - Define canonical records for tasks, notes, sections, profiles,
//!   prospects and blog posts.
//! - Keep serialized field names compatible with the profile JSON documents
//!   the dashboard already stores (`task`, `note`, `dueDate`, ...).
//!
//! # Invariants
//! - Task and note ids are unique within their owning profile list.
//! - Calendar dates (`due_date`, `last_completed`, `end_date`) carry no
//!   timezone; timestamps (`created_at`) are UTC.

pub mod blog;
pub mod field;
pub mod list_id;
pub mod note;
pub mod profile;
pub mod prospect;
pub mod section;
pub mod task;
