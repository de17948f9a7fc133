//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

mod board;
pub mod blog_service;
pub mod dashboard_service;
pub mod note_service;
pub mod prospect_service;
pub mod section_service;
pub mod task_service;

pub use blog_service::{is_owner, BlogService, BlogServiceError, BlogWrite};
pub use board::BoardError;
pub use dashboard_service::{DashboardService, DashboardSnapshot};
pub use note_service::{NoteBoard, NoteEdit};
pub use prospect_service::{
    ProspectListRequest, ProspectListResult, ProspectService, ProspectServiceError, ProspectWrite,
};
pub use section_service::{SectionError, SectionService};
pub use task_service::TaskBoard;
