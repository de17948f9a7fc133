//! Core domain logic for the Eko dashboard.
//! This crate is the single source of truth for business invariants.

pub mod access;
pub mod clock;
pub mod db;
pub mod identity;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod query;
pub mod repo;
pub mod schedule;
pub mod service;
pub mod templates;

pub use access::{default_policy, AccessPolicy, AccessRequest, PolicyError, PolicyEvaluator};
pub use clock::{Clock, FixedClock, SystemClock};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use identity::{IdentityProvider, StaticIdentity};
pub use logging::{
    default_log_level, init_logging, logging_status, LogConfig, LogLevel, LoggingError,
};
pub use model::blog::{BlogDraft, BlogId, BlogPost};
pub use model::field::FieldError;
pub use model::note::{Note, NoteId};
pub use model::profile::{ProfileId, ProfileRecord};
pub use model::prospect::{Prospect, ProspectDraft, ProspectId, ProspectStatus};
pub use model::section::Section;
pub use model::task::{Priority, Recurrence, RecurrenceKind, Task, TaskId};
pub use navigation::{NavigationAction, NavigationRequest};
pub use query::{NoteQuery, Page, Selection, SortOption, TaskQuery, TaskView};
pub use repo::blog_repo::{BlogRepository, SqliteBlogRepository};
pub use repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
pub use repo::prospect_repo::{ProspectRepository, SqliteProspectRepository};
pub use repo::{ListPage, RepoError, RepoResult};
pub use schedule::{next_due_date, DailyResetWorker};
pub use service::{
    BlogService, BoardError, DashboardService, NoteBoard, ProspectService, SectionService,
    TaskBoard,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
