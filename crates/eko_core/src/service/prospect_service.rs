//! Prospect CRM use-cases.
//!
//! # Responsibility
//! - Back the prospect list, create, edit and show pages.
//! - Validate form drafts and stamp timestamps.
//! - Tell the UI where to go after a successful form submit.
//!
//! # Invariants
//! - `update_status` touches only `status` and `updated_at`.
//! - `mark_converted` sets `converted_at` once; repeated calls are no-ops.
//! - Page sizes are clamped into `1..=MAX_PAGE_SIZE`.

use crate::clock::Clock;
use crate::model::field::FieldError;
use crate::model::prospect::{Prospect, ProspectDraft, ProspectId, ProspectStatus};
use crate::navigation::NavigationRequest;
use crate::repo::prospect_repo::{ProspectListQuery, ProspectRepository};
use crate::repo::{truncate_to_millis, RepoError};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

const RESOURCE: &str = "prospects";

#[derive(Debug)]
pub enum ProspectServiceError {
    Validation(FieldError),
    NotFound(ProspectId),
    Repo(RepoError),
}

impl Display for ProspectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "prospect not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProspectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for ProspectServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<FieldError> for ProspectServiceError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value)
    }
}

/// Stored record plus the page to open next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProspectWrite {
    pub prospect: Prospect,
    pub navigation: Option<NavigationRequest>,
}

/// List page request; `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProspectListRequest {
    pub search: Option<String>,
    pub status: Option<ProspectStatus>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ProspectListRequest {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProspectListResult {
    pub items: Vec<Prospect>,
    /// Matches across all pages.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

pub struct ProspectService<R: ProspectRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: ProspectRepository, C: Clock> ProspectService<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Validates and inserts a prospect; status defaults to `1. new`.
    pub fn create(&self, draft: &ProspectDraft) -> Result<ProspectWrite, ProspectServiceError> {
        draft.validate()?;
        let draft = draft.normalized();
        let now = truncate_to_millis(self.clock.now());
        let prospect = Prospect {
            id: Uuid::new_v4(),
            company_name: draft.company_name,
            contact_name: draft.contact_name,
            email: draft.email,
            phone: draft.phone,
            website: draft.website,
            status: draft.status.unwrap_or_default(),
            notes: draft.notes,
            is_migrated: false,
            converted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.repo.create_prospect(&prospect)?;
        log_write("create", prospect.id);
        Ok(ProspectWrite {
            navigation: NavigationRequest::show(RESOURCE, prospect.id),
            prospect,
        })
    }

    /// Replaces the form fields of an existing prospect.
    ///
    /// A draft without status keeps the current stage. Conversion state and
    /// `created_at` are never touched.
    pub fn update(
        &self,
        id: ProspectId,
        draft: &ProspectDraft,
    ) -> Result<ProspectWrite, ProspectServiceError> {
        draft.validate()?;
        let draft = draft.normalized();
        let current = self.require(id)?;
        let prospect = Prospect {
            company_name: draft.company_name,
            contact_name: draft.contact_name,
            email: draft.email,
            phone: draft.phone,
            website: draft.website,
            status: draft.status.unwrap_or(current.status),
            notes: draft.notes,
            updated_at: truncate_to_millis(self.clock.now()),
            ..current
        };
        self.repo.update_prospect(&prospect)?;
        log_write("update", id);
        Ok(ProspectWrite {
            navigation: NavigationRequest::show(RESOURCE, id),
            prospect,
        })
    }

    /// Inline stage change from the list page.
    pub fn update_status(
        &self,
        id: ProspectId,
        status: ProspectStatus,
    ) -> Result<Prospect, ProspectServiceError> {
        self.repo
            .update_status(id, status, truncate_to_millis(self.clock.now()))
            .map_err(|err| not_found_as(err, id))?;
        log_write("update_status", id);
        self.require(id)
    }

    pub fn mark_converted(&self, id: ProspectId) -> Result<Prospect, ProspectServiceError> {
        let current = self.require(id)?;
        if current.is_migrated && current.converted_at.is_some() {
            return Ok(current);
        }
        let now = truncate_to_millis(self.clock.now());
        let prospect = Prospect {
            is_migrated: true,
            converted_at: current.converted_at.or(Some(now)),
            updated_at: now,
            ..current
        };
        self.repo.update_prospect(&prospect)?;
        log_write("convert", id);
        Ok(prospect)
    }

    pub fn get(&self, id: ProspectId) -> Result<Option<Prospect>, ProspectServiceError> {
        Ok(self.repo.get_prospect(id)?)
    }

    pub fn list(
        &self,
        request: &ProspectListRequest,
    ) -> Result<ProspectListResult, ProspectServiceError> {
        let page = request.page.max(1);
        let page_size = request.page_size.clamp(1, MAX_PAGE_SIZE);
        let query = ProspectListQuery {
            search: request.search.clone(),
            status: request.status,
            limit: page_size,
            offset: (page - 1).saturating_mul(page_size),
        };
        let result = self.repo.list_prospects(&query)?;
        Ok(ProspectListResult {
            items: result.items,
            total: result.total,
            page,
            page_size,
        })
    }

    pub fn delete(&self, id: ProspectId) -> Result<(), ProspectServiceError> {
        self.repo
            .delete_prospect(id)
            .map_err(|err| not_found_as(err, id))?;
        log_write("delete", id);
        Ok(())
    }

    fn require(&self, id: ProspectId) -> Result<Prospect, ProspectServiceError> {
        self.repo
            .get_prospect(id)?
            .ok_or(ProspectServiceError::NotFound(id))
    }
}

fn not_found_as(err: RepoError, id: ProspectId) -> ProspectServiceError {
    match err {
        RepoError::NotFound { .. } => ProspectServiceError::NotFound(id),
        other => ProspectServiceError::Repo(other),
    }
}

fn log_write(action: &str, id: ProspectId) {
    info!("event=prospect_write module=service status=ok action={action} prospect_id={id}");
}
