//! Dashboard home read model.

use crate::clock::Clock;
use crate::identity::IdentityProvider;
use crate::model::note::Note;
use crate::model::section::{available_sections, Section, DEFAULT_SECTION_ID};
use crate::model::task::Task;
use crate::repo::profile_repo::ProfileRepository;
use crate::service::board::{load_profile, BoardError};
use serde::Serialize;

/// Everything the home page renders in one read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub sections: Vec<Section>,
    pub tasks: Vec<Task>,
    pub notes: Vec<Note>,
    /// Tasks in the task filter not yet completed today.
    pub open_tasks: usize,
    /// Open tasks in the task filter whose due date has passed.
    pub overdue_tasks: usize,
}

pub struct DashboardService<R: ProfileRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: ProfileRepository, C: Clock> DashboardService<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Tasks and notes filtered by their own section chips; `all` shows
    /// everything.
    pub fn snapshot(
        &self,
        identity: &dyn IdentityProvider,
        task_section: &str,
        note_section: &str,
    ) -> Result<DashboardSnapshot, BoardError> {
        let today = self.clock.today();
        let mut profile = load_profile(&self.repo, identity)?;
        profile.normalize_loaded(today);

        let tasks = profile
            .tasks
            .into_iter()
            .filter(|task| in_section(&task.section, task_section))
            .collect::<Vec<_>>();
        let notes = profile
            .notes
            .into_iter()
            .filter(|note| in_section(&note.section, note_section))
            .collect::<Vec<_>>();

        let open_tasks = tasks
            .iter()
            .filter(|task| !task.is_completed_on(today))
            .count();
        let overdue_tasks = tasks
            .iter()
            .filter(|task| task.is_overdue_on(today))
            .count();

        Ok(DashboardSnapshot {
            sections: available_sections(&profile.sections),
            tasks,
            notes,
            open_tasks,
            overdue_tasks,
        })
    }
}

fn in_section(item_section: &str, filter: &str) -> bool {
    filter == DEFAULT_SECTION_ID || item_section == filter
}
