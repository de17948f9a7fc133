//! Task board use-cases.
//!
//! # Responsibility
//! - Hold the signed-in user's task list as a working copy.
//! - Apply single-task, bulk and daily-reset mutations and persist the
//!   whole list after each one.
//! - Serve filtered pages through the list pipeline.
//!
//! # Invariants
//! - Mutations are staged on a copy. The working copy changes only after
//!   the write succeeds, so a failed write leaves it as it was.
//! - Every write presents the revision read at load time; a stale board
//!   gets `RevisionConflict` and must `refresh()`.

use crate::clock::Clock;
use crate::identity::IdentityProvider;
use crate::model::profile::{ProfileId, ProfileRecord, ProfileUpdate};
use crate::model::section::{available_sections, Section};
use crate::model::task::{Priority, Recurrence, Task, TaskId};
use crate::query::pipeline::{
    filter_tasks, page_after_removal, run_task_query, TaskQuery, TaskView,
};
use crate::query::selection::Selection;
use crate::repo::profile_repo::ProfileRepository;
use crate::repo::RepoError;
use crate::schedule::daily_reset::reset_completed_tasks;
use crate::schedule::recurrence;
use crate::service::board::{ensure_known_section, load_profile, required_text, BoardError};
use chrono::NaiveDate;
use log::{error, info};

/// Working copy of one profile's tasks.
pub struct TaskBoard<R: ProfileRepository, C: Clock> {
    repo: R,
    clock: C,
    profile_id: ProfileId,
    revision: i64,
    custom_sections: Vec<Section>,
    tasks: Vec<Task>,
    /// Stored completion flags from an earlier day not yet written back.
    stale_completions: usize,
}

impl<R: ProfileRepository, C: Clock> TaskBoard<R, C> {
    /// Loads the current identity's profile, creating it when missing.
    pub fn load(repo: R, identity: &dyn IdentityProvider, clock: C) -> Result<Self, BoardError> {
        let profile = load_profile(&repo, identity)?;
        let mut board = Self {
            repo,
            clock,
            profile_id: profile.id.clone(),
            revision: 0,
            custom_sections: Vec::new(),
            tasks: Vec::new(),
            stale_completions: 0,
        };
        board.replace_from(profile);
        Ok(board)
    }

    /// Re-reads the profile, dropping any local state.
    pub fn refresh(&mut self) -> Result<(), BoardError> {
        let profile = self
            .repo
            .get_profile(&self.profile_id)?
            .ok_or_else(|| RepoError::not_found("profile", &self.profile_id))?;
        self.replace_from(profile);
        Ok(())
    }

    fn replace_from(&mut self, mut profile: ProfileRecord) {
        let today = self.clock.today();
        self.stale_completions = profile
            .tasks
            .iter()
            .filter(|task| task.completed && task.last_completed != Some(today))
            .count();
        profile.normalize_loaded(today);
        info!(
            "event=board_load module=service status=ok board=tasks revision={} count={}",
            profile.revision,
            profile.tasks.len()
        );
        self.revision = profile.revision;
        self.custom_sections = profile.sections;
        self.tasks = profile.tasks;
    }

    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Full working copy in stored order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Defaults followed by the profile's custom sections.
    pub fn sections(&self) -> Vec<Section> {
        available_sections(&self.custom_sections)
    }

    pub fn view(&self, query: &TaskQuery) -> TaskView {
        run_task_query(&self.tasks, query, self.clock.today())
    }

    /// Appends a new task. A `none` recurrence is dropped.
    pub fn add_task(
        &mut self,
        text: &str,
        section: &str,
        recurrence: Option<Recurrence>,
    ) -> Result<Task, BoardError> {
        let text = required_text(text, "task", "Task")?;
        ensure_known_section(section, &self.custom_sections)?;

        let mut task = Task::new(text, section);
        task.recurrence = recurrence
            .map(Recurrence::normalized)
            .filter(Recurrence::is_active);

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        Ok(task)
    }

    /// Completes the task for today, or reopens it when already completed
    /// today. Completing a recurring task moves its due date to the next
    /// occurrence. Returns the new completed state.
    pub fn toggle_completion(&mut self, id: TaskId) -> Result<bool, BoardError> {
        self.mutate_task(id, |task, today| {
            if task.is_completed_on(today) {
                task.completed = false;
                task.last_completed = None;
                return Ok(false);
            }
            task.completed = true;
            task.last_completed = Some(today);
            if let Some(next_due) = recurrence::next_due_date(task, today) {
                task.due_date = Some(next_due);
            }
            Ok(true)
        })
    }

    pub fn toggle_star(&mut self, id: TaskId) -> Result<bool, BoardError> {
        self.mutate_task(id, |task, _| {
            task.starred = !task.starred;
            Ok(task.starred)
        })
    }

    pub fn toggle_active(&mut self, id: TaskId) -> Result<bool, BoardError> {
        self.mutate_task(id, |task, _| {
            task.active = !task.active;
            Ok(task.active)
        })
    }

    pub fn edit_text(&mut self, id: TaskId, text: &str) -> Result<(), BoardError> {
        let text = required_text(text, "task", "Task")?;
        self.mutate_task(id, |task, _| {
            task.text = text;
            Ok(())
        })
    }

    /// Replaces the recurrence rule; kind `none` removes it.
    pub fn set_recurrence(&mut self, id: TaskId, rule: Recurrence) -> Result<(), BoardError> {
        let rule = Some(rule.normalized()).filter(Recurrence::is_active);
        self.mutate_task(id, |task, _| {
            task.recurrence = rule;
            Ok(())
        })
    }

    pub fn change_section(&mut self, id: TaskId, section: &str) -> Result<(), BoardError> {
        ensure_known_section(section, &self.custom_sections)?;
        self.mutate_task(id, |task, _| {
            task.section = section.to_string();
            Ok(())
        })
    }

    pub fn set_priority(&mut self, id: TaskId, priority: Priority) -> Result<(), BoardError> {
        self.mutate_task(id, |task, _| {
            task.priority = priority;
            Ok(())
        })
    }

    /// Sets or (with `None`) removes the due date.
    pub fn set_due_date(&mut self, id: TaskId, due: Option<NaiveDate>) -> Result<(), BoardError> {
        self.mutate_task(id, |task, _| {
            task.due_date = due;
            Ok(())
        })
    }

    /// Removes one task and returns the page to show for `query` afterwards.
    pub fn delete_task(&mut self, id: TaskId, query: &TaskQuery) -> Result<usize, BoardError> {
        if self.task(id).is_none() {
            return Err(BoardError::ItemNotFound(id));
        }
        let next = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect::<Vec<_>>();
        self.commit(next)?;

        let remaining = filter_tasks(&self.tasks, query, self.clock.today()).len();
        Ok(page_after_removal(query.page, remaining, query.page_size))
    }

    /// Deletes every selected task, then clears the selection.
    pub fn bulk_delete(&mut self, selection: &mut Selection) -> Result<usize, BoardError> {
        if selection.is_empty() {
            return Ok(0);
        }
        let next = self
            .tasks
            .iter()
            .filter(|task| !selection.contains(&task.id))
            .cloned()
            .collect::<Vec<_>>();
        let removed = self.tasks.len() - next.len();
        self.commit(next)?;
        selection.clear();
        Ok(removed)
    }

    /// Moves every selected task to `target`, then clears the selection.
    pub fn bulk_move(
        &mut self,
        selection: &mut Selection,
        target: &str,
    ) -> Result<usize, BoardError> {
        ensure_known_section(target, &self.custom_sections)?;
        if selection.is_empty() {
            return Ok(0);
        }
        let mut moved = 0;
        let mut next = self.tasks.clone();
        for task in next.iter_mut().filter(|task| selection.contains(&task.id)) {
            task.section = target.to_string();
            moved += 1;
        }
        self.commit(next)?;
        selection.clear();
        Ok(moved)
    }

    /// Reopens tasks completed on an earlier day; writes only on change.
    ///
    /// Counts both tasks completed before a rollover seen by this board and
    /// stored flags that loading already re-derived.
    pub fn run_daily_reset(&mut self) -> Result<usize, BoardError> {
        let today = self.clock.today();
        let mut next = self.tasks.clone();
        let changed = reset_completed_tasks(&mut next, today) + self.stale_completions;
        if changed > 0 {
            self.commit(next)?;
        }
        info!("event=daily_reset module=service status=ok date={today} reset_count={changed}");
        Ok(changed)
    }

    pub fn next_due_date(&self, id: TaskId) -> Result<Option<NaiveDate>, BoardError> {
        let task = self.task(id).ok_or(BoardError::ItemNotFound(id))?;
        Ok(recurrence::next_due_date(task, self.clock.today()))
    }

    fn mutate_task<T>(
        &mut self,
        id: TaskId,
        apply: impl FnOnce(&mut Task, NaiveDate) -> Result<T, BoardError>,
    ) -> Result<T, BoardError> {
        let today = self.clock.today();
        let mut next = self.tasks.clone();
        let task = next
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(BoardError::ItemNotFound(id))?;
        let outcome = apply(task, today)?;
        self.commit(next)?;
        Ok(outcome)
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<(), BoardError> {
        match self
            .repo
            .update_lists(&self.profile_id, self.revision, ProfileUpdate::tasks(&next))
        {
            Ok(revision) => {
                info!(
                    "event=board_persist module=service status=ok board=tasks revision={} count={}",
                    revision,
                    next.len()
                );
                self.revision = revision;
                self.tasks = next;
                self.stale_completions = 0;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=board_persist module=service status=error board=tasks revision={} error={}",
                    self.revision, err
                );
                Err(err.into())
            }
        }
    }
}
