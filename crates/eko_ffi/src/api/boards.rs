//! Task board, note board, section and dashboard entry points.
//!
//! Every call loads the caller's board, applies one use-case and persists
//! the whole list, matching one UI event per FFI call.

use super::{parse_id, respond, with_connection, ApiResponse};
use chrono::NaiveDate;
use eko_core::query::pipeline::{DueFilter, ListFilter};
use eko_core::service::{NoteEdit, SectionService};
use eko_core::{
    BoardError, DailyResetWorker, DashboardService, NoteBoard, NoteQuery, Priority, Recurrence,
    Selection, SortOption, SqliteProfileRepository, StaticIdentity, SystemClock, TaskBoard,
    TaskQuery,
};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

static RESET_WORKER: Mutex<Option<DailyResetWorker>> = Mutex::new(None);

type SqliteTaskBoard<'conn> = TaskBoard<SqliteProfileRepository<'conn>, SystemClock>;
type SqliteNoteBoard<'conn> = NoteBoard<SqliteProfileRepository<'conn>>;

/// Filter, sort and page input shared by task and note lists.
///
/// Absent fields use the board defaults: section `all`, no search, any
/// priority, creation date sort, page 1 of 10.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardQueryInput {
    pub section: Option<String>,
    pub search: Option<String>,
    /// `high|medium|low`.
    pub priority: Option<String>,
    pub active_only: bool,
    /// `all|today|overdue|upcoming`; ignored for notes.
    pub due: Option<String>,
    /// Ignored for notes.
    pub show_completed: bool,
    /// `date|priority|dueDate`.
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Full field set of the note edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEditInput {
    pub text: String,
    pub priority: String,
    pub section: String,
    pub starred: bool,
    pub active: bool,
}

#[derive(Debug, Serialize)]
struct PageAfterDelete {
    page: usize,
}

/// Filtered task page plus header counters.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(user_id: String, query: BoardQueryInput) -> ApiResponse {
    let result = task_query(&query)
        .and_then(|query| with_task_board(&user_id, |board| Ok(board.view(&query))));
    respond("task_list", "Tasks loaded.", result)
}

/// Adds a task. `recurrence_json` uses the stored rule shape, e.g.
/// `{"type":"weekly","interval":1,"daysOfWeek":[1]}`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(
    user_id: String,
    text: String,
    section: String,
    recurrence_json: Option<String>,
) -> ApiResponse {
    let result = parse_recurrence(recurrence_json.as_deref()).and_then(|recurrence| {
        with_task_board(&user_id, |board| board.add_task(&text, &section, recurrence))
    });
    respond("task_add", "Task created.", result)
}

/// Returns the new completed state.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_completion(user_id: String, task_id: String) -> ApiResponse {
    let result = parse_id(&task_id, "task_id")
        .and_then(|id| with_task_board(&user_id, |board| board.toggle_completion(id)));
    respond("task_toggle_completion", "Task updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_star(user_id: String, task_id: String) -> ApiResponse {
    let result = parse_id(&task_id, "task_id")
        .and_then(|id| with_task_board(&user_id, |board| board.toggle_star(id)));
    respond("task_toggle_star", "Task updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_active(user_id: String, task_id: String) -> ApiResponse {
    let result = parse_id(&task_id, "task_id")
        .and_then(|id| with_task_board(&user_id, |board| board.toggle_active(id)));
    respond("task_toggle_active", "Task updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_edit_text(user_id: String, task_id: String, text: String) -> ApiResponse {
    let result = parse_id(&task_id, "task_id")
        .and_then(|id| with_task_board(&user_id, |board| board.edit_text(id, &text)));
    respond("task_edit_text", "Task updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_set_priority(user_id: String, task_id: String, priority: String) -> ApiResponse {
    let result = parse_id(&task_id, "task_id").and_then(|id| {
        let priority = parse_priority(&priority)?;
        with_task_board(&user_id, |board| board.set_priority(id, priority))
    });
    respond("task_set_priority", "Task updated.", result)
}

/// `due_date` is `YYYY-MM-DD`; `None` clears it.
#[flutter_rust_bridge::frb(sync)]
pub fn task_set_due_date(
    user_id: String,
    task_id: String,
    due_date: Option<String>,
) -> ApiResponse {
    let result = parse_id(&task_id, "task_id").and_then(|id| {
        let due = due_date.as_deref().map(parse_date).transpose()?;
        with_task_board(&user_id, |board| board.set_due_date(id, due))
    });
    respond("task_set_due_date", "Task updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_set_recurrence(
    user_id: String,
    task_id: String,
    recurrence_json: String,
) -> ApiResponse {
    let result = parse_id(&task_id, "task_id").and_then(|id| {
        let rule = parse_recurrence(Some(&recurrence_json))?.unwrap_or_default();
        with_task_board(&user_id, |board| board.set_recurrence(id, rule))
    });
    respond("task_set_recurrence", "Task updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_change_section(user_id: String, task_id: String, section: String) -> ApiResponse {
    let result = parse_id(&task_id, "task_id")
        .and_then(|id| with_task_board(&user_id, |board| board.change_section(id, &section)));
    respond("task_change_section", "Task moved.", result)
}

/// Deletes one task; the payload's `page` is the page to show next for
/// `query`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(user_id: String, task_id: String, query: BoardQueryInput) -> ApiResponse {
    let result = parse_id(&task_id, "task_id").and_then(|id| {
        let query = task_query(&query)?;
        with_task_board(&user_id, |board| {
            board
                .delete_task(id, &query)
                .map(|page| PageAfterDelete { page })
        })
    });
    respond("task_delete", "Task deleted.", result)
}

/// Returns the number of deleted tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn task_bulk_delete(user_id: String, task_ids: Vec<String>) -> ApiResponse {
    let result = parse_selection(&task_ids, "task_id").and_then(|mut selection| {
        with_task_board(&user_id, |board| board.bulk_delete(&mut selection))
    });
    respond("task_bulk_delete", "Tasks deleted.", result)
}

/// Returns the number of moved tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn task_bulk_move(user_id: String, task_ids: Vec<String>, section: String) -> ApiResponse {
    let result = parse_selection(&task_ids, "task_id").and_then(|mut selection| {
        with_task_board(&user_id, |board| board.bulk_move(&mut selection, &section))
    });
    respond("task_bulk_move", "Tasks moved.", result)
}

/// Next occurrence for a recurring task as `YYYY-MM-DD`, or `null`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_next_due_date(user_id: String, task_id: String) -> ApiResponse {
    let result = parse_id(&task_id, "task_id")
        .and_then(|id| with_task_board(&user_id, |board| board.next_due_date(id)));
    respond("task_next_due_date", "Next due date computed.", result)
}

/// Runs the daily reset sweep once for one user; returns the reset count.
#[flutter_rust_bridge::frb(sync)]
pub fn task_daily_reset(user_id: String) -> ApiResponse {
    let result = with_task_board(&user_id, |board| board.run_daily_reset());
    respond("task_daily_reset", "Daily reset done.", result)
}

/// Starts the background rollover watcher for `user_id`, replacing any
/// running one. `poll_secs` defaults to 60.
///
/// # FFI contract
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn daily_reset_start(user_id: String, poll_secs: Option<u64>) -> String {
    if user_id.trim().is_empty() {
        return "daily_reset_start failed: no signed-in user".to_string();
    }
    let mut slot = RESET_WORKER.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(mut previous) = slot.take() {
        previous.stop();
    }

    let owner = user_id.clone();
    let on_rollover = move |date: NaiveDate| {
        match with_task_board(&owner, |board| board.run_daily_reset()) {
            Ok(count) => info!(
                "event=daily_reset module=ffi status=ok date={date} reset_count={count}"
            ),
            Err(err) => warn!("event=daily_reset module=ffi status=error date={date} error={err}"),
        }
    };
    let spawned = match poll_secs.filter(|secs| *secs > 0) {
        Some(secs) => DailyResetWorker::spawn(SystemClock, Duration::from_secs(secs), on_rollover),
        None => DailyResetWorker::spawn_default(SystemClock, on_rollover),
    };
    match spawned {
        Ok(worker) => {
            *slot = Some(worker);
            String::new()
        }
        Err(err) => format!("daily_reset_start failed: {err}"),
    }
}

/// Stops the background watcher; returns whether one was running.
#[flutter_rust_bridge::frb(sync)]
pub fn daily_reset_stop() -> bool {
    let mut slot = RESET_WORKER.lock().unwrap_or_else(PoisonError::into_inner);
    match slot.take() {
        Some(mut worker) => {
            worker.stop();
            true
        }
        None => false,
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_list(user_id: String, query: BoardQueryInput) -> ApiResponse {
    let result = note_query(&query)
        .and_then(|query| with_note_board(&user_id, |board| Ok(board.view(&query))));
    respond("note_list", "Notes loaded.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_add(user_id: String, text: String, section: String) -> ApiResponse {
    let result = with_note_board(&user_id, |board| board.add_note(&text, &section));
    respond("note_add", "Note created.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_update(user_id: String, note_id: String, edit: NoteEditInput) -> ApiResponse {
    let result = parse_id(&note_id, "note_id").and_then(|id| {
        let edit = NoteEdit {
            text: edit.text,
            priority: parse_priority(&edit.priority)?,
            section: edit.section,
            starred: edit.starred,
            active: edit.active,
        };
        with_note_board(&user_id, |board| board.update_note(id, edit))
    });
    respond("note_update", "Note updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_toggle_star(user_id: String, note_id: String) -> ApiResponse {
    let result = parse_id(&note_id, "note_id")
        .and_then(|id| with_note_board(&user_id, |board| board.toggle_star(id)));
    respond("note_toggle_star", "Note updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_toggle_active(user_id: String, note_id: String) -> ApiResponse {
    let result = parse_id(&note_id, "note_id")
        .and_then(|id| with_note_board(&user_id, |board| board.toggle_active(id)));
    respond("note_toggle_active", "Note updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_change_section(user_id: String, note_id: String, section: String) -> ApiResponse {
    let result = parse_id(&note_id, "note_id")
        .and_then(|id| with_note_board(&user_id, |board| board.change_section(id, &section)));
    respond("note_change_section", "Note moved.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(user_id: String, note_id: String) -> ApiResponse {
    let result = parse_id(&note_id, "note_id")
        .and_then(|id| with_note_board(&user_id, |board| board.delete_note(id)));
    respond("note_delete", "Note deleted.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_bulk_delete(user_id: String, note_ids: Vec<String>) -> ApiResponse {
    let result = parse_selection(&note_ids, "note_id").and_then(|mut selection| {
        with_note_board(&user_id, |board| board.bulk_delete(&mut selection))
    });
    respond("note_bulk_delete", "Notes deleted.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_bulk_move(user_id: String, note_ids: Vec<String>, section: String) -> ApiResponse {
    let result = parse_selection(&note_ids, "note_id").and_then(|mut selection| {
        with_note_board(&user_id, |board| board.bulk_move(&mut selection, &section))
    });
    respond("note_bulk_move", "Notes moved.", result)
}

/// Defaults followed by the user's custom sections.
#[flutter_rust_bridge::frb(sync)]
pub fn section_list(user_id: String) -> ApiResponse {
    let result = with_section_service(&user_id, |service| service.list());
    respond("section_list", "Sections loaded.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn section_add(user_id: String, name: String) -> ApiResponse {
    let result = with_section_service(&user_id, |service| service.add_section(&name));
    respond("section_add", "Section added.", result)
}

/// Removes a custom section; the payload is the number of rehomed items.
#[flutter_rust_bridge::frb(sync)]
pub fn section_remove(user_id: String, section_id: String) -> ApiResponse {
    let result = with_section_service(&user_id, |service| service.remove_section(&section_id));
    respond("section_remove", "Section removed.", result)
}

/// Home page data: sections, section-filtered tasks and notes, counters.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_snapshot(
    user_id: String,
    task_section: String,
    note_section: String,
) -> ApiResponse {
    let result = with_connection(|conn| {
        let repo = profile_repo(conn)?;
        let identity = StaticIdentity::signed_in(user_id.as_str());
        DashboardService::new(repo, SystemClock)
            .snapshot(&identity, &task_section, &note_section)
            .map_err(board_error)
    });
    respond("dashboard_snapshot", "Dashboard loaded.", result)
}

fn with_task_board<T>(
    user_id: &str,
    f: impl FnOnce(&mut SqliteTaskBoard<'_>) -> Result<T, BoardError>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = profile_repo(conn)?;
        let identity = StaticIdentity::signed_in(user_id);
        let mut board = TaskBoard::load(repo, &identity, SystemClock).map_err(board_error)?;
        f(&mut board).map_err(board_error)
    })
}

fn with_note_board<T>(
    user_id: &str,
    f: impl FnOnce(&mut SqliteNoteBoard<'_>) -> Result<T, BoardError>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = profile_repo(conn)?;
        let identity = StaticIdentity::signed_in(user_id);
        let mut board = NoteBoard::load(repo, &identity).map_err(board_error)?;
        f(&mut board).map_err(board_error)
    })
}

fn with_section_service<T>(
    user_id: &str,
    f: impl FnOnce(
        &SectionService<SqliteProfileRepository<'_>>,
    ) -> Result<T, eko_core::service::SectionError>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = profile_repo(conn)?;
        let identity = StaticIdentity::signed_in(user_id);
        let service = SectionService::new(repo, &identity).map_err(|err| err.to_string())?;
        f(&service).map_err(|err| err.to_string())
    })
}

fn profile_repo(conn: &Connection) -> Result<SqliteProfileRepository<'_>, String> {
    SqliteProfileRepository::try_new(conn).map_err(|err| format!("repo init failed: {err}"))
}

fn board_error(err: BoardError) -> String {
    if err.is_conflict() {
        format!("{err}; reload and try again")
    } else {
        err.to_string()
    }
}

fn task_query(input: &BoardQueryInput) -> Result<TaskQuery, String> {
    let defaults = TaskQuery::default();
    Ok(TaskQuery {
        filter: list_filter(input)?,
        due: match input.due.as_deref() {
            Some(raw) => {
                DueFilter::parse(raw).ok_or_else(|| format!("invalid due filter: `{raw}`"))?
            }
            None => defaults.due,
        },
        show_completed: input.show_completed,
        sort: sort_option(input.sort.as_deref())?.unwrap_or(defaults.sort),
        page: input.page.map_or(defaults.page, |page| page as usize),
        page_size: input
            .page_size
            .map_or(defaults.page_size, |size| size as usize),
    })
}

fn note_query(input: &BoardQueryInput) -> Result<NoteQuery, String> {
    let defaults = NoteQuery::default();
    Ok(NoteQuery {
        filter: list_filter(input)?,
        sort: sort_option(input.sort.as_deref())?.unwrap_or(defaults.sort),
        page: input.page.map_or(defaults.page, |page| page as usize),
        page_size: input
            .page_size
            .map_or(defaults.page_size, |size| size as usize),
    })
}

fn list_filter(input: &BoardQueryInput) -> Result<ListFilter, String> {
    let defaults = ListFilter::default();
    Ok(ListFilter {
        section: input
            .section
            .as_deref()
            .map(str::trim)
            .filter(|section| !section.is_empty())
            .map_or(defaults.section, str::to_string),
        search: input.search.as_deref().unwrap_or_default().trim().to_string(),
        priority: input
            .priority
            .as_deref()
            .filter(|raw| !raw.trim().is_empty() && raw.trim() != "all")
            .map(parse_priority)
            .transpose()?,
        active_only: input.active_only,
    })
}

fn sort_option(raw: Option<&str>) -> Result<Option<SortOption>, String> {
    raw.map(|raw| SortOption::parse(raw).ok_or_else(|| format!("invalid sort option: `{raw}`")))
        .transpose()
}

fn parse_priority(raw: &str) -> Result<Priority, String> {
    Priority::parse(raw).ok_or_else(|| format!("invalid priority: `{raw}`"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date `{raw}`, expected YYYY-MM-DD"))
}

fn parse_recurrence(raw: Option<&str>) -> Result<Option<Recurrence>, String> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(json) => serde_json::from_str::<Recurrence>(json)
            .map(Some)
            .map_err(|err| format!("invalid recurrence: {err}")),
        None => Ok(None),
    }
}

fn parse_selection(raw_ids: &[String], field: &str) -> Result<Selection, String> {
    raw_ids.iter().map(|raw| parse_id(raw, field)).collect()
}
