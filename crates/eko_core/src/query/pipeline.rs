//! In-memory filter, sort and pagination for task and note lists.
//!
//! # Responsibility
//! - Turn a full profile list plus UI filter state into one visible page.
//! - Stay pure: the same input always yields the same page.
//!
//! # Invariants
//! - Filters run before sorting; sorting runs before slicing.
//! - Starred items lead every page; the primary sort order is kept within
//!   the starred and unstarred groups.
//! - `total_pages == ceil(total_items / page_size)`; the last page holds
//!   `total_items % page_size` items, or a full page when that is zero.

use crate::model::note::Note;
use crate::model::section::DEFAULT_SECTION_ID;
use crate::model::task::{Priority, Task};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use uuid::Uuid;

/// Rows per page on the task and note boards.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Common read surface for list entries that go through the pipeline.
pub trait BoardItem {
    fn item_id(&self) -> Uuid;
    fn item_text(&self) -> &str;
    fn item_section(&self) -> &str;
    fn item_priority(&self) -> Priority;
    fn item_active(&self) -> bool;
    fn item_starred(&self) -> bool;
    fn item_created_at(&self) -> DateTime<Utc>;
    fn item_due_date(&self) -> Option<NaiveDate> {
        None
    }
}

impl BoardItem for Task {
    fn item_id(&self) -> Uuid {
        self.id
    }
    fn item_text(&self) -> &str {
        &self.text
    }
    fn item_section(&self) -> &str {
        &self.section
    }
    fn item_priority(&self) -> Priority {
        self.priority
    }
    fn item_active(&self) -> bool {
        self.active
    }
    fn item_starred(&self) -> bool {
        self.starred
    }
    fn item_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn item_due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

impl BoardItem for Note {
    fn item_id(&self) -> Uuid {
        self.id
    }
    fn item_text(&self) -> &str {
        &self.text
    }
    fn item_section(&self) -> &str {
        &self.section
    }
    fn item_priority(&self) -> Priority {
        self.priority
    }
    fn item_active(&self) -> bool {
        self.active
    }
    fn item_starred(&self) -> bool {
        self.starred
    }
    fn item_created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOption {
    /// Newest first.
    #[default]
    CreatedDesc,
    /// High before medium before low.
    Priority,
    /// Earliest due date first, undated last. Notes fall back to
    /// [`SortOption::CreatedDesc`].
    DueDate,
}

impl SortOption {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date" | "created" => Some(Self::CreatedDesc),
            "priority" => Some(Self::Priority),
            "duedate" | "due_date" | "due" => Some(Self::DueDate),
            _ => None,
        }
    }
}

/// Due-date bucket for tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueFilter {
    #[default]
    Any,
    /// Due exactly today.
    Today,
    /// Due before today and not completed today.
    Overdue,
    /// Due after today and not completed today.
    Upcoming,
}

impl DueFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" | "any" | "" => Some(Self::Any),
            "today" => Some(Self::Today),
            "overdue" => Some(Self::Overdue),
            "upcoming" => Some(Self::Upcoming),
            _ => None,
        }
    }
}

/// Filters shared by tasks and notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    /// `all` disables the section filter.
    pub section: String,
    /// Case-insensitive substring; empty matches everything.
    pub search: String,
    pub priority: Option<Priority>,
    pub active_only: bool,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            section: DEFAULT_SECTION_ID.to_string(),
            search: String::new(),
            priority: None,
            active_only: false,
        }
    }
}

impl ListFilter {
    pub fn matches<T: BoardItem>(&self, item: &T) -> bool {
        if self.section != DEFAULT_SECTION_ID && item.item_section() != self.section {
            return false;
        }
        if !self.search.is_empty()
            && !item
                .item_text()
                .to_lowercase()
                .contains(&self.search.to_lowercase())
        {
            return false;
        }
        if self
            .priority
            .is_some_and(|priority| item.item_priority() != priority)
        {
            return false;
        }
        !self.active_only || item.item_active()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: ListFilter,
    pub due: DueFilter,
    /// When false, tasks completed today are hidden.
    pub show_completed: bool,
    pub sort: SortOption,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            filter: ListFilter::default(),
            due: DueFilter::Any,
            show_completed: false,
            sort: SortOption::CreatedDesc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteQuery {
    pub filter: ListFilter,
    pub sort: SortOption,
    pub page: usize,
    pub page_size: usize,
}

impl Default for NoteQuery {
    fn default() -> Self {
        Self {
            filter: ListFilter::default(),
            sort: SortOption::CreatedDesc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One visible page of a filtered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually shown, clamped into range.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Counts over the filtered (not paginated) task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub active: usize,
    pub starred: usize,
    pub overdue: usize,
}

impl TaskSummary {
    pub fn from_tasks(tasks: &[Task], today: NaiveDate) -> Self {
        tasks.iter().fold(Self::default(), |mut summary, task| {
            summary.total += 1;
            summary.active += usize::from(task.active);
            summary.starred += usize::from(task.starred);
            summary.overdue += usize::from(task.is_overdue_on(today));
            summary
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub page: Page<Task>,
    pub summary: TaskSummary,
}

/// Filtered and sorted tasks, with `completed` re-derived for `today`.
pub fn filter_tasks(tasks: &[Task], query: &TaskQuery, today: NaiveDate) -> Vec<Task> {
    let mut result = tasks
        .iter()
        .cloned()
        .map(|mut task| {
            task.completed = task.is_completed_on(today);
            task
        })
        .filter(|task| query.filter.matches(task))
        .filter(|task| match query.due {
            DueFilter::Any => true,
            DueFilter::Today => task.due_date == Some(today),
            DueFilter::Overdue => task.due_date.is_some_and(|due| due < today) && !task.completed,
            DueFilter::Upcoming => task.due_date.is_some_and(|due| due > today) && !task.completed,
        })
        .filter(|task| query.show_completed || !task.completed)
        .collect::<Vec<_>>();
    sort_items(&mut result, query.sort);
    result
}

pub fn filter_notes(notes: &[Note], query: &NoteQuery) -> Vec<Note> {
    let mut result = notes
        .iter()
        .filter(|note| query.filter.matches(*note))
        .cloned()
        .collect::<Vec<_>>();
    let sort = match query.sort {
        SortOption::DueDate => SortOption::CreatedDesc,
        other => other,
    };
    sort_items(&mut result, sort);
    result
}

/// Full task pipeline: filter, sort, summarize, slice.
pub fn run_task_query(tasks: &[Task], query: &TaskQuery, today: NaiveDate) -> TaskView {
    let filtered = filter_tasks(tasks, query, today);
    let summary = TaskSummary::from_tasks(&filtered, today);
    TaskView {
        page: paginate(&filtered, query.page, query.page_size),
        summary,
    }
}

pub fn run_note_query(notes: &[Note], query: &NoteQuery) -> Page<Note> {
    paginate(&filter_notes(notes, query), query.page, query.page_size)
}

/// Stable primary sort followed by a stable starred-first pass.
pub fn sort_items<T: BoardItem>(items: &mut [T], sort: SortOption) {
    match sort {
        SortOption::CreatedDesc => {
            items.sort_by(|a, b| b.item_created_at().cmp(&a.item_created_at()));
        }
        SortOption::Priority => {
            items.sort_by(|a, b| b.item_priority().rank().cmp(&a.item_priority().rank()));
        }
        SortOption::DueDate => {
            items.sort_by(|a, b| compare_due(a.item_due_date(), b.item_due_date()));
        }
    }
    items.sort_by_key(|item| !item.item_starred());
}

fn compare_due(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1))
}

/// Slices the 1-based `page` out of `items`, clamping the page into range.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let page = page.clamp(1, total_pages.max(1));
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// Page to show after items were removed from a list of `remaining` rows.
///
/// Steps back when the current page no longer exists; never below 1.
pub fn page_after_removal(current_page: usize, remaining: usize, page_size: usize) -> usize {
    current_page
        .min(total_pages(remaining, page_size).max(1))
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::{
        filter_tasks, page_after_removal, paginate, run_note_query, run_task_query, sort_items,
        DueFilter, ListFilter, NoteQuery, SortOption, TaskQuery,
    };
    use crate::model::note::Note;
    use crate::model::task::{Priority, Task};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn task(text: &str, minutes: i64) -> Task {
        let mut task = Task::new(text, "all");
        task.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + Duration::minutes(minutes);
        task
    }

    fn texts(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.text.as_str()).collect()
    }

    #[test]
    fn priority_sort_ranks_and_starred_lead() {
        let mut low = task("low", 0);
        low.priority = Priority::Low;
        let mut high = task("high", 1);
        high.priority = Priority::High;
        let medium = task("medium", 2);
        let mut starred_low = task("starred-low", 3);
        starred_low.priority = Priority::Low;
        starred_low.starred = true;

        let mut items = vec![low, high, medium, starred_low];
        sort_items(&mut items, SortOption::Priority);
        assert_eq!(texts(&items), vec!["starred-low", "high", "medium", "low"]);
    }

    #[test]
    fn due_date_sort_puts_undated_last() {
        let mut later = task("later", 0);
        later.due_date = Some(date(2024, 3, 2));
        let undated = task("undated", 1);
        let mut sooner = task("sooner", 2);
        sooner.due_date = Some(date(2024, 3, 1));

        let mut items = vec![later, undated, sooner];
        sort_items(&mut items, SortOption::DueDate);
        assert_eq!(texts(&items), vec!["sooner", "later", "undated"]);
    }

    #[test]
    fn hiding_completed_removes_today_completions_and_is_idempotent() {
        let today = date(2024, 5, 10);
        let mut done = task("done", 0);
        done.completed = true;
        done.last_completed = Some(today);
        let mut stale = task("stale", 1);
        stale.completed = true;
        stale.last_completed = Some(date(2024, 5, 9));
        let open = task("open", 2);
        let tasks = vec![done, stale, open];

        let query = TaskQuery::default();
        let once = filter_tasks(&tasks, &query, today);
        assert!(once.iter().all(|task| !task.is_completed_on(today)));
        assert_eq!(once.len(), 2);
        let twice = filter_tasks(&once, &query, today);
        assert_eq!(once, twice);

        let shown = filter_tasks(
            &tasks,
            &TaskQuery {
                show_completed: true,
                ..TaskQuery::default()
            },
            today,
        );
        assert_eq!(shown.len(), 3);
    }

    #[test]
    fn due_buckets_split_around_today() {
        let today = date(2024, 5, 10);
        let mut overdue = task("overdue", 0);
        overdue.due_date = Some(date(2024, 5, 1));
        let mut due_today = task("today", 1);
        due_today.due_date = Some(today);
        let mut upcoming = task("upcoming", 2);
        upcoming.due_date = Some(date(2024, 6, 1));
        let tasks = vec![overdue, due_today, upcoming, task("undated", 3)];

        let bucket = |due| {
            let query = TaskQuery {
                due,
                ..TaskQuery::default()
            };
            texts(&filter_tasks(&tasks, &query, today))
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(bucket(DueFilter::Overdue), vec!["overdue"]);
        assert_eq!(bucket(DueFilter::Today), vec!["today"]);
        assert_eq!(bucket(DueFilter::Upcoming), vec!["upcoming"]);
        assert_eq!(bucket(DueFilter::Any).len(), 4);
    }

    #[test]
    fn filters_compose_section_text_priority_and_active() {
        let today = date(2024, 5, 10);
        let mut work = task("Call Supplier", 0);
        work.section = "work".to_string();
        work.priority = Priority::High;
        let mut inactive = task("call home", 1);
        inactive.section = "work".to_string();
        inactive.priority = Priority::High;
        inactive.active = false;
        let other = task("call bank", 2);

        let query = TaskQuery {
            filter: ListFilter {
                section: "work".to_string(),
                search: "CALL".to_string(),
                priority: Some(Priority::High),
                active_only: true,
            },
            ..TaskQuery::default()
        };
        let view = run_task_query(&[work, inactive, other], &query, today);
        assert_eq!(texts(&view.page.items), vec!["Call Supplier"]);
        assert_eq!(view.summary.total, 1);
    }

    #[test]
    fn pagination_counts_pages_and_last_page_size() {
        let items = (0..23).collect::<Vec<_>>();
        let page = paginate(&items, 3, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![20, 21, 22]);

        let exact = (0..20).collect::<Vec<_>>();
        let last = paginate(&exact, 2, 10);
        assert_eq!(last.total_pages, 2);
        assert_eq!(last.items.len(), 10);

        let clamped = paginate(&exact, 9, 10);
        assert_eq!(clamped.page, 2);

        let empty = paginate::<i32>(&[], 1, 10);
        assert_eq!(empty.total_pages, 0);
        assert_eq!(empty.page, 1);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn removing_last_row_of_a_page_steps_back() {
        assert_eq!(page_after_removal(2, 10, 10), 1);
        assert_eq!(page_after_removal(2, 11, 10), 2);
        assert_eq!(page_after_removal(1, 0, 10), 1);
        assert_eq!(page_after_removal(3, 15, 10), 2);
    }

    #[test]
    fn summary_counts_filtered_set() {
        let today = date(2024, 5, 10);
        let mut overdue = task("late", 0);
        overdue.due_date = Some(date(2024, 5, 1));
        overdue.starred = true;
        let mut inactive = task("paused", 1);
        inactive.active = false;
        let view = run_task_query(&[overdue, inactive], &TaskQuery::default(), today);
        assert_eq!(view.summary.total, 2);
        assert_eq!(view.summary.active, 1);
        assert_eq!(view.summary.starred, 1);
        assert_eq!(view.summary.overdue, 1);
    }

    #[test]
    fn note_query_sorts_newest_first_with_starred_leading() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut old = Note::new("old", "all");
        old.created_at = base;
        let mut new = Note::new("new", "all");
        new.created_at = base + Duration::hours(1);
        let mut pinned = Note::new("pinned", "all");
        pinned.created_at = base - Duration::hours(1);
        pinned.starred = true;

        let page = run_note_query(&[old, new, pinned], &NoteQuery::default());
        let order = page
            .items
            .iter()
            .map(|note| note.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["pinned", "new", "old"]);
    }
}
