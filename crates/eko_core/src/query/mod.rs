//! Board read models: the filter/sort/paginate pipeline and selection state.

pub mod pipeline;
pub mod selection;

pub use pipeline::{
    filter_notes, filter_tasks, page_after_removal, paginate, run_note_query, run_task_query,
    sort_items, total_pages, BoardItem, DueFilter, ListFilter, NoteQuery, Page, SortOption,
    TaskQuery, TaskSummary, TaskView, DEFAULT_PAGE_SIZE,
};
pub use selection::Selection;
