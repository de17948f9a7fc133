use chrono::NaiveDate;
use eko_core::db::open_db_in_memory;
use eko_core::query::pipeline::ListFilter;
use eko_core::service::{NoteEdit, SectionError};
use eko_core::{
    BoardError, DashboardService, FixedClock, NoteBoard, NoteQuery, Priority, ProfileRepository,
    SectionService, Selection, SortOption, SqliteProfileRepository, StaticIdentity, TaskBoard,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 15).unwrap()
}

#[test]
fn note_edit_replaces_fields_and_persists() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let identity = StaticIdentity::signed_in("writer");
    let mut board = NoteBoard::load(&repo, &identity).unwrap();

    let note = board.add_note("  meeting notes  ", "all").unwrap();
    assert_eq!(note.text, "meeting notes");

    let mut edit = NoteEdit::from(&note);
    edit.text = "meeting notes, revised".to_string();
    edit.priority = Priority::High;
    edit.section = "personal".to_string();
    edit.starred = true;
    let updated = board.update_note(note.id, edit).unwrap();
    assert_eq!(updated.priority, Priority::High);
    assert!(updated.starred);

    let reloaded = NoteBoard::load(&repo, &identity).unwrap();
    assert_eq!(reloaded.get_note(note.id), Some(&updated));
}

#[test]
fn note_view_filters_search_and_priority() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let identity = StaticIdentity::signed_in("reader");
    let mut board = NoteBoard::load(&repo, &identity).unwrap();

    let invoice = board.add_note("Invoice template", "all").unwrap();
    board.add_note("Grocery list", "personal").unwrap();
    let mut edit = NoteEdit::from(&invoice);
    edit.priority = Priority::Low;
    board.update_note(invoice.id, edit).unwrap();

    let page = board.view(&NoteQuery {
        filter: ListFilter {
            search: "INVOICE".to_string(),
            ..ListFilter::default()
        },
        ..NoteQuery::default()
    });
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].id, invoice.id);

    let page = board.view(&NoteQuery {
        filter: ListFilter {
            priority: Some(Priority::Medium),
            ..ListFilter::default()
        },
        sort: SortOption::DueDate,
        ..NoteQuery::default()
    });
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].text, "Grocery list");
}

#[test]
fn blank_note_is_rejected_with_field_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let mut board = NoteBoard::load(&repo, &StaticIdentity::signed_in("blank")).unwrap();

    match board.add_note("   ", "all") {
        Err(BoardError::Validation(err)) => assert_eq!(err.field, "note"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(board.notes().is_empty());
}

#[test]
fn removing_a_section_rehomes_tasks_and_notes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let identity = StaticIdentity::signed_in("organizer");
    let clock = FixedClock::on(today());

    let sections = SectionService::new(&repo, &identity).unwrap();
    let clients = sections.add_section("Clients").unwrap();
    assert!(matches!(
        sections.add_section("clients"),
        Err(SectionError::DuplicateSection(_))
    ));
    assert!(matches!(
        sections.add_section("All"),
        Err(SectionError::ReservedSection(_))
    ));

    let mut tasks = TaskBoard::load(&repo, &identity, clock).unwrap();
    tasks.add_task("call client", &clients.id, None).unwrap();
    let mut notes = NoteBoard::load(&repo, &identity).unwrap();
    let note = notes.add_note("client brief", &clients.id).unwrap();
    let mut selection = Selection::new();
    selection.toggle(note.id);

    assert_eq!(sections.remove_section(&clients.id).unwrap(), 2);
    assert!(matches!(
        sections.remove_section(&clients.id),
        Err(SectionError::SectionNotFound(_))
    ));

    let stored = repo.get_profile("organizer").unwrap().unwrap();
    assert!(stored.sections.is_empty());
    assert!(stored.tasks.iter().all(|task| task.section == "all"));
    assert!(stored.notes.iter().all(|note| note.section == "all"));

    // The note board still holds the old revision.
    assert!(notes
        .bulk_move(&mut selection, "personal")
        .unwrap_err()
        .is_conflict());
}

#[test]
fn dashboard_snapshot_filters_by_section_chips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let identity = StaticIdentity::signed_in("dash");
    let clock = FixedClock::on(today());

    let mut tasks = TaskBoard::load(&repo, &identity, clock).unwrap();
    let late = tasks.add_task("late", "personal", None).unwrap();
    tasks
        .set_due_date(late.id, NaiveDate::from_ymd_opt(2025, 4, 1))
        .unwrap();
    tasks.add_task("someday", "archived", None).unwrap();
    let mut notes = NoteBoard::load(&repo, &identity).unwrap();
    notes.add_note("idea", "personal").unwrap();

    let snapshot = DashboardService::new(&repo, clock)
        .snapshot(&identity, "personal", "all")
        .unwrap();
    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.notes.len(), 1);
    assert_eq!(snapshot.open_tasks, 1);
    assert_eq!(snapshot.overdue_tasks, 1);
    assert!(snapshot.sections.iter().any(|section| section.id == "all"));
}
