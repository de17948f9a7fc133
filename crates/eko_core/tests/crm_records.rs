use chrono::{Duration, NaiveDate, TimeZone, Utc};
use eko_core::db::open_db_in_memory;
use eko_core::service::blog_service::{BlogServiceError, LATEST_COUNT};
use eko_core::service::{is_owner, ProspectListRequest, ProspectServiceError};
use eko_core::{
    BlogDraft, BlogService, Clock, FixedClock, Prospect, ProspectDraft, ProspectService,
    ProspectStatus, SqliteBlogRepository, SqliteProspectRepository, StaticIdentity,
};
use rusqlite::Connection;

type Prospects<'conn> = ProspectService<SqliteProspectRepository<'conn>, FixedClock>;
type Blogs<'conn> = BlogService<SqliteBlogRepository<'conn>, FixedClock>;

fn clock_at(minutes: i64) -> FixedClock {
    let now = Utc.with_ymd_and_hms(2025, 2, 3, 9, 0, 0).unwrap() + Duration::minutes(minutes);
    FixedClock::at(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(), now)
}

fn prospects(conn: &Connection, minutes: i64) -> Prospects<'_> {
    ProspectService::new(
        SqliteProspectRepository::try_new(conn).unwrap(),
        clock_at(minutes),
    )
}

fn blogs(conn: &Connection, minutes: i64) -> Blogs<'_> {
    BlogService::new(SqliteBlogRepository::try_new(conn).unwrap(), clock_at(minutes))
}

fn draft(company: &str) -> ProspectDraft {
    ProspectDraft {
        company_name: company.to_string(),
        contact_name: Some("Aino Virtanen".to_string()),
        email: "aino@example.com".to_string(),
        phone: Some("+358 40 123 4567".to_string()),
        website: Some("https://example.com".to_string()),
        status: None,
        notes: Some("met at expo".to_string()),
    }
}

fn post(title: &str) -> BlogDraft {
    BlogDraft {
        title: title.to_string(),
        content: format!("{title} body"),
        image_link: None,
    }
}

#[test]
fn status_change_keeps_every_other_field() {
    let conn = open_db_in_memory().unwrap();
    let created = prospects(&conn, 0).create(&draft("Acme Oy")).unwrap();
    assert_eq!(created.prospect.status, ProspectStatus::New);
    assert_eq!(
        created.navigation.map(|nav| nav.path),
        Some(format!("/crm/prospects/show/{}", created.prospect.id))
    );

    let updated = prospects(&conn, 5)
        .update_status(created.prospect.id, ProspectStatus::Interested)
        .unwrap();
    assert_eq!(updated.status.label(), "4. interested");
    assert_eq!(updated.updated_at, clock_at(5).now());
    assert_eq!(
        Prospect {
            status: ProspectStatus::New,
            updated_at: created.prospect.updated_at,
            ..updated
        },
        created.prospect
    );
}

#[test]
fn edit_without_status_keeps_stage_and_conversion() {
    let conn = open_db_in_memory().unwrap();
    let id = prospects(&conn, 0)
        .create(&ProspectDraft {
            status: Some(ProspectStatus::Qualified),
            ..draft("Keep Stage Ltd")
        })
        .unwrap()
        .prospect
        .id;
    let converted = prospects(&conn, 1).mark_converted(id).unwrap();
    assert!(converted.is_migrated);

    let edited = prospects(&conn, 2)
        .update(
            id,
            &ProspectDraft {
                phone: Some("   ".to_string()),
                ..draft("Keep Stage Ltd")
            },
        )
        .unwrap()
        .prospect;
    assert_eq!(edited.status, ProspectStatus::Qualified);
    assert_eq!(edited.phone, None);
    assert_eq!(edited.converted_at, converted.converted_at);
    assert!(edited.is_migrated);
}

#[test]
fn mark_converted_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let id = prospects(&conn, 0)
        .create(&draft("Convert Me"))
        .unwrap()
        .prospect
        .id;
    let first = prospects(&conn, 10).mark_converted(id).unwrap();
    let second = prospects(&conn, 20).mark_converted(id).unwrap();
    assert_eq!(first.converted_at, Some(clock_at(10).now()));
    assert_eq!(second, first);
}

#[test]
fn list_searches_filters_and_counts_across_pages() {
    let conn = open_db_in_memory().unwrap();
    for (minute, company) in ["Nordic Web", "Nordic Apps", "Baltic Web"].iter().enumerate() {
        prospects(&conn, minute as i64).create(&draft(company)).unwrap();
    }
    let baltic = prospects(&conn, 9)
        .list(&ProspectListRequest {
            search: Some("baltic".to_string()),
            ..ProspectListRequest::default()
        })
        .unwrap();
    prospects(&conn, 10)
        .update_status(baltic.items[0].id, ProspectStatus::Contacted)
        .unwrap();

    let nordic = prospects(&conn, 11)
        .list(&ProspectListRequest {
            search: Some("NORDIC".to_string()),
            page_size: 1,
            ..ProspectListRequest::default()
        })
        .unwrap();
    assert_eq!(nordic.total, 2);
    assert_eq!(nordic.items.len(), 1);
    assert_eq!(nordic.items[0].company_name, "Nordic Apps");

    let contacted = prospects(&conn, 11)
        .list(&ProspectListRequest {
            status: Some(ProspectStatus::Contacted),
            ..ProspectListRequest::default()
        })
        .unwrap();
    assert_eq!(contacted.total, 1);
    assert_eq!(contacted.items[0].company_name, "Baltic Web");

    let clamped = prospects(&conn, 11)
        .list(&ProspectListRequest {
            page: 0,
            page_size: 10_000,
            ..ProspectListRequest::default()
        })
        .unwrap();
    assert_eq!(clamped.page, 1);
    assert_eq!(clamped.page_size, 100);
    assert_eq!(clamped.items.len(), 3);
}

#[test]
fn company_search_ignores_case_beyond_ascii() {
    let conn = open_db_in_memory().unwrap();
    prospects(&conn, 0).create(&draft("ÄÄNI Oy")).unwrap();
    prospects(&conn, 1).create(&draft("Öljy_Palvelu")).unwrap();
    prospects(&conn, 2).create(&draft("Anni Tmi")).unwrap();

    let search = |term: &str| {
        prospects(&conn, 3)
            .list(&ProspectListRequest {
                search: Some(term.to_string()),
                ..ProspectListRequest::default()
            })
            .unwrap()
    };
    let found = search("ääni");
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].company_name, "ÄÄNI Oy");
    assert_eq!(search("ÖLJY_").total, 1);
    // Wildcards in the term stay literal.
    assert_eq!(search("_").total, 1);
    assert_eq!(search("%").total, 0);
}

#[test]
fn invalid_drafts_and_missing_rows_are_reported() {
    let conn = open_db_in_memory().unwrap();
    let service = prospects(&conn, 0);

    match service.create(&ProspectDraft {
        email: "not-an-email".to_string(),
        ..draft("Broken")
    }) {
        Err(ProspectServiceError::Validation(err)) => assert_eq!(err.field, "email"),
        other => panic!("unexpected result: {other:?}"),
    }
    match service.create(&draft("  ")) {
        Err(ProspectServiceError::Validation(err)) => assert_eq!(err.field, "company_name"),
        other => panic!("unexpected result: {other:?}"),
    }

    let missing = uuid::Uuid::new_v4();
    assert!(matches!(
        service.update_status(missing, ProspectStatus::Signed),
        Err(ProspectServiceError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.delete(missing),
        Err(ProspectServiceError::NotFound(_))
    ));
    assert_eq!(service.get(missing).unwrap(), None);
}

#[test]
fn blog_index_splits_latest_and_older_posts() {
    let conn = open_db_in_memory().unwrap();
    let author = StaticIdentity::signed_in("author-1");
    for minute in 0..5 {
        blogs(&conn, minute)
            .create(&author, &post(&format!("post {minute}")))
            .unwrap();
    }

    let service = blogs(&conn, 10);
    let latest = service.latest().unwrap();
    assert_eq!(latest.len(), LATEST_COUNT as usize);
    assert_eq!(latest[0].title, "post 4");
    let older = service
        .older()
        .unwrap()
        .into_iter()
        .map(|post| post.title)
        .collect::<Vec<_>>();
    assert_eq!(older, vec!["post 1", "post 0"]);

    let page = service.list(2, 2).unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items[0].title, "post 2");
}

#[test]
fn blog_ownership_and_identity_checks() {
    let conn = open_db_in_memory().unwrap();
    let author = StaticIdentity::signed_in("author-2");
    let written = blogs(&conn, 0).create(&author, &post("Hello")).unwrap();
    assert_eq!(
        written.navigation.map(|nav| nav.path),
        Some(format!("/eko/dash/blogs/show/{}", written.post.id))
    );
    assert!(is_owner(&written.post, &author));
    assert!(!is_owner(&written.post, &StaticIdentity::signed_in("someone")));
    assert!(!is_owner(&written.post, &StaticIdentity::anonymous()));

    assert!(matches!(
        blogs(&conn, 1).create(&StaticIdentity::anonymous(), &post("Nope")),
        Err(BlogServiceError::MissingIdentity)
    ));

    let edited = blogs(&conn, 2)
        .update(written.post.id, &post("Hello again"))
        .unwrap()
        .post;
    assert_eq!(edited.created_at, written.post.created_at);
    assert_eq!(edited.profile_id, "author-2");

    blogs(&conn, 3).delete(written.post.id).unwrap();
    assert!(matches!(
        blogs(&conn, 4).delete(written.post.id),
        Err(BlogServiceError::NotFound(_))
    ));
}
