use std::{
    io::Write as _,
    time::{Duration, Instant},
};

use shared::domain::{CourseOutline, OutlineId, OutlineStatus, PerformedBy, TeacherId};

use crate::{
    activity::{outline_status_counts, ActivityKind, OutlineFilter},
    config::{normalize_server_url, ClientConfig, ConfigError, DEFAULT_SERVER_URL},
    confirm::{DeleteFlow, DeleteState},
    list_view::{ListController, ListPage, Pagination, SEARCH_DEBOUNCE},
    notice::NoticeLevel,
};

fn page_of(rows: Vec<&'static str>, current_page: u32, total_pages: u32) -> ListPage<&'static str> {
    ListPage {
        pagination: Pagination {
            current_page,
            total_pages,
            limit: 10,
            total_records: u64::from(total_pages) * 10,
        },
        rows,
    }
}

#[test]
fn search_fires_once_after_idle_window() {
    let start = Instant::now();
    let mut list: ListController<Option<String>, &str> = ListController::new(None);

    list.on_search_input("s", start);
    list.on_search_input("st", start + Duration::from_millis(200));
    list.on_search_input("stu", start + Duration::from_millis(400));

    assert!(list.poll(start + Duration::from_millis(600)).is_none());
    let ticket = list
        .poll(start + Duration::from_millis(400) + SEARCH_DEBOUNCE)
        .expect("idle window elapsed");
    assert_eq!(ticket.search, "stu");
    assert_eq!(ticket.page, 1);
    assert!(list.is_loading());

    assert!(list.poll(start + Duration::from_secs(5)).is_none());
}

#[test]
fn unchanged_search_term_does_not_refetch() {
    let start = Instant::now();
    let mut list: ListController<(), &str> = ListController::new(());
    list.on_search_input("ada", start);
    list.poll(start + SEARCH_DEBOUNCE).expect("first search");

    list.on_search_input("ada ", start + Duration::from_secs(1));
    assert!(list
        .poll(start + Duration::from_secs(1) + SEARCH_DEBOUNCE)
        .is_none());
}

#[test]
fn dropdown_filter_fetches_immediately_and_absorbs_pending_search() {
    let start = Instant::now();
    let mut list: ListController<Option<String>, &str> = ListController::new(None);
    list.on_search_input("S-1", start);

    let ticket = list.set_filter(Some("10".into())).expect("immediate fetch");
    assert_eq!(ticket.filter.as_deref(), Some("10"));
    assert_eq!(ticket.search_term(), Some("S-1"));
    assert!(!list.search_pending());
    assert!(list.poll(start + SEARCH_DEBOUNCE).is_none());

    assert!(list.set_filter(Some("10".into())).is_none());
}

#[test]
fn stale_responses_never_overwrite_newer_ones() {
    let mut list: ListController<Option<String>, &str> = ListController::new(None);
    let slow = list.set_filter(Some("9".into())).expect("first");
    let fast = list.set_filter(Some("10".into())).expect("second");

    assert!(list.apply_response(fast.generation, Ok(page_of(vec!["ten"], 1, 1))));
    assert!(!list.is_loading());
    assert!(!list.apply_response(slow.generation, Ok(page_of(vec!["nine"], 1, 1))));
    assert_eq!(list.rows(), &["ten"]);
}

#[test]
fn failed_fetch_keeps_previous_rows() {
    let mut list: ListController<(), &str> = ListController::new(());
    let first = list.refresh();
    list.apply_response(first.generation, Ok(page_of(vec!["a", "b"], 1, 1)));

    let second = list.refresh();
    assert!(list.apply_response(second.generation, Err("server returned 500".into())));
    assert_eq!(list.rows(), &["a", "b"]);
    assert_eq!(list.last_error(), Some("server returned 500"));
    assert!(!list.is_loading());
}

#[test]
fn paging_respects_server_bounds() {
    let mut list: ListController<(), &str> = ListController::new(());
    let first = list.refresh();
    list.apply_response(first.generation, Ok(page_of(vec!["a"], 1, 3)));

    assert!(list.prev_page().is_none());
    let next = list.next_page().expect("page two");
    assert_eq!(next.page, 2);
    list.apply_response(next.generation, Ok(page_of(vec!["b"], 2, 3)));
    assert!(list.go_to_page(4).is_none());
    assert!(list.go_to_page(2).is_none());
    assert_eq!(list.prev_page().map(|ticket| ticket.page), Some(1));
}

#[test]
fn showing_range_matches_footer_arithmetic() {
    let pagination = Pagination {
        current_page: 3,
        total_pages: 3,
        limit: 10,
        total_records: 25,
    };
    assert_eq!(pagination.showing_range(), (21, 25, 25));
    assert!(pagination.can_prev());
    assert!(!pagination.can_next());
    assert_eq!(Pagination::default().showing_range(), (0, 0, 0));

    let unpaged = ListPage::unpaged(vec![1, 2, 3]);
    assert_eq!(unpaged.pagination.showing_range(), (1, 3, 3));
}

#[test]
fn delete_flow_issues_exactly_one_request() {
    let mut flow: DeleteFlow<String> = DeleteFlow::new("Student");
    assert!(flow.confirm().is_none());

    assert!(flow.request("65a".into()));
    flow.cancel();
    assert_eq!(flow.state(), &DeleteState::Idle);
    assert!(flow.confirm().is_none());

    flow.request("65a".into());
    let ticket = flow.confirm().expect("ticket");
    assert_eq!(ticket.target, "65a");
    assert!(flow.confirm().is_none());
    assert!(!flow.request("65b".into()));
    flow.cancel();
    assert!(flow.is_deleting());

    let resolution = flow.finish(Ok(())).expect("resolution");
    assert!(resolution.refresh);
    assert_eq!(resolution.notice.message, "Student deleted successfully");
    assert!(!flow.is_open());
    assert!(flow.finish(Ok(())).is_none());
}

#[test]
fn failed_delete_closes_dialog_without_refresh() {
    let mut flow: DeleteFlow<u32> = DeleteFlow::new("Schedule");
    flow.request(7);
    flow.confirm();
    let resolution = flow.finish(Err("404".into())).expect("resolution");
    assert!(!resolution.refresh);
    assert_eq!(resolution.notice.level, NoticeLevel::Error);
    assert_eq!(resolution.notice.message, "Failed to delete schedule");
}

#[test]
fn activity_templates_fill_placeholders() {
    let entry = ActivityKind::ClassScheduled.render(PerformedBy::Admin, &[("className", "10")]);
    assert_eq!(entry.title, "Class Scheduled");
    assert_eq!(entry.subtitle, "A new schedule was created for class 10");
    assert_eq!(entry.perform_by, PerformedBy::Admin);

    let untouched = ActivityKind::StudentAdded.render(PerformedBy::Secretary, &[]);
    assert!(untouched.subtitle.contains("{name}"));
}

fn outline(id: &str, course: &str, status: OutlineStatus) -> CourseOutline {
    CourseOutline {
        id: OutlineId(id.into()),
        teacher_id: TeacherId("t1".into()),
        status,
        document: "https://files.example.com/doc.pdf".into(),
        course_name: course.into(),
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn outline_filter_combines_status_and_course_search() {
    let outlines = vec![
        outline("1", "Algebra I", OutlineStatus::Approved),
        outline("2", "Biology", OutlineStatus::Pending),
        outline("3", "Linear Algebra", OutlineStatus::Pending),
    ];

    let filter = OutlineFilter {
        status: Some(OutlineStatus::Pending),
        course_search: "ALGEBRA".into(),
    };
    let matched: Vec<&str> = filter
        .apply(&outlines)
        .into_iter()
        .map(|outline| outline.id.as_str())
        .collect();
    assert_eq!(matched, vec!["3"]);

    let counts = outline_status_counts(&outlines);
    assert_eq!(counts.get("approved"), Some(&1));
    assert_eq!(counts.get("pending"), Some(&2));
    assert_eq!(counts.get("rejected"), Some(&0));
}

#[test]
fn config_layers_file_env_then_flag() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "server_url = \"http://from-file:5000/\"").expect("write");

    let from_file = ClientConfig::load_with_env(Some(file.path()), None, |_| None)
        .expect("file config");
    assert_eq!(from_file.server_url, "http://from-file:5000");

    let from_env = ClientConfig::load_with_env(Some(file.path()), None, |key| {
        (key == "NEXT_PUBLIC_SRS_SERVER").then(|| "http://from-env:5000".to_string())
    })
    .expect("env config");
    assert_eq!(from_env.server_url, "http://from-env:5000");

    let from_flag = ClientConfig::load_with_env(
        Some(file.path()),
        Some("https://from-flag.example.com"),
        |_| Some("http://from-env:5000".to_string()),
    )
    .expect("flag config");
    assert_eq!(from_flag.server_url, "https://from-flag.example.com");
}

#[test]
fn config_rejects_missing_file_and_bad_urls() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("absent.toml");
    assert!(matches!(
        ClientConfig::load_with_env(Some(missing.as_path()), None, |_| None),
        Err(ConfigError::Read { .. })
    ));

    assert!(matches!(
        normalize_server_url("ftp://files.example.com"),
        Err(ConfigError::InvalidUrl { .. })
    ));
    assert_eq!(
        normalize_server_url(DEFAULT_SERVER_URL).expect("default"),
        "http://127.0.0.1:5000"
    );
}
