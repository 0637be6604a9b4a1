use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use client_core::{ListController, SrsClient};
use crossbeam_channel::bounded;
use forms::{OutlineFailure, SubmitOutcome, SubmitTarget, Submission};
use serde_json::{json, Value};
use shared::{
    domain::{PerformedBy, ScheduleId, Student, TeacherId},
    protocol::{NewActivity, NewCourseOutline, StudentPayload},
};
use tokio::{net::TcpListener, sync::mpsc};

use crate::backend_bridge::{
    commands::{BackendCommand, DeleteTarget, FetchRequest, StudentFilter},
    runtime::{execute, forward},
};
use crate::controller::events::{FetchedPage, UiErrorCategory, UiEvent};

async fn serve(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn client_for(server_url: &str) -> SrsClient {
    SrsClient::with_server_url(server_url).expect("client")
}

#[tokio::test]
async fn student_fetch_carries_debounced_search_and_class_filter() {
    let (tx, mut rx) = mpsc::unbounded_channel::<HashMap<String, String>>();
    let app = Router::new().route(
        "/student",
        get(move |Query(query): Query<HashMap<String, String>>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(query);
                Json(json!({
                    "data": [{
                        "_id": "65a",
                        "rollNo": "S-9",
                        "firstName": "Ada",
                        "lastName": "Obi",
                        "class": "11",
                        "section": "B",
                        "email": "ada@example.com"
                    }],
                    "totalPages": 1,
                    "totalRecordsCount": 1,
                    "currentPage": 1,
                    "limit": 10
                }))
            }
        }),
    );
    let client = client_for(&serve(app).await);

    let start = Instant::now();
    let mut list: ListController<StudentFilter, Student> = ListController::new(StudentFilter {
        class_name: Some("11".into()),
    });
    list.on_search_input("S-9", start);
    assert!(list.poll(start + Duration::from_millis(100)).is_none());
    let ticket = list
        .poll(start + Duration::from_millis(600))
        .expect("debounce elapsed");

    let event = execute(&client, BackendCommand::Fetch(FetchRequest::Students(ticket)))
        .await
        .expect("event");

    let query = rx.recv().await.expect("query");
    assert_eq!(query.get("studentId").map(String::as_str), Some("S-9"));
    assert_eq!(query.get("className").map(String::as_str), Some("11"));
    assert_eq!(query.get("page").map(String::as_str), Some("1"));

    match event {
        UiEvent::Fetched(FetchedPage::Students(generation, Ok(page))) => {
            assert_eq!(generation, list.latest_generation());
            assert_eq!(page.rows[0].full_name(), "Ada Obi");
            assert_eq!(page.pagination.total_records, 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn outlines_without_teacher_make_no_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let app = Router::new().route(
        "/course-outline/teacher",
        get(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(json!([]))
            }
        }),
    );
    let client = client_for(&serve(app).await);

    let mut list: ListController<(), shared::domain::CourseOutline> = ListController::new(());
    let ticket = list.refresh();
    let event = execute(&client, BackendCommand::Fetch(FetchRequest::Outlines(ticket)))
        .await
        .expect("event");

    match event {
        UiEvent::Fetched(FetchedPage::Outlines(_, Ok(page))) => assert!(page.rows.is_empty()),
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_student_reports_conflict_outcome() {
    let app = Router::new().route(
        "/student/add",
        post(|| async {
            (
                StatusCode::CONFLICT,
                Json(json!({ "statusCode": 409, "message": "Email already exists" })),
            )
        }),
    );
    let client = client_for(&serve(app).await);

    let submission = Submission {
        target: SubmitTarget::Create,
        payload: StudentPayload {
            roll_no: "S-2".into(),
            email: "dup@example.com".into(),
            ..StudentPayload::default()
        },
    };
    let event = execute(&client, BackendCommand::SubmitStudent(submission))
        .await
        .expect("event");

    assert!(matches!(
        event,
        UiEvent::StudentSubmitted(SubmitOutcome::Conflict)
    ));
}

#[tokio::test]
async fn outline_conflict_keeps_server_message() {
    let app = Router::new().route(
        "/course-outline",
        post(|| async {
            (
                StatusCode::CONFLICT,
                Json(json!({ "message": "Outline already submitted for this course" })),
            )
        }),
    );
    let client = client_for(&serve(app).await);

    let body = NewCourseOutline {
        teacher_id: TeacherId("t1".into()),
        document: "https://files.example.com/outline.pdf".into(),
        course_name: "Physics".into(),
    };
    let event = execute(&client, BackendCommand::SubmitOutline(body))
        .await
        .expect("event");

    match event {
        UiEvent::OutlineSubmitted(Err(OutlineFailure::Conflict(message))) => {
            assert_eq!(message, "Outline already submitted for this course");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn delete_schedule_reports_target_back() {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let app = Router::new().route(
        "/schedule/:id",
        delete(move |Path(id): Path<String>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(id);
                Json(json!({ "message": "deleted" }))
            }
        }),
    );
    let client = client_for(&serve(app).await);

    let target = DeleteTarget::Schedule {
        id: ScheduleId("sch-7".into()),
        class_name: "10A".into(),
    };
    let event = execute(&client, BackendCommand::Delete(target.clone()))
        .await
        .expect("event");

    assert_eq!(rx.recv().await.expect("id"), "sch-7");
    match event {
        UiEvent::Deleted {
            target: reported,
            result,
        } => {
            assert_eq!(reported, target);
            assert!(result.is_ok());
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn record_activity_posts_entry_and_reports_nothing() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    let app = Router::new().route(
        "/activity",
        post(move |Json(body): Json<Value>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(body);
                Json(json!({ "message": "ok" }))
            }
        }),
    );
    let client = client_for(&serve(app).await);

    let entry = NewActivity {
        title: "Department Added".into(),
        subtitle: "Department Science was created".into(),
        perform_by: PerformedBy::Admin,
    };
    let event = execute(&client, BackendCommand::RecordActivity(entry)).await;

    assert!(event.is_none());
    let body = rx.recv().await.expect("body");
    assert_eq!(body["title"], "Department Added");
    assert_eq!(body["performBy"], "Admin");
}

#[tokio::test]
async fn reference_data_keeps_partial_results_and_first_failure() {
    let app = Router::new()
        .route(
            "/department",
            get(|| async { Json(json!([{ "_id": "d1", "departmentName": "Science" }])) }),
        )
        .route(
            "/course",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "database offline" })),
                )
            }),
        )
        .route("/teachers", get(|| async { Json(json!({ "data": [] })) }));
    let client = client_for(&serve(app).await);

    let event = execute(&client, BackendCommand::LoadReferenceData)
        .await
        .expect("event");

    match event {
        UiEvent::ReferenceDataLoaded(data) => {
            assert_eq!(data.departments.len(), 1);
            assert!(data.courses.is_empty());
            let failure = data.failure.expect("failure recorded");
            assert_eq!(failure.category(), UiErrorCategory::Server);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn full_ui_queue_delivers_result_once_drained() {
    let (ui_tx, ui_rx) = bounded(1);
    ui_tx
        .try_send(UiEvent::Info("earlier".into()))
        .expect("fill queue");

    let drain = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        let first = ui_rx.recv().expect("first event");
        let second = ui_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("second event");
        (first, second)
    });
    forward(&ui_tx, "delete", UiEvent::Info("deleted".into())).await;

    let (first, second) = drain.join().expect("drain thread");
    assert!(matches!(first, UiEvent::Info(message) if message == "earlier"));
    assert!(matches!(second, UiEvent::Info(message) if message == "deleted"));
}

#[tokio::test]
async fn closed_ui_queue_does_not_block_forwarding() {
    let (ui_tx, ui_rx) = bounded(1);
    ui_tx
        .try_send(UiEvent::Info("earlier".into()))
        .expect("fill queue");
    drop(ui_rx);

    tokio::time::timeout(
        Duration::from_secs(2),
        forward(&ui_tx, "fetch", UiEvent::Info("late".into())),
    )
    .await
    .expect("forward returns once the ui is gone");
}
