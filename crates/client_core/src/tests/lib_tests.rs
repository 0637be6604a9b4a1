use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, Query},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{PerformedBy, ScheduleId, StudentRecordId},
    error::ErrorCode,
    protocol::{ActivityQuery, NewDepartment, StudentPayload, StudentQuery, TeacherQuery},
};
use tokio::{net::TcpListener, sync::mpsc};

use crate::{activity, api::SrsApi, config::ClientConfig, error::ClientError, SrsClient};

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
async fn list_students_sends_filters_as_query_and_decodes_page() {
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
                        "rollNo": "S-1",
                        "firstName": "Sam",
                        "lastName": "Rivera",
                        "class": "10",
                        "section": "A",
                        "email": "sam@example.com"
                    }],
                    "totalPages": 3,
                    "totalRecordsCount": 25,
                    "currentPage": 2,
                    "limit": 10
                }))
            }
        }),
    );
    let client = client_for(&serve(app).await);

    let page = client
        .list_students(&StudentQuery {
            page: 2,
            limit: 10,
            student_id: Some("S-1".into()),
            class_name: None,
        })
        .await
        .expect("page");

    let query = rx.recv().await.expect("query");
    assert_eq!(query.get("page").map(String::as_str), Some("2"));
    assert_eq!(query.get("limit").map(String::as_str), Some("10"));
    assert_eq!(query.get("studentId").map(String::as_str), Some("S-1"));
    assert!(!query.contains_key("className"));

    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_records_count, 25);
    assert_eq!(page.data[0].full_name(), "Sam Rivera");
}

#[tokio::test]
async fn create_student_posts_flat_payload_and_maps_409_to_conflict() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    let app = Router::new().route(
        "/student/add",
        post(move |Json(body): Json<Value>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(body);
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "statusCode": 409, "message": "Email already exists" })),
                )
            }
        }),
    );
    let client = client_for(&serve(app).await);

    let payload = StudentPayload {
        roll_no: "S-2".into(),
        email: "dup@example.com".into(),
        guardian_name: "Pat".into(),
        ..StudentPayload::default()
    };
    let err = client
        .create_student(&payload)
        .await
        .expect_err("conflict");

    assert!(err.is_conflict());
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.to_string(), "Email already exists");

    let body = rx.recv().await.expect("body");
    assert_eq!(body["rollNo"], "S-2");
    assert_eq!(body["guardianName"], "Pat");
}

#[tokio::test]
async fn update_student_uses_put_with_record_id() {
    let (tx, mut rx) = mpsc::unbounded_channel::<(String, Value)>();
    let app = Router::new().route(
        "/student/:id",
        axum::routing::put(move |Path(id): Path<String>, Json(body): Json<Value>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send((id, body));
                Json(json!({ "message": "updated" }))
            }
        }),
    );
    let client = client_for(&serve(app).await);

    client
        .update_student(
            &StudentRecordId("65f0".into()),
            &StudentPayload {
                address: "9 Pine Rd".into(),
                ..StudentPayload::default()
            },
        )
        .await
        .expect("update");

    let (id, body) = rx.recv().await.expect("request");
    assert_eq!(id, "65f0");
    assert_eq!(body["address"], "9 Pine Rd");
}

#[tokio::test]
async fn non_conflict_failures_carry_status_and_body_text() {
    let app = Router::new()
        .route(
            "/department/add",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database offline") }),
        )
        .route(
            "/department",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "statusCode": 400,
                        "message": ["name too short", "name invalid"]
                    })),
                )
            }),
        );
    let client = client_for(&serve(app).await);

    let err = client
        .create_department(&NewDepartment {
            department_name: "Art".into(),
        })
        .await
        .expect_err("server error");
    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database offline");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = client.list_departments().await.expect_err("validation");
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.to_string(),
        "server returned 400: name too short; name invalid"
    );
}

#[tokio::test]
async fn delete_schedule_issues_delete_for_the_id() {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let app = Router::new().route(
        "/schedule/:id",
        delete(move |Path(id): Path<String>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(id);
                StatusCode::NO_CONTENT
            }
        }),
    );
    let client = client_for(&serve(app).await);

    client
        .delete_schedule(&ScheduleId("s-42".into()))
        .await
        .expect("delete");
    assert_eq!(rx.recv().await.as_deref(), Some("s-42"));
}

#[tokio::test]
async fn import_students_uploads_multipart_file_field() {
    let (tx, mut rx) = mpsc::unbounded_channel::<(String, Option<String>, Vec<u8>)>();
    let app = Router::new().route(
        "/student/import",
        post(move |mut multipart: Multipart| {
            let tx = tx.clone();
            async move {
                while let Ok(Some(field)) = multipart.next_field().await {
                    let name = field.name().unwrap_or_default().to_string();
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
                    let _ = tx.send((name, file_name, bytes));
                }
                Json(json!({ "message": "Uploading failed" }))
            }
        }),
    );
    let client = client_for(&serve(app).await);

    let response = client
        .import_students("roster.xlsx", b"sheet-bytes".to_vec())
        .await
        .expect("import");
    assert_eq!(response.message.as_deref(), Some("Uploading failed"));

    let (name, file_name, bytes) = rx.recv().await.expect("field");
    assert_eq!(name, "file");
    assert_eq!(file_name.as_deref(), Some("roster.xlsx"));
    assert_eq!(bytes, b"sheet-bytes");
}

#[tokio::test]
async fn listings_unwrap_envelopes_where_the_server_uses_them() {
    let (tx, mut rx) = mpsc::unbounded_channel::<HashMap<String, String>>();
    let app = Router::new()
        .route(
            "/teachers",
            get(move |Query(query): Query<HashMap<String, String>>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(query);
                    Json(json!({
                        "data": [{ "_id": "t1", "firstName": "Ada", "lastName": "Lovelace" }]
                    }))
                }
            }),
        )
        .route(
            "/department",
            get(|| async { Json(json!([{ "_id": "d1", "departmentName": "Science" }])) }),
        )
        .route(
            "/activity",
            get(|| async {
                Json(json!({ "data": [{
                    "_id": "a1",
                    "title": "Student Added",
                    "subtitle": "New student Sam was registered",
                    "performBy": "Admin"
                }] }))
            }),
        );
    let client = client_for(&serve(app).await);

    let teachers = client
        .list_teachers(&TeacherQuery {
            email: Some("ada@".into()),
            department: None,
        })
        .await
        .expect("teachers");
    assert_eq!(teachers[0].full_name(), "Ada Lovelace");
    let query = rx.recv().await.expect("teacher query");
    assert_eq!(query.get("email").map(String::as_str), Some("ada@"));

    let departments = client.list_departments().await.expect("departments");
    assert_eq!(departments[0].department_name, "Science");

    let activities = client
        .list_activities(&ActivityQuery {
            perform_by: Some(PerformedBy::Admin),
        })
        .await
        .expect("activities");
    assert_eq!(activities[0].perform_by, PerformedBy::Admin);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let app = Router::new().route("/course", get(|| async { "not json" }));
    let client = client_for(&serve(app).await);

    let err = client
        .list_courses(&Default::default())
        .await
        .expect_err("decode");
    assert!(matches!(err, ClientError::Decode(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = client_for(&format!("http://{addr}"));
    let err = client.list_departments().await.expect_err("refused");
    assert!(matches!(err, ClientError::Transport(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn activity_recording_failure_is_swallowed() {
    let app = Router::new().route(
        "/activity",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let client = client_for(&serve(app).await);

    let entry = activity::ActivityKind::DepartmentAdded
        .render(PerformedBy::Admin, &[("department", "Science")]);
    activity::record_best_effort(&client, entry).await;
}

#[test]
fn client_uses_normalised_config_url() {
    let config = ClientConfig {
        server_url: "http://srs.local:5000".into(),
    };
    assert_eq!(SrsClient::new(&config).server_url(), "http://srs.local:5000");
    assert_eq!(
        client_for("https://srs.example.com/api/").server_url(),
        "https://srs.example.com/api"
    );
    assert!(matches!(
        SrsClient::with_server_url("srs.example.com"),
        Err(ClientError::InvalidUrl { .. })
    ));
}

#[test]
fn error_codes_follow_response_status() {
    let cases = [
        (400, ErrorCode::Validation),
        (404, ErrorCode::NotFound),
        (409, ErrorCode::Conflict),
        (502, ErrorCode::Internal),
    ];
    for (status, expected) in cases {
        let err = ClientError::from_response(status, r#"{"message":"nope"}"#);
        assert_eq!(err.code(), expected, "status {status}");
        assert!(err.to_string().contains("nope"));
    }

    let decode = ClientError::Decode(
        serde_json::from_str::<Value>("not json").expect_err("invalid json"),
    );
    assert_eq!(decode.code(), ErrorCode::Unknown);
}
