use std::io::Write as _;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use clap::Parser;
use client_core::SrsClient;
use forms::{SubmitTarget, WizardStep};
use serde_json::{json, Value};
use shared::domain::{OutlineStatus, StudentRecordId, Weekday};
use tokio::{net::TcpListener, sync::mpsc};

use crate::{
    cli::{
        Cli, Command, DeleteArgs, DepartmentCommand, OutlineCommand, ScheduleCommand,
        StudentCommand,
    },
    commands::run,
    drafts::{
        read_toml, schedule_from_draft, wizard_from_draft, ScheduleDraftFile, StudentDraftFile,
    },
};

const STUDENT_DRAFT: &str = r#"
[student]
roll_no = "S-100"
first_name = "Sam"
last_name = "Rivera"
class_name = "10"
section = "A"
dob = "2008-04-01"
email = "sam@example.com"
phone = "5551234567"
address = "12 Elm St"
expected_graduation = "2027"
athletics = true

[guardian]
name = "Pat Rivera"
email = "pat@example.com"
phone = "5559876543"
"#;

fn write_draft(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write draft");
    file
}

#[test]
fn parses_global_flags_and_nested_subcommands() {
    let cli = Cli::try_parse_from([
        "srs-admin",
        "--server-url",
        "http://srs.local:5000",
        "students",
        "list",
        "--class",
        "11",
        "--page",
        "2",
    ])
    .expect("parse");
    assert_eq!(cli.server_url.as_deref(), Some("http://srs.local:5000"));
    match cli.command {
        Command::Students(StudentCommand::List {
            page,
            limit,
            class_name,
            student_id,
        }) => {
            assert_eq!(page, 2);
            assert_eq!(limit, 10);
            assert_eq!(class_name.as_deref(), Some("11"));
            assert!(student_id.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn outline_status_flag_is_case_insensitive() {
    let cli = Cli::try_parse_from([
        "srs-admin", "outlines", "list", "--teacher", "t1", "--status", "Pending",
    ])
    .expect("parse");
    match cli.command {
        Command::Outlines(OutlineCommand::List { status, .. }) => {
            assert_eq!(status, Some(OutlineStatus::Pending));
        }
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(Cli::try_parse_from([
        "srs-admin", "outlines", "list", "--teacher", "t1", "--status", "archived",
    ])
    .is_err());
}

#[test]
fn delete_accepts_yes_flag() {
    let cli = Cli::try_parse_from(["srs-admin", "students", "delete", "65a", "--yes"])
        .expect("parse");
    match cli.command {
        Command::Students(StudentCommand::Delete(args)) => {
            assert_eq!(args.id, "65a");
            assert!(args.yes);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn student_draft_passes_both_wizard_steps() {
    let file = write_draft(STUDENT_DRAFT);
    let draft: StudentDraftFile = read_toml(file.path()).expect("draft");

    let mut wizard = wizard_from_draft(draft, None).expect("valid student step");
    assert_eq!(wizard.step(), WizardStep::Guardian);
    let submission = wizard.begin_submit().expect("valid guardian step");
    assert_eq!(submission.target, SubmitTarget::Create);
    assert!(submission.payload.athletics);
    assert_eq!(submission.payload.guardian_email, "pat@example.com");
}

#[test]
fn update_draft_targets_the_record() {
    let file = write_draft(STUDENT_DRAFT);
    let draft: StudentDraftFile = read_toml(file.path()).expect("draft");
    let mut wizard =
        wizard_from_draft(draft, Some(StudentRecordId("65f0".into()))).expect("valid draft");
    let submission = wizard.begin_submit().expect("submission");
    assert_eq!(
        submission.target,
        SubmitTarget::Update(StudentRecordId("65f0".into()))
    );
}

#[test]
fn invalid_student_draft_lists_field_errors() {
    let file = write_draft(&STUDENT_DRAFT.replace("5551234567", "555"));
    let draft: StudentDraftFile = read_toml(file.path()).expect("draft");
    let err = wizard_from_draft(draft, None).expect_err("bad phone");
    let text = err.to_string();
    assert!(text.contains("phone: Phone number must be 10 digits"), "{text}");
}

#[test]
fn schedule_draft_runs_day_rules() {
    let file = write_draft(
        r#"
course_id = "c1"
class_name = "10"
section = "A"
teacher_id = "t1"

[[days]]
day = "Monday"
start = "9:00 AM"
end = "10:00 AM"

[[days]]
day = "Wednesday"
start = "1:00 PM"
end = "2:30 PM"
"#,
    );
    let draft: ScheduleDraftFile = read_toml(file.path()).expect("draft");
    let (builder, body) = schedule_from_draft(draft).expect("valid schedule");
    assert!(builder.is_submitting());
    assert_eq!(body.day_of_week.len(), 2);
    assert_eq!(body.day_of_week[1].day, Weekday::Wednesday);

    let duplicate = write_draft(
        r#"
course_id = "c1"
class_name = "10"
section = "A"
teacher_id = "t1"
days = [
  { day = "Friday", start = "9:00 AM", end = "10:00 AM" },
  { day = "Friday", start = "11:00 AM", end = "12:00 PM" },
]
"#,
    );
    let draft: ScheduleDraftFile = read_toml(duplicate.path()).expect("draft");
    let err = schedule_from_draft(draft).expect_err("duplicate day");
    assert_eq!(
        err.to_string(),
        "Schedule for Friday already exists. Remove it first to change."
    );
}

#[test]
fn incomplete_schedule_draft_names_missing_fields() {
    let file = write_draft("course_id = \"c1\"\n");
    let draft: ScheduleDraftFile = read_toml(file.path()).expect("draft");
    let err = schedule_from_draft(draft).expect_err("incomplete");
    let text = err.to_string();
    assert!(text.starts_with("Please fill all required fields"), "{text}");
    assert!(text.contains("className"));
    assert!(text.contains("dayOfWeek"));
    assert!(!text.contains("courseId"));
}

async fn serve(app: Router) -> SrsClient {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    SrsClient::with_server_url(&format!("http://{addr}")).expect("client")
}

fn activity_sink(app: Router) -> (Router, mpsc::UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = app.route(
        "/activity",
        post(move |Json(body): Json<Value>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(body);
                Json(json!({ "message": "ok" }))
            }
        }),
    );
    (app, rx)
}

fn confirmed(id: &str) -> DeleteArgs {
    DeleteArgs {
        id: id.into(),
        yes: true,
    }
}

#[tokio::test]
async fn department_delete_records_the_department_name() {
    let (app, mut activities) = activity_sink(
        Router::new()
            .route(
                "/department",
                get(|| async {
                    Json(json!([
                        { "_id": "d1", "departmentName": "Science" },
                        { "_id": "d2", "departmentName": "Arts" }
                    ]))
                }),
            )
            .route(
                "/department/:id",
                delete(|| async { Json(json!({ "message": "deleted" })) }),
            ),
    );
    let client = serve(app).await;

    run(
        &client,
        Command::Departments(DepartmentCommand::Delete(confirmed("d2"))),
    )
    .await
    .expect("delete department");

    let entry = activities.recv().await.expect("activity");
    assert_eq!(entry["title"], "Department Removed");
    assert_eq!(entry["subtitle"], "Department Arts was removed");
}

#[tokio::test]
async fn schedule_delete_records_class_and_falls_back_to_id() {
    let (app, mut activities) = activity_sink(
        Router::new()
            .route(
                "/schedule",
                get(|| async {
                    Json(json!({
                        "data": [{
                            "_id": "s1",
                            "courseId": null,
                            "className": "10",
                            "section": "A"
                        }]
                    }))
                }),
            )
            .route(
                "/schedule/:id",
                delete(|| async { Json(json!({ "message": "deleted" })) }),
            ),
    );
    let client = serve(app).await;

    run(
        &client,
        Command::Schedules(ScheduleCommand::Delete(confirmed("s1"))),
    )
    .await
    .expect("delete listed schedule");
    let entry = activities.recv().await.expect("activity");
    assert_eq!(entry["subtitle"], "A schedule was removed for class 10A");

    run(
        &client,
        Command::Schedules(ScheduleCommand::Delete(confirmed("s9"))),
    )
    .await
    .expect("delete unlisted schedule");
    let entry = activities.recv().await.expect("activity");
    assert_eq!(entry["subtitle"], "A schedule was removed for class (id s9)");
}
