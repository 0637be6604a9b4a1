//! Backend worker: a tokio runtime on its own thread that turns queued
//! commands into HTTP calls and reports each result as a `UiEvent`.

use std::{path::Path, sync::Arc, thread};

use client_core::{activity::record_best_effort, ClientError, ListPage, Pagination, SrsApi};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use forms::{OutlineFailure, SubmitOutcome, SubmitTarget};
use shared::protocol::{ActivityQuery, CourseQuery, ScheduleQuery, StudentQuery, TeacherQuery};
use tracing::{error, info, warn};

use crate::backend_bridge::commands::{BackendCommand, DeleteTarget, FetchRequest};
use crate::controller::events::{
    FetchedPage, PageResult, ReferenceData, UiError, UiErrorContext, UiEvent,
};

pub fn launch(api: Arc<dyn SrsApi>, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));
            while let Ok(cmd) = cmd_rx.recv() {
                let api = Arc::clone(&api);
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let name = cmd.name();
                    if let Some(event) = execute(api.as_ref(), cmd).await {
                        forward(&ui_tx, name, event).await;
                    }
                });
            }
            info!("ui command channel closed; backend worker exiting");
        });
    });
}

/// Hands a result to the UI. A full queue waits for the UI to drain so the
/// page waiting on this result always hears back.
pub async fn forward(ui_tx: &Sender<UiEvent>, command: &'static str, event: UiEvent) {
    let event = match ui_tx.try_send(event) {
        Ok(()) => return,
        Err(TrySendError::Disconnected(_)) => {
            info!(command, "ui closed before the result arrived");
            return;
        }
        Err(TrySendError::Full(event)) => event,
    };
    warn!(command, "backend->ui event queue is full; waiting for the ui to drain");
    let ui_tx = ui_tx.clone();
    match tokio::task::spawn_blocking(move || ui_tx.send(event)).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => info!(command, "ui closed before the result arrived"),
        Err(err) => error!(command, %err, "forwarding a result to the ui failed"),
    }
}

/// Runs one command to completion. `RecordActivity` reports nothing back.
pub async fn execute(api: &dyn SrsApi, cmd: BackendCommand) -> Option<UiEvent> {
    let event = match cmd {
        BackendCommand::Fetch(request) => UiEvent::Fetched(fetch(api, request).await),
        BackendCommand::LoadReferenceData => {
            UiEvent::ReferenceDataLoaded(load_reference_data(api).await)
        }
        BackendCommand::SubmitStudent(submission) => {
            let result = match &submission.target {
                SubmitTarget::Create => api.create_student(&submission.payload).await,
                SubmitTarget::Update(id) => api.update_student(id, &submission.payload).await,
            };
            let outcome = match result {
                Ok(()) => SubmitOutcome::Saved,
                Err(err) if err.is_conflict() => SubmitOutcome::Conflict,
                Err(err) => SubmitOutcome::Failed(err.to_string()),
            };
            UiEvent::StudentSubmitted(outcome)
        }
        BackendCommand::ImportStudents { path } => {
            UiEvent::StudentsImported(import_students(api, &path).await)
        }
        BackendCommand::CreateDepartment(body) => {
            UiEvent::DepartmentCreated(flatten(api.create_department(&body).await))
        }
        BackendCommand::CreateCourse(body) => {
            UiEvent::CourseCreated(flatten(api.create_course(&body).await))
        }
        BackendCommand::CreateSchedule(body) => {
            UiEvent::ScheduleCreated(flatten(api.create_schedule(&body).await))
        }
        BackendCommand::SubmitOutline(body) => {
            let result = api.submit_course_outline(&body).await.map_err(|err| {
                if err.is_conflict() {
                    OutlineFailure::Conflict(err.to_string())
                } else {
                    OutlineFailure::Other
                }
            });
            UiEvent::OutlineSubmitted(result)
        }
        BackendCommand::Delete(target) => {
            info!(target = target.label(), "deleting record");
            let result = match &target {
                DeleteTarget::Student { id, .. } => api.delete_student(id).await,
                DeleteTarget::Teacher { id, .. } => api.delete_teacher(id).await,
                DeleteTarget::Department { id, .. } => api.delete_department(id).await,
                DeleteTarget::Course { id, .. } => api.delete_course(id).await,
                DeleteTarget::Schedule { id, .. } => api.delete_schedule(id).await,
            };
            UiEvent::Deleted {
                target,
                result: flatten(result),
            }
        }
        BackendCommand::RecordActivity(activity) => {
            record_best_effort(api, activity).await;
            return None;
        }
    };
    Some(event)
}

fn flatten(result: Result<(), ClientError>) -> Result<(), String> {
    result.map_err(|err| err.to_string())
}

fn page_error(err: ClientError) -> UiError {
    UiError::from_client_error(UiErrorContext::LoadList, &err)
}

fn unpaged<R>(result: Result<Vec<R>, ClientError>) -> PageResult<R> {
    result.map(ListPage::unpaged).map_err(page_error)
}

async fn fetch(api: &dyn SrsApi, request: FetchRequest) -> FetchedPage {
    let generation = request.generation();
    match request {
        FetchRequest::Students(ticket) => {
            let query = StudentQuery {
                page: ticket.page,
                limit: Pagination::default().limit,
                student_id: ticket.search_term().map(str::to_string),
                class_name: ticket.filter.class_name.clone(),
            };
            let result = api
                .list_students(&query)
                .await
                .map(ListPage::from)
                .map_err(page_error);
            FetchedPage::Students(generation, result)
        }
        FetchRequest::Teachers(ticket) => {
            let query = TeacherQuery {
                email: ticket.search_term().map(str::to_string),
                department: ticket.filter.department.clone(),
            };
            FetchedPage::Teachers(generation, unpaged(api.list_teachers(&query).await))
        }
        FetchRequest::Departments(_) => {
            FetchedPage::Departments(generation, unpaged(api.list_departments().await))
        }
        FetchRequest::Courses(_) => FetchedPage::Courses(
            generation,
            unpaged(api.list_courses(&CourseQuery::default()).await),
        ),
        FetchRequest::Schedules(ticket) => {
            let query = ScheduleQuery {
                class_name: ticket.filter.class_name.clone(),
                section: ticket.filter.section.clone(),
            };
            FetchedPage::Schedules(generation, unpaged(api.list_schedules(&query).await))
        }
        FetchRequest::Outlines(ticket) => {
            // Outlines are listed per teacher; no teacher, nothing to show.
            let result = match ticket.search_term() {
                Some(teacher) => unpaged(api.list_course_outlines(&teacher.into()).await),
                None => Ok(ListPage::unpaged(Vec::new())),
            };
            FetchedPage::Outlines(generation, result)
        }
        FetchRequest::Activities(ticket) => {
            let query = ActivityQuery {
                perform_by: ticket.filter.perform_by,
            };
            FetchedPage::Activities(generation, unpaged(api.list_activities(&query).await))
        }
    }
}

async fn load_reference_data(api: &dyn SrsApi) -> ReferenceData {
    let active = CourseQuery { active: Some(true) };
    let all_teachers = TeacherQuery::default();
    let (departments, courses, teachers) = tokio::join!(
        api.list_departments(),
        api.list_courses(&active),
        api.list_teachers(&all_teachers),
    );

    let mut data = ReferenceData::default();
    let mut note = |err: ClientError| {
        warn!(error = %err, "reference data failed to load");
        if data.failure.is_none() {
            data.failure = Some(UiError::from_client_error(
                UiErrorContext::LoadReferenceData,
                &err,
            ));
        }
    };
    let departments = departments.unwrap_or_else(|err| {
        note(err);
        Vec::new()
    });
    let courses = courses.unwrap_or_else(|err| {
        note(err);
        Vec::new()
    });
    let teachers = teachers.unwrap_or_else(|err| {
        note(err);
        Vec::new()
    });
    data.departments = departments;
    data.courses = courses;
    data.teachers = teachers;
    data
}

async fn import_students(
    api: &dyn SrsApi,
    path: &Path,
) -> Result<shared::protocol::MessageResponse, String> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("students.xlsx")
        .to_string();
    let bytes = tokio::fs::read(path).await.map_err(|err| {
        error!(path = %path.display(), "failed to read import file: {err}");
        format!("failed to read '{}': {err}", path.display())
    })?;
    info!(%filename, size = bytes.len(), "importing students");
    api.import_students(&filename, bytes)
        .await
        .map_err(|err| err.to_string())
}
