use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use client_core::{
    activity::{outline_status_counts, record_best_effort, ActivityKind, OutlineFilter},
    notice::{Notice, NoticeLevel, SubmitResolution},
    DeleteFlow, ListPage, SrsApi,
};
use forms::{
    single_step::{CourseForm, DepartmentForm, ImportForm, OutlineFailure, OutlineForm},
    SubmitOutcome, SubmitTarget,
};
use shared::{
    domain::{
        format_date, CourseId, DepartmentId, PerformedBy, ScheduleId, StudentRecordId, TeacherId,
    },
    protocol::{ActivityQuery, CourseQuery, ScheduleQuery, StudentQuery, TeacherQuery},
};
use tracing::info;

use crate::{
    cli::{
        ActivityCommand, Command, CourseCommand, DeleteArgs, DepartmentCommand, OutlineCommand,
        ScheduleCommand, StudentCommand, TeacherCommand,
    },
    drafts::{
        describe, read_toml, schedule_from_draft, wizard_from_draft, ScheduleDraftFile,
        StudentDraftFile,
    },
};

pub async fn run(api: &dyn SrsApi, command: Command) -> Result<()> {
    match command {
        Command::Students(command) => students(api, command).await,
        Command::Teachers(command) => teachers(api, command).await,
        Command::Departments(command) => departments(api, command).await,
        Command::Courses(command) => courses(api, command).await,
        Command::Schedules(command) => schedules(api, command).await,
        Command::Outlines(command) => outlines(api, command).await,
        Command::Activities(command) => activities(api, command).await,
    }
}

/// Prints the notice; an error notice becomes the command's error.
fn report(resolution: SubmitResolution) -> Result<()> {
    report_notice(resolution.notice)
}

fn report_notice(notice: Notice) -> Result<()> {
    match notice.level {
        NoticeLevel::Error => bail!(notice.message),
        NoticeLevel::Success | NoticeLevel::Info => {
            println!("{}", notice.message);
            Ok(())
        }
    }
}

fn prompt_yes(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush().context("failed to flush stdout")?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}

/// Confirm, send exactly one DELETE, report. Returns whether it succeeded.
async fn confirm_and_delete<F>(noun: &'static str, args: DeleteArgs, send: F) -> Result<bool>
where
    F: std::future::Future<Output = client_core::ApiResult<()>>,
{
    let mut flow = DeleteFlow::new(noun);
    flow.request(args.id.clone());
    let confirmed =
        args.yes || prompt_yes(&format!("Delete {} {}?", noun.to_lowercase(), args.id))?;
    if !confirmed {
        flow.cancel();
        println!("Cancelled");
        return Ok(false);
    }
    let Some(ticket) = flow.confirm() else {
        return Ok(false);
    };
    info!(noun, id = %ticket.target, "deleting");
    let result = send.await.map_err(|err| err.to_string());
    let resolution = flow
        .finish(result)
        .context("delete finished without a pending request")?;
    let refreshed = resolution.refresh;
    report(resolution)?;
    Ok(refreshed)
}

/// Feed label for a deleted record whose name could not be looked up.
fn id_label(id: &str) -> String {
    format!("(id {id})")
}

// Names are resolved before the delete, while the record still exists.
async fn department_label(api: &dyn SrsApi, id: &DepartmentId) -> String {
    api.list_departments()
        .await
        .unwrap_or_default()
        .into_iter()
        .find(|department| &department.id == id)
        .map(|department| department.department_name)
        .unwrap_or_else(|| id_label(id.as_str()))
}

async fn course_label(api: &dyn SrsApi, id: &CourseId) -> String {
    api.list_courses(&CourseQuery::default())
        .await
        .unwrap_or_default()
        .into_iter()
        .find(|course| &course.id == id)
        .map(|course| course.course_name)
        .unwrap_or_else(|| id_label(id.as_str()))
}

async fn schedule_class_label(api: &dyn SrsApi, id: &ScheduleId) -> String {
    api.list_schedules(&ScheduleQuery::default())
        .await
        .unwrap_or_default()
        .into_iter()
        .find(|schedule| &schedule.id == id)
        .map(|schedule| format!("{}{}", schedule.class_name, schedule.section))
        .unwrap_or_else(|| id_label(id.as_str()))
}

async fn students(api: &dyn SrsApi, command: StudentCommand) -> Result<()> {
    match command {
        StudentCommand::List {
            page,
            limit,
            student_id,
            class_name,
        } => {
            let query = StudentQuery {
                page,
                limit,
                student_id,
                class_name,
            };
            let page = ListPage::from(api.list_students(&query).await?);
            if page.rows.is_empty() {
                println!("No students found");
                return Ok(());
            }
            for student in &page.rows {
                println!(
                    "{:<26} {:<10} {:<24} class {:>2}{} {:<28} {}",
                    student.id,
                    student.roll_no,
                    student.full_name(),
                    student.class_name,
                    student.section,
                    student.email,
                    student.masked_password().unwrap_or_default()
                );
            }
            let (first, last, total) = page.pagination.showing_range();
            println!(
                "Showing {first} to {last} of {total} (page {} of {})",
                page.pagination.current_page, page.pagination.total_pages
            );
            Ok(())
        }
        StudentCommand::Add { draft } => submit_student(api, &draft, None).await,
        StudentCommand::Update { id, draft } => {
            submit_student(api, &draft, Some(StudentRecordId(id))).await
        }
        StudentCommand::Delete(args) => {
            let id = StudentRecordId(args.id.clone());
            let label = id_label(id.as_str());
            if confirm_and_delete("Student", args, api.delete_student(&id)).await? {
                let entry = ActivityKind::StudentDeleted
                    .render(PerformedBy::Admin, &[("name", label.as_str())]);
                record_best_effort(api, entry).await;
            }
            Ok(())
        }
        StudentCommand::Import { file } => import_students(api, file).await,
    }
}

async fn submit_student(
    api: &dyn SrsApi,
    draft_path: &Path,
    update: Option<StudentRecordId>,
) -> Result<()> {
    let draft: StudentDraftFile = read_toml(draft_path)?;
    let mut wizard = wizard_from_draft(draft, update)?;
    let submission = match wizard.begin_submit() {
        Ok(submission) => submission,
        Err(err) => return Err(describe(err, wizard.guardian_errors())),
    };

    let name = format!(
        "{} {}",
        submission.payload.first_name, submission.payload.last_name
    );
    let (result, kind) = match &submission.target {
        SubmitTarget::Create => (
            api.create_student(&submission.payload).await,
            ActivityKind::StudentAdded,
        ),
        SubmitTarget::Update(id) => (
            api.update_student(id, &submission.payload).await,
            ActivityKind::StudentUpdated,
        ),
    };
    let outcome = match result {
        Ok(()) => SubmitOutcome::Saved,
        Err(err) if err.is_conflict() => SubmitOutcome::Conflict,
        Err(err) => SubmitOutcome::Failed(err.to_string()),
    };
    let saved = outcome == SubmitOutcome::Saved;
    report(wizard.finish_submit(outcome))?;
    if saved {
        record_best_effort(api, kind.render(PerformedBy::Admin, &[("name", name.as_str())])).await;
    }
    Ok(())
}

async fn import_students(api: &dyn SrsApi, file: PathBuf) -> Result<()> {
    let mut form = ImportForm { file: Some(file) };
    let path = form.selected().map_err(|notice| anyhow::anyhow!(notice.message))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("students.xlsx")
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;

    let result = api
        .import_students(&filename, bytes)
        .await
        .map_err(|err| err.to_string());
    let resolution = form.finish(result);
    let imported = resolution.refresh;
    report(resolution)?;
    if imported {
        let entry = ActivityKind::StudentsImported
            .render(PerformedBy::Admin, &[("file", filename.as_str())]);
        record_best_effort(api, entry).await;
    }
    Ok(())
}

async fn teachers(api: &dyn SrsApi, command: TeacherCommand) -> Result<()> {
    match command {
        TeacherCommand::List { email, department } => {
            let teachers = api
                .list_teachers(&TeacherQuery { email, department })
                .await?;
            if teachers.is_empty() {
                println!("No teachers found");
            }
            for teacher in teachers {
                println!(
                    "{:<26} {:<24} {:<28} {:<12} {}",
                    teacher.id,
                    teacher.full_name(),
                    teacher.email,
                    teacher.phone,
                    teacher.department
                );
            }
            Ok(())
        }
        TeacherCommand::Delete(args) => {
            let id = TeacherId(args.id.clone());
            confirm_and_delete("Teacher", args, api.delete_teacher(&id)).await?;
            Ok(())
        }
    }
}

async fn departments(api: &dyn SrsApi, command: DepartmentCommand) -> Result<()> {
    match command {
        DepartmentCommand::List => {
            let departments = api.list_departments().await?;
            if departments.is_empty() {
                println!("No departments found");
            }
            for department in departments {
                println!("{:<26} {}", department.id, department.department_name);
            }
            Ok(())
        }
        DepartmentCommand::Add { name } => {
            let mut form = DepartmentForm { name };
            let body = form.build().map_err(|notice| anyhow::anyhow!(notice.message))?;
            let result = api
                .create_department(&body)
                .await
                .map_err(|err| err.to_string());
            let resolution = form.finish(result);
            let created = resolution.refresh;
            report(resolution)?;
            if created {
                let entry = ActivityKind::DepartmentAdded
                    .render(PerformedBy::Admin, &[("department", body.department_name.as_str())]);
                record_best_effort(api, entry).await;
            }
            Ok(())
        }
        DepartmentCommand::Delete(args) => {
            let id = DepartmentId(args.id.clone());
            let label = department_label(api, &id).await;
            if confirm_and_delete("Department", args, api.delete_department(&id)).await? {
                let entry = ActivityKind::DepartmentDeleted
                    .render(PerformedBy::Admin, &[("department", label.as_str())]);
                record_best_effort(api, entry).await;
            }
            Ok(())
        }
    }
}

async fn courses(api: &dyn SrsApi, command: CourseCommand) -> Result<()> {
    match command {
        CourseCommand::List { active } => {
            let query = CourseQuery {
                active: active.then_some(true),
            };
            let courses = api.list_courses(&query).await?;
            let departments = api.list_departments().await.unwrap_or_default();
            if courses.is_empty() {
                println!("No courses found");
            }
            for course in &courses {
                let created = course
                    .created_at
                    .map(|at| format_date(&at.to_rfc3339()))
                    .unwrap_or_default();
                println!(
                    "{:<26} {:<10} {:<28} {:<20} {}",
                    course.id,
                    course.course_code,
                    course.course_name,
                    course.department_name(&departments),
                    created
                );
            }
            Ok(())
        }
        CourseCommand::Add {
            name,
            code,
            department,
            prerequisites,
            description,
        } => {
            let mut form = CourseForm {
                course_name: name,
                course_code: code,
                department_id: department,
                prerequisites,
                description,
            };
            let body = match form.build() {
                Ok(body) => body,
                Err(notice) => {
                    let missing: Vec<&str> = form.errors().iter().map(|(key, _)| key).collect();
                    bail!("{} (missing: {})", notice.message, missing.join(", "));
                }
            };
            let result = api.create_course(&body).await.map_err(|err| err.to_string());
            let resolution = form.finish(result);
            let created = resolution.refresh;
            report(resolution)?;
            if created {
                let entry = ActivityKind::CourseAdded
                    .render(PerformedBy::Admin, &[("course", body.course_name.as_str())]);
                record_best_effort(api, entry).await;
            }
            Ok(())
        }
        CourseCommand::Delete(args) => {
            let id = CourseId(args.id.clone());
            let label = course_label(api, &id).await;
            if confirm_and_delete("Course", args, api.delete_course(&id)).await? {
                let entry = ActivityKind::CourseDeleted
                    .render(PerformedBy::Admin, &[("course", label.as_str())]);
                record_best_effort(api, entry).await;
            }
            Ok(())
        }
    }
}

async fn schedules(api: &dyn SrsApi, command: ScheduleCommand) -> Result<()> {
    match command {
        ScheduleCommand::List {
            class_name,
            section,
        } => {
            let schedules = api
                .list_schedules(&ScheduleQuery {
                    class_name,
                    section,
                })
                .await?;
            if schedules.is_empty() {
                println!("No schedules found");
            }
            for schedule in schedules {
                println!(
                    "{:<26} {:<30} class {}{} {:<24} {}",
                    schedule.id,
                    schedule.course_label(),
                    schedule.class_name,
                    schedule.section,
                    schedule.teacher_label(),
                    schedule.note
                );
                for slot in &schedule.day_of_week {
                    println!("    {:<10} {} - {}", slot.day, slot.start_time, slot.end_time);
                }
            }
            Ok(())
        }
        ScheduleCommand::Add { draft } => {
            let draft: ScheduleDraftFile = read_toml(&draft)?;
            let (mut builder, body) = schedule_from_draft(draft)?;
            let result = api.create_schedule(&body).await.map_err(|err| err.to_string());
            let resolution = builder.finish_submit(result);
            let created = resolution.refresh;
            report(resolution)?;
            if created {
                let entry = ActivityKind::ClassScheduled
                    .render(PerformedBy::Admin, &[("className", body.class_name.as_str())]);
                record_best_effort(api, entry).await;
            }
            Ok(())
        }
        ScheduleCommand::Delete(args) => {
            let id = ScheduleId(args.id.clone());
            let label = schedule_class_label(api, &id).await;
            if confirm_and_delete("Schedule", args, api.delete_schedule(&id)).await? {
                let entry = ActivityKind::ScheduleRemoved
                    .render(PerformedBy::Admin, &[("className", label.as_str())]);
                record_best_effort(api, entry).await;
            }
            Ok(())
        }
    }
}

async fn outlines(api: &dyn SrsApi, command: OutlineCommand) -> Result<()> {
    match command {
        OutlineCommand::List {
            teacher,
            status,
            course,
        } => {
            let outlines = api.list_course_outlines(&TeacherId(teacher)).await?;
            let filter = OutlineFilter {
                status,
                course_search: course.unwrap_or_default(),
            };
            for outline in filter.apply(&outlines) {
                println!(
                    "{:<26} {:<28} {:<9} {}",
                    outline.id,
                    outline.course_name,
                    outline.status.label(),
                    outline.document
                );
            }
            let counts: Vec<String> = outline_status_counts(&outlines)
                .into_iter()
                .map(|(label, count)| format!("{label}: {count}"))
                .collect();
            println!("{}", counts.join("  "));
            Ok(())
        }
        OutlineCommand::Submit {
            teacher,
            course,
            document,
        } => {
            let teacher_id = TeacherId(teacher);
            let mut form = OutlineForm {
                course_name: course,
                document,
            };
            let body = form
                .build(&teacher_id)
                .map_err(|notice| anyhow::anyhow!(notice.message))?;
            let result = api.submit_course_outline(&body).await.map_err(|err| {
                if err.is_conflict() {
                    OutlineFailure::Conflict(err.to_string())
                } else {
                    OutlineFailure::Other
                }
            });
            let resolution = form.finish(result);
            let submitted = resolution.refresh;
            report(resolution)?;
            if submitted {
                let entry = ActivityKind::OutlineSubmitted
                    .render(PerformedBy::Teacher, &[("course", body.course_name.as_str())]);
                record_best_effort(api, entry).await;
            }
            Ok(())
        }
    }
}

async fn activities(api: &dyn SrsApi, command: ActivityCommand) -> Result<()> {
    match command {
        ActivityCommand::List { perform_by } => {
            let activities = api.list_activities(&ActivityQuery { perform_by }).await?;
            if activities.is_empty() {
                println!("No activities found");
            }
            for activity in activities {
                let when = activity
                    .created_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{:<16} {:<10} {:<26} {}",
                    when,
                    activity.perform_by.label(),
                    activity.title,
                    activity.subtitle
                );
            }
            Ok(())
        }
    }
}
