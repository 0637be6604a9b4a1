//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use client_core::FetchTicket;
use forms::Submission;
use shared::{
    domain::{CourseId, DepartmentId, PerformedBy, ScheduleId, StudentRecordId, TeacherId},
    protocol::{NewActivity, NewCourse, NewCourseOutline, NewDepartment, NewSchedule},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherFilter {
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleFilter {
    pub class_name: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub perform_by: Option<PerformedBy>,
}

/// One list fetch. The ticket's search term means something different per
/// page: student id, teacher email, or the teacher whose outlines are shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Students(FetchTicket<StudentFilter>),
    Teachers(FetchTicket<TeacherFilter>),
    Departments(FetchTicket<()>),
    Courses(FetchTicket<()>),
    Schedules(FetchTicket<ScheduleFilter>),
    Outlines(FetchTicket<()>),
    Activities(FetchTicket<ActivityFilter>),
}

impl FetchRequest {
    pub fn generation(&self) -> u64 {
        match self {
            FetchRequest::Students(ticket) => ticket.generation,
            FetchRequest::Teachers(ticket) => ticket.generation,
            FetchRequest::Departments(ticket)
            | FetchRequest::Courses(ticket)
            | FetchRequest::Outlines(ticket) => ticket.generation,
            FetchRequest::Schedules(ticket) => ticket.generation,
            FetchRequest::Activities(ticket) => ticket.generation,
        }
    }
}

/// A record picked for deletion, with the label used in the activity feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Student { id: StudentRecordId, name: String },
    Teacher { id: TeacherId, name: String },
    Department { id: DepartmentId, name: String },
    Course { id: CourseId, name: String },
    Schedule { id: ScheduleId, class_name: String },
}

impl DeleteTarget {
    pub fn label(&self) -> &str {
        match self {
            DeleteTarget::Student { name, .. }
            | DeleteTarget::Teacher { name, .. }
            | DeleteTarget::Department { name, .. }
            | DeleteTarget::Course { name, .. } => name,
            DeleteTarget::Schedule { class_name, .. } => class_name,
        }
    }
}

#[derive(Debug, Clone)]
pub enum BackendCommand {
    Fetch(FetchRequest),
    /// Departments, active courses and teachers for the form dropdowns.
    LoadReferenceData,
    SubmitStudent(Submission),
    ImportStudents { path: PathBuf },
    CreateDepartment(NewDepartment),
    CreateCourse(NewCourse),
    CreateSchedule(NewSchedule),
    SubmitOutline(NewCourseOutline),
    Delete(DeleteTarget),
    /// Best-effort audit entry after a mutation succeeded.
    RecordActivity(NewActivity),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Fetch(FetchRequest::Students(_)) => "fetch_students",
            BackendCommand::Fetch(FetchRequest::Teachers(_)) => "fetch_teachers",
            BackendCommand::Fetch(FetchRequest::Departments(_)) => "fetch_departments",
            BackendCommand::Fetch(FetchRequest::Courses(_)) => "fetch_courses",
            BackendCommand::Fetch(FetchRequest::Schedules(_)) => "fetch_schedules",
            BackendCommand::Fetch(FetchRequest::Outlines(_)) => "fetch_outlines",
            BackendCommand::Fetch(FetchRequest::Activities(_)) => "fetch_activities",
            BackendCommand::LoadReferenceData => "load_reference_data",
            BackendCommand::SubmitStudent(_) => "submit_student",
            BackendCommand::ImportStudents { .. } => "import_students",
            BackendCommand::CreateDepartment(_) => "create_department",
            BackendCommand::CreateCourse(_) => "create_course",
            BackendCommand::CreateSchedule(_) => "create_schedule",
            BackendCommand::SubmitOutline(_) => "submit_outline",
            BackendCommand::Delete(_) => "delete",
            BackendCommand::RecordActivity(_) => "record_activity",
        }
    }
}
