//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{ClientError, ListPage};
use forms::{OutlineFailure, SubmitOutcome};
use shared::{
    domain::{Activity, Course, CourseOutline, Department, Schedule, Student, Teacher},
    error::ErrorCode,
    protocol::MessageResponse,
};

use crate::backend_bridge::commands::DeleteTarget;

pub type PageResult<R> = Result<ListPage<R>, UiError>;

/// A list response, tagged with the generation of the ticket that asked for it.
#[derive(Debug)]
pub enum FetchedPage {
    Students(u64, PageResult<Student>),
    Teachers(u64, PageResult<Teacher>),
    Departments(u64, PageResult<Department>),
    Courses(u64, PageResult<Course>),
    Schedules(u64, PageResult<Schedule>),
    Outlines(u64, PageResult<CourseOutline>),
    Activities(u64, PageResult<Activity>),
}

/// Dropdown sources. A list that failed to load stays empty and its error
/// is reported in `failure`.
#[derive(Debug, Default)]
pub struct ReferenceData {
    pub departments: Vec<Department>,
    pub courses: Vec<Course>,
    pub teachers: Vec<Teacher>,
    pub failure: Option<UiError>,
}

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    Error(UiError),
    Fetched(FetchedPage),
    ReferenceDataLoaded(ReferenceData),
    StudentSubmitted(SubmitOutcome),
    StudentsImported(Result<MessageResponse, String>),
    DepartmentCreated(Result<(), String>),
    CourseCreated(Result<(), String>),
    ScheduleCreated(Result<(), String>),
    OutlineSubmitted(Result<(), OutlineFailure>),
    Deleted {
        target: DeleteTarget,
        result: Result<(), String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Conflict,
    Transport,
    Validation,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadList,
    LoadReferenceData,
}

impl UiErrorContext {
    pub fn describe(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "starting the backend worker",
            UiErrorContext::LoadList => "loading the list",
            UiErrorContext::LoadReferenceData => "loading dropdown data",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Transport(_) => UiErrorCategory::Transport,
            ClientError::InvalidUrl { .. } => UiErrorCategory::Validation,
            _ => match err.code() {
                ErrorCode::Conflict => UiErrorCategory::Conflict,
                ErrorCode::Validation => UiErrorCategory::Validation,
                ErrorCode::Internal => UiErrorCategory::Server,
                _ => UiErrorCategory::Unknown,
            },
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    /// Classifies a free-form message, used where no typed error exists
    /// (worker startup).
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("already") || lower.contains("conflict") {
            UiErrorCategory::Conflict
        } else if lower.contains("invalid")
            || lower.contains("missing")
            || lower.contains("required")
        {
            UiErrorCategory::Validation
        } else if lower.contains("timeout")
            || lower.contains("connection")
            || lower.contains("network")
            || lower.contains("disconnect")
            || lower.contains("unreachable")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };
        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Conflict => "Conflict",
        UiErrorCategory::Transport => "Server unreachable",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Server => "Server error",
        UiErrorCategory::Unknown => "Unexpected",
    }
}
