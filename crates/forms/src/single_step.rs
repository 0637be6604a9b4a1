//! One-screen forms: department, course, course outline and spreadsheet import.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{DepartmentId, TeacherId},
    protocol::{MessageResponse, NewCourse, NewCourseOutline, NewDepartment},
};

use crate::{
    notice::{Notice, SubmitResolution},
    schema::{FieldErrors, FieldRule, FieldSource, FormSchema},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentForm {
    pub name: String,
}

impl DepartmentForm {
    pub fn build(&self) -> Result<NewDepartment, Notice> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Notice::error("Department name is required"));
        }
        Ok(NewDepartment {
            department_name: name.to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<(), String>) -> SubmitResolution {
        match result {
            Ok(()) => {
                self.name.clear();
                SubmitResolution::done(Notice::success("Department added successfully"))
            }
            Err(_) => SubmitResolution::stay_open(Notice::error("Failed to add department")),
        }
    }
}

pub static COURSE_SCHEMA: FormSchema = FormSchema::new(&[
    FieldRule::required("courseName", "Course name"),
    FieldRule::required("courseCode", "Course code"),
    FieldRule::required("departmentId", "Department"),
    FieldRule::optional("Prerequisites", "Prerequisites"),
    FieldRule::required("description", "Description"),
]);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseForm {
    pub course_name: String,
    pub course_code: String,
    pub department_id: String,
    pub prerequisites: String,
    pub description: String,
}

impl FieldSource for CourseForm {
    fn field_value(&self, key: &str) -> Option<&str> {
        let value = match key {
            "courseName" => &self.course_name,
            "courseCode" => &self.course_code,
            "departmentId" => &self.department_id,
            "Prerequisites" => &self.prerequisites,
            "description" => &self.description,
            _ => return None,
        };
        Some(value)
    }
}

impl CourseForm {
    pub fn errors(&self) -> FieldErrors {
        COURSE_SCHEMA.validate(self)
    }

    pub fn build(&self) -> Result<NewCourse, Notice> {
        if !self.errors().is_empty() {
            return Err(Notice::error("Please fill all required fields"));
        }
        Ok(NewCourse {
            course_name: self.course_name.trim().to_string(),
            course_code: self.course_code.trim().to_string(),
            department_id: DepartmentId(self.department_id.trim().to_string()),
            prerequisites: self.prerequisites.trim().to_string(),
            description: self.description.trim().to_string(),
        })
    }

    pub fn finish(&mut self, result: Result<(), String>) -> SubmitResolution {
        match result {
            Ok(()) => {
                *self = Self::default();
                SubmitResolution::done(Notice::success("Course added successfully!"))
            }
            Err(_) => SubmitResolution::stay_open(Notice::error("Failed to add course")),
        }
    }
}

/// Outline upload. `document` is the stored document's URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineForm {
    pub course_name: String,
    pub document: String,
}

impl OutlineForm {
    pub fn build(&self, teacher_id: &TeacherId) -> Result<NewCourseOutline, Notice> {
        let course_name = self.course_name.trim();
        let document = self.document.trim();
        if course_name.is_empty() || document.is_empty() {
            return Err(Notice::error("Please select a course and upload a file"));
        }
        Ok(NewCourseOutline {
            teacher_id: teacher_id.clone(),
            document: document.to_string(),
            course_name: course_name.to_string(),
        })
    }

    /// A conflict carries the server's own explanation.
    pub fn finish(&mut self, result: Result<(), OutlineFailure>) -> SubmitResolution {
        match result {
            Ok(()) => {
                *self = Self::default();
                SubmitResolution::done(Notice::success("Course outline uploaded successfully"))
            }
            Err(OutlineFailure::Conflict(message)) => {
                SubmitResolution::stay_open(Notice::error(message))
            }
            Err(OutlineFailure::Other) => {
                SubmitResolution::stay_open(Notice::error("Failed to upload course outline"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineFailure {
    Conflict(String),
    Other,
}

pub const IMPORT_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// The server reports duplicate rows with this message on a 2xx response.
const IMPORT_DUPLICATES: &str = "Uploading failed";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportForm {
    pub file: Option<PathBuf>,
}

impl ImportForm {
    pub fn selected(&self) -> Result<&Path, Notice> {
        let path = self
            .file
            .as_deref()
            .ok_or_else(|| Notice::error("Please select a file to upload"))?;
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                IMPORT_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
            });
        if !supported {
            return Err(Notice::error("Only .xlsx and .xls files can be imported"));
        }
        Ok(path)
    }

    pub fn finish(&mut self, result: Result<MessageResponse, String>) -> SubmitResolution {
        match result {
            Ok(response) => match response.message.as_deref() {
                Some(IMPORT_DUPLICATES) => {
                    SubmitResolution::stay_open(Notice::error("Student Already Registered!"))
                }
                message => {
                    self.file = None;
                    let text = message
                        .filter(|text| !text.is_empty())
                        .unwrap_or("Upload Successful!");
                    SubmitResolution::done(Notice::success(text))
                }
            },
            Err(_) => SubmitResolution::stay_open(Notice::error(
                "Error uploading file. Please try again.",
            )),
        }
    }
}
