use serde::{Deserialize, Serialize};

use crate::domain::{
    CourseId, DaySchedule, DepartmentId, Gender, PerformedBy, Student, TeacherId,
};

/// Paged student listing as returned by `GET /student`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPage {
    #[serde(default)]
    pub data: Vec<Student>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_records_count: u64,
    #[serde(default = "default_page")]
    pub current_page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// `{ data: [...] }` wrapper used by the teacher, schedule and activity
/// listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Flat create/update body for a student. Guardian fields carry the
/// `guardian` prefix on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub roll_no: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: String,
    pub gender: Gender,
    pub dob: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub enroll_date: String,
    pub expected_graduation: String,
    pub guardian_name: String,
    pub guardian_email: String,
    pub guardian_phone: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub guardian_relation: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub guardian_profession: String,
    pub honor_roll: bool,
    pub athletics: bool,
    pub club_membership: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lunch_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub transcripts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartment {
    pub department_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub course_name: String,
    pub course_code: String,
    pub department_id: DepartmentId,
    #[serde(rename = "Prerequisites")]
    pub prerequisites: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub course_id: CourseId,
    pub class_name: String,
    pub section: String,
    pub teacher_id: TeacherId,
    pub note: String,
    pub day_of_week: Vec<DaySchedule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub title: String,
    pub subtitle: String,
    pub perform_by: PerformedBy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseOutline {
    pub teacher_id: TeacherId,
    pub document: String,
    pub course_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleQuery {
    #[serde(rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perform_by: Option<PerformedBy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineQuery {
    pub teacher_id: TeacherId,
}
