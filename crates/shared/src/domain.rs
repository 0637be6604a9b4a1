use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(StudentRecordId);
id_newtype!(TeacherId);
id_newtype!(DepartmentId);
id_newtype!(CourseId);
id_newtype!(ScheduleId);
id_newtype!(ActivityId);
id_newtype!(OutlineId);

/// A reference field the server returns either as a bare id or as a
/// populated sub-document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Populated(T),
    Id(String),
}

impl<T> Reference<T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Reference::Populated(value) => Some(value),
            Reference::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: StudentRecordId,
    pub roll_no: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub section: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub dob: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub enroll_date: String,
    #[serde(default)]
    pub expected_graduation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub guardian_name: String,
    #[serde(default)]
    pub guardian_email: String,
    #[serde(default)]
    pub guardian_phone: String,
    #[serde(default)]
    pub guardian_relation: String,
    #[serde(default)]
    pub guardian_profession: String,
    #[serde(default)]
    pub honor_roll: bool,
    #[serde(default)]
    pub athletics: bool,
    #[serde(default)]
    pub club_membership: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lunch_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default)]
    pub transcripts: Vec<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn guardian(&self) -> Guardian {
        Guardian {
            name: self.guardian_name.clone(),
            email: self.guardian_email.clone(),
            phone: self.guardian_phone.clone(),
            relation: self.guardian_relation.clone(),
            profession: self.guardian_profession.clone(),
        }
    }

    /// Issued passwords are only ever shown truncated.
    pub fn masked_password(&self) -> Option<String> {
        self.password.as_deref().map(|password| {
            let visible: String = password.chars().take(6).collect();
            format!("{visible}...")
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub relation: String,
    pub profession: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    #[serde(rename = "_id")]
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub qualification: String,
}

impl Teacher {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(rename = "_id")]
    pub id: DepartmentId,
    pub department_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DepartmentId>,
    pub department_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: CourseId,
    pub course_name: String,
    pub course_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<Reference<DepartmentSummary>>,
    #[serde(rename = "Prerequisites", default)]
    pub prerequisites: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Resolves the department label, falling back to a lookup table when
    /// the server returned a bare id.
    pub fn department_name<'a>(&'a self, departments: &'a [Department]) -> &'a str {
        match &self.department_id {
            Some(Reference::Populated(summary)) => &summary.department_name,
            Some(Reference::Id(id)) => departments
                .iter()
                .find(|dept| dept.id.as_str() == id)
                .map(|dept| dept.department_name.as_str())
                .unwrap_or("Unknown Department"),
            None => "Unknown Department",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[serde(rename = "_id")]
    pub id: CourseId,
    pub course_name: String,
    pub course_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    #[serde(rename = "_id")]
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Weekday {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|day| day.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLabelError::Weekday(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLabelError {
    #[error("unknown weekday: {0}")]
    Weekday(String),
    #[error("invalid time label: {0}")]
    Time(String),
    #[error("unknown outline status: {0}")]
    OutlineStatus(String),
}

/// Wall-clock time of day, exchanged as 12-hour labels such as `"9:00 AM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    pub fn minutes_since_midnight(self) -> u16 {
        self.minutes
    }

    pub fn hour(self) -> u8 {
        (self.minutes / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.minutes % 60) as u8
    }

    /// The selectable slots offered by the schedule form: 7:00 AM to 9:00 PM
    /// in half-hour steps.
    pub fn slot_options() -> Vec<ClockTime> {
        (7 * 60..=21 * 60)
            .step_by(30)
            .map(|minutes| ClockTime { minutes })
            .collect()
    }
}

impl FromStr for ClockTime {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseLabelError::Time(s.to_string());
        let (clock, period) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let (hour, minute) = clock.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&hour) || minute > 59 {
            return Err(invalid());
        }

        let hour = match period.trim().to_ascii_uppercase().as_str() {
            "AM" if hour == 12 => 0,
            "AM" => hour,
            "PM" if hour == 12 => 12,
            "PM" => hour + 12,
            _ => return Err(invalid()),
        };

        ClockTime::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour = self.hour();
        let period = if hour >= 12 { "PM" } else { "AM" };
        let display_hour = match hour % 12 {
            0 => 12,
            other => other,
        };
        write!(f, "{display_hour}:{:02} {period}", self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    #[serde(rename = "date")]
    pub day: Weekday,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(rename = "_id")]
    pub id: ScheduleId,
    #[serde(default)]
    pub course_id: Option<Reference<CourseSummary>>,
    pub class_name: String,
    pub section: String,
    #[serde(default)]
    pub teacher_id: Option<Reference<TeacherSummary>>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub day_of_week: Vec<DaySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Schedule {
    /// Deleted or unpopulated courses show as "Unknown".
    pub fn course_label(&self) -> String {
        self.course_id
            .as_ref()
            .and_then(Reference::populated)
            .map(|course| format!("{} ({})", course.course_name, course.course_code))
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn teacher_label(&self) -> String {
        self.teacher_id
            .as_ref()
            .and_then(Reference::populated)
            .map(|teacher| format!("{} {}", teacher.first_name, teacher.last_name))
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PerformedBy {
    #[default]
    Admin,
    Teacher,
    Secretary,
    Student,
    /// Any role this client does not know about.
    #[serde(other)]
    Unknown,
}

impl PerformedBy {
    pub const ALL: [PerformedBy; 4] = [
        PerformedBy::Admin,
        PerformedBy::Teacher,
        PerformedBy::Secretary,
        PerformedBy::Student,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PerformedBy::Admin => "Admin",
            PerformedBy::Teacher => "Teacher",
            PerformedBy::Secretary => "Secretary",
            PerformedBy::Student => "Student",
            PerformedBy::Unknown => "Unknown",
        }
    }
}

impl FromStr for PerformedBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PerformedBy::ALL
            .into_iter()
            .find(|role| role.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

fn unknown_role() -> PerformedBy {
    PerformedBy::Unknown
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "_id")]
    pub id: ActivityId,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default = "unknown_role")]
    pub perform_by: PerformedBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutlineStatus {
    Approved,
    Pending,
    Rejected,
}

impl OutlineStatus {
    pub const ALL: [OutlineStatus; 3] = [
        OutlineStatus::Approved,
        OutlineStatus::Pending,
        OutlineStatus::Rejected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OutlineStatus::Approved => "approved",
            OutlineStatus::Pending => "pending",
            OutlineStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for OutlineStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutlineStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLabelError::OutlineStatus(s.to_string()))
    }
}

impl Serialize for OutlineStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for OutlineStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOutline {
    #[serde(rename = "_id")]
    pub id: OutlineId,
    pub teacher_id: TeacherId,
    pub status: OutlineStatus,
    #[serde(default)]
    pub document: String,
    pub course_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Renders a server date (`2024-05-01T00:00:00.000Z` or `2024-05-01`) as
/// `YYYY-MM-DD`, passing anything unparseable through unchanged.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}
