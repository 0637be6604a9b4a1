//! Course schedule form: course, class, section, teacher and a list of
//! `(day, start, end)` tuples.

use std::collections::BTreeSet;

use shared::{
    domain::{ClockTime, CourseId, DaySchedule, TeacherId, Weekday},
    protocol::NewSchedule,
};
use thiserror::Error;
use tracing::debug;

use crate::notice::{Notice, SubmitResolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScheduleField {
    Course,
    ClassName,
    Section,
    Teacher,
    DayOfWeek,
}

impl ScheduleField {
    pub fn key(self) -> &'static str {
        match self {
            ScheduleField::Course => "courseId",
            ScheduleField::ClassName => "className",
            ScheduleField::Section => "section",
            ScheduleField::Teacher => "teacherId",
            ScheduleField::DayOfWeek => "dayOfWeek",
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleRejection {
    #[error("Please select day, start time, and end time")]
    MissingSelection,
    #[error("Schedule for {0} already exists. Remove it first to change.")]
    DuplicateDay(Weekday),
    #[error("End time must be after start time")]
    EndNotAfterStart,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleBuilder {
    course_id: String,
    class_name: String,
    section: String,
    teacher_id: String,
    note: String,
    days: Vec<DaySchedule>,
    pending_day: Option<Weekday>,
    pending_start: Option<ClockTime>,
    pending_end: Option<ClockTime>,
    invalid: BTreeSet<ScheduleField>,
    submit_attempted: bool,
    submitting: bool,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn teacher_id(&self) -> &str {
        &self.teacher_id
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn days(&self) -> &[DaySchedule] {
        &self.days
    }

    pub fn pending(&self) -> (Option<Weekday>, Option<ClockTime>, Option<ClockTime>) {
        (self.pending_day, self.pending_start, self.pending_end)
    }

    pub fn is_invalid(&self, field: ScheduleField) -> bool {
        self.invalid.contains(&field)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_course(&mut self, course_id: impl Into<String>) {
        self.course_id = course_id.into();
        self.revalidate();
    }

    pub fn set_class_name(&mut self, class_name: impl Into<String>) {
        self.class_name = class_name.into();
        self.revalidate();
    }

    pub fn set_section(&mut self, section: impl Into<String>) {
        self.section = section.into();
        self.revalidate();
    }

    pub fn set_teacher(&mut self, teacher_id: impl Into<String>) {
        self.teacher_id = teacher_id.into();
        self.revalidate();
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    pub fn select_day(&mut self, day: Option<Weekday>) {
        self.pending_day = day;
    }

    pub fn select_start(&mut self, start: Option<ClockTime>) {
        self.pending_start = start;
    }

    pub fn select_end(&mut self, end: Option<ClockTime>) {
        self.pending_end = end;
    }

    /// Appends the pending selection. The selection resets only on success.
    pub fn add_day_schedule(&mut self) -> Result<DaySchedule, ScheduleRejection> {
        let (Some(day), Some(start_time), Some(end_time)) =
            (self.pending_day, self.pending_start, self.pending_end)
        else {
            return Err(ScheduleRejection::MissingSelection);
        };
        if self.days.iter().any(|entry| entry.day == day) {
            return Err(ScheduleRejection::DuplicateDay(day));
        }
        if end_time <= start_time {
            return Err(ScheduleRejection::EndNotAfterStart);
        }

        let entry = DaySchedule {
            day,
            start_time,
            end_time,
        };
        self.days.push(entry);
        self.pending_day = None;
        self.pending_start = None;
        self.pending_end = None;
        self.revalidate();
        Ok(entry)
    }

    pub fn remove_day_schedule(&mut self, index: usize) -> Option<DaySchedule> {
        if index >= self.days.len() {
            return None;
        }
        let removed = self.days.remove(index);
        self.revalidate();
        Some(removed)
    }

    /// Recomputes the invalid-field set. Returns `true` when nothing is missing.
    pub fn validate(&mut self) -> bool {
        let mut invalid = BTreeSet::new();
        let blank = [
            (ScheduleField::Course, &self.course_id),
            (ScheduleField::ClassName, &self.class_name),
            (ScheduleField::Section, &self.section),
            (ScheduleField::Teacher, &self.teacher_id),
        ];
        for (field, value) in blank {
            if value.trim().is_empty() {
                invalid.insert(field);
            }
        }
        if self.days.is_empty() {
            invalid.insert(ScheduleField::DayOfWeek);
        }
        self.invalid = invalid;
        self.invalid.is_empty()
    }

    /// Marks a submit attempt and returns the request body when valid.
    pub fn build(&mut self) -> Option<NewSchedule> {
        self.submit_attempted = true;
        if !self.validate() {
            return None;
        }
        Some(NewSchedule {
            course_id: CourseId(self.course_id.trim().to_string()),
            class_name: self.class_name.trim().to_string(),
            section: self.section.trim().to_string(),
            teacher_id: TeacherId(self.teacher_id.trim().to_string()),
            note: self.note.trim().to_string(),
            day_of_week: self.days.clone(),
        })
    }

    /// `build` plus the in-flight guard.
    pub fn begin_submit(&mut self) -> Result<NewSchedule, Notice> {
        if self.submitting {
            return Err(Notice::info("Schedule is already being saved"));
        }
        let body = self
            .build()
            .ok_or_else(|| Notice::error("Please fill all required fields"))?;
        self.submitting = true;
        debug!(days = body.day_of_week.len(), "schedule submission started");
        Ok(body)
    }

    pub fn finish_submit(&mut self, result: Result<(), String>) -> SubmitResolution {
        self.submitting = false;
        match result {
            Ok(()) => SubmitResolution::done(Notice::success("Course scheduled successfully!")),
            Err(reason) => {
                debug!(%reason, "schedule submission failed");
                SubmitResolution::stay_open(Notice::error("Failed to schedule course"))
            }
        }
    }

    fn revalidate(&mut self) {
        if self.submit_attempted {
            self.validate();
        }
    }
}
