//! TOML drafts for the multi-field forms.

use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use forms::{
    FieldErrors, GuardianDraft, ScheduleBuilder, StudentDraft, StudentWizard, WizardAction,
    WizardError,
};
use serde::Deserialize;
use shared::{
    domain::{ClockTime, StudentRecordId, Weekday},
    protocol::NewSchedule,
};

/// ```toml
/// [student]
/// roll_no = "S-100"
/// ...
/// [guardian]
/// name = "Pat Rivera"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudentDraftFile {
    pub student: StudentDraft,
    pub guardian: GuardianDraft,
}

#[derive(Debug, Deserialize)]
pub struct DayEntry {
    pub day: Weekday,
    pub start: ClockTime,
    pub end: ClockTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleDraftFile {
    pub course_id: String,
    pub class_name: String,
    pub section: String,
    pub teacher_id: String,
    pub note: String,
    pub days: Vec<DayEntry>,
}

pub fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read draft '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse draft '{}'", path.display()))
}

/// Runs both wizard steps so the draft gets the same checks as the GUI.
pub fn wizard_from_draft(
    draft: StudentDraftFile,
    update: Option<StudentRecordId>,
) -> Result<StudentWizard> {
    let mut wizard = match update {
        Some(id) => StudentWizard::for_update(id, draft.student, draft.guardian),
        None => StudentWizard::from_drafts(draft.student, draft.guardian),
    };
    if let Err(err) = wizard.apply(WizardAction::Continue) {
        return Err(describe(err, wizard.student_errors()));
    }
    Ok(wizard)
}

pub fn describe(err: WizardError, errors: &FieldErrors) -> anyhow::Error {
    if errors.is_empty() {
        return anyhow!(err);
    }
    let details: Vec<String> = errors
        .iter()
        .map(|(key, message)| format!("  {key}: {message}"))
        .collect();
    anyhow!("{err}\n{}", details.join("\n"))
}

pub fn schedule_from_draft(draft: ScheduleDraftFile) -> Result<(ScheduleBuilder, NewSchedule)> {
    let mut builder = ScheduleBuilder::new();
    builder.set_course(draft.course_id);
    builder.set_class_name(draft.class_name);
    builder.set_section(draft.section);
    builder.set_teacher(draft.teacher_id);
    builder.set_note(draft.note);
    for entry in draft.days {
        builder.select_day(Some(entry.day));
        builder.select_start(Some(entry.start));
        builder.select_end(Some(entry.end));
        builder
            .add_day_schedule()
            .map_err(|rejection| anyhow!(rejection))?;
    }
    let body = builder.begin_submit().map_err(|notice| {
        anyhow!(
            "{} (missing: {})",
            notice.message,
            missing_schedule_fields(&builder).join(", ")
        )
    })?;
    Ok((builder, body))
}

fn missing_schedule_fields(builder: &ScheduleBuilder) -> Vec<&'static str> {
    use forms::ScheduleField;
    [
        ScheduleField::Course,
        ScheduleField::ClassName,
        ScheduleField::Section,
        ScheduleField::Teacher,
        ScheduleField::DayOfWeek,
    ]
    .into_iter()
    .filter(|field| builder.is_invalid(*field))
    .map(ScheduleField::key)
    .collect()
}
