//! Audit-feed entries recorded after admin mutations, and the filters used
//! by the activity and course-outline pages.

use std::collections::BTreeMap;

use shared::{
    domain::{CourseOutline, OutlineStatus, PerformedBy},
    protocol::NewActivity,
};
use tracing::{info, warn};

use crate::api::SrsApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    StudentAdded,
    StudentUpdated,
    StudentDeleted,
    StudentsImported,
    DepartmentAdded,
    DepartmentDeleted,
    CourseAdded,
    CourseDeleted,
    ClassScheduled,
    ScheduleRemoved,
    OutlineSubmitted,
}

pub struct ActivityTemplate {
    pub action: &'static str,
    pub description: &'static str,
}

impl ActivityKind {
    pub fn template(self) -> ActivityTemplate {
        let (action, description) = match self {
            ActivityKind::StudentAdded => ("Student Added", "New student {name} was registered"),
            ActivityKind::StudentUpdated => {
                ("Student Updated", "Student {name} details were updated")
            }
            ActivityKind::StudentDeleted => ("Student Removed", "Student {name} was removed"),
            ActivityKind::StudentsImported => {
                ("Students Imported", "Student records imported from {file}")
            }
            ActivityKind::DepartmentAdded => {
                ("Department Added", "Department {department} was created")
            }
            ActivityKind::DepartmentDeleted => {
                ("Department Removed", "Department {department} was removed")
            }
            ActivityKind::CourseAdded => ("Course Added", "Course {course} was added"),
            ActivityKind::CourseDeleted => ("Course Removed", "Course {course} was removed"),
            ActivityKind::ClassScheduled => {
                ("Class Scheduled", "A new schedule was created for class {className}")
            }
            ActivityKind::ScheduleRemoved => {
                ("Schedule Removed", "A schedule was removed for class {className}")
            }
            ActivityKind::OutlineSubmitted => {
                ("Course Outline Submitted", "Outline for {course} was submitted for review")
            }
        };
        ActivityTemplate {
            action,
            description,
        }
    }

    /// Fills `{placeholder}`s from `values`. Unknown placeholders stay as-is.
    pub fn render(self, perform_by: PerformedBy, values: &[(&str, &str)]) -> NewActivity {
        let template = self.template();
        let subtitle = values
            .iter()
            .fold(template.description.to_string(), |text, (key, value)| {
                text.replace(&format!("{{{key}}}"), value)
            });
        NewActivity {
            title: template.action.to_string(),
            subtitle,
            perform_by,
        }
    }
}

/// Posts an activity entry. Failures are logged and otherwise ignored.
pub async fn record_best_effort(api: &dyn SrsApi, activity: NewActivity) {
    match api.record_activity(&activity).await {
        Ok(()) => info!(title = %activity.title, "activity recorded"),
        Err(err) => warn!(title = %activity.title, error = %err, "activity recording failed"),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineFilter {
    pub status: Option<OutlineStatus>,
    pub course_search: String,
}

impl OutlineFilter {
    pub fn matches(&self, outline: &CourseOutline) -> bool {
        if self.status.is_some_and(|status| status != outline.status) {
            return false;
        }
        let needle = self.course_search.trim().to_lowercase();
        needle.is_empty() || outline.course_name.to_lowercase().contains(&needle)
    }

    pub fn apply<'a>(&self, outlines: &'a [CourseOutline]) -> Vec<&'a CourseOutline> {
        outlines.iter().filter(|outline| self.matches(outline)).collect()
    }
}

/// Per-status totals over the unfiltered list.
pub fn outline_status_counts(outlines: &[CourseOutline]) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> = OutlineStatus::ALL
        .into_iter()
        .map(|status| (status.label(), 0))
        .collect();
    for outline in outlines {
        *counts.entry(outline.status.label()).or_default() += 1;
    }
    counts
}
