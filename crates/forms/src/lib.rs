//! Form state and validation for the admin front-ends.
//!
//! Everything here is synchronous and side-effect free: forms own their
//! field values and error flags, and hand back request bodies for the
//! caller to send.

pub mod notice;
pub mod schedule_builder;
pub mod schema;
pub mod single_step;
pub mod student_wizard;

pub use notice::{Notice, NoticeLevel, SubmitResolution};
pub use schedule_builder::{ScheduleBuilder, ScheduleField, ScheduleRejection};
pub use schema::{FieldErrors, FieldFormat, FieldRule, FieldSource, FormSchema};
pub use single_step::{CourseForm, DepartmentForm, ImportForm, OutlineFailure, OutlineForm};
pub use student_wizard::{
    GuardianDraft, GuardianField, StudentDraft, StudentExtras, StudentField, StudentWizard,
    SubmitOutcome, SubmitTarget, Submission, Transition, WizardAction, WizardError, WizardStep,
};

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod wizard_tests;

#[cfg(test)]
#[path = "tests/schedule_tests.rs"]
mod schedule_tests;

#[cfg(test)]
#[path = "tests/single_step_tests.rs"]
mod single_step_tests;
