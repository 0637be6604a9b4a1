//! Two-step student registration: student details, then guardian details.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{format_date, Gender, Student, StudentRecordId},
    protocol::StudentPayload,
};
use thiserror::Error;
use tracing::debug;

use crate::{
    notice::{Notice, SubmitResolution},
    schema::{FieldErrors, FieldFormat, FieldRule, FieldSource, FormSchema},
};

pub const CLASS_OPTIONS: [&str; 4] = ["9", "10", "11", "12"];
pub const SECTION_OPTIONS: [&str; 3] = ["A", "B", "C"];

/// Graduation years offered by the picker, starting at `current_year`.
pub fn graduation_year_options(current_year: i32) -> Vec<String> {
    (current_year..=current_year + 15)
        .map(|year| year.to_string())
        .collect()
}

pub static STUDENT_SCHEMA: FormSchema = FormSchema::new(&[
    FieldRule::required("rollNo", "Roll number"),
    FieldRule::required("firstName", "First name"),
    FieldRule::required("lastName", "Last name"),
    FieldRule::required("class", "Class"),
    FieldRule::required("section", "Section"),
    FieldRule::required("dob", "Date of birth").format(FieldFormat::Date),
    FieldRule::required("email", "Email").format(FieldFormat::Email),
    FieldRule::required("phone", "Phone number").format(FieldFormat::Phone10),
    FieldRule::required("address", "Address"),
    FieldRule::optional("enrollDate", "Enroll date").format(FieldFormat::Date),
    FieldRule::required("expectedGraduation", "Expected graduation").format(FieldFormat::Year),
]);

pub static GUARDIAN_SCHEMA: FormSchema = FormSchema::new(&[
    FieldRule::required("guardianName", "Guardian name"),
    FieldRule::required("guardianEmail", "Guardian email").format(FieldFormat::Email),
    FieldRule::required("guardianPhone", "Guardian phone").format(FieldFormat::Phone10),
    FieldRule::optional("guardianRelation", "Relation"),
    FieldRule::optional("guardianProfession", "Profession"),
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentField {
    RollNo,
    FirstName,
    LastName,
    ClassName,
    Section,
    Dob,
    Email,
    Phone,
    Address,
    EnrollDate,
    ExpectedGraduation,
}

impl StudentField {
    pub const ALL: [StudentField; 11] = [
        StudentField::RollNo,
        StudentField::FirstName,
        StudentField::LastName,
        StudentField::ClassName,
        StudentField::Section,
        StudentField::Dob,
        StudentField::Email,
        StudentField::Phone,
        StudentField::Address,
        StudentField::EnrollDate,
        StudentField::ExpectedGraduation,
    ];

    pub fn key(self) -> &'static str {
        match self {
            StudentField::RollNo => "rollNo",
            StudentField::FirstName => "firstName",
            StudentField::LastName => "lastName",
            StudentField::ClassName => "class",
            StudentField::Section => "section",
            StudentField::Dob => "dob",
            StudentField::Email => "email",
            StudentField::Phone => "phone",
            StudentField::Address => "address",
            StudentField::EnrollDate => "enrollDate",
            StudentField::ExpectedGraduation => "expectedGraduation",
        }
    }

    pub fn label(self) -> &'static str {
        STUDENT_SCHEMA
            .rules()
            .iter()
            .find(|rule| rule.key == self.key())
            .map(|rule| rule.label)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardianField {
    Name,
    Email,
    Phone,
    Relation,
    Profession,
}

impl GuardianField {
    pub const ALL: [GuardianField; 5] = [
        GuardianField::Name,
        GuardianField::Email,
        GuardianField::Phone,
        GuardianField::Relation,
        GuardianField::Profession,
    ];

    pub fn key(self) -> &'static str {
        match self {
            GuardianField::Name => "guardianName",
            GuardianField::Email => "guardianEmail",
            GuardianField::Phone => "guardianPhone",
            GuardianField::Relation => "guardianRelation",
            GuardianField::Profession => "guardianProfession",
        }
    }

    pub fn label(self) -> &'static str {
        GUARDIAN_SCHEMA
            .rules()
            .iter()
            .find(|rule| rule.key == self.key())
            .map(|rule| rule.label)
            .unwrap_or_default()
    }
}

/// Values entered on the student step. Also the on-disk draft format used
/// by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentDraft {
    pub roll_no: String,
    pub first_name: String,
    pub last_name: String,
    pub class_name: String,
    pub section: String,
    pub gender: Gender,
    pub dob: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub enroll_date: String,
    pub expected_graduation: String,
    pub honor_roll: bool,
    pub athletics: bool,
    pub club_membership: bool,
    pub lunch_preference: String,
    pub nationality: String,
    pub transcripts: Vec<String>,
    #[serde(skip)]
    pub photo: Option<PathBuf>,
}

impl StudentDraft {
    pub fn get(&self, field: StudentField) -> &str {
        match field {
            StudentField::RollNo => &self.roll_no,
            StudentField::FirstName => &self.first_name,
            StudentField::LastName => &self.last_name,
            StudentField::ClassName => &self.class_name,
            StudentField::Section => &self.section,
            StudentField::Dob => &self.dob,
            StudentField::Email => &self.email,
            StudentField::Phone => &self.phone,
            StudentField::Address => &self.address,
            StudentField::EnrollDate => &self.enroll_date,
            StudentField::ExpectedGraduation => &self.expected_graduation,
        }
    }

    fn slot(&mut self, field: StudentField) -> &mut String {
        match field {
            StudentField::RollNo => &mut self.roll_no,
            StudentField::FirstName => &mut self.first_name,
            StudentField::LastName => &mut self.last_name,
            StudentField::ClassName => &mut self.class_name,
            StudentField::Section => &mut self.section,
            StudentField::Dob => &mut self.dob,
            StudentField::Email => &mut self.email,
            StudentField::Phone => &mut self.phone,
            StudentField::Address => &mut self.address,
            StudentField::EnrollDate => &mut self.enroll_date,
            StudentField::ExpectedGraduation => &mut self.expected_graduation,
        }
    }
}

impl FieldSource for StudentDraft {
    fn field_value(&self, key: &str) -> Option<&str> {
        StudentField::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .map(|field| self.get(field))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub relation: String,
    pub profession: String,
}

impl GuardianDraft {
    pub fn get(&self, field: GuardianField) -> &str {
        match field {
            GuardianField::Name => &self.name,
            GuardianField::Email => &self.email,
            GuardianField::Phone => &self.phone,
            GuardianField::Relation => &self.relation,
            GuardianField::Profession => &self.profession,
        }
    }

    fn slot(&mut self, field: GuardianField) -> &mut String {
        match field {
            GuardianField::Name => &mut self.name,
            GuardianField::Email => &mut self.email,
            GuardianField::Phone => &mut self.phone,
            GuardianField::Relation => &mut self.relation,
            GuardianField::Profession => &mut self.profession,
        }
    }
}

impl FieldSource for GuardianDraft {
    fn field_value(&self, key: &str) -> Option<&str> {
        GuardianField::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .map(|field| self.get(field))
    }
}

/// Unvalidated student fields, borrowed for editing.
pub struct StudentExtras<'a> {
    pub gender: &'a mut Gender,
    pub honor_roll: &'a mut bool,
    pub athletics: &'a mut bool,
    pub club_membership: &'a mut bool,
    pub lunch_preference: &'a mut String,
    pub nationality: &'a mut String,
    pub photo: &'a mut Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Student,
    Guardian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    Continue,
    Back,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    /// `POST /student/add`
    Create,
    /// `PUT /student/:id`
    Update(StudentRecordId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub target: SubmitTarget,
    pub payload: StudentPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Moved(WizardStep),
    Submit(Submission),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    Conflict,
    Failed(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("cannot {action:?} from the {step:?} step")]
    InvalidTransition {
        step: WizardStep,
        action: WizardAction,
    },
    #[error("student details have {0} invalid field(s)")]
    StudentInvalid(usize),
    #[error("guardian details have {0} invalid field(s)")]
    GuardianInvalid(usize),
    #[error("a submission is already in flight")]
    SubmitInFlight,
}

#[derive(Debug, Clone)]
pub struct StudentWizard {
    step: WizardStep,
    student: StudentDraft,
    guardian: GuardianDraft,
    student_errors: FieldErrors,
    guardian_errors: FieldErrors,
    editing: Option<StudentRecordId>,
    submitting: bool,
}

impl Default for StudentWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentWizard {
    pub fn new() -> Self {
        Self::from_drafts(StudentDraft::default(), GuardianDraft::default())
    }

    pub fn from_drafts(student: StudentDraft, guardian: GuardianDraft) -> Self {
        Self {
            step: WizardStep::Student,
            student,
            guardian,
            student_errors: FieldErrors::default(),
            guardian_errors: FieldErrors::default(),
            editing: None,
            submitting: false,
        }
    }

    /// Opens the wizard pre-filled from an existing record.
    pub fn edit(record: &Student) -> Self {
        let student = StudentDraft {
            roll_no: record.roll_no.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            class_name: record.class_name.clone(),
            section: record.section.clone(),
            gender: record.gender,
            dob: format_date(&record.dob),
            email: record.email.clone(),
            phone: record.phone.clone(),
            address: record.address.clone(),
            enroll_date: format_date(&record.enroll_date),
            expected_graduation: record.expected_graduation.clone(),
            honor_roll: record.honor_roll,
            athletics: record.athletics,
            club_membership: record.club_membership,
            lunch_preference: record.lunch_preference.clone().unwrap_or_default(),
            nationality: record.nationality.clone().unwrap_or_default(),
            transcripts: record.transcripts.clone(),
            photo: None,
        };
        let guardian = record.guardian();
        let guardian = GuardianDraft {
            name: guardian.name,
            email: guardian.email,
            phone: guardian.phone,
            relation: guardian.relation,
            profession: guardian.profession,
        };
        let mut wizard = Self::from_drafts(student, guardian);
        wizard.editing = Some(record.id.clone());
        wizard
    }

    /// Update of a known record from drafts, without the record itself.
    pub fn for_update(id: StudentRecordId, student: StudentDraft, guardian: GuardianDraft) -> Self {
        let mut wizard = Self::from_drafts(student, guardian);
        wizard.editing = Some(id);
        wizard
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn student(&self) -> &StudentDraft {
        &self.student
    }

    pub fn guardian(&self) -> &GuardianDraft {
        &self.guardian
    }

    pub fn student_errors(&self) -> &FieldErrors {
        &self.student_errors
    }

    pub fn guardian_errors(&self) -> &FieldErrors {
        &self.guardian_errors
    }

    /// Roll number and email identify the record and stay fixed while editing.
    pub fn is_locked(&self, field: StudentField) -> bool {
        self.editing.is_some() && matches!(field, StudentField::RollNo | StudentField::Email)
    }

    /// Returns `false` when the field is locked and the value was ignored.
    /// An accepted edit clears the field's error.
    pub fn set_student_field(&mut self, field: StudentField, value: impl Into<String>) -> bool {
        if self.is_locked(field) {
            return false;
        }
        *self.student.slot(field) = value.into();
        self.student_errors.remove(field.key());
        true
    }

    pub fn set_guardian_field(&mut self, field: GuardianField, value: impl Into<String>) {
        *self.guardian.slot(field) = value.into();
        self.guardian_errors.remove(field.key());
    }

    /// Gender, extension flags and the photo path have no validation rules.
    pub fn extras_mut(&mut self) -> StudentExtras<'_> {
        let student = &mut self.student;
        StudentExtras {
            gender: &mut student.gender,
            honor_roll: &mut student.honor_roll,
            athletics: &mut student.athletics,
            club_membership: &mut student.club_membership,
            lunch_preference: &mut student.lunch_preference,
            nationality: &mut student.nationality,
            photo: &mut student.photo,
        }
    }

    pub fn validate_student_form(&mut self) -> bool {
        self.student_errors = STUDENT_SCHEMA.validate(&self.student);
        self.student_errors.is_empty()
    }

    pub fn validate_guardian_form(&mut self) -> bool {
        self.guardian_errors = GUARDIAN_SCHEMA.validate(&self.guardian);
        self.guardian_errors.is_empty()
    }

    /// Rejected actions leave the step untouched.
    pub fn apply(&mut self, action: WizardAction) -> Result<Transition, WizardError> {
        match (self.step, action) {
            (WizardStep::Student, WizardAction::Continue) => {
                if !self.validate_student_form() {
                    return Err(WizardError::StudentInvalid(self.student_errors.len()));
                }
                self.step = WizardStep::Guardian;
                Ok(Transition::Moved(self.step))
            }
            (WizardStep::Guardian, WizardAction::Back) => {
                self.step = WizardStep::Student;
                Ok(Transition::Moved(self.step))
            }
            (WizardStep::Guardian, WizardAction::Submit) => {
                if self.submitting {
                    return Err(WizardError::SubmitInFlight);
                }
                if !self.validate_guardian_form() {
                    return Err(WizardError::GuardianInvalid(self.guardian_errors.len()));
                }
                self.submitting = true;
                let submission = Submission {
                    target: self.target(),
                    payload: self.payload(),
                };
                debug!(target = ?submission.target, "student submission started");
                Ok(Transition::Submit(submission))
            }
            (step, action) => Err(WizardError::InvalidTransition { step, action }),
        }
    }

    pub fn begin_submit(&mut self) -> Result<Submission, WizardError> {
        match self.apply(WizardAction::Submit)? {
            Transition::Submit(submission) => Ok(submission),
            Transition::Moved(step) => Err(WizardError::InvalidTransition {
                step,
                action: WizardAction::Submit,
            }),
        }
    }

    pub fn finish_submit(&mut self, outcome: SubmitOutcome) -> SubmitResolution {
        self.submitting = false;
        match outcome {
            SubmitOutcome::Saved if self.is_editing() => {
                SubmitResolution::done(Notice::success("Student updated successfully"))
            }
            SubmitOutcome::Saved => {
                SubmitResolution::done(Notice::success("Student registered successfully"))
            }
            SubmitOutcome::Conflict => {
                SubmitResolution::stay_open(Notice::error("Student already registered"))
            }
            SubmitOutcome::Failed(reason) => {
                debug!(%reason, "student submission failed");
                let verb = if self.is_editing() { "update" } else { "register" };
                SubmitResolution::stay_open(Notice::error(format!("Failed to {verb} student")))
            }
        }
    }

    fn target(&self) -> SubmitTarget {
        match &self.editing {
            Some(id) => SubmitTarget::Update(id.clone()),
            None => SubmitTarget::Create,
        }
    }

    fn payload(&self) -> StudentPayload {
        let student = &self.student;
        let guardian = &self.guardian;
        StudentPayload {
            roll_no: student.roll_no.trim().to_string(),
            first_name: student.first_name.trim().to_string(),
            last_name: student.last_name.trim().to_string(),
            class_name: student.class_name.clone(),
            section: student.section.clone(),
            gender: student.gender,
            dob: student.dob.trim().to_string(),
            email: student.email.trim().to_string(),
            phone: student.phone.trim().to_string(),
            address: student.address.trim().to_string(),
            enroll_date: student.enroll_date.trim().to_string(),
            expected_graduation: student.expected_graduation.trim().to_string(),
            guardian_name: guardian.name.trim().to_string(),
            guardian_email: guardian.email.trim().to_string(),
            guardian_phone: guardian.phone.trim().to_string(),
            guardian_relation: guardian.relation.trim().to_string(),
            guardian_profession: guardian.profession.trim().to_string(),
            honor_roll: student.honor_roll,
            athletics: student.athletics,
            club_membership: student.club_membership,
            lunch_preference: non_empty(&student.lunch_preference),
            nationality: non_empty(&student.nationality),
            transcripts: student.transcripts.clone(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
