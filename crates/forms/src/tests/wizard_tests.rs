use shared::domain::{Gender, Student, StudentRecordId};

use crate::{
    notice::NoticeLevel,
    schema::FieldFormat,
    student_wizard::{
        graduation_year_options, GuardianField, StudentField, StudentWizard, SubmitOutcome,
        SubmitTarget, Transition, WizardAction, WizardError, WizardStep,
    },
};

fn fill_student(wizard: &mut StudentWizard) {
    for (field, value) in [
        (StudentField::RollNo, "S-100"),
        (StudentField::FirstName, "Sam"),
        (StudentField::LastName, "Rivera"),
        (StudentField::ClassName, "10"),
        (StudentField::Section, "A"),
        (StudentField::Dob, "2008-04-01"),
        (StudentField::Email, "sam@example.com"),
        (StudentField::Phone, "5551234567"),
        (StudentField::Address, "12 Elm St"),
        (StudentField::ExpectedGraduation, "2027"),
    ] {
        assert!(wizard.set_student_field(field, value));
    }
}

fn fill_guardian(wizard: &mut StudentWizard) {
    wizard.set_guardian_field(GuardianField::Name, "Pat Rivera");
    wizard.set_guardian_field(GuardianField::Email, "pat@example.com");
    wizard.set_guardian_field(GuardianField::Phone, "5559876543");
}

#[test]
fn starts_on_student_step_and_rejects_early_submit() {
    let mut wizard = StudentWizard::new();
    assert_eq!(wizard.step(), WizardStep::Student);
    assert_eq!(wizard.student().gender, Gender::Male);

    let err = wizard.apply(WizardAction::Submit).expect_err("submit from step one");
    assert_eq!(
        err,
        WizardError::InvalidTransition {
            step: WizardStep::Student,
            action: WizardAction::Submit,
        }
    );
    assert!(wizard.apply(WizardAction::Back).is_err());
    assert_eq!(wizard.step(), WizardStep::Student);
    assert!(!wizard.is_submitting());
}

#[test]
fn continue_is_blocked_until_student_fields_are_valid() {
    let mut wizard = StudentWizard::new();
    let err = wizard.apply(WizardAction::Continue).expect_err("empty form");
    assert!(matches!(err, WizardError::StudentInvalid(count) if count > 0));
    assert_eq!(wizard.step(), WizardStep::Student);
    assert_eq!(
        wizard.student_errors().get("rollNo"),
        Some("Roll number is required")
    );
    assert!(wizard.student_errors().get("enrollDate").is_none());

    fill_student(&mut wizard);
    wizard.set_student_field(StudentField::Phone, "555123");
    wizard.set_student_field(StudentField::Email, "not-an-email");
    assert!(wizard.apply(WizardAction::Continue).is_err());
    assert_eq!(
        wizard.student_errors().get("phone"),
        Some("Phone number must be 10 digits")
    );
    assert_eq!(
        wizard.student_errors().get("email"),
        Some("Invalid email address")
    );

    wizard.set_student_field(StudentField::Email, "sam@example.com");
    assert!(wizard.student_errors().get("email").is_none());
    wizard.set_student_field(StudentField::Phone, "5551234567");

    let moved = wizard.apply(WizardAction::Continue).expect("valid student step");
    assert_eq!(moved, Transition::Moved(WizardStep::Guardian));
}

#[test]
fn each_required_student_field_blocks_continue() {
    for field in StudentField::ALL {
        let mut wizard = StudentWizard::new();
        fill_student(&mut wizard);
        wizard.set_student_field(field, "   ");

        let result = wizard.apply(WizardAction::Continue);
        if field == StudentField::EnrollDate {
            assert!(result.is_ok(), "enroll date is optional");
            continue;
        }
        assert_eq!(
            result,
            Err(WizardError::StudentInvalid(1)),
            "blank {}",
            field.key()
        );
        assert_eq!(wizard.step(), WizardStep::Student);
        let expected = format!("{} is required", field.label());
        assert_eq!(
            wizard.student_errors().get(field.key()),
            Some(expected.as_str())
        );
        assert_eq!(
            wizard.student_errors().first_message(),
            Some(expected.as_str())
        );
    }
}

#[test]
fn each_required_guardian_field_blocks_submit() {
    for field in GuardianField::ALL {
        let mut wizard = StudentWizard::new();
        fill_student(&mut wizard);
        wizard.apply(WizardAction::Continue).expect("continue");
        fill_guardian(&mut wizard);
        wizard.set_guardian_field(field, "");

        let result = wizard.begin_submit();
        if matches!(field, GuardianField::Relation | GuardianField::Profession) {
            assert!(result.is_ok(), "{} is optional", field.key());
            continue;
        }
        assert_eq!(
            result,
            Err(WizardError::GuardianInvalid(1)),
            "blank {}",
            field.key()
        );
        assert!(!wizard.is_submitting());
        let expected = format!("{} is required", field.label());
        assert_eq!(
            wizard.guardian_errors().get(field.key()),
            Some(expected.as_str())
        );
    }
}

#[test]
fn phone_numbers_must_be_exactly_ten_digits() {
    for phone in ["12345678901", "12345", "555-123-456"] {
        assert!(FieldFormat::Phone10.check(phone).is_err(), "{phone}");

        let mut wizard = StudentWizard::new();
        fill_student(&mut wizard);
        wizard.set_student_field(StudentField::Phone, phone);
        assert_eq!(
            wizard.apply(WizardAction::Continue),
            Err(WizardError::StudentInvalid(1))
        );
        assert_eq!(
            wizard.student_errors().get("phone"),
            Some("Phone number must be 10 digits")
        );

        wizard.set_student_field(StudentField::Phone, "5551234567");
        wizard.apply(WizardAction::Continue).expect("continue");
        fill_guardian(&mut wizard);
        wizard.set_guardian_field(GuardianField::Phone, phone);
        assert_eq!(wizard.begin_submit(), Err(WizardError::GuardianInvalid(1)));
        assert_eq!(
            wizard.guardian_errors().get("guardianPhone"),
            Some("Phone number must be 10 digits")
        );
    }
    assert!(FieldFormat::Phone10.check("0123456789").is_ok());
}

#[test]
fn guardian_email_format_is_checked() {
    let mut wizard = StudentWizard::new();
    fill_student(&mut wizard);
    wizard.apply(WizardAction::Continue).expect("continue");
    fill_guardian(&mut wizard);

    wizard.set_guardian_field(GuardianField::Email, "not-an-email");
    assert_eq!(wizard.begin_submit(), Err(WizardError::GuardianInvalid(1)));
    assert_eq!(
        wizard.guardian_errors().get("guardianEmail"),
        Some("Invalid email address")
    );

    wizard.set_guardian_field(GuardianField::Email, "a@b.com");
    assert!(wizard.guardian_errors().get("guardianEmail").is_none());
    let submission = wizard.begin_submit().expect("valid guardian email");
    assert_eq!(submission.payload.guardian_email, "a@b.com");
}

#[test]
fn back_returns_to_student_step_without_validation() {
    let mut wizard = StudentWizard::new();
    fill_student(&mut wizard);
    wizard.apply(WizardAction::Continue).expect("continue");

    wizard.set_guardian_field(GuardianField::Email, "bad");
    let moved = wizard.apply(WizardAction::Back).expect("back");
    assert_eq!(moved, Transition::Moved(WizardStep::Student));
    assert_eq!(wizard.guardian().email, "bad");
    assert!(wizard.apply(WizardAction::Back).is_err());
}

#[test]
fn guardian_step_validates_before_submission() {
    let mut wizard = StudentWizard::new();
    fill_student(&mut wizard);
    wizard.apply(WizardAction::Continue).expect("continue");

    let err = wizard.begin_submit().expect_err("empty guardian");
    assert!(matches!(err, WizardError::GuardianInvalid(3)));
    assert_eq!(
        wizard.guardian_errors().get("guardianName"),
        Some("Guardian name is required")
    );
    assert!(!wizard.is_submitting());
}

#[test]
fn submission_builds_flat_payload_and_guards_double_submit() {
    let mut wizard = StudentWizard::new();
    fill_student(&mut wizard);
    *wizard.extras_mut().honor_roll = true;
    wizard.extras_mut().nationality.push_str("Canadian");
    wizard.apply(WizardAction::Continue).expect("continue");
    fill_guardian(&mut wizard);

    let submission = wizard.begin_submit().expect("valid submission");
    assert_eq!(submission.target, SubmitTarget::Create);
    assert_eq!(submission.payload.roll_no, "S-100");
    assert_eq!(submission.payload.class_name, "10");
    assert_eq!(submission.payload.guardian_name, "Pat Rivera");
    assert_eq!(submission.payload.guardian_phone, "5559876543");
    assert!(submission.payload.honor_roll);
    assert_eq!(submission.payload.nationality.as_deref(), Some("Canadian"));
    assert_eq!(submission.payload.lunch_preference, None);
    assert!(wizard.is_submitting());

    assert_eq!(wizard.begin_submit(), Err(WizardError::SubmitInFlight));

    let resolution = wizard.finish_submit(SubmitOutcome::Saved);
    assert!(!wizard.is_submitting());
    assert!(resolution.close);
    assert!(resolution.refresh);
    assert_eq!(resolution.notice.level, NoticeLevel::Success);
    assert_eq!(resolution.notice.message, "Student registered successfully");
}

#[test]
fn conflict_and_failure_keep_the_wizard_open() {
    let mut wizard = StudentWizard::new();
    fill_student(&mut wizard);
    wizard.apply(WizardAction::Continue).expect("continue");
    fill_guardian(&mut wizard);

    wizard.begin_submit().expect("first attempt");
    let conflict = wizard.finish_submit(SubmitOutcome::Conflict);
    assert!(!conflict.close);
    assert_eq!(conflict.notice.message, "Student already registered");

    wizard.begin_submit().expect("retry allowed after settle");
    let failure = wizard.finish_submit(SubmitOutcome::Failed("connection reset".into()));
    assert!(!failure.close);
    assert!(failure.notice.is_error());
    assert_eq!(wizard.step(), WizardStep::Guardian);
}

#[test]
fn edit_mode_prefills_and_locks_identity_fields() {
    let record = Student {
        id: StudentRecordId("65f0".into()),
        roll_no: "S-7".into(),
        first_name: "Ana".into(),
        last_name: "Diaz".into(),
        class_name: "11".into(),
        section: "B".into(),
        gender: Gender::Female,
        dob: "2007-09-12T00:00:00.000Z".into(),
        email: "ana@example.com".into(),
        phone: "5550001111".into(),
        address: "4 Oak Ave".into(),
        expected_graduation: "2026".into(),
        guardian_name: "Luis Diaz".into(),
        guardian_email: "luis@example.com".into(),
        guardian_phone: "5550002222".into(),
        guardian_relation: "Father".into(),
        ..Student::default()
    };

    let mut wizard = StudentWizard::edit(&record);
    assert!(wizard.is_editing());
    assert_eq!(wizard.student().dob, "2007-09-12");
    assert_eq!(wizard.guardian().relation, "Father");
    assert!(wizard.is_locked(StudentField::RollNo));
    assert!(wizard.is_locked(StudentField::Email));
    assert!(!wizard.is_locked(StudentField::Phone));

    assert!(!wizard.set_student_field(StudentField::Email, "other@example.com"));
    assert_eq!(wizard.student().email, "ana@example.com");
    assert!(wizard.set_student_field(StudentField::Address, "9 Pine Rd"));

    wizard.apply(WizardAction::Continue).expect("prefilled record is valid");
    let submission = wizard.begin_submit().expect("submit edit");
    assert_eq!(
        submission.target,
        SubmitTarget::Update(StudentRecordId("65f0".into()))
    );
    assert_eq!(submission.payload.address, "9 Pine Rd");
    assert_eq!(submission.payload.guardian_relation, "Father");

    let resolution = wizard.finish_submit(SubmitOutcome::Saved);
    assert_eq!(resolution.notice.message, "Student updated successfully");
}

#[test]
fn graduation_options_cover_fifteen_years_ahead() {
    let years = graduation_year_options(2026);
    assert_eq!(years.first().map(String::as_str), Some("2026"));
    assert_eq!(years.last().map(String::as_str), Some("2041"));
}
