//! Manage-students page: paged list, Student/Guardian wizard, Excel import.

use chrono::Datelike;
use client_core::{
    activity::ActivityKind,
    notice::Notice,
    DeleteFlow, ListController,
};
use eframe::egui;
use forms::{
    student_wizard::{graduation_year_options, CLASS_OPTIONS, SECTION_OPTIONS},
    single_step::IMPORT_EXTENSIONS,
    GuardianField, ImportForm, StudentField, StudentWizard, SubmitOutcome, Transition,
    WizardAction, WizardError, WizardStep,
};
use shared::domain::{Gender, Student};
use tracing::debug;

use crate::backend_bridge::commands::{BackendCommand, DeleteTarget, FetchRequest, StudentFilter};
use crate::ui::widgets::{
    choice, delete_dialog, field_error, filter_choice, list_state, pagination_bar, text_field,
    PageCtx, PageNav,
};

pub struct StudentsPage {
    pub list: ListController<StudentFilter, Student>,
    wizard: Option<StudentWizard>,
    /// Name and activity kind of the submission in flight.
    submitting: Option<(ActivityKind, String)>,
    import: Option<ImportWindow>,
    pub delete: DeleteFlow<DeleteTarget>,
}

#[derive(Default)]
struct ImportWindow {
    form: ImportForm,
    uploading: bool,
}

impl Default for StudentsPage {
    fn default() -> Self {
        Self {
            list: ListController::new(StudentFilter::default()),
            wizard: None,
            submitting: None,
            import: None,
            delete: DeleteFlow::new("Student"),
        }
    }
}

impl StudentsPage {
    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &mut PageCtx<'_>) {
        ui.horizontal(|ui| {
            ui.heading("Manage Students");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Import Excel").clicked() && self.import.is_none() {
                    self.import = Some(ImportWindow::default());
                }
                if ui.button("Add Student").clicked() && self.wizard.is_none() {
                    self.wizard = Some(StudentWizard::new());
                }
            });
        });
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Search");
            let mut search = self.list.search_text().to_string();
            let response = ui.add(
                egui::TextEdit::singleline(&mut search)
                    .hint_text("Student ID")
                    .desired_width(220.0),
            );
            if response.changed() {
                self.list.on_search_input(search, ctx.now);
            }
            ui.label("Class");
            let current = self.list.filter().class_name.clone();
            if let Some(class_name) = filter_choice(
                ui,
                "student_class_filter",
                current.as_deref(),
                "All classes",
                &CLASS_OPTIONS,
            ) {
                if let Some(ticket) = self.list.set_filter(StudentFilter { class_name }) {
                    ctx.fetch(&mut self.list, ticket, FetchRequest::Students);
                }
            }
        });
        ui.add_space(6.0);

        if list_state(ui, &self.list, "No students found") {
            self.show_table(ui);
        }
        ui.add_space(6.0);
        let nav = pagination_bar(ui, self.list.pagination(), "students");
        let ticket = match nav {
            Some(PageNav::Prev) => self.list.prev_page(),
            Some(PageNav::Next) => self.list.next_page(),
            None => None,
        };
        if let Some(ticket) = ticket {
            ctx.fetch(&mut self.list, ticket, FetchRequest::Students);
        }
    }

    fn show_table(&mut self, ui: &mut egui::Ui) {
        let mut edit = None;
        let mut remove = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .max_height(ui.available_height() - 40.0)
            .show(ui, |ui| {
                egui::Grid::new("students_table")
                    .striped(true)
                    .num_columns(7)
                    .show(ui, |ui| {
                        let headers =
                            ["Roll No", "Name", "Class", "Email", "Phone", "Password", ""];
                        for header in headers {
                            ui.strong(header);
                        }
                        ui.end_row();
                        for student in self.list.rows() {
                            ui.label(&student.roll_no);
                            ui.label(student.full_name());
                            ui.label(format!("{}{}", student.class_name, student.section));
                            ui.label(&student.email);
                            ui.label(&student.phone);
                            ui.monospace(student.masked_password().unwrap_or_default());
                            ui.horizontal(|ui| {
                                if ui.small_button("Edit").clicked() {
                                    edit = Some(student.clone());
                                }
                                if ui.small_button("Delete").clicked() {
                                    remove = Some(DeleteTarget::Student {
                                        id: student.id.clone(),
                                        name: student.full_name(),
                                    });
                                }
                            });
                            ui.end_row();
                        }
                    });
            });
        if let Some(student) = edit {
            if self.wizard.is_none() {
                self.wizard = Some(StudentWizard::edit(&student));
            }
        }
        if let Some(target) = remove {
            self.delete.request(target);
        }
    }

    pub fn show_windows(&mut self, egui_ctx: &egui::Context, ctx: &mut PageCtx<'_>) {
        self.show_wizard(egui_ctx, ctx);
        self.show_import(egui_ctx, ctx);
        delete_dialog(&mut self.delete, "Student", egui_ctx, ctx);
    }

    fn show_wizard(&mut self, egui_ctx: &egui::Context, ctx: &mut PageCtx<'_>) {
        let Some(wizard) = self.wizard.as_mut() else {
            return;
        };
        let title = if wizard.is_editing() {
            "Edit Student"
        } else {
            "Add Student"
        };
        let current_year = chrono::Local::now().year();
        let mut open = true;
        let mut action = None;
        egui::Window::new(title)
            .id(egui::Id::new("student_wizard"))
            .collapsible(false)
            .default_width(560.0)
            .open(&mut open)
            .show(egui_ctx, |ui| {
                ui.horizontal(|ui| {
                    let on_student = wizard.step() == WizardStep::Student;
                    ui.label(step_label("1. Student details", on_student));
                    ui.label(">");
                    ui.label(step_label("2. Guardian details", !on_student));
                });
                ui.separator();
                action = match wizard.step() {
                    WizardStep::Student => student_step(ui, wizard, current_year),
                    WizardStep::Guardian => guardian_step(ui, wizard),
                };
            });

        if !open && !wizard.is_submitting() {
            self.wizard = None;
            return;
        }
        let Some(action) = action else {
            return;
        };
        match wizard.apply(action) {
            Ok(Transition::Moved(step)) => debug!(?step, "wizard moved"),
            Ok(Transition::Submit(submission)) => {
                let (kind, verb) = if wizard.is_editing() {
                    (ActivityKind::StudentUpdated, "update")
                } else {
                    (ActivityKind::StudentAdded, "register")
                };
                let name = format!(
                    "{} {}",
                    submission.payload.first_name, submission.payload.last_name
                );
                debug!(%name, verb, "submitting student");
                if ctx.send(BackendCommand::SubmitStudent(submission)) {
                    self.submitting = Some((kind, name));
                } else {
                    let resolution =
                        wizard.finish_submit(SubmitOutcome::Failed(ctx.status.clone()));
                    ctx.notify(resolution.notice);
                }
            }
            Err(err @ (WizardError::StudentInvalid(_) | WizardError::GuardianInvalid(_))) => {
                let errors = match err {
                    WizardError::StudentInvalid(_) => wizard.student_errors(),
                    _ => wizard.guardian_errors(),
                };
                let message = errors
                    .first_message()
                    .unwrap_or("Please correct the highlighted fields");
                ctx.notify(Notice::error(message));
            }
            Err(err) => debug!(%err, "wizard action ignored"),
        }
    }

    pub fn on_student_submitted(&mut self, outcome: SubmitOutcome, ctx: &mut PageCtx<'_>) {
        let Some(wizard) = self.wizard.as_mut() else {
            return;
        };
        let saved = outcome == SubmitOutcome::Saved;
        let resolution = wizard.finish_submit(outcome);
        let pending = self.submitting.take();
        if saved {
            if let Some((kind, name)) = pending {
                ctx.record(kind, &[("name", name.as_str())]);
            }
        }
        if ctx.settle(resolution, &mut self.list, FetchRequest::Students) {
            self.wizard = None;
        }
    }

    fn show_import(&mut self, egui_ctx: &egui::Context, ctx: &mut PageCtx<'_>) {
        let Some(import) = self.import.as_mut() else {
            return;
        };
        let mut open = true;
        let mut upload = false;
        egui::Window::new("Import Students")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(egui_ctx, |ui| {
                ui.label("Upload an Excel sheet (.xlsx or .xls) with one student per row.");
                ui.horizontal(|ui| {
                    if ui.button("Choose file...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Excel", &IMPORT_EXTENSIONS)
                            .pick_file()
                        {
                            import.form.file = Some(path);
                        }
                    }
                    match &import.form.file {
                        Some(path) => ui.monospace(path.display().to_string()),
                        None => ui.weak("No file selected"),
                    };
                });
                ui.add_space(8.0);
                let label = if import.uploading { "Uploading..." } else { "Upload" };
                upload = ui
                    .add_enabled(!import.uploading, egui::Button::new(label))
                    .clicked();
            });

        if !open && !import.uploading {
            self.import = None;
            return;
        }
        if !upload {
            return;
        }
        match import.form.selected() {
            Ok(path) => {
                let path = path.to_path_buf();
                if ctx.send(BackendCommand::ImportStudents { path }) {
                    import.uploading = true;
                }
            }
            Err(notice) => ctx.notify(notice),
        }
    }

    pub fn on_students_imported(
        &mut self,
        result: Result<shared::protocol::MessageResponse, String>,
        ctx: &mut PageCtx<'_>,
    ) {
        let Some(import) = self.import.as_mut() else {
            return;
        };
        import.uploading = false;
        let file = import
            .form
            .file
            .as_deref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let resolution = import.form.finish(result);
        if resolution.refresh {
            ctx.record(ActivityKind::StudentsImported, &[("file", file.as_str())]);
        }
        if ctx.settle(resolution, &mut self.list, FetchRequest::Students) {
            self.import = None;
        }
    }

    pub fn on_deleted(
        &mut self,
        target: &DeleteTarget,
        result: Result<(), String>,
        ctx: &mut PageCtx<'_>,
    ) {
        let succeeded = result.is_ok();
        let Some(resolution) = self.delete.finish(result) else {
            return;
        };
        if succeeded {
            ctx.record(ActivityKind::StudentDeleted, &[("name", target.label())]);
        }
        ctx.settle(resolution, &mut self.list, FetchRequest::Students);
    }
}

fn step_label(text: &str, active: bool) -> egui::RichText {
    let text = egui::RichText::new(text);
    if active {
        text.strong()
    } else {
        text.weak()
    }
}

fn student_step(
    ui: &mut egui::Ui,
    wizard: &mut StudentWizard,
    current_year: i32,
) -> Option<WizardAction> {
    let years = graduation_year_options(current_year);
    egui::Grid::new("student_step_fields")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for field in StudentField::ALL {
                ui.label(field.label());
                ui.vertical(|ui| {
                    let value = wizard.student().get(field).to_string();
                    let edited = match field {
                        StudentField::ClassName => choice(
                            ui,
                            "wizard_class",
                            &value,
                            "Select class",
                            CLASS_OPTIONS.iter().map(|class| (*class, *class)),
                        ),
                        StudentField::Section => choice(
                            ui,
                            "wizard_section",
                            &value,
                            "Select section",
                            SECTION_OPTIONS.iter().map(|section| (*section, *section)),
                        ),
                        StudentField::ExpectedGraduation => choice(
                            ui,
                            "wizard_graduation",
                            &value,
                            "Select year",
                            years.iter().map(|year| (year.as_str(), year.as_str())),
                        ),
                        StudentField::Dob | StudentField::EnrollDate => {
                            text_field(ui, &value, true, "YYYY-MM-DD")
                        }
                        _ => text_field(ui, &value, !wizard.is_locked(field), ""),
                    };
                    if let Some(edited) = edited {
                        wizard.set_student_field(field, edited);
                    }
                    field_error(ui, wizard.student_errors().get(field.key()));
                });
                ui.end_row();
            }

            let extras = wizard.extras_mut();
            ui.label("Gender");
            ui.horizontal(|ui| {
                for gender in Gender::ALL {
                    ui.radio_value(extras.gender, gender, gender.label());
                }
            });
            ui.end_row();
            ui.label("Activities");
            ui.horizontal(|ui| {
                ui.checkbox(extras.honor_roll, "Honor roll");
                ui.checkbox(extras.athletics, "Athletics");
                ui.checkbox(extras.club_membership, "Club membership");
            });
            ui.end_row();
            ui.label("Lunch preference");
            ui.text_edit_singleline(extras.lunch_preference);
            ui.end_row();
            ui.label("Nationality");
            ui.text_edit_singleline(extras.nationality);
            ui.end_row();
            ui.label("Photo");
            ui.horizontal(|ui| {
                if ui.button("Choose...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Images", &["png", "jpg", "jpeg"])
                        .pick_file()
                    {
                        *extras.photo = Some(path);
                    }
                }
                if let Some(path) = extras.photo.as_ref() {
                    ui.weak(path.display().to_string());
                }
            });
            ui.end_row();
        });

    ui.add_space(8.0);
    let mut action = None;
    ui.horizontal(|ui| {
        if ui.button("Continue").clicked() {
            action = Some(WizardAction::Continue);
        }
    });
    action
}

fn guardian_step(ui: &mut egui::Ui, wizard: &mut StudentWizard) -> Option<WizardAction> {
    egui::Grid::new("guardian_step_fields")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for field in GuardianField::ALL {
                ui.label(field.label());
                ui.vertical(|ui| {
                    let value = wizard.guardian().get(field).to_string();
                    if let Some(edited) = text_field(ui, &value, !wizard.is_submitting(), "") {
                        wizard.set_guardian_field(field, edited);
                    }
                    field_error(ui, wizard.guardian_errors().get(field.key()));
                });
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    let mut action = None;
    let submitting = wizard.is_submitting();
    ui.horizontal(|ui| {
        if ui.add_enabled(!submitting, egui::Button::new("Back")).clicked() {
            action = Some(WizardAction::Back);
        }
        let label = match (submitting, wizard.is_editing()) {
            (true, _) => "Saving...",
            (false, true) => "Update Student",
            (false, false) => "Register Student",
        };
        if ui.add_enabled(!submitting, egui::Button::new(label)).clicked() {
            action = Some(WizardAction::Submit);
        }
    });
    action
}
