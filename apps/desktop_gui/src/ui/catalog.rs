//! Teachers, departments and courses.

use client_core::{activity::ActivityKind, DeleteFlow, ListController};
use eframe::egui;
use forms::{CourseForm, DepartmentForm, FieldErrors};
use shared::domain::{Course, Department, Teacher};

use crate::backend_bridge::commands::{BackendCommand, DeleteTarget, FetchRequest, TeacherFilter};
use crate::ui::widgets::{
    choice, delete_dialog, field_error, filter_choice, list_state, text_field, PageCtx,
};

pub struct TeachersPage {
    pub list: ListController<TeacherFilter, Teacher>,
    pub delete: DeleteFlow<DeleteTarget>,
}

impl Default for TeachersPage {
    fn default() -> Self {
        Self {
            list: ListController::new(TeacherFilter::default()),
            delete: DeleteFlow::new("Teacher"),
        }
    }
}

impl TeachersPage {
    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &mut PageCtx<'_>) {
        ui.heading("Manage Teachers");
        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Search");
            let mut search = self.list.search_text().to_string();
            if ui
                .add(egui::TextEdit::singleline(&mut search).hint_text("Email"))
                .changed()
            {
                self.list.on_search_input(search, ctx.now);
            }
            ui.label("Department");
            let reference = ctx.reference;
            let departments: Vec<&str> = reference
                .departments
                .iter()
                .map(|dept| dept.department_name.as_str())
                .collect();
            let current = self.list.filter().department.clone();
            if let Some(department) = filter_choice(
                ui,
                "teacher_department_filter",
                current.as_deref(),
                "All departments",
                &departments,
            ) {
                if let Some(ticket) = self.list.set_filter(TeacherFilter { department }) {
                    ctx.fetch(&mut self.list, ticket, FetchRequest::Teachers);
                }
            }
        });
        ui.add_space(6.0);

        if !list_state(ui, &self.list, "No teachers found") {
            return;
        }
        let mut remove = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("teachers_table")
                .striped(true)
                .num_columns(5)
                .show(ui, |ui| {
                    for header in ["Name", "Email", "Phone", "Department", ""] {
                        ui.strong(header);
                    }
                    ui.end_row();
                    for teacher in self.list.rows() {
                        ui.label(teacher.full_name());
                        ui.label(&teacher.email);
                        ui.label(&teacher.phone);
                        ui.label(&teacher.department);
                        if ui.small_button("Delete").clicked() {
                            remove = Some(DeleteTarget::Teacher {
                                id: teacher.id.clone(),
                                name: teacher.full_name(),
                            });
                        }
                        ui.end_row();
                    }
                });
        });
        if let Some(target) = remove {
            self.delete.request(target);
        }
    }

    pub fn show_windows(&mut self, egui_ctx: &egui::Context, ctx: &mut PageCtx<'_>) {
        delete_dialog(&mut self.delete, "Teacher", egui_ctx, ctx);
    }

    pub fn on_deleted(&mut self, result: Result<(), String>, ctx: &mut PageCtx<'_>) {
        if let Some(resolution) = self.delete.finish(result) {
            ctx.settle(resolution, &mut self.list, FetchRequest::Teachers);
        }
    }
}

pub struct DepartmentsPage {
    pub list: ListController<(), Department>,
    form: Option<(DepartmentForm, bool)>,
    pub delete: DeleteFlow<DeleteTarget>,
}

impl Default for DepartmentsPage {
    fn default() -> Self {
        Self {
            list: ListController::new(()),
            form: None,
            delete: DeleteFlow::new("Department"),
        }
    }
}

impl DepartmentsPage {
    pub fn show(&mut self, ui: &mut egui::Ui, _ctx: &mut PageCtx<'_>) {
        ui.horizontal(|ui| {
            ui.heading("Departments");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Add Department").clicked() && self.form.is_none() {
                    self.form = Some((DepartmentForm::default(), false));
                }
            });
        });
        ui.separator();
        if !list_state(ui, &self.list, "No departments found") {
            return;
        }
        let mut remove = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("departments_table")
                .striped(true)
                .num_columns(2)
                .show(ui, |ui| {
                    ui.strong("Department");
                    ui.strong("");
                    ui.end_row();
                    for department in self.list.rows() {
                        ui.label(&department.department_name);
                        if ui.small_button("Delete").clicked() {
                            remove = Some(DeleteTarget::Department {
                                id: department.id.clone(),
                                name: department.department_name.clone(),
                            });
                        }
                        ui.end_row();
                    }
                });
        });
        if let Some(target) = remove {
            self.delete.request(target);
        }
    }

    pub fn show_windows(&mut self, egui_ctx: &egui::Context, ctx: &mut PageCtx<'_>) {
        delete_dialog(&mut self.delete, "Department", egui_ctx, ctx);

        let Some((form, saving)) = self.form.as_mut() else {
            return;
        };
        let mut open = true;
        let mut submit = false;
        egui::Window::new("Add Department")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(egui_ctx, |ui| {
                ui.label("Department name");
                if let Some(name) = text_field(ui, &form.name, !*saving, "e.g. Mathematics") {
                    form.name = name;
                }
                ui.add_space(8.0);
                let label = if *saving { "Adding..." } else { "Add Department" };
                submit = ui.add_enabled(!*saving, egui::Button::new(label)).clicked();
            });
        if !open && !*saving {
            self.form = None;
            return;
        }
        if !submit {
            return;
        }
        match form.build() {
            Ok(body) => {
                if ctx.send(BackendCommand::CreateDepartment(body)) {
                    *saving = true;
                }
            }
            Err(notice) => ctx.notify(notice),
        }
    }

    pub fn on_created(&mut self, result: Result<(), String>, ctx: &mut PageCtx<'_>) {
        let Some((form, saving)) = self.form.as_mut() else {
            return;
        };
        *saving = false;
        let name = form.name.trim().to_string();
        let resolution = form.finish(result);
        if resolution.refresh {
            ctx.record(ActivityKind::DepartmentAdded, &[("department", name.as_str())]);
        }
        if ctx.settle(resolution, &mut self.list, FetchRequest::Departments) {
            self.form = None;
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
            ctx.record(ActivityKind::DepartmentDeleted, &[("department", target.label())]);
        }
        ctx.settle(resolution, &mut self.list, FetchRequest::Departments);
    }
}

struct CourseWindow {
    form: CourseForm,
    /// Filled on the first submit attempt, then kept current while typing.
    errors: Option<FieldErrors>,
    saving: bool,
}

pub struct CoursesPage {
    pub list: ListController<(), Course>,
    form: Option<CourseWindow>,
    pub delete: DeleteFlow<DeleteTarget>,
}

impl Default for CoursesPage {
    fn default() -> Self {
        Self {
            list: ListController::new(()),
            form: None,
            delete: DeleteFlow::new("Course"),
        }
    }
}

impl CoursesPage {
    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &mut PageCtx<'_>) {
        ui.horizontal(|ui| {
            ui.heading("Courses");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Add Course").clicked() && self.form.is_none() {
                    self.form = Some(CourseWindow {
                        form: CourseForm::default(),
                        errors: None,
                        saving: false,
                    });
                }
            });
        });
        ui.separator();
        if !list_state(ui, &self.list, "No courses found") {
            return;
        }
        let reference = ctx.reference;
        let departments = &reference.departments;
        let mut remove = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("courses_table")
                .striped(true)
                .num_columns(6)
                .show(ui, |ui| {
                    for header in ["Code", "Name", "Department", "Prerequisites", "Created", ""] {
                        ui.strong(header);
                    }
                    ui.end_row();
                    for course in self.list.rows() {
                        ui.monospace(&course.course_code);
                        ui.label(&course.course_name).on_hover_text(&course.description);
                        ui.label(course.department_name(departments));
                        ui.label(&course.prerequisites);
                        ui.label(
                            course
                                .created_at
                                .map(|at| at.format("%Y-%m-%d").to_string())
                                .unwrap_or_default(),
                        );
                        if ui.small_button("Delete").clicked() {
                            remove = Some(DeleteTarget::Course {
                                id: course.id.clone(),
                                name: course.course_name.clone(),
                            });
                        }
                        ui.end_row();
                    }
                });
        });
        if let Some(target) = remove {
            self.delete.request(target);
        }
    }

    pub fn show_windows(&mut self, egui_ctx: &egui::Context, ctx: &mut PageCtx<'_>) {
        delete_dialog(&mut self.delete, "Course", egui_ctx, ctx);

        let Some(window) = self.form.as_mut() else {
            return;
        };
        let reference = ctx.reference;
        let departments = &reference.departments;
        let mut open = true;
        let mut submit = false;
        egui::Window::new("Add Course")
            .collapsible(false)
            .default_width(420.0)
            .open(&mut open)
            .show(egui_ctx, |ui| {
                let enabled = !window.saving;
                let mut changed = false;
                egui::Grid::new("course_form")
                    .num_columns(2)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        let errors = window.errors.as_ref();
                        let form = &mut window.form;

                        ui.label("Course name");
                        ui.vertical(|ui| {
                            if let Some(value) = text_field(ui, &form.course_name, enabled, "") {
                                form.course_name = value;
                                changed = true;
                            }
                            field_error(ui, errors.and_then(|e| e.get("courseName")));
                        });
                        ui.end_row();

                        ui.label("Course code");
                        ui.vertical(|ui| {
                            if let Some(value) =
                                text_field(ui, &form.course_code, enabled, "e.g. MATH101")
                            {
                                form.course_code = value;
                                changed = true;
                            }
                            field_error(ui, errors.and_then(|e| e.get("courseCode")));
                        });
                        ui.end_row();

                        ui.label("Department");
                        ui.vertical(|ui| {
                            let options = departments
                                .iter()
                                .map(|dept| (dept.id.as_str(), dept.department_name.as_str()));
                            if let Some(value) = choice(
                                ui,
                                "course_department",
                                &form.department_id,
                                "Select department",
                                options,
                            ) {
                                form.department_id = value;
                                changed = true;
                            }
                            field_error(ui, errors.and_then(|e| e.get("departmentId")));
                        });
                        ui.end_row();

                        ui.label("Prerequisites");
                        if let Some(value) =
                            text_field(ui, &form.prerequisites, enabled, "Optional")
                        {
                            form.prerequisites = value;
                        }
                        ui.end_row();

                        ui.label("Description");
                        ui.vertical(|ui| {
                            let mut description = form.description.clone();
                            let response = ui.add_enabled(
                                enabled,
                                egui::TextEdit::multiline(&mut description)
                                    .desired_rows(3)
                                    .desired_width(240.0),
                            );
                            if response.changed() {
                                form.description = description;
                                changed = true;
                            }
                            field_error(ui, errors.and_then(|e| e.get("description")));
                        });
                        ui.end_row();
                    });
                if changed && window.errors.is_some() {
                    window.errors = Some(window.form.errors());
                }
                ui.add_space(8.0);
                let label = if window.saving { "Adding..." } else { "Add Course" };
                submit = ui.add_enabled(enabled, egui::Button::new(label)).clicked();
            });

        if !open && !window.saving {
            self.form = None;
            return;
        }
        if !submit {
            return;
        }
        window.errors = Some(window.form.errors());
        match window.form.build() {
            Ok(body) => {
                if ctx.send(BackendCommand::CreateCourse(body)) {
                    window.saving = true;
                }
            }
            Err(notice) => ctx.notify(notice),
        }
    }

    pub fn on_created(&mut self, result: Result<(), String>, ctx: &mut PageCtx<'_>) {
        let Some(window) = self.form.as_mut() else {
            return;
        };
        window.saving = false;
        let name = window.form.course_name.trim().to_string();
        let resolution = window.form.finish(result);
        if resolution.refresh {
            ctx.record(ActivityKind::CourseAdded, &[("course", name.as_str())]);
        }
        if ctx.settle(resolution, &mut self.list, FetchRequest::Courses) {
            self.form = None;
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
            ctx.record(ActivityKind::CourseDeleted, &[("course", target.label())]);
        }
        ctx.settle(resolution, &mut self.list, FetchRequest::Courses);
    }
}
