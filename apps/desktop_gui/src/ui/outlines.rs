//! Course outlines (viewed per teacher) and the activity feed.

use client_core::{
    activity::{outline_status_counts, ActivityKind, OutlineFilter},
    notice::Notice,
    ListController,
};
use eframe::egui;
use forms::{OutlineFailure, OutlineForm};
use shared::domain::{Activity, CourseOutline, OutlineStatus, PerformedBy, TeacherId};

use crate::backend_bridge::commands::{ActivityFilter, BackendCommand, FetchRequest};
use crate::ui::widgets::{choice, list_state, text_field, PageCtx, ERROR_COLOR};

#[derive(Default)]
struct OutlineWindow {
    form: OutlineForm,
    uploading: bool,
}

pub struct OutlinesPage {
    pub list: ListController<(), CourseOutline>,
    filter: OutlineFilter,
    form: Option<OutlineWindow>,
}

impl Default for OutlinesPage {
    fn default() -> Self {
        Self {
            list: ListController::new(()),
            filter: OutlineFilter::default(),
            form: None,
        }
    }
}

impl OutlinesPage {
    fn teacher_id(&self) -> Option<TeacherId> {
        let raw = self.list.search_text().trim();
        (!raw.is_empty()).then(|| TeacherId::from(raw))
    }

    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &mut PageCtx<'_>) {
        ui.horizontal(|ui| {
            ui.heading("Course Outlines");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Upload Outline").clicked() && self.form.is_none() {
                    self.form = Some(OutlineWindow::default());
                }
            });
        });
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Teacher ID");
            let mut search = self.list.search_text().to_string();
            let response = ui.add(
                egui::TextEdit::singleline(&mut search)
                    .hint_text("Teacher ID")
                    .desired_width(220.0),
            );
            if response.changed() {
                self.list.on_search_input(search, ctx.now);
            }
            ui.label("Course");
            ui.add(
                egui::TextEdit::singleline(&mut self.filter.course_search)
                    .hint_text("Search course")
                    .desired_width(180.0),
            );
        });

        let counts = outline_status_counts(self.list.rows());
        ui.horizontal(|ui| {
            let total = self.list.rows().len();
            if ui
                .selectable_label(self.filter.status.is_none(), format!("All ({total})"))
                .clicked()
            {
                self.filter.status = None;
            }
            for status in OutlineStatus::ALL {
                let count = counts.get(status.label()).copied().unwrap_or_default();
                let selected = self.filter.status == Some(status);
                if ui
                    .selectable_label(selected, format!("{} ({count})", status.label()))
                    .clicked()
                {
                    self.filter.status = Some(status);
                }
            }
        });
        ui.add_space(6.0);

        if self.teacher_id().is_none() {
            ui.weak("Enter a teacher ID to see their course outlines");
            return;
        }
        if !list_state(ui, &self.list, "No course outlines found") {
            return;
        }
        let visible = self.filter.apply(self.list.rows());
        if visible.is_empty() {
            ui.weak("No course outlines match the current filters");
            return;
        }
        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("outlines_table")
                .striped(true)
                .num_columns(4)
                .show(ui, |ui| {
                    for header in ["Course", "Status", "Document", "Submitted"] {
                        ui.strong(header);
                    }
                    ui.end_row();
                    for outline in visible {
                        ui.label(&outline.course_name);
                        ui.label(status_text(outline.status));
                        if outline.document.is_empty() {
                            ui.weak("-");
                        } else {
                            ui.hyperlink_to("Open", &outline.document);
                        }
                        let submitted = outline
                            .created_at
                            .map(|at| at.format("%Y-%m-%d").to_string())
                            .unwrap_or_default();
                        ui.label(submitted);
                        ui.end_row();
                    }
                });
        });
    }

    pub fn show_windows(&mut self, egui_ctx: &egui::Context, ctx: &mut PageCtx<'_>) {
        let teacher_id = self.teacher_id();
        let Some(window) = self.form.as_mut() else {
            return;
        };
        let reference = ctx.reference;
        let mut open = true;
        let mut submit = false;
        egui::Window::new("Upload Course Outline")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(egui_ctx, |ui| {
                match &teacher_id {
                    Some(id) => ui.label(format!("Teacher: {id}")),
                    None => ui.colored_label(ERROR_COLOR, "Enter a teacher ID on the page first"),
                };
                ui.add_space(6.0);
                ui.label("Course");
                let options = reference
                    .courses
                    .iter()
                    .map(|course| (course.course_name.as_str(), course.course_name.as_str()));
                if let Some(course_name) = choice(
                    ui,
                    "outline_course",
                    &window.form.course_name,
                    "Select course",
                    options,
                ) {
                    window.form.course_name = course_name;
                }
                ui.label("Document URL");
                if let Some(document) = text_field(
                    ui,
                    &window.form.document,
                    !window.uploading,
                    "https://...",
                ) {
                    window.form.document = document;
                }
                ui.add_space(8.0);
                let label = if window.uploading {
                    "Uploading..."
                } else {
                    "Submit Outline"
                };
                submit = ui
                    .add_enabled(!window.uploading, egui::Button::new(label))
                    .clicked();
            });

        if !open && !window.uploading {
            self.form = None;
            return;
        }
        if !submit {
            return;
        }
        let Some(teacher_id) = teacher_id else {
            ctx.notify(Notice::error("Enter a teacher ID first"));
            return;
        };
        match window.form.build(&teacher_id) {
            Ok(body) => {
                if ctx.send(BackendCommand::SubmitOutline(body)) {
                    window.uploading = true;
                }
            }
            Err(notice) => ctx.notify(notice),
        }
    }

    pub fn on_submitted(&mut self, result: Result<(), OutlineFailure>, ctx: &mut PageCtx<'_>) {
        let Some(window) = self.form.as_mut() else {
            return;
        };
        window.uploading = false;
        let course = window.form.course_name.trim().to_string();
        let resolution = window.form.finish(result);
        if resolution.refresh {
            let entry = ActivityKind::OutlineSubmitted
                .render(PerformedBy::Teacher, &[("course", course.as_str())]);
            ctx.send(BackendCommand::RecordActivity(entry));
        }
        if ctx.settle(resolution, &mut self.list, FetchRequest::Outlines) {
            self.form = None;
        }
    }
}

fn status_text(status: OutlineStatus) -> egui::RichText {
    let color = match status {
        OutlineStatus::Approved => egui::Color32::from_rgb(46, 160, 67),
        OutlineStatus::Pending => egui::Color32::from_rgb(210, 153, 34),
        OutlineStatus::Rejected => ERROR_COLOR,
    };
    egui::RichText::new(status.label()).color(color)
}

pub struct ActivitiesPage {
    pub list: ListController<ActivityFilter, Activity>,
}

impl Default for ActivitiesPage {
    fn default() -> Self {
        Self {
            list: ListController::new(ActivityFilter::default()),
        }
    }
}

impl ActivitiesPage {
    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &mut PageCtx<'_>) {
        ui.horizontal(|ui| {
            ui.heading("Recent Activity");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    ctx.refresh(&mut self.list, FetchRequest::Activities);
                }
            });
        });
        ui.separator();

        let current = self.list.filter().perform_by;
        let mut picked = None;
        ui.horizontal(|ui| {
            ui.label("Performed by");
            egui::ComboBox::from_id_salt("activity_role_filter")
                .selected_text(current.map(PerformedBy::label).unwrap_or("Everyone"))
                .show_ui(ui, |ui| {
                    if ui.selectable_label(current.is_none(), "Everyone").clicked() {
                        picked = Some(None);
                    }
                    for role in PerformedBy::ALL {
                        if ui
                            .selectable_label(current == Some(role), role.label())
                            .clicked()
                        {
                            picked = Some(Some(role));
                        }
                    }
                });
        });
        if let Some(perform_by) = picked.filter(|role| *role != current) {
            if let Some(ticket) = self.list.set_filter(ActivityFilter { perform_by }) {
                ctx.fetch(&mut self.list, ticket, FetchRequest::Activities);
            }
        }
        ui.add_space(6.0);

        if !list_state(ui, &self.list, "No recent activity") {
            return;
        }
        egui::ScrollArea::vertical().show(ui, |ui| {
            for activity in self.list.rows() {
                ui.horizontal(|ui| {
                    ui.strong(&activity.title);
                    ui.weak(format!("by {}", activity.perform_by.label()));
                    if let Some(at) = activity.created_at {
                        ui.weak(at.format("%Y-%m-%d %H:%M").to_string());
                    }
                });
                if !activity.subtitle.is_empty() {
                    ui.label(&activity.subtitle);
                }
                ui.separator();
            }
        });
    }
}
