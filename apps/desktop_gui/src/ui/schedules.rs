//! Course schedules: class/section filters and the schedule builder window.

use client_core::{activity::ActivityKind, notice::Notice, DeleteFlow, ListController};
use eframe::egui;
use forms::{
    student_wizard::{CLASS_OPTIONS, SECTION_OPTIONS},
    ScheduleBuilder, ScheduleField,
};
use shared::domain::{ClockTime, Schedule, Weekday};

use crate::backend_bridge::commands::{BackendCommand, DeleteTarget, FetchRequest, ScheduleFilter};
use crate::controller::events::ReferenceData;
use crate::ui::widgets::{
    choice, delete_dialog, filter_choice, list_state, PageCtx, ERROR_COLOR,
};

pub struct SchedulesPage {
    pub list: ListController<ScheduleFilter, Schedule>,
    builder: Option<ScheduleBuilder>,
    pub delete: DeleteFlow<DeleteTarget>,
}

impl Default for SchedulesPage {
    fn default() -> Self {
        Self {
            list: ListController::new(ScheduleFilter::default()),
            builder: None,
            delete: DeleteFlow::new("Schedule"),
        }
    }
}

impl SchedulesPage {
    pub fn show(&mut self, ui: &mut egui::Ui, ctx: &mut PageCtx<'_>) {
        ui.horizontal(|ui| {
            ui.heading("Course Schedules");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Schedule Course").clicked() && self.builder.is_none() {
                    self.builder = Some(ScheduleBuilder::new());
                }
            });
        });
        ui.separator();

        let filter = self.list.filter().clone();
        let mut next = None;
        ui.horizontal(|ui| {
            ui.label("Class");
            if let Some(class_name) = filter_choice(
                ui,
                "schedule_class_filter",
                filter.class_name.as_deref(),
                "All classes",
                &CLASS_OPTIONS,
            ) {
                next = Some(ScheduleFilter {
                    class_name,
                    ..filter.clone()
                });
            }
            ui.label("Section");
            if let Some(section) = filter_choice(
                ui,
                "schedule_section_filter",
                filter.section.as_deref(),
                "All sections",
                &SECTION_OPTIONS,
            ) {
                next = Some(ScheduleFilter {
                    section,
                    ..filter.clone()
                });
            }
            let filtered = filter != ScheduleFilter::default();
            if ui
                .add_enabled(filtered, egui::Button::new("Clear filters"))
                .clicked()
            {
                next = Some(ScheduleFilter::default());
            }
        });
        if let Some(filter) = next {
            if let Some(ticket) = self.list.set_filter(filter) {
                ctx.fetch(&mut self.list, ticket, FetchRequest::Schedules);
            }
        }
        ui.add_space(6.0);

        let filtered = self.list.filter() != &ScheduleFilter::default();
        let empty = if filtered {
            "No schedules found matching your filters"
        } else {
            "No schedules found"
        };
        if !list_state(ui, &self.list, empty) {
            return;
        }
        let mut remove = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for schedule in self.list.rows() {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.strong(schedule.course_label());
                        ui.label(format!(
                            "Class {} / Section {}",
                            schedule.class_name, schedule.section
                        ));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("Delete").clicked() {
                                remove = Some(DeleteTarget::Schedule {
                                    id: schedule.id.clone(),
                                    class_name: format!(
                                        "{}{}",
                                        schedule.class_name, schedule.section
                                    ),
                                });
                            }
                        });
                    });
                    ui.label(format!("Teacher: {}", schedule.teacher_label()));
                    for slot in &schedule.day_of_week {
                        ui.monospace(format!(
                            "{:<10} {} - {}",
                            slot.day, slot.start_time, slot.end_time
                        ));
                    }
                    if !schedule.note.is_empty() {
                        ui.weak(&schedule.note);
                    }
                });
                ui.add_space(4.0);
            }
        });
        if let Some(target) = remove {
            self.delete.request(target);
        }
    }

    pub fn show_windows(&mut self, egui_ctx: &egui::Context, ctx: &mut PageCtx<'_>) {
        delete_dialog(&mut self.delete, "Schedule", egui_ctx, ctx);

        let Some(builder) = self.builder.as_mut() else {
            return;
        };
        let reference = ctx.reference;
        let mut open = true;
        let mut submit = false;
        let mut add_day = false;
        egui::Window::new("Schedule Course")
            .collapsible(false)
            .default_width(520.0)
            .open(&mut open)
            .show(egui_ctx, |ui| {
                builder_fields(ui, builder, reference);
                ui.separator();
                add_day = day_picker(ui, builder);
                ui.separator();
                let label = if builder.is_submitting() {
                    "Saving..."
                } else {
                    "Schedule Course"
                };
                submit = ui
                    .add_enabled(!builder.is_submitting(), egui::Button::new(label))
                    .clicked();
            });

        if !open && !builder.is_submitting() {
            self.builder = None;
            return;
        }
        if add_day {
            if let Err(rejection) = builder.add_day_schedule() {
                ctx.notify(Notice::error(rejection.to_string()));
            }
        }
        if submit {
            match builder.begin_submit() {
                Ok(body) => {
                    if !ctx.send(BackendCommand::CreateSchedule(body)) {
                        let status = ctx.status.clone();
                        let resolution = builder.finish_submit(Err(status));
                        ctx.notify(resolution.notice);
                    }
                }
                Err(notice) => ctx.notify(notice),
            }
        }
    }

    pub fn on_created(&mut self, result: Result<(), String>, ctx: &mut PageCtx<'_>) {
        let Some(builder) = self.builder.as_mut() else {
            return;
        };
        let class_name = format!("{}{}", builder.class_name(), builder.section());
        let resolution = builder.finish_submit(result);
        if resolution.refresh {
            ctx.record(
                ActivityKind::ClassScheduled,
                &[("className", class_name.as_str())],
            );
        }
        if ctx.settle(resolution, &mut self.list, FetchRequest::Schedules) {
            self.builder = None;
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
            ctx.record(
                ActivityKind::ScheduleRemoved,
                &[("className", target.label())],
            );
        }
        ctx.settle(resolution, &mut self.list, FetchRequest::Schedules);
    }
}

fn invalid_hint(ui: &mut egui::Ui, builder: &ScheduleBuilder, field: ScheduleField) {
    if builder.is_invalid(field) {
        ui.label(egui::RichText::new("Required").small().color(ERROR_COLOR));
    }
}

fn builder_fields(ui: &mut egui::Ui, builder: &mut ScheduleBuilder, reference: &ReferenceData) {
    egui::Grid::new("schedule_builder_fields")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Course");
            ui.vertical(|ui| {
                let labels: Vec<(String, String)> = reference
                    .courses
                    .iter()
                    .map(|course| {
                        (
                            course.id.to_string(),
                            format!("{} ({})", course.course_name, course.course_code),
                        )
                    })
                    .collect();
                let options = labels
                    .iter()
                    .map(|(id, label)| (id.as_str(), label.as_str()));
                let current = builder.course_id().to_string();
                if let Some(course) =
                    choice(ui, "schedule_course", &current, "Select course", options)
                {
                    builder.set_course(course);
                }
                invalid_hint(ui, builder, ScheduleField::Course);
            });
            ui.end_row();

            ui.label("Class");
            ui.vertical(|ui| {
                let current = builder.class_name().to_string();
                let options = CLASS_OPTIONS.iter().map(|class| (*class, *class));
                if let Some(class_name) =
                    choice(ui, "schedule_class", &current, "Select class", options)
                {
                    builder.set_class_name(class_name);
                }
                invalid_hint(ui, builder, ScheduleField::ClassName);
            });
            ui.end_row();

            ui.label("Section");
            ui.vertical(|ui| {
                let current = builder.section().to_string();
                let options = SECTION_OPTIONS.iter().map(|section| (*section, *section));
                if let Some(section) =
                    choice(ui, "schedule_section", &current, "Select section", options)
                {
                    builder.set_section(section);
                }
                invalid_hint(ui, builder, ScheduleField::Section);
            });
            ui.end_row();

            ui.label("Teacher");
            ui.vertical(|ui| {
                let labels: Vec<(String, String)> = reference
                    .teachers
                    .iter()
                    .map(|teacher| (teacher.id.to_string(), teacher.full_name()))
                    .collect();
                let options = labels
                    .iter()
                    .map(|(id, label)| (id.as_str(), label.as_str()));
                let current = builder.teacher_id().to_string();
                if let Some(teacher) =
                    choice(ui, "schedule_teacher", &current, "Select teacher", options)
                {
                    builder.set_teacher(teacher);
                }
                invalid_hint(ui, builder, ScheduleField::Teacher);
            });
            ui.end_row();

            ui.label("Note");
            let mut note = builder.note().to_string();
            if ui
                .add(egui::TextEdit::singleline(&mut note).desired_width(240.0))
                .changed()
            {
                builder.set_note(note);
            }
            ui.end_row();
        });
}

/// Day/start/end selectors and the current day list. Returns whether
/// "Add" was pressed.
fn day_picker(ui: &mut egui::Ui, builder: &mut ScheduleBuilder) -> bool {
    let (day, start, end) = builder.pending();
    let slots = ClockTime::slot_options();
    let mut add = false;
    ui.label("Days of week");
    ui.horizontal(|ui| {
        egui::ComboBox::from_id_salt("schedule_day")
            .selected_text(day.map(Weekday::label).unwrap_or("Day"))
            .show_ui(ui, |ui| {
                for option in Weekday::ALL {
                    if ui.selectable_label(day == Some(option), option.label()).clicked() {
                        builder.select_day(Some(option));
                    }
                }
            });
        if let Some(time) = time_combo(ui, "schedule_start", start, "Start", &slots) {
            builder.select_start(Some(time));
        }
        if let Some(time) = time_combo(ui, "schedule_end", end, "End", &slots) {
            builder.select_end(Some(time));
        }
        add = ui.button("Add").clicked();
    });
    if builder.is_invalid(ScheduleField::DayOfWeek) {
        ui.label(
            egui::RichText::new("Add at least one day")
                .small()
                .color(ERROR_COLOR),
        );
    }

    let mut removed = None;
    for (index, slot) in builder.days().iter().enumerate() {
        ui.horizontal(|ui| {
            ui.monospace(format!(
                "{:<10} {} - {}",
                slot.day, slot.start_time, slot.end_time
            ));
            if ui.small_button("Remove").clicked() {
                removed = Some(index);
            }
        });
    }
    if let Some(index) = removed {
        builder.remove_day_schedule(index);
    }
    add
}

fn time_combo(
    ui: &mut egui::Ui,
    id: &str,
    selected: Option<ClockTime>,
    placeholder: &str,
    slots: &[ClockTime],
) -> Option<ClockTime> {
    let mut picked = None;
    let text = selected.map(|time| time.to_string());
    egui::ComboBox::from_id_salt(id)
        .selected_text(text.as_deref().unwrap_or(placeholder))
        .show_ui(ui, |ui| {
            for slot in slots {
                if ui
                    .selectable_label(selected == Some(*slot), slot.to_string())
                    .clicked()
                {
                    picked = Some(*slot);
                }
            }
        });
    picked
}
