//! App shell: navigation, event routing from the backend worker, and the
//! per-frame debounce polling of the visible list.

use std::time::{Duration, Instant};

use client_core::{FetchTicket, ListController};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use tracing::debug;

use crate::backend_bridge::commands::{BackendCommand, DeleteTarget, FetchRequest};
use crate::controller::{
    events::{err_label, FetchedPage, PageResult, ReferenceData, UiError, UiEvent},
    orchestration::dispatch_backend_command,
};
use crate::ui::{
    catalog::{CoursesPage, DepartmentsPage, TeachersPage},
    outlines::{ActivitiesPage, OutlinesPage},
    schedules::SchedulesPage,
    students::StudentsPage,
    toasts::ToastStack,
    widgets::{PageCtx, ERROR_COLOR},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Students,
    Teachers,
    Departments,
    Courses,
    Schedules,
    Outlines,
    Activity,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Students,
        Page::Teachers,
        Page::Departments,
        Page::Courses,
        Page::Schedules,
        Page::Outlines,
        Page::Activity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::Students => "Students",
            Page::Teachers => "Teachers",
            Page::Departments => "Departments",
            Page::Courses => "Courses",
            Page::Schedules => "Schedules",
            Page::Outlines => "Course outlines",
            Page::Activity => "Activity",
        }
    }
}

pub struct SrsDesktopApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    page: Page,
    status: String,
    status_banner: Option<UiError>,
    toasts: ToastStack,
    reference: ReferenceData,
    students: StudentsPage,
    teachers: TeachersPage,
    departments: DepartmentsPage,
    courses: CoursesPage,
    schedules: SchedulesPage,
    outlines: OutlinesPage,
    activities: ActivitiesPage,
}

impl SrsDesktopApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        server_url: String,
    ) -> Self {
        let mut status = "Connecting...".to_string();
        dispatch_backend_command(&cmd_tx, BackendCommand::LoadReferenceData, &mut status);
        Self {
            cmd_tx,
            ui_rx,
            server_url,
            page: Page::Students,
            status,
            status_banner: None,
            toasts: ToastStack::default(),
            reference: ReferenceData::default(),
            students: StudentsPage::default(),
            teachers: TeachersPage::default(),
            departments: DepartmentsPage::default(),
            courses: CoursesPage::default(),
            schedules: SchedulesPage::default(),
            outlines: OutlinesPage::default(),
            activities: ActivitiesPage::default(),
        }
    }

    fn process_ui_events(&mut self, now: Instant) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    self.status = err.message().to_string();
                    self.status_banner = Some(err);
                }
                UiEvent::Fetched(page) => self.apply_fetched(page),
                UiEvent::ReferenceDataLoaded(mut data) => {
                    if let Some(err) = data.failure.take() {
                        self.status_banner = Some(err);
                    }
                    debug!(
                        departments = data.departments.len(),
                        courses = data.courses.len(),
                        teachers = data.teachers.len(),
                        "reference data loaded"
                    );
                    self.reference = data;
                }
                other => self.route_result(other, now),
            }
        }
    }

    fn apply_fetched(&mut self, page: FetchedPage) {
        let banner = &mut self.status_banner;
        match page {
            FetchedPage::Students(generation, result) => {
                apply_list(&mut self.students.list, generation, result, banner)
            }
            FetchedPage::Teachers(generation, result) => {
                apply_list(&mut self.teachers.list, generation, result, banner)
            }
            FetchedPage::Departments(generation, result) => {
                apply_list(&mut self.departments.list, generation, result, banner)
            }
            FetchedPage::Courses(generation, result) => {
                apply_list(&mut self.courses.list, generation, result, banner)
            }
            FetchedPage::Schedules(generation, result) => {
                apply_list(&mut self.schedules.list, generation, result, banner)
            }
            FetchedPage::Outlines(generation, result) => {
                apply_list(&mut self.outlines.list, generation, result, banner)
            }
            FetchedPage::Activities(generation, result) => {
                apply_list(&mut self.activities.list, generation, result, banner)
            }
        }
    }

    /// Hands a mutation result to the page that issued it.
    fn route_result(&mut self, event: UiEvent, now: Instant) {
        let mut ctx = PageCtx {
            cmd_tx: &self.cmd_tx,
            status: &mut self.status,
            toasts: &mut self.toasts,
            reference: &self.reference,
            now,
        };
        match event {
            UiEvent::StudentSubmitted(outcome) => {
                self.students.on_student_submitted(outcome, &mut ctx)
            }
            UiEvent::StudentsImported(result) => {
                self.students.on_students_imported(result, &mut ctx)
            }
            UiEvent::DepartmentCreated(result) => self.departments.on_created(result, &mut ctx),
            UiEvent::CourseCreated(result) => self.courses.on_created(result, &mut ctx),
            UiEvent::ScheduleCreated(result) => self.schedules.on_created(result, &mut ctx),
            UiEvent::OutlineSubmitted(result) => self.outlines.on_submitted(result, &mut ctx),
            UiEvent::Deleted { target, result } => match &target {
                DeleteTarget::Student { .. } => {
                    self.students.on_deleted(&target, result, &mut ctx)
                }
                DeleteTarget::Teacher { .. } => self.teachers.on_deleted(result, &mut ctx),
                DeleteTarget::Department { .. } => {
                    self.departments.on_deleted(&target, result, &mut ctx)
                }
                DeleteTarget::Course { .. } => self.courses.on_deleted(&target, result, &mut ctx),
                DeleteTarget::Schedule { .. } => {
                    self.schedules.on_deleted(&target, result, &mut ctx)
                }
            },
            UiEvent::Info(_)
            | UiEvent::Error(_)
            | UiEvent::Fetched(_)
            | UiEvent::ReferenceDataLoaded(_) => {}
        }
    }

    /// First visit loads the list; afterwards only an elapsed search
    /// debounce triggers a fetch.
    fn poll_active_list(&mut self, now: Instant) {
        let mut ctx = PageCtx {
            cmd_tx: &self.cmd_tx,
            status: &mut self.status,
            toasts: &mut self.toasts,
            reference: &self.reference,
            now,
        };
        match self.page {
            Page::Students => poll_list(&mut self.students.list, &mut ctx, FetchRequest::Students),
            Page::Teachers => poll_list(&mut self.teachers.list, &mut ctx, FetchRequest::Teachers),
            Page::Departments => {
                poll_list(&mut self.departments.list, &mut ctx, FetchRequest::Departments)
            }
            Page::Courses => poll_list(&mut self.courses.list, &mut ctx, FetchRequest::Courses),
            Page::Schedules => {
                poll_list(&mut self.schedules.list, &mut ctx, FetchRequest::Schedules)
            }
            Page::Outlines => poll_list(&mut self.outlines.list, &mut ctx, FetchRequest::Outlines),
            Page::Activity => {
                poll_list(&mut self.activities.list, &mut ctx, FetchRequest::Activities)
            }
        }
    }

    fn show_navigation(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("left_navigation_panel")
            .resizable(false)
            .default_width(180.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading("SRS Admin");
                ui.separator();
                for page in Page::ALL {
                    if ui
                        .selectable_label(self.page == page, page.label())
                        .clicked()
                    {
                        self.page = page;
                    }
                }
            });
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.weak(format!("Server: {}", self.server_url));
                ui.separator();
                ui.label(&self.status);
                if ui.small_button("Reload dropdowns").clicked() {
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::LoadReferenceData,
                        &mut self.status,
                    );
                }
            });
            let mut dismiss = false;
            if let Some(banner) = &self.status_banner {
                ui.horizontal(|ui| {
                    ui.colored_label(
                        ERROR_COLOR,
                        format!(
                            "{} while {}: {}",
                            err_label(banner.category()),
                            banner.context().describe(),
                            banner.message()
                        ),
                    );
                    dismiss = ui.small_button("Dismiss").clicked();
                });
            }
            if dismiss {
                self.status_banner = None;
            }
        });
    }

    fn show_active_page(&mut self, egui_ctx: &egui::Context, now: Instant) {
        let mut ctx = PageCtx {
            cmd_tx: &self.cmd_tx,
            status: &mut self.status,
            toasts: &mut self.toasts,
            reference: &self.reference,
            now,
        };
        let page = self.page;
        egui::CentralPanel::default().show(egui_ctx, |ui| match page {
            Page::Students => self.students.show(ui, &mut ctx),
            Page::Teachers => self.teachers.show(ui, &mut ctx),
            Page::Departments => self.departments.show(ui, &mut ctx),
            Page::Courses => self.courses.show(ui, &mut ctx),
            Page::Schedules => self.schedules.show(ui, &mut ctx),
            Page::Outlines => self.outlines.show(ui, &mut ctx),
            Page::Activity => self.activities.show(ui, &mut ctx),
        });
        match page {
            Page::Students => self.students.show_windows(egui_ctx, &mut ctx),
            Page::Teachers => self.teachers.show_windows(egui_ctx, &mut ctx),
            Page::Departments => self.departments.show_windows(egui_ctx, &mut ctx),
            Page::Courses => self.courses.show_windows(egui_ctx, &mut ctx),
            Page::Schedules => self.schedules.show_windows(egui_ctx, &mut ctx),
            Page::Outlines => self.outlines.show_windows(egui_ctx, &mut ctx),
            Page::Activity => {}
        }
    }
}

fn apply_list<F: Clone + PartialEq, R>(
    list: &mut ListController<F, R>,
    generation: u64,
    result: PageResult<R>,
    banner: &mut Option<UiError>,
) {
    let (result, failure) = match result {
        Ok(page) => (Ok(page), None),
        Err(err) => (Err(err.message().to_string()), Some(err)),
    };
    if list.apply_response(generation, result) {
        if let Some(err) = failure {
            *banner = Some(err);
        }
    }
}

fn poll_list<F: Clone + PartialEq, R>(
    list: &mut ListController<F, R>,
    ctx: &mut PageCtx<'_>,
    wrap: fn(FetchTicket<F>) -> FetchRequest,
) {
    if list.latest_generation() == 0 {
        ctx.refresh(list, wrap);
    } else if let Some(ticket) = list.poll(ctx.now) {
        ctx.fetch(list, ticket, wrap);
    }
}

impl eframe::App for SrsDesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.process_ui_events(now);
        self.poll_active_list(now);
        self.toasts.prune(now);

        self.show_navigation(ctx);
        self.show_top_bar(ctx);
        self.show_active_page(ctx, now);
        self.toasts.show(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
