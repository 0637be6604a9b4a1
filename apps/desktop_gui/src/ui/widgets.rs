//! Small egui building blocks shared by the pages, plus `PageCtx`, the
//! handle pages use to queue commands and raise toasts.

use std::time::Instant;

use client_core::{
    activity::ActivityKind,
    notice::{Notice, SubmitResolution},
    DeleteFlow, FetchTicket, ListController, Pagination,
};
use crossbeam_channel::Sender;
use eframe::egui;
use shared::domain::PerformedBy;

use crate::backend_bridge::commands::{BackendCommand, DeleteTarget, FetchRequest};
use crate::controller::{events::ReferenceData, orchestration::dispatch_backend_command};
use crate::ui::toasts::ToastStack;

pub const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 76, 70);

pub struct PageCtx<'a> {
    pub cmd_tx: &'a Sender<BackendCommand>,
    pub status: &'a mut String,
    pub toasts: &'a mut ToastStack,
    pub reference: &'a ReferenceData,
    pub now: Instant,
}

impl PageCtx<'_> {
    pub fn send(&mut self, cmd: BackendCommand) -> bool {
        dispatch_backend_command(self.cmd_tx, cmd, self.status)
    }

    pub fn notify(&mut self, notice: Notice) {
        self.toasts.push(notice, self.now);
    }

    /// Issues a list fetch. A ticket that never reaches the worker is
    /// answered locally so the page does not stay in its loading state.
    pub fn fetch<F, R>(
        &mut self,
        list: &mut ListController<F, R>,
        ticket: FetchTicket<F>,
        wrap: fn(FetchTicket<F>) -> FetchRequest,
    ) where
        F: Clone + PartialEq,
    {
        let generation = ticket.generation;
        if !self.send(BackendCommand::Fetch(wrap(ticket))) {
            list.apply_response(generation, Err(self.status.clone()));
        }
    }

    pub fn refresh<F, R>(
        &mut self,
        list: &mut ListController<F, R>,
        wrap: fn(FetchTicket<F>) -> FetchRequest,
    ) where
        F: Clone + PartialEq,
    {
        let ticket = list.refresh();
        self.fetch(list, ticket, wrap);
    }

    /// Toasts the notice and returns whether the caller should close its form.
    pub fn settle<F, R>(
        &mut self,
        resolution: SubmitResolution,
        list: &mut ListController<F, R>,
        wrap: fn(FetchTicket<F>) -> FetchRequest,
    ) -> bool
    where
        F: Clone + PartialEq,
    {
        self.notify(resolution.notice);
        if resolution.refresh {
            self.refresh(list, wrap);
            self.send(BackendCommand::LoadReferenceData);
        }
        resolution.close
    }

    pub fn record(&mut self, kind: ActivityKind, values: &[(&str, &str)]) {
        self.send(BackendCommand::RecordActivity(
            kind.render(PerformedBy::Admin, values),
        ));
    }
}

pub fn field_error(ui: &mut egui::Ui, message: Option<&str>) {
    if let Some(message) = message {
        ui.label(egui::RichText::new(message).small().color(ERROR_COLOR));
    }
}

/// Edits a copy of `value`; returns the new text when the user changed it.
pub fn text_field(ui: &mut egui::Ui, value: &str, enabled: bool, hint: &str) -> Option<String> {
    let mut text = value.to_string();
    let response = ui.add_enabled(
        enabled,
        egui::TextEdit::singleline(&mut text)
            .hint_text(hint)
            .desired_width(240.0),
    );
    response.changed().then_some(text)
}

/// A combo box over `(value, label)` pairs. Returns the picked value.
pub fn choice<'v>(
    ui: &mut egui::Ui,
    id: &str,
    selected: &str,
    placeholder: &str,
    options: impl IntoIterator<Item = (&'v str, &'v str)>,
) -> Option<String> {
    let options: Vec<(&str, &str)> = options.into_iter().collect();
    let selected_text = options
        .iter()
        .find(|(value, _)| *value == selected)
        .map(|(_, label)| *label)
        .unwrap_or(placeholder);
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .width(240.0)
        .show_ui(ui, |ui| {
            for (value, label) in &options {
                if ui.selectable_label(*value == selected, *label).clicked() {
                    picked = Some((*value).to_string());
                }
            }
        });
    picked.filter(|value| value != selected)
}

/// Filter dropdown whose first entry clears the filter.
pub fn filter_choice(
    ui: &mut egui::Ui,
    id: &str,
    current: Option<&str>,
    all_label: &str,
    options: &[&str],
) -> Option<Option<String>> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.unwrap_or(all_label))
        .show_ui(ui, |ui| {
            if ui.selectable_label(current.is_none(), all_label).clicked() {
                picked = Some(None);
            }
            for option in options {
                if ui.selectable_label(current == Some(*option), *option).clicked() {
                    picked = Some(Some((*option).to_string()));
                }
            }
        });
    picked.filter(|choice| choice.as_deref() != current)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNav {
    Prev,
    Next,
}

pub fn pagination_bar(ui: &mut egui::Ui, pagination: &Pagination, noun: &str) -> Option<PageNav> {
    let (first, last, total) = pagination.showing_range();
    let mut nav = None;
    ui.horizontal(|ui| {
        ui.label(format!("Showing {first} to {last} of {total} {noun}"));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(pagination.can_next(), egui::Button::new("Next"))
                .clicked()
            {
                nav = Some(PageNav::Next);
            }
            ui.label(format!(
                "Page {} of {}",
                pagination.current_page,
                pagination.total_pages.max(1)
            ));
            if ui
                .add_enabled(pagination.can_prev(), egui::Button::new("Previous"))
                .clicked()
            {
                nav = Some(PageNav::Prev);
            }
        });
    });
    nav
}

/// Loading, failure and empty states shared by every list.
pub fn list_state<F: Clone + PartialEq, R>(
    ui: &mut egui::Ui,
    list: &ListController<F, R>,
    empty: &str,
) -> bool {
    if list.is_loading() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.weak("Loading...");
        });
    }
    if let Some(error) = list.last_error() {
        ui.colored_label(ERROR_COLOR, error);
    }
    if list.rows().is_empty() && !list.is_loading() {
        ui.weak(empty);
        return false;
    }
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmChoice {
    Cancel,
    Confirm,
}

fn confirm_delete_window(
    ctx: &egui::Context,
    title: &str,
    body: &str,
    deleting: bool,
) -> Option<ConfirmChoice> {
    let mut choice = None;
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(body);
            ui.weak("This action cannot be undone.");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!deleting, egui::Button::new("Cancel"))
                    .clicked()
                {
                    choice = Some(ConfirmChoice::Cancel);
                }
                let label = if deleting { "Deleting..." } else { "Delete" };
                let text = egui::RichText::new(label).color(egui::Color32::WHITE);
                let button = egui::Button::new(text).fill(ERROR_COLOR);
                if ui.add_enabled(!deleting, button).clicked() {
                    choice = Some(ConfirmChoice::Confirm);
                }
            });
        });
    choice
}

/// Shows the confirm dialog for `flow` and queues the DELETE on confirm.
pub fn delete_dialog(
    flow: &mut DeleteFlow<DeleteTarget>,
    noun: &str,
    egui_ctx: &egui::Context,
    ctx: &mut PageCtx<'_>,
) {
    let Some(target) = flow.target() else {
        return;
    };
    let title = format!("Delete {noun}");
    let body = format!(
        "Are you sure you want to delete {} \"{}\"?",
        noun.to_lowercase(),
        target.label()
    );
    match confirm_delete_window(egui_ctx, &title, &body, flow.is_deleting()) {
        Some(ConfirmChoice::Cancel) => flow.cancel(),
        Some(ConfirmChoice::Confirm) => {
            if let Some(ticket) = flow.confirm() {
                if !ctx.send(BackendCommand::Delete(ticket.target)) {
                    let status = ctx.status.clone();
                    if let Some(resolution) = flow.finish(Err(status)) {
                        ctx.notify(resolution.notice);
                    }
                }
            }
        }
        None => {}
    }
}
