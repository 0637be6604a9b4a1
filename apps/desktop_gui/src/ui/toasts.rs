//! Transient notices stacked in the top-right corner.

use std::time::{Duration, Instant};

use client_core::notice::{Notice, NoticeLevel};
use eframe::egui;

pub const TOAST_TTL: Duration = Duration::from_secs(4);
const MAX_VISIBLE: usize = 5;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct ToastStack {
    toasts: Vec<Toast>,
}

impl ToastStack {
    pub fn push(&mut self, notice: Notice, now: Instant) {
        tracing::debug!(level = ?notice.level, message = %notice.message, "toast");
        self.toasts.push(Toast {
            notice,
            expires_at: now + TOAST_TTL,
        });
        if self.toasts.len() > MAX_VISIBLE {
            self.toasts.remove(0);
        }
    }

    pub fn prune(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let mut dismissed = None;
        egui::Area::new(egui::Id::new("toast_stack"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for (index, toast) in self.toasts.iter().enumerate() {
                    let fill = match toast.notice.level {
                        NoticeLevel::Success => egui::Color32::from_rgb(46, 125, 50),
                        NoticeLevel::Info => egui::Color32::from_rgb(40, 90, 160),
                        NoticeLevel::Error => egui::Color32::from_rgb(178, 40, 40),
                    };
                    egui::Frame::new()
                        .fill(fill)
                        .corner_radius(6.0)
                        .inner_margin(10.0)
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(&toast.notice.message)
                                        .color(egui::Color32::WHITE),
                                );
                                if ui.small_button("x").clicked() {
                                    dismissed = Some(index);
                                }
                            });
                        });
                    ui.add_space(6.0);
                }
            });
        if let Some(index) = dismissed {
            self.toasts.remove(index);
        }
    }
}
