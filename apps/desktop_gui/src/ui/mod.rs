//! UI layer: app shell, one module per admin page, and shared widgets.

pub mod app;
mod catalog;
mod outlines;
mod schedules;
mod students;
pub mod toasts;
pub mod widgets;

pub use app::SrsDesktopApp;
