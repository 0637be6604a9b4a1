//! Bridge between the egui thread and the tokio worker that talks to the server.

pub mod commands;
pub mod runtime;
