use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{ClientConfig, SrsClient};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::SrsDesktopApp;

#[derive(Debug, Parser)]
#[command(name = "srs-desktop", about = "Desktop admin console for the SRS server")]
struct Args {
    /// Overrides NEXT_PUBLIC_SRS_SERVER and the config file.
    #[arg(long)]
    server_url: Option<String>,
    /// TOML file with a `server_url` key.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let config = ClientConfig::load(args.config.as_deref(), args.server_url.as_deref())
        .context("failed to resolve server configuration")?;
    info!(server_url = %config.server_url, "srs-desktop starting");
    let client = SrsClient::new(&config);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(Arc::new(client), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("SRS Admin")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([980.0, 640.0]),
        ..Default::default()
    };
    let server_url = config.server_url.clone();
    eframe::run_native(
        "SRS Admin",
        options,
        Box::new(move |_cc| Ok(Box::new(SrsDesktopApp::new(cmd_tx, ui_rx, server_url)))),
    )
    .map_err(|err| anyhow!("desktop ui exited with an error: {err}"))
}

#[cfg(test)]
#[path = "tests/gui_tests.rs"]
mod gui_tests;

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod runtime_tests;
