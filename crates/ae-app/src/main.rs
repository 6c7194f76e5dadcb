mod app;
mod auth;
mod backend;
mod config;
mod error;
mod events;
mod gallery;
mod generator;
mod job;
mod notifications;
mod payments;
mod state;
mod ui;

use anyhow::anyhow;
use eframe::egui;
use tracing::info;
use crate::config::AppConfig;
use crate::state::AppState;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load()?;
    info!(api = %config.api_base_url, "Starting aeaiou");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("aeaiou-runtime")
        .build()?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("aeaiou")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([960.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "aeaiou",
        options,
        Box::new(move |cc| {
            let state = AppState::new(&config, handle, &cc.egui_ctx)?;
            Ok(Box::new(app::App::new(state)))
        }),
    )
    .map_err(|e| anyhow!("UI exited with an error: {}", e))?;

    runtime.shutdown_background();
    Ok(())
}
