// Sketchpad: a freehand drawing pad.
// Usage: sketchpad [config.json]

mod app;
mod editor;

use anyhow::Context;
use sketchpad_core::config::{load_config, PadConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::SketchpadApp;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => load_config(&path)
            .with_context(|| format!("load config: {}", path.to_string_lossy()))?,
        None => PadConfig::default(),
    };
    info!(
        "Starting sketchpad with a {}x{} canvas",
        config.canvas.width, config.canvas.height
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Sketchpad")
            .with_inner_size([
                config.canvas.width as f32 + 40.0,
                config.canvas.height as f32 + 100.0,
            ]),
        ..Default::default()
    };

    eframe::run_native(
        "Sketchpad",
        options,
        Box::new(move |cc| Ok(Box::new(SketchpadApp::new(cc, config)?))),
    )
    .map_err(|err| anyhow::anyhow!("run sketchpad window: {err}"))
}
