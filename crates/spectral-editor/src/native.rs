#![cfg(not(target_arch = "wasm32"))]

use crate::create_app;
use crate::settings::{BACKEND_ENV, EditorSettings, SETTINGS_FILE};
use std::path::Path;

/// Entry point used by the native executable.
pub fn run() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = EditorSettings::load_or_default(Path::new(SETTINGS_FILE))
        .with_backend_override(std::env::var(BACKEND_ENV).ok());
    log::info!("using backend {}", settings.backend.url);

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Spectral Graph Editor",
        native_options,
        Box::new(|cc| Ok(Box::new(create_app(cc, settings)))),
    )
}
