pub mod actions;
pub mod api;
pub mod app;
pub mod canvas;
pub mod effects;
pub mod heatmap;
pub mod payload;
pub mod result_panel;
pub mod serialization;
pub mod settings;
pub mod state;
pub mod store;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::SpectralEditor;
pub use settings::EditorSettings;

/// Build the application for either the native or the web runner.
pub fn create_app(_cc: &eframe::CreationContext<'_>, settings: EditorSettings) -> SpectralEditor {
    SpectralEditor::new(store::Store::new(settings))
}
