#![cfg(target_arch = "wasm32")]

use crate::actions::Action;
use crate::create_app;
use crate::serialization;
use crate::settings::EditorSettings;
use eframe::{WebRunner, egui};
use std::sync::mpsc::Sender;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

/// Launch the egui app inside the canvas referenced by `index.html`.
#[wasm_bindgen]
pub async fn start() -> Result<(), JsValue> {
    use web_sys::HtmlCanvasElement;

    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);

    let document = web_sys::window()
        .ok_or("No window")?
        .document()
        .ok_or("No document")?;

    let canvas = document
        .get_element_by_id("the_canvas_id")
        .ok_or("Canvas not found")?
        .dyn_into::<HtmlCanvasElement>()?;

    let web_options = eframe::WebOptions::default();

    WebRunner::new()
        .start(
            canvas,
            web_options,
            Box::new(|cc| Ok(Box::new(create_app(cc, EditorSettings::default())))),
        )
        .await
}

/// Pick a project file in the browser and deliver it through the inbox.
pub fn open_project_dialog(ctx: egui::Context, inbox: Sender<Action>) {
    use rfd::AsyncFileDialog;
    use wasm_bindgen_futures::spawn_local;

    let task = AsyncFileDialog::new()
        .add_filter("JSON", &["json"])
        .pick_file();

    spawn_local(async move {
        if let Some(file) = task.await {
            let data = file.read().await;
            let result = String::from_utf8(data)
                .map_err(|e| e.to_string())
                .and_then(|json| serialization::from_json(&json).map_err(|e| e.to_string()));
            if inbox.send(Action::ProjectLoaded { result }).is_err() {
                log::debug!("inbox closed, dropping loaded project");
            }
            ctx.request_repaint();
        }
    });
}
