use crate::actions::Action;
use crate::api::AttentionTask;
use crate::canvas::{CanvasView, SELECTED_COLOR};
use crate::result_panel;
use crate::settings::{
    EDGE_HIT_WIDTH_RANGE, EDGE_PROBABILITY_RANGE, EDGE_WIDTH_RANGE, NODE_RADIUS_RANGE,
    PADDING_RANGE, SliderRange,
};
use crate::state::State;
use crate::store::Store;
use eframe::egui;

pub struct SpectralEditor {
    state: State,
    canvas: CanvasView,
}

impl SpectralEditor {
    pub fn new(store: Store) -> Self {
        Self {
            state: State::new(store),
            canvas: CanvasView::new(),
        }
    }

    fn menu_bar(&self, ctx: &egui::Context) -> Vec<Action> {
        let mut actions = Vec::new();
        let store = &self.state.store;

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    #[cfg(not(target_arch = "wasm32"))]
                    {
                        if ui.button("Save").clicked() {
                            ui.close();
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .save_file()
                            {
                                actions.push(Action::SaveToFile { path });
                            }
                        }

                        if ui.button("Load").clicked() {
                            ui.close();
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter("JSON", &["json"])
                                .pick_file()
                            {
                                actions.push(Action::LoadFromFile { path });
                            }
                        }
                    }

                    #[cfg(target_arch = "wasm32")]
                    {
                        if ui.button("Load").clicked() {
                            ui.close();
                            crate::web::open_project_dialog(ctx.clone(), self.state.sender());
                        }
                    }
                });

                ui.menu_button("Settings", |ui| {
                    let mut canvas = store.settings.canvas.clone();
                    slider(ui, &mut canvas.padding, PADDING_RANGE, "Padding");
                    slider(ui, &mut canvas.node_radius, NODE_RADIUS_RANGE, "Node radius");
                    slider(ui, &mut canvas.edge_width, EDGE_WIDTH_RANGE, "Edge width");
                    slider(ui, &mut canvas.edge_hit_width, EDGE_HIT_WIDTH_RANGE, "Edge hit width");
                    if canvas != store.settings.canvas {
                        actions.push(Action::UpdateCanvasSettings { canvas });
                    }
                    ui.separator();
                    ui.label(format!("Backend: {}", store.settings.backend.url));
                });
            });
        });

        actions
    }

    fn controls(&self, ctx: &egui::Context) -> Vec<Action> {
        let mut actions = Vec::new();
        let store = &self.state.store;

        egui::TopBottomPanel::bottom("controls")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(8.0))
            .show(ctx, |ui| {
                // Graph editing
                ui.horizontal_wrapped(|ui| {
                    if ui.button("Add Node").clicked() {
                        actions.push(Action::AddNode);
                    }
                    if ui.button("Delete Node(s)").clicked() {
                        actions.push(Action::DeleteSelectedNodes);
                    }
                    warning(ui, &store.warnings.node);

                    ui.separator();
                    if ui.button("Add Edge").clicked() {
                        actions.push(Action::AddEdgesBetweenSelected);
                    }
                    if ui.button("Delete Edge").clicked() {
                        actions.push(Action::DeleteSelectedEdge);
                    }
                    warning(ui, &store.warnings.edge);
                });

                // Bulk generation
                ui.horizontal_wrapped(|ui| {
                    ui.label("N");
                    let mut count_text = store.generator.count_text.clone();
                    if ui
                        .add(egui::TextEdit::singleline(&mut count_text).desired_width(48.0))
                        .changed()
                    {
                        actions.push(Action::SetGeneratorCount { text: count_text });
                    }

                    ui.label("p");
                    let mut p = store.generator.edge_probability;
                    if ui
                        .add(egui::Slider::new(
                            &mut p,
                            EDGE_PROBABILITY_RANGE.min as f64..=EDGE_PROBABILITY_RANGE.max as f64,
                        )
                        .step_by(EDGE_PROBABILITY_RANGE.step as f64))
                        .changed()
                    {
                        actions.push(Action::SetEdgeProbability { p });
                    }

                    if ui.button("Generate").clicked() {
                        actions.push(Action::GenerateNodes);
                    }
                    warning(ui, &store.warnings.generate);

                    ui.separator();
                    if ui.button("Clear").clicked() {
                        actions.push(Action::ClearAll);
                    }
                    if ui.button("Recompute").clicked() {
                        actions.push(Action::RequestSpectrum);
                    }
                });

                // Transformer
                ui.horizontal_wrapped(|ui| {
                    egui::ComboBox::from_id_salt("model")
                        .selected_text(store.transformer.model.as_str())
                        .show_ui(ui, |ui| {
                            for model in &store.settings.transformer.models {
                                if ui
                                    .selectable_label(*model == store.transformer.model, model)
                                    .clicked()
                                {
                                    actions.push(Action::SetModel {
                                        model: model.clone(),
                                    });
                                }
                            }
                        });

                    for task in AttentionTask::ALL {
                        if ui
                            .selectable_label(store.transformer.task == task, task.label())
                            .clicked()
                        {
                            actions.push(Action::SetTask { task });
                        }
                    }

                    let mut sentence = store.transformer.sentence.clone();
                    if ui
                        .add(
                            egui::TextEdit::singleline(&mut sentence)
                                .hint_text("Sentence")
                                .desired_width(320.0),
                        )
                        .changed()
                    {
                        actions.push(Action::SetSentence { sentence });
                    }

                    let mut word = store.transformer.mask_word.clone();
                    let masking = store.transformer.task == AttentionTask::Mlm;
                    if ui
                        .add_enabled(
                            masking,
                            egui::TextEdit::singleline(&mut word)
                                .hint_text("Mask word")
                                .desired_width(96.0),
                        )
                        .changed()
                    {
                        actions.push(Action::SetMaskWord { word });
                    }

                    if ui.button("Load Model Info").clicked() {
                        actions.push(Action::RequestAttention);
                    }
                });
            });

        actions
    }
}

fn slider(ui: &mut egui::Ui, value: &mut f32, range: SliderRange, label: &str) {
    ui.add(
        egui::Slider::new(value, range.min..=range.max)
            .step_by(range.step as f64)
            .text(label),
    );
}

fn warning(ui: &mut egui::Ui, message: &Option<String>) {
    if let Some(message) = message {
        ui.colored_label(SELECTED_COLOR, message);
    }
}

impl eframe::App for SpectralEditor {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_inbox();
        self.state.flush_actions();

        let mut actions = self.menu_bar(ctx);
        actions.extend(self.controls(ctx));

        egui::SidePanel::right("result_panel")
            .default_width(ctx.available_rect().width() / 2.5)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(8.0))
            .show(ctx, |ui| {
                ui.heading("Results");
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    actions.extend(result_panel::show(ui, &self.state.store));
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            actions.extend(self.canvas.show(ui, &self.state.store));
        });

        // Display error dialog if there's an error message
        if let Some(error) = self.state.store.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&error);
                    if ui.button("OK").clicked() {
                        actions.push(Action::ClearErrorMessage);
                    }
                });
        }

        for action in actions {
            self.state.dispatch(action);
        }
        self.state.flush_actions();
        self.state.flush_effects(Some(ctx));
    }
}
