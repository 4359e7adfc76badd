//! Presentation of the last accepted backend payload. Nothing here computes
//! beyond projecting the payload onto plots and heatmaps.

use crate::actions::Action;
use crate::canvas::{EDGE_COLOR, SELECTED_COLOR};
use crate::heatmap;
use crate::payload::{AttentionPayload, MatrixKind, ResultPayload, Spectrum, SpectrumPayload};
use crate::store::{AttentionView, Store, ViewMode};
use eframe::egui;
use egui_plot::{Line, MarkerShape, Plot, PlotPoints, Points};

pub const EMPTY_HINT: &str = "Click compute spectrum to start.";
pub const AXIS_HINT: &str =
    "Select eigenvector (1 = max eigenvalue if adjacency, 1 = min eigenvalue if Laplacian)";

pub fn show(ui: &mut egui::Ui, store: &Store) -> Vec<Action> {
    let mut actions = Vec::new();

    match &store.result {
        ResultPayload::Spectrum(payload) => show_spectrum(ui, store, payload, &mut actions),
        ResultPayload::Attention(payload) => show_attention(ui, store, payload, &mut actions),
    }

    ui.separator();
    if store.awaiting.is_some() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Waiting for backend...");
        });
    }
    if let Some(status) = &store.status {
        ui.colored_label(SELECTED_COLOR, status);
    }

    actions
}

// ------------------------------------------------------------------
// Spectrum
// ------------------------------------------------------------------

fn show_spectrum(
    ui: &mut egui::Ui,
    store: &Store,
    payload: &SpectrumPayload,
    actions: &mut Vec<Action>,
) {
    ui.horizontal(|ui| {
        for kind in MatrixKind::ALL {
            if ui
                .selectable_label(store.view.matrix == kind, kind.label())
                .clicked()
            {
                actions.push(Action::SetMatrixKind { kind });
            }
        }
    });
    ui.horizontal(|ui| {
        for (mode, label) in [
            (ViewMode::Spectrum, "Spectrum"),
            (ViewMode::Embedding, "Embedding"),
        ] {
            if ui.selectable_label(store.view.mode == mode, label).clicked() {
                actions.push(Action::SetViewMode { mode });
            }
        }
    });
    ui.separator();

    let spectrum = payload.get(store.view.matrix);
    match store.view.mode {
        ViewMode::Spectrum => show_eigenvalues(ui, spectrum),
        ViewMode::Embedding => show_embedding(ui, store, spectrum, actions),
    }
}

fn show_eigenvalues(ui: &mut egui::Ui, spectrum: &Spectrum) {
    if spectrum.eigenvalues.is_empty() {
        ui.label(EMPTY_HINT);
        return;
    }

    let points = PlotPoints::from_iter(spectrum.eigenvalues.iter().map(|&l| [l, 0.0]));
    Plot::new("spectrum_plot")
        .height(160.0)
        .show_y(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new("eigenvalues", points)
                    .shape(MarkerShape::Circle)
                    .radius(4.0)
                    .color(EDGE_COLOR),
            );
        });

    egui::CollapsingHeader::new("Eigenvalues")
        .default_open(false)
        .show(ui, |ui| {
            egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                for (i, l) in spectrum.eigenvalues.iter().enumerate() {
                    ui.monospace(format!("{:>3}  {:+.4}", i + 1, l));
                }
            });
        });
}

fn show_embedding(
    ui: &mut egui::Ui,
    store: &Store,
    spectrum: &Spectrum,
    actions: &mut Vec<Action>,
) {
    ui.label(AXIS_HINT);

    let max = store.graph.node_count().max(1);
    let mut x = store.view.x_index;
    let mut y = store.view.y_index;
    ui.horizontal(|ui| {
        ui.add(egui::DragValue::new(&mut x).range(1..=max).prefix("x: "));
        ui.add(egui::DragValue::new(&mut y).range(1..=max).prefix("y: "));
    });
    if x != store.view.x_index || y != store.view.y_index {
        actions.push(Action::SetEmbeddingAxes { x, y });
    }

    if spectrum.is_empty() {
        ui.label(EMPTY_HINT);
        return;
    }

    let coords = spectrum.embedding(store.view.x_index, store.view.y_index);
    // The graph may have changed since the spectrum was computed.
    let segments: Vec<[[f64; 2]; 2]> = store
        .graph
        .edges()
        .iter()
        .filter_map(|e| Some([*coords.get(e.source)?, *coords.get(e.target)?]))
        .collect();

    Plot::new("embedding_plot")
        .data_aspect(1.0)
        .show(ui, |plot_ui| {
            for segment in segments {
                plot_ui.line(
                    Line::new("edge", PlotPoints::from(segment.to_vec()))
                        .color(EDGE_COLOR)
                        .width(1.0),
                );
            }
            plot_ui.points(
                Points::new("nodes", PlotPoints::from(coords))
                    .shape(MarkerShape::Circle)
                    .radius(5.0)
                    .color(SELECTED_COLOR),
            );
        });
}

// ------------------------------------------------------------------
// Attention
// ------------------------------------------------------------------

fn show_attention(
    ui: &mut egui::Ui,
    store: &Store,
    payload: &AttentionPayload,
    actions: &mut Vec<Action>,
) {
    if payload.layers.is_empty() {
        ui.label("The model returned no layers.");
        return;
    }

    ui.horizontal(|ui| {
        let mut layer = store.view.layer + 1;
        ui.label("Layer");
        ui.add(egui::DragValue::new(&mut layer).range(1..=payload.layers.len()));
        if layer != store.view.layer + 1 {
            actions.push(Action::SetLayer { layer: layer - 1 });
        }

        ui.separator();
        for (view, label) in [
            (AttentionView::Attention, "Attention"),
            (AttentionView::Gradient, "Gradient"),
        ] {
            if ui
                .selectable_label(store.view.attention_view == view, label)
                .clicked()
            {
                actions.push(Action::SetAttentionView { view });
            }
        }
    });
    ui.separator();

    let Some(layer) = payload.layers.get(store.view.layer) else {
        return;
    };
    let matrix = match store.view.attention_view {
        AttentionView::Attention => Some(&layer.attention),
        AttentionView::Gradient => layer.gradient.as_ref(),
    };
    let Some(matrix) = matrix else {
        ui.label("No gradient for this layer.");
        return;
    };

    let hovered = heatmap::show_heatmap(
        ui,
        &payload.tokens,
        matrix.view(),
        store.view.heatmap_hovered_cell,
    );
    if hovered != store.view.heatmap_hovered_cell {
        actions.push(Action::SetHeatmapHoveredCell { cell: hovered });
    }
}
