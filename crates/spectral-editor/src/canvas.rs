//! egui rendering of the editable graph.
//!
//! Pointer state is translated into [`Surface`] calls each frame; the
//! surface answers with events which become actions.

use crate::actions::Action;
use crate::store::Store;
use eframe::egui;
use graph_edit::surface::{edge_handles, node_handles};
use graph_edit::{Clickable, Point, Surface};

pub const SELECTED_COLOR: egui::Color32 = egui::Color32::from_rgb(0xff, 0x6b, 0x6b);
pub const EDGE_COLOR: egui::Color32 = egui::Color32::from_rgb(0x7b, 0xae, 0xff);
const NODE_FILL: egui::Color32 = egui::Color32::from_rgb(0xb4, 0xd4, 0xff);
const NODE_STROKE: egui::Color32 = egui::Color32::from_rgb(0x1a, 0x3f, 0xa3);

#[derive(Default)]
pub struct CanvasView {
    surface: Surface,
}

impl CanvasView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the graph and return the actions produced by pointer input.
    pub fn show(&mut self, ui: &mut egui::Ui, store: &Store) -> Vec<Action> {
        let mut actions = Vec::new();
        let canvas = &store.settings.canvas;

        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;

        if (rect.width() - store.bounds.width).abs() > 0.5
            || (rect.height() - store.bounds.height).abs() > 0.5
        {
            actions.push(Action::SetCanvasSize {
                width: rect.width(),
                height: rect.height(),
            });
        }
        // Use this frame's measurement even before the store catches up.
        let mut bounds = store.bounds;
        bounds.width = rect.width();
        bounds.height = rect.height();

        let to_local = |pos: egui::Pos2| Point::new(pos.x - rect.min.x, pos.y - rect.min.y);
        let to_screen = |p: Point| egui::pos2(rect.min.x + p.x, rect.min.y + p.y);

        let nodes = node_handles(&store.graph, canvas.node_radius);
        let edges = edge_handles(&store.graph, canvas.edge_hit_width / 2.0);

        // Pointer input
        let (pressed, released, pointer) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });

        if pressed
            && let Some(pos) = pointer
            && rect.contains(pos)
            && on_canvas_layer(ui, pos)
            && let Some(event) = self.surface.pointer_down(to_local(pos), &nodes, &edges)
        {
            actions.push(event.into());
        }

        if response.dragged()
            && let Some(pos) = pointer
            && let Some(event) = self.surface.pointer_move(to_local(pos), &bounds)
        {
            actions.push(event.into());
        }

        if released {
            self.surface.pointer_up();
        }

        // Cursor feedback
        if self.surface.dragging().is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
        } else if let Some(pos) = response.hover_pos() {
            let p = to_local(pos);
            if nodes.iter().any(|n| n.hit(p)) {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
            } else if edges.iter().any(|e| e.hit(p)) {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
        }

        // Drawing
        painter.rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);

        for edge in &edges {
            let color = if store.selection.is_edge_selected(edge.index) {
                SELECTED_COLOR
            } else {
                EDGE_COLOR
            };
            let width = if store.selection.is_edge_selected(edge.index) {
                canvas.edge_width * 2.0
            } else {
                canvas.edge_width
            };
            painter.line_segment(
                [to_screen(edge.from), to_screen(edge.to)],
                egui::Stroke::new(width, color),
            );
        }

        for node in &nodes {
            let center = to_screen(node.center);
            let selected = store.selection.is_node_selected(node.id);
            let (fill, text) = if selected {
                (SELECTED_COLOR, egui::Color32::WHITE)
            } else {
                (NODE_FILL, NODE_STROKE)
            };
            painter.circle(
                center,
                node.radius,
                fill,
                egui::Stroke::new(1.5, NODE_STROKE),
            );
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                node.id.to_string(),
                egui::FontId::proportional(node.radius.max(8.0)),
                text,
            );
        }

        actions
    }
}

/// Presses over a popup, menu or window belong to that layer.
fn on_canvas_layer(ui: &egui::Ui, pos: egui::Pos2) -> bool {
    ui.ctx()
        .layer_id_at(pos)
        .is_none_or(|layer| layer == ui.layer_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EditorSettings;

    const NODE_0: egui::Pos2 = egui::pos2(100.0, 100.0);

    fn input(events: Vec<egui::Event>) -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(800.0, 600.0),
            )),
            events,
            ..Default::default()
        }
    }

    fn press_at(pos: egui::Pos2) -> Vec<egui::Event> {
        vec![
            egui::Event::PointerMoved(pos),
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed: true,
                modifiers: egui::Modifiers::NONE,
            },
        ]
    }

    /// Run frames with the canvas filling the screen, optionally under a
    /// foreground area covering node 0. Returns the actions of the last
    /// frame.
    fn frames(
        canvas: &mut CanvasView,
        store: &Store,
        overlay: bool,
        inputs: Vec<egui::RawInput>,
    ) -> Vec<Action> {
        let ctx = egui::Context::default();
        let mut actions = Vec::new();
        for raw in inputs {
            actions.clear();
            let _ = ctx.run(raw, |ctx| {
                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE)
                    .show(ctx, |ui| {
                        actions = canvas.show(ui, store);
                    });
                if overlay {
                    egui::Area::new(egui::Id::new("overlay"))
                        .order(egui::Order::Foreground)
                        .fixed_pos(NODE_0 - egui::vec2(30.0, 20.0))
                        .show(ctx, |ui| {
                            let _ = ui.allocate_exact_size(
                                egui::vec2(60.0, 40.0),
                                egui::Sense::click(),
                            );
                        });
                }
            });
        }
        actions
    }

    fn clicks(actions: &[Action]) -> Vec<usize> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::ClickNode { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_press_on_node_selects_it() {
        let store = Store::with_seed(EditorSettings::default(), 1);
        let mut canvas = CanvasView::new();

        let actions = frames(
            &mut canvas,
            &store,
            false,
            vec![input(vec![]), input(vec![]), input(press_at(NODE_0))],
        );

        assert_eq!(clicks(&actions), vec![0]);
        assert_eq!(canvas.surface.dragging(), Some(0));
    }

    #[test]
    fn test_press_on_overlay_does_not_reach_canvas() {
        let store = Store::with_seed(EditorSettings::default(), 1);
        let mut canvas = CanvasView::new();

        let actions = frames(
            &mut canvas,
            &store,
            true,
            vec![input(vec![]), input(vec![]), input(press_at(NODE_0))],
        );

        assert!(clicks(&actions).is_empty());
        assert_eq!(canvas.surface.dragging(), None);
    }
}
