use eframe::egui;
use ndarray::ArrayView2;

// Color scale configuration constants
const COLOR_SCALE_MESH_POINTS: usize = 10;
const COLOR_SCALE_HEIGHT: f32 = 30.0;
const COLOR_SCALE_LABEL_HEIGHT: f32 = 15.0;
const MIN_CELL_SIZE: f32 = 6.0;
/// Cells smaller than this get no value text.
const MIN_TEXT_CELL_SIZE: f32 = 28.0;

/// Convert a normalized value [0.0, 1.0] to a Viridis color
fn viridis(t: f64) -> egui::Color32 {
    let c = colorous::VIRIDIS.eval_continuous(t.clamp(0.0, 1.0));
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

/// Black on bright backgrounds, white on dark ones.
fn contrasting_text_color(bg: egui::Color32) -> egui::Color32 {
    let r = bg.r() as f64 / 255.0;
    let g = bg.g() as f64 / 255.0;
    let b = bg.b() as f64 / 255.0;

    let luminance = 0.299 * r + 0.587 * g + 0.114 * b;

    if luminance > 0.5 {
        egui::Color32::BLACK
    } else {
        egui::Color32::WHITE
    }
}

/// Rank-based colour position of `value` within `sorted`, in [0.0, 1.0].
///
/// Attention weights are heavily skewed, so colour follows the rank of a
/// value rather than its magnitude. Ties share the middle rank, values
/// between two entries interpolate their ranks.
pub fn calculate_color_position(value: f64, sorted: &[f64]) -> f64 {
    if sorted.len() < 2 {
        return 0.5;
    }

    let insert_pos = sorted.partition_point(|&w| w < value);
    if insert_pos == 0 {
        return 0.0;
    }
    if insert_pos >= sorted.len() {
        return 1.0;
    }

    let last = (sorted.len() - 1) as f64;
    if (sorted[insert_pos] - value).abs() < 1e-9 {
        let first_idx = insert_pos;
        let last_idx = sorted.partition_point(|&w| w <= value + 1e-9) - 1;
        let middle_idx = (first_idx + last_idx) / 2;
        return middle_idx as f64 / last;
    }

    let lower_idx = insert_pos - 1;
    let (lower, upper) = (sorted[lower_idx], sorted[insert_pos]);
    let ratio = (value - lower) / (upper - lower);
    (lower_idx as f64 + ratio) / last
}

/// All finite entries of `matrix`, ascending.
pub fn sorted_values(matrix: ArrayView2<f64>) -> Vec<f64> {
    let mut values: Vec<f64> = matrix.iter().copied().filter(|v| v.is_finite()).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Horizontal Viridis bar with five evenly spaced value ticks.
fn render_color_scale(ui: &mut egui::Ui, sorted: &[f64], scale_width: f32) {
    let (Some(&min_value), Some(&max_value)) = (sorted.first(), sorted.last()) else {
        return;
    };

    if (max_value - min_value).abs() < 1e-9 {
        return;
    }

    ui.vertical(|ui| {
        ui.spacing_mut().item_spacing = egui::Vec2::splat(0.0);

        let (rect, _response) = ui.allocate_exact_size(
            egui::Vec2::new(scale_width, COLOR_SCALE_HEIGHT),
            egui::Sense::hover(),
        );
        let rect_pos = rect.min;

        let mut mesh = egui::Mesh::default();

        for i in 0..COLOR_SCALE_MESH_POINTS {
            let t = i as f32 / (COLOR_SCALE_MESH_POINTS - 1) as f32;
            let x = rect_pos.x + t * scale_width;
            let value = min_value + (t as f64) * (max_value - min_value);
            let color = viridis(calculate_color_position(value, sorted));

            mesh.colored_vertex(egui::pos2(x, rect_pos.y), color);
            mesh.colored_vertex(egui::pos2(x, rect_pos.y + COLOR_SCALE_HEIGHT), color);
        }

        for i in 0..(COLOR_SCALE_MESH_POINTS - 1) {
            let base = (i * 2) as u32;
            mesh.add_triangle(base, base + 1, base + 2);
            mesh.add_triangle(base + 1, base + 3, base + 2);
        }

        ui.painter().add(egui::Shape::mesh(mesh));

        ui.allocate_space(egui::Vec2::new(scale_width, COLOR_SCALE_LABEL_HEIGHT));

        for pos in [0.0_f32, 0.25, 0.5, 0.75, 1.0] {
            let x = rect_pos.x + pos * scale_width;
            let value = min_value + (pos as f64) * (max_value - min_value);

            let tick_top = rect_pos.y + COLOR_SCALE_HEIGHT;
            let tick_bottom = tick_top + 5.0;
            ui.painter().line_segment(
                [egui::pos2(x, tick_top), egui::pos2(x, tick_bottom)],
                egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
            );

            ui.painter().text(
                egui::pos2(x, tick_bottom + 2.0),
                egui::Align2::CENTER_TOP,
                format!("{:.2}", value),
                egui::FontId::proportional(9.0),
                egui::Color32::DARK_GRAY,
            );
        }
    });
}

/// Render a read-only token x token heatmap.
/// Rows are query tokens, columns key tokens. Returns the hovered cell as
/// `(column, row)`.
pub fn show_heatmap(
    ui: &mut egui::Ui,
    tokens: &[String],
    matrix: ArrayView2<f64>,
    prev_hovered_cell: Option<(usize, usize)>,
) -> Option<(usize, usize)> {
    if tokens.is_empty() || matrix.is_empty() {
        ui.label("No tokens to display");
        return None;
    }

    let sorted = sorted_values(matrix);

    let available_rect = ui.available_rect_before_wrap();
    let spacing = 2.0;
    let label_height = 20.0;
    let label_width = 70.0;

    let available_width = available_rect.width() - label_width - spacing;
    let available_height = available_rect.height()
        - label_height
        - spacing
        - 10.0
        - COLOR_SCALE_HEIGHT
        - COLOR_SCALE_LABEL_HEIGHT
        - 5.0;

    let (rows, cols) = matrix.dim();
    let cell_width = available_width / cols as f32;
    let cell_height = available_height / rows as f32;
    let cell_size = cell_width.min(cell_height).max(MIN_CELL_SIZE);

    let mut new_hovered_cell = None;

    let label_color = |ui: &egui::Ui, highlighted: bool| {
        if highlighted {
            egui::Color32::WHITE
        } else {
            ui.style().visuals.text_color()
        }
    };

    ui.vertical(|ui| {
        ui.spacing_mut().item_spacing = egui::Vec2::ZERO;

        // Column headers
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing = egui::Vec2::ZERO;
            ui.add_space(label_width);

            for (x_idx, label) in tokens.iter().take(cols).enumerate() {
                let highlighted = prev_hovered_cell.is_some_and(|(hx, _)| hx == x_idx);
                let color = label_color(ui, highlighted);
                ui.add_sized(
                    [cell_size, label_height],
                    egui::Label::new(egui::RichText::new(label.as_str()).color(color).size(10.0))
                        .truncate(),
                );
            }
        });

        for (y_idx, row) in matrix.rows().into_iter().enumerate() {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing = egui::Vec2::ZERO;

                let highlighted = prev_hovered_cell.is_some_and(|(_, hy)| hy == y_idx);
                let color = label_color(ui, highlighted);
                let label = tokens.get(y_idx).map(String::as_str).unwrap_or("");
                ui.add_sized(
                    [label_width, cell_size],
                    egui::Label::new(egui::RichText::new(label).color(color).size(10.0))
                        .truncate(),
                );

                for (x_idx, &value) in row.iter().enumerate() {
                    let cell_color = viridis(calculate_color_position(value, &sorted));

                    let (rect, response) = ui.allocate_exact_size(
                        egui::Vec2::new(cell_size, cell_size),
                        egui::Sense::hover(),
                    );

                    let final_color = if response.hovered() {
                        new_hovered_cell = Some((x_idx, y_idx));
                        egui::Color32::from_rgb(
                            cell_color.r().saturating_add(40),
                            cell_color.g().saturating_add(40),
                            cell_color.b().saturating_add(40),
                        )
                    } else {
                        cell_color
                    };

                    ui.painter().rect_filled(rect, 0.0, final_color);
                    ui.painter().rect_stroke(
                        rect,
                        0.0,
                        egui::Stroke::new(0.5, egui::Color32::from_gray(40)),
                        egui::epaint::StrokeKind::Outside,
                    );

                    if cell_size >= MIN_TEXT_CELL_SIZE {
                        ui.painter().text(
                            rect.center(),
                            egui::Align2::CENTER_CENTER,
                            format!("{:.2}", value),
                            egui::FontId::proportional(9.0),
                            contrasting_text_color(cell_color),
                        );
                    }

                    response.on_hover_text(format!(
                        "{} -> {}: {:.4}",
                        tokens.get(y_idx).map(String::as_str).unwrap_or("?"),
                        tokens.get(x_idx).map(String::as_str).unwrap_or("?"),
                        value
                    ));
                }
            });
        }

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing = egui::Vec2::ZERO;
            ui.add_space(label_width);
            render_color_scale(ui, &sorted, cell_size * cols as f32);
        });
    });

    new_hovered_cell
}
