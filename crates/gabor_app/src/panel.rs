//! egui layout: parameter sliders, heatmap image with axes, sigma overlay and colorbar.

use egui::{
    pos2, vec2, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Shape, Stroke, TextureId, Ui,
};
use gabor_core::{
    annotation::sigma_arrows,
    config::PARAMETER_SLIDERS,
    sigmas, Colormap, GridSpec, VisualizationConfig,
};
use glam::Vec2;

use crate::state::ExplorerState;

pub const TITLE: &str = "Gabor Filter Visualization";
pub const DESCRIPTION: &str =
    "Adjust the parameters to see changes in the Gabor filter visualization.";

const AXIS_TICKS: [f32; 5] = [-10.0, -5.0, 0.0, 5.0, 10.0];
const AXIS_MARGIN: f32 = 36.0;
const COLORBAR_WIDTH: f32 = 18.0;
const COLORBAR_GAP: f32 = 16.0;
const COLORBAR_LABELS: f32 = 56.0;
const COLORBAR_STEPS: usize = 64;
const ARROW_STROKE: f32 = 1.5;

pub fn controls(ui: &mut Ui, state: &mut ExplorerState) {
    ui.heading(TITLE);
    ui.label(DESCRIPTION);
    ui.separator();

    for spec in PARAMETER_SLIDERS {
        ui.add(
            egui::Slider::new(state.params.value_mut(spec.kind), spec.min..=spec.max)
                .step_by(f64::from(spec.step))
                .text(spec.label()),
        );
    }
    ui.checkbox(&mut state.params.draw_sigma, "Draw sigma");
    if ui.button("Reset").clicked() {
        state.reset_parameters();
    }

    ui.separator();
    egui::ComboBox::from_label("Colormap")
        .selected_text(state.heatmap.colormap.name())
        .show_ui(ui, |ui| {
            for map in Colormap::ALL {
                ui.selectable_value(&mut state.heatmap.colormap, map, map.name());
            }
        });
    ui.checkbox(&mut state.heatmap.invert, "Invert colormap");
    ui.checkbox(&mut state.heatmap.symmetric_range, "Symmetric range");

    ui.separator();
    let (sigma_x, sigma_y) = sigmas(&state.params);
    ui.label(format!("σx = {sigma_x:.3}    σy = {sigma_y:.3}"));
    let range = state.field_range();
    ui.label(format!("Field range: [{:.3}, {:.3}]", range.min, range.max));
    ui.label(format!(
        "Grid: {0}×{0}    Evaluation: {1:>5.2} ms",
        state.grid.resolution,
        state.last_eval_ms()
    ));
}

/// Lays out the heatmap, its axes and colorbar inside the remaining space.
pub fn heatmap(ui: &mut Ui, state: &ExplorerState, texture: TextureId) {
    let available = ui.available_size();
    let side = (available.x - AXIS_MARGIN - COLORBAR_GAP - COLORBAR_WIDTH - COLORBAR_LABELS)
        .min(available.y - AXIS_MARGIN)
        .max(64.0);
    let total = vec2(
        AXIS_MARGIN + side + COLORBAR_GAP + COLORBAR_WIDTH + COLORBAR_LABELS,
        side + AXIS_MARGIN,
    );
    let (outer, _) = ui.allocate_exact_size(total, Sense::hover());
    let image_rect = Rect::from_min_size(outer.min + vec2(AXIS_MARGIN, 0.0), vec2(side, side));

    let painter = ui.painter();
    painter.image(
        texture,
        image_rect,
        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
        Color32::WHITE,
    );
    draw_axes(painter, image_rect, &state.grid, ui.visuals().text_color());

    if state.params.draw_sigma {
        draw_sigma_overlay(&ui.painter_at(image_rect), painter, image_rect, state);
    }

    let colorbar_rect = Rect::from_min_size(
        pos2(image_rect.right() + COLORBAR_GAP, image_rect.top()),
        vec2(COLORBAR_WIDTH, side),
    );
    draw_colorbar(
        painter,
        colorbar_rect,
        &state.visualization_config(),
        ui.visuals().text_color(),
    );
}

/// Projects a data-space point into the image rect (lower origin).
pub fn data_to_screen(rect: Rect, grid: &GridSpec, point: Vec2) -> Pos2 {
    let (min, max) = grid.extent();
    let span = max - min;
    pos2(
        rect.left() + (point.x - min) / span * rect.width(),
        rect.bottom() - (point.y - min) / span * rect.height(),
    )
}

fn draw_axes(painter: &Painter, rect: Rect, grid: &GridSpec, color: Color32) {
    let font = FontId::proportional(12.0);
    let stroke = Stroke::new(1.0, color);
    for tick in AXIS_TICKS {
        let p = data_to_screen(rect, grid, Vec2::splat(tick));
        painter.line_segment([pos2(p.x, rect.bottom()), pos2(p.x, rect.bottom() + 4.0)], stroke);
        painter.text(
            pos2(p.x, rect.bottom() + 6.0),
            Align2::CENTER_TOP,
            format!("{tick}"),
            font.clone(),
            color,
        );
        painter.line_segment([pos2(rect.left() - 4.0, p.y), pos2(rect.left(), p.y)], stroke);
        painter.text(
            pos2(rect.left() - 6.0, p.y),
            Align2::RIGHT_CENTER,
            format!("{tick}"),
            font.clone(),
            color,
        );
    }
    painter.rect_stroke(rect, 0.0, stroke, egui::StrokeKind::Outside);
}

fn draw_sigma_overlay(clipped: &Painter, labels: &Painter, rect: Rect, state: &ExplorerState) {
    let stroke = Stroke::new(ARROW_STROKE, Color32::WHITE);
    for arrow in sigma_arrows(&state.params) {
        let to_screen = |p: Vec2| data_to_screen(rect, &state.grid, p);
        clipped.line_segment([to_screen(arrow.start), to_screen(arrow.shaft_end)], stroke);
        clipped.add(Shape::convex_polygon(
            arrow.head.iter().map(|p| to_screen(*p)).collect(),
            Color32::WHITE,
            Stroke::NONE,
        ));
        labels.text(
            to_screen(arrow.label_anchor),
            Align2::CENTER_BOTTOM,
            arrow.label(),
            FontId::proportional(14.0),
            Color32::WHITE,
        );
    }
}

fn draw_colorbar(painter: &Painter, rect: Rect, config: &VisualizationConfig, text: Color32) {
    let colormap = config.colormap();
    let slice = rect.height() / COLORBAR_STEPS as f32;
    for i in 0..COLORBAR_STEPS {
        // Bottom slice shows the range minimum.
        let t = (i as f32 + 0.5) / COLORBAR_STEPS as f32;
        let t = if config.invert != 0 { 1.0 - t } else { t };
        let [r, g, b] = colormap.sample(t);
        let bottom = rect.bottom() - i as f32 * slice;
        let band = Rect::from_min_max(pos2(rect.left(), bottom - slice), pos2(rect.right(), bottom));
        painter.rect_filled(band.expand2(vec2(0.0, 0.5)), 0.0, Color32::from_rgb(r, g, b));
    }
    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, text), egui::StrokeKind::Outside);

    let font = FontId::proportional(12.0);
    let mid = 0.5 * (config.value_min + config.value_max);
    for (value, y) in [
        (config.value_max, rect.top()),
        (mid, rect.center().y),
        (config.value_min, rect.bottom()),
    ] {
        painter.text(
            pos2(rect.right() + 6.0, y),
            Align2::LEFT_CENTER,
            format!("{value:.2}"),
            font.clone(),
            text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_to_screen_uses_lower_origin() {
        let rect = Rect::from_min_size(pos2(10.0, 20.0), vec2(200.0, 200.0));
        let grid = GridSpec::default();
        assert_eq!(data_to_screen(rect, &grid, Vec2::new(-10.0, -10.0)), pos2(10.0, 220.0));
        assert_eq!(data_to_screen(rect, &grid, Vec2::new(10.0, 10.0)), pos2(210.0, 20.0));
        assert_eq!(data_to_screen(rect, &grid, Vec2::ZERO), pos2(110.0, 120.0));
    }
}
