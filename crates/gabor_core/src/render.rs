//! CPU heatmap rasterization and PNG snapshots.

use std::path::Path;

use glam::Vec2;
use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::annotation::{sigma_arrows, SigmaArrow};
use crate::config::{GaborParameters, GridError, GridSpec, HeatmapSettings, VisualizationConfig};
use crate::field::{evaluate, GaborField};

const ARROW_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("failed to write snapshot: {0}")]
    Image(#[from] image::ImageError),
}

/// Colormaps `field` into an image with a lower origin (row 0 of the field at the bottom).
pub fn rasterize(field: &GaborField, config: &VisualizationConfig) -> RgbaImage {
    let colormap = config.colormap();
    let mut img = RgbaImage::new(field.width, field.height);
    for (row, samples) in field.values.chunks(field.width.max(1) as usize).enumerate() {
        let y = field.height - 1 - row as u32;
        for (col, &value) in samples.iter().enumerate() {
            let [r, g, b] = colormap.sample(config.normalize(value));
            img.put_pixel(col as u32, y, Rgba([r, g, b, 255]));
        }
    }
    img
}

/// Maps data coordinates to pixel centres of an image rasterized from `grid`.
pub fn data_to_pixel(grid: &GridSpec, point: Vec2) -> Vec2 {
    let spacing = grid.spacing();
    let top = (grid.resolution - 1) as f32;
    Vec2::new(
        (point.x - grid.min) / spacing,
        top - (point.y - grid.min) / spacing,
    )
}

/// Strokes the shaft and fills the head of each arrow. Labels need a font and are left
/// to the interactive view.
pub fn draw_arrows(img: &mut RgbaImage, grid: &GridSpec, arrows: &[SigmaArrow]) {
    for arrow in arrows {
        let start = data_to_pixel(grid, arrow.start);
        let shaft_end = data_to_pixel(grid, arrow.shaft_end);
        draw_line(img, start, shaft_end);
        let head = arrow.head.map(|p| data_to_pixel(grid, p));
        fill_triangle(img, head);
    }
}

fn put(img: &mut RgbaImage, x: i64, y: i64) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, ARROW_COLOR);
    }
}

fn draw_line(img: &mut RgbaImage, from: Vec2, to: Vec2) {
    let delta = to - from;
    let steps = delta.abs().max_element().ceil().max(1.0) as usize;
    for i in 0..=steps {
        let p = from + delta * (i as f32 / steps as f32);
        put(img, p.x.round() as i64, p.y.round() as i64);
    }
}

fn fill_triangle(img: &mut RgbaImage, [a, b, c]: [Vec2; 3]) {
    let edge = |p: Vec2, q: Vec2, r: Vec2| (q - p).perp_dot(r - p);
    let area = edge(a, b, c);
    if area.abs() < f32::EPSILON {
        draw_line(img, a, b);
        return;
    }
    let min = a.min(b).min(c).floor();
    let max = a.max(b).max(c).ceil();
    for y in min.y as i64..=max.y as i64 {
        for x in min.x as i64..=max.x as i64 {
            let p = Vec2::new(x as f32, y as f32);
            let w0 = edge(b, c, p) / area;
            let w1 = edge(c, a, p) / area;
            let w2 = edge(a, b, p) / area;
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                put(img, x, y);
            }
        }
    }
}

/// Evaluates `params` on `grid` and renders the heatmap (plus arrows when requested).
pub fn snapshot(
    params: &GaborParameters,
    grid: &GridSpec,
    settings: &HeatmapSettings,
) -> Result<RgbaImage, SnapshotError> {
    grid.validate()?;
    let field = evaluate(params, grid);
    let config = VisualizationConfig::from_settings(settings, field.range());
    let mut img = rasterize(&field, &config);
    if params.draw_sigma {
        draw_arrows(&mut img, grid, &sigma_arrows(params));
    }
    Ok(img)
}

pub fn save_png<P: AsRef<Path>>(
    path: P,
    params: &GaborParameters,
    grid: &GridSpec,
    settings: &HeatmapSettings,
) -> Result<(), SnapshotError> {
    let img = snapshot(params, grid, settings)?;
    img.save_with_format(path.as_ref(), ImageFormat::Png)?;
    tracing::info!(
        path = %path.as_ref().display(),
        width = img.width(),
        height = img.height(),
        "wrote snapshot"
    );
    Ok(())
}
