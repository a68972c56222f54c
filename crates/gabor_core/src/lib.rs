//! Core Gabor explorer domain logic that stays independent of GPU backends or UI shells.
//!
//! This crate hosts:
//! - the parameter record, slider table and grid description shared with the UI
//! - the closed-form field evaluator
//! - geometry for the standard-deviation annotation arrows
//! - colormaps and a CPU rasterizer used for PNG snapshots

pub mod annotation;
pub mod colormap;
pub mod config;
pub mod field;
pub mod metrics;
pub mod render;

/// Convenience re-export for the scalar type used across the explorer.
pub type Scalar = f32;

pub fn version_string() -> &'static str {
    concat!("gabor_core ", env!("CARGO_PKG_VERSION"))
}

pub use annotation::{sigma_arrows, sigmas, SigmaArrow, SigmaAxis};
pub use colormap::Colormap;
pub use config::{GaborParameters, GridSpec, HeatmapSettings, VisualizationConfig};
pub use field::{evaluate, gabor, GaborField};
pub use metrics::ValueRange;
