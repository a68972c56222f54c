//! Shared configuration types: Gabor parameters, slider ranges, grid and heatmap settings.

use std::{f32::consts::PI, fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::colormap::Colormap;
use crate::metrics::ValueRange;
use crate::Scalar;

/// Parameter vector of a single Gabor function.
///
/// Defaults mirror the slider defaults of the control panel, so a preset that only
/// overrides a few fields still lands on a sensible picture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaborParameters {
    pub x0: Scalar,
    pub y0: Scalar,
    /// Orientation of the envelope frame in radians.
    pub theta: Scalar,
    /// Envelope precision along the local x axis (inverse variance).
    pub beta_x: Scalar,
    /// Envelope precision along the local y axis (inverse variance).
    pub beta_y: Scalar,
    pub alpha: Scalar,
    /// Spatial frequency of the carrier in cycles per unit.
    pub f: Scalar,
    pub phi: Scalar,
    pub draw_sigma: bool,
}

impl Default for GaborParameters {
    fn default() -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            theta: 2.0,
            beta_x: 0.1,
            beta_y: 0.03,
            alpha: 3.0,
            f: 0.15,
            phi: 0.0,
            draw_sigma: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("parameter `{name}` must be finite (got {value})")]
    NonFinite { name: &'static str, value: Scalar },
    #[error("envelope precision `{name}` must be positive (got {value})")]
    NonPositivePrecision { name: &'static str, value: Scalar },
}

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read preset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed preset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

impl GaborParameters {
    /// Reads a numeric parameter by its slider identity.
    pub fn value(&self, kind: ParameterKind) -> Scalar {
        match kind {
            ParameterKind::X0 => self.x0,
            ParameterKind::Y0 => self.y0,
            ParameterKind::Theta => self.theta,
            ParameterKind::BetaX => self.beta_x,
            ParameterKind::BetaY => self.beta_y,
            ParameterKind::Alpha => self.alpha,
            ParameterKind::Frequency => self.f,
            ParameterKind::Phase => self.phi,
        }
    }

    pub fn value_mut(&mut self, kind: ParameterKind) -> &mut Scalar {
        match kind {
            ParameterKind::X0 => &mut self.x0,
            ParameterKind::Y0 => &mut self.y0,
            ParameterKind::Theta => &mut self.theta,
            ParameterKind::BetaX => &mut self.beta_x,
            ParameterKind::BetaY => &mut self.beta_y,
            ParameterKind::Alpha => &mut self.alpha,
            ParameterKind::Frequency => &mut self.f,
            ParameterKind::Phase => &mut self.phi,
        }
    }

    /// Checks the domain constraints the sliders enforce interactively.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for kind in ParameterKind::ALL {
            let value = self.value(kind);
            if !value.is_finite() {
                return Err(ParameterError::NonFinite {
                    name: kind.name(),
                    value,
                });
            }
        }
        for (name, value) in [("beta_x", self.beta_x), ("beta_y", self.beta_y)] {
            if value <= 0.0 {
                return Err(ParameterError::NonPositivePrecision { name, value });
            }
        }
        Ok(())
    }

    /// Clamps every numeric field into its slider range.
    pub fn clamp_to_sliders(&mut self) {
        for spec in PARAMETER_SLIDERS {
            let slot = self.value_mut(spec.kind);
            *slot = spec.clamp(*slot);
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, PresetError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json_string(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a JSON preset, validates it and clamps it into the slider ranges.
    pub fn load_preset<P: AsRef<Path>>(path: P) -> Result<Self, PresetError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut params = Self::from_json_str(&json)?;
        params.clamp_to_sliders();
        tracing::debug!(path = %path.display(), ?params, "loaded parameter preset");
        Ok(params)
    }
}

/// Identity of each numeric slider on the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    X0,
    Y0,
    Theta,
    BetaX,
    BetaY,
    Alpha,
    Frequency,
    Phase,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 8] = [
        ParameterKind::X0,
        ParameterKind::Y0,
        ParameterKind::Theta,
        ParameterKind::BetaX,
        ParameterKind::BetaY,
        ParameterKind::Alpha,
        ParameterKind::Frequency,
        ParameterKind::Phase,
    ];

    /// Field name as it appears in presets and on the panel.
    pub fn name(self) -> &'static str {
        match self {
            ParameterKind::X0 => "x0",
            ParameterKind::Y0 => "y0",
            ParameterKind::Theta => "theta",
            ParameterKind::BetaX => "beta_x",
            ParameterKind::BetaY => "beta_y",
            ParameterKind::Alpha => "alpha",
            ParameterKind::Frequency => "f",
            ParameterKind::Phase => "phi",
        }
    }
}

/// Fixed range of one slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    pub kind: ParameterKind,
    pub min: Scalar,
    pub max: Scalar,
    pub step: Scalar,
    pub default: Scalar,
}

impl SliderSpec {
    pub fn label(&self) -> &'static str {
        self.kind.name()
    }

    pub fn clamp(&self, value: Scalar) -> Scalar {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: Scalar) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub const PARAMETER_SLIDERS: [SliderSpec; 8] = [
    SliderSpec {
        kind: ParameterKind::X0,
        min: -10.0,
        max: 10.0,
        step: 0.5,
        default: 0.0,
    },
    SliderSpec {
        kind: ParameterKind::Y0,
        min: -10.0,
        max: 10.0,
        step: 0.5,
        default: 0.0,
    },
    SliderSpec {
        kind: ParameterKind::Theta,
        min: 0.0,
        max: PI,
        step: PI / 16.0,
        default: 2.0,
    },
    SliderSpec {
        kind: ParameterKind::BetaX,
        min: 0.001,
        max: 1.0,
        step: 0.001,
        default: 0.1,
    },
    SliderSpec {
        kind: ParameterKind::BetaY,
        min: 0.001,
        max: 1.0,
        step: 0.001,
        default: 0.03,
    },
    SliderSpec {
        kind: ParameterKind::Alpha,
        min: 0.1,
        max: 10.0,
        step: 0.1,
        default: 3.0,
    },
    SliderSpec {
        kind: ParameterKind::Frequency,
        min: 0.01,
        max: 2.0,
        step: 0.05,
        default: 0.15,
    },
    SliderSpec {
        kind: ParameterKind::Phase,
        min: 0.0,
        max: 2.0 * PI,
        step: PI / 16.0,
        default: 0.0,
    },
];

pub fn slider(kind: ParameterKind) -> SliderSpec {
    // The table is ordered like the enum variants.
    PARAMETER_SLIDERS[kind as usize]
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid needs at least two samples per axis (got {0})")]
    TooFewSamples(u32),
    #[error("grid bounds must be finite with max > min (got [{min}, {max}])")]
    InvalidBounds { min: Scalar, max: Scalar },
}

/// Square sampling grid: `resolution` points per axis on `[min, max]`, endpoints included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub resolution: u32,
    pub min: Scalar,
    pub max: Scalar,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            resolution: 500,
            min: -10.0,
            max: 10.0,
        }
    }
}

impl GridSpec {
    pub fn with_resolution(resolution: u32) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.resolution < 2 {
            return Err(GridError::TooFewSamples(self.resolution));
        }
        if !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min {
            return Err(GridError::InvalidBounds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn spacing(&self) -> Scalar {
        (self.max - self.min) / (self.resolution.max(2) - 1) as Scalar
    }

    /// Coordinate of sample `index` along either axis.
    pub fn coordinate(&self, index: u32) -> Scalar {
        if index + 1 >= self.resolution {
            // Pin the last sample to the bound instead of accumulating rounding.
            return self.max;
        }
        self.min + index as Scalar * self.spacing()
    }

    pub fn coordinates(&self) -> Vec<Scalar> {
        (0..self.resolution).map(|i| self.coordinate(i)).collect()
    }

    /// `(min, max)` of the displayed image on both axes.
    pub fn extent(&self) -> (Scalar, Scalar) {
        (self.min, self.max)
    }

    pub fn sample_count(&self) -> usize {
        self.resolution as usize * self.resolution as usize
    }
}

/// Heatmap uniform shared between the CPU rasterizer and the WGSL render pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VisualizationConfig {
    pub colormap_index: u32,
    pub invert: u32,
    pub value_min: Scalar,
    pub value_max: Scalar,
}

const _: () = assert!(core::mem::size_of::<VisualizationConfig>() == 16);

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            colormap_index: Colormap::default().index(),
            invert: 0,
            value_min: 0.0,
            value_max: 1.0,
        }
    }
}

impl VisualizationConfig {
    pub fn from_settings(settings: &HeatmapSettings, range: ValueRange) -> Self {
        let range = if settings.symmetric_range {
            range.symmetric()
        } else {
            range
        };
        Self {
            colormap_index: settings.colormap.index(),
            invert: u32::from(settings.invert),
            value_min: range.min,
            value_max: range.max,
        }
    }

    pub fn colormap(&self) -> Colormap {
        Colormap::from_index(self.colormap_index)
    }

    /// Maps a field value into `[0, 1]` the same way the render pass does.
    pub fn normalize(&self, value: Scalar) -> Scalar {
        let t = ValueRange {
            min: self.value_min,
            max: self.value_max,
        }
        .normalize(value);
        if self.invert != 0 {
            1.0 - t
        } else {
            t
        }
    }
}

/// User-facing heatmap options edited on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapSettings {
    pub colormap: Colormap,
    pub invert: bool,
    pub symmetric_range: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_slider_table() {
        let params = GaborParameters::default();
        for spec in PARAMETER_SLIDERS {
            assert_eq!(params.value(spec.kind), spec.default, "{}", spec.label());
            assert!(spec.contains(spec.default), "{}", spec.label());
            assert!(spec.step > 0.0 && spec.min < spec.max);
        }
        assert!(!params.draw_sigma);
        params.validate().unwrap();
    }

    #[test]
    fn slider_lookup_follows_kind_order() {
        for (position, kind) in ParameterKind::ALL.into_iter().enumerate() {
            assert_eq!(kind as usize, position);
            assert_eq!(PARAMETER_SLIDERS[position].kind, kind);
            assert_eq!(slider(kind).kind, kind);
        }
        assert_eq!(slider(ParameterKind::Phase).max, 2.0 * PI);
    }

    #[test]
    fn validate_rejects_zero_precision_and_nan() {
        let mut params = GaborParameters::default();
        params.beta_y = 0.0;
        assert_eq!(
            params.validate(),
            Err(ParameterError::NonPositivePrecision {
                name: "beta_y",
                value: 0.0
            })
        );

        let mut params = GaborParameters::default();
        params.f = f32::NAN;
        assert!(matches!(
            params.validate(),
            Err(ParameterError::NonFinite { name: "f", .. })
        ));
    }

    #[test]
    fn clamp_pulls_values_into_slider_ranges() {
        let mut params = GaborParameters {
            x0: -42.0,
            beta_x: 5.0,
            alpha: 0.0,
            ..GaborParameters::default()
        };
        params.clamp_to_sliders();
        assert_eq!(params.x0, -10.0);
        assert_eq!(params.beta_x, 1.0);
        assert_eq!(params.alpha, 0.1);
        assert_eq!(params.theta, 2.0);
    }

    #[test]
    fn partial_preset_falls_back_to_defaults() {
        let params = GaborParameters::from_json_str(r#"{"x0": 2.5, "draw_sigma": true}"#).unwrap();
        assert_eq!(params.x0, 2.5);
        assert!(params.draw_sigma);
        assert_eq!(params.beta_y, 0.03);
    }

    #[test]
    fn preset_with_negative_precision_is_rejected() {
        let err = GaborParameters::from_json_str(r#"{"beta_x": -1.0}"#).unwrap_err();
        assert!(matches!(err, PresetError::Parameter(_)));
    }

    #[test]
    fn grid_coordinates_include_endpoints() {
        let grid = GridSpec::default();
        let coords = grid.coordinates();
        assert_eq!(coords.len(), 500);
        assert_eq!(coords[0], -10.0);
        assert_eq!(coords[499], 10.0);
        assert!((grid.spacing() - 20.0 / 499.0).abs() < 1e-6);
        assert_eq!(grid.sample_count(), 250_000);
    }

    #[test]
    fn degenerate_grids_are_rejected() {
        assert_eq!(
            GridSpec::with_resolution(1).validate(),
            Err(GridError::TooFewSamples(1))
        );
        let inverted = GridSpec {
            resolution: 8,
            min: 1.0,
            max: -1.0,
        };
        assert!(matches!(
            inverted.validate(),
            Err(GridError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn visualization_config_applies_symmetric_range_and_invert() {
        let settings = HeatmapSettings {
            colormap: Colormap::Coolwarm,
            invert: true,
            symmetric_range: true,
        };
        let cfg = VisualizationConfig::from_settings(&settings, ValueRange { min: -1.0, max: 3.0 });
        assert_eq!(cfg.value_min, -3.0);
        assert_eq!(cfg.value_max, 3.0);
        assert_eq!(cfg.colormap(), Colormap::Coolwarm);
        assert_eq!(cfg.normalize(3.0), 0.0);
        assert_eq!(cfg.normalize(-3.0), 1.0);
    }
}
