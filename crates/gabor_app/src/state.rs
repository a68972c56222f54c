//! Explorer state: what the panel edits and what the heatmap currently shows.

use std::time::Instant;

use anyhow::Result;
use gabor_core::{
    evaluate, metrics, GaborParameters, GridSpec, HeatmapSettings, ValueRange,
    VisualizationConfig,
};
use gabor_gfx::HeatmapRenderer;

/// Work needed to bring the heatmap in line with the edited state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    None,
    /// Colormap options changed; the uploaded field is still valid.
    Recolor,
    /// A numeric parameter changed; the field must be evaluated again.
    Evaluate,
}

#[derive(Debug, Clone)]
pub struct ExplorerState {
    pub params: GaborParameters,
    pub heatmap: HeatmapSettings,
    pub grid: GridSpec,
    field_range: ValueRange,
    last_eval_ms: f64,
    shown: Option<(GaborParameters, HeatmapSettings)>,
}

impl ExplorerState {
    pub fn new(params: GaborParameters, heatmap: HeatmapSettings, grid: GridSpec) -> Self {
        Self {
            params,
            heatmap,
            grid,
            field_range: ValueRange::default(),
            last_eval_ms: 0.0,
            shown: None,
        }
    }

    pub fn field_range(&self) -> ValueRange {
        self.field_range
    }

    pub fn last_eval_ms(&self) -> f64 {
        self.last_eval_ms
    }

    pub fn visualization_config(&self) -> VisualizationConfig {
        VisualizationConfig::from_settings(&self.heatmap, self.field_range)
    }

    pub fn reset_parameters(&mut self) {
        self.params = GaborParameters {
            draw_sigma: self.params.draw_sigma,
            ..GaborParameters::default()
        };
    }

    /// The arrow checkbox only affects the overlay, never the field.
    pub fn refresh(&self) -> Refresh {
        match &self.shown {
            None => Refresh::Evaluate,
            Some((params, heatmap)) => {
                if without_overlay(params) != without_overlay(&self.params) {
                    Refresh::Evaluate
                } else if *heatmap != self.heatmap {
                    Refresh::Recolor
                } else {
                    Refresh::None
                }
            }
        }
    }

    /// Applies pending work to the renderer. Returns `true` when the renderer recreated its
    /// target texture.
    pub fn sync(&mut self, renderer: &mut HeatmapRenderer) -> Result<bool> {
        let refresh = self.refresh();
        let mut resized = false;
        match refresh {
            Refresh::None => return Ok(false),
            Refresh::Evaluate => {
                let started = Instant::now();
                let field = evaluate(&self.params, &self.grid);
                self.last_eval_ms = started.elapsed().as_secs_f64() * 1000.0;
                self.field_range = field.range();
                resized = renderer.upload_field(&field)?;
                tracing::debug!(
                    params = ?self.params,
                    eval_ms = self.last_eval_ms,
                    min = self.field_range.min,
                    max = self.field_range.max,
                    checksum = metrics::checksum(&field.values),
                    "re-evaluated field"
                );
            }
            Refresh::Recolor => {
                tracing::debug!(heatmap = ?self.heatmap, "recoloring heatmap");
            }
        }
        renderer.update_visualization_config(&self.visualization_config());
        renderer.render();
        self.shown = Some((self.params, self.heatmap));
        Ok(resized)
    }
}

fn without_overlay(params: &GaborParameters) -> GaborParameters {
    GaborParameters {
        draw_sigma: false,
        ..*params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gabor_core::Colormap;

    fn shown_state() -> ExplorerState {
        let mut state = ExplorerState::new(
            GaborParameters::default(),
            HeatmapSettings::default(),
            GridSpec::with_resolution(8),
        );
        state.shown = Some((state.params, state.heatmap));
        state
    }

    #[test]
    fn first_frame_evaluates() {
        let state = ExplorerState::new(
            GaborParameters::default(),
            HeatmapSettings::default(),
            GridSpec::default(),
        );
        assert_eq!(state.refresh(), Refresh::Evaluate);
    }

    #[test]
    fn slider_change_triggers_evaluation() {
        let mut state = shown_state();
        assert_eq!(state.refresh(), Refresh::None);
        state.params.phi = 1.0;
        assert_eq!(state.refresh(), Refresh::Evaluate);
    }

    #[test]
    fn checkbox_alone_needs_no_work() {
        let mut state = shown_state();
        state.params.draw_sigma = true;
        assert_eq!(state.refresh(), Refresh::None);
    }

    #[test]
    fn colormap_change_only_recolors() {
        let mut state = shown_state();
        state.heatmap.colormap = Colormap::Grayscale;
        assert_eq!(state.refresh(), Refresh::Recolor);
    }

    #[test]
    fn reset_keeps_overlay_choice() {
        let mut state = shown_state();
        state.params.alpha = 9.0;
        state.params.draw_sigma = true;
        state.reset_parameters();
        assert_eq!(state.params.alpha, 3.0);
        assert!(state.params.draw_sigma);
    }
}
