//! Command line for the explorer binary.

use std::path::PathBuf;

use clap::Parser;
use gabor_core::{Colormap, GridSpec, HeatmapSettings};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "gabor-explorer",
    version,
    about = "Interactive 2D Gabor function visualization"
)]
pub struct Cli {
    /// JSON preset with Gabor parameters; missing fields keep their slider defaults.
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Write a PNG snapshot and exit without opening a window.
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Samples per axis on [-10, 10].
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(2..=4096))]
    pub resolution: u32,

    /// Start with the standard-deviation arrows enabled.
    #[arg(long)]
    pub draw_sigma: bool,

    #[arg(long, default_value = "viridis", value_parser = parse_colormap)]
    pub colormap: Colormap,

    /// Normalize the heatmap symmetrically around zero.
    #[arg(long)]
    pub symmetric_range: bool,

    /// Close the window after this many milliseconds.
    #[arg(long, value_name = "MS")]
    pub exit_after_ms: Option<u64>,
}

impl Cli {
    pub fn grid(&self) -> GridSpec {
        GridSpec::with_resolution(self.resolution)
    }

    pub fn heatmap_settings(&self) -> HeatmapSettings {
        HeatmapSettings {
            colormap: self.colormap,
            symmetric_range: self.symmetric_range,
            ..HeatmapSettings::default()
        }
    }
}

fn parse_colormap(name: &str) -> Result<Colormap, String> {
    Colormap::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Colormap::ALL.iter().map(|c| c.name()).collect();
        format!("unknown colormap `{name}` (expected one of {})", known.join(", "))
    })
}
