//! Centralized storage for WGSL shader sources.

pub mod render {
    /// Fullscreen heatmap pass: `fullscreen_vertex` + `visualize_fragment`.
    pub const VISUALIZE: &str = include_str!("kernels/visualize.wgsl");

    pub const VERTEX_ENTRY: &str = "fullscreen_vertex";
    pub const FRAGMENT_ENTRY: &str = "visualize_fragment";
}
