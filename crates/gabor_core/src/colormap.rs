//! Colormap ramps shared by the CPU rasterizer and the heatmap shader.
//!
//! Control points are sRGB bytes; `visualize.wgsl` carries the same tables.

use serde::{Deserialize, Serialize};

use crate::Scalar;

const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

const GRAYSCALE: [[u8; 3]; 2] = [[0, 0, 0], [255, 255, 255]];

const COOLWARM: [[u8; 3]; 5] = [
    [59, 76, 192],
    [124, 159, 249],
    [221, 221, 221],
    [244, 154, 123],
    [180, 4, 38],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Viridis,
    Grayscale,
    Coolwarm,
}

impl Colormap {
    pub const ALL: [Colormap; 3] = [Colormap::Viridis, Colormap::Grayscale, Colormap::Coolwarm];

    /// Index consumed by the shader's `colormap_index` switch.
    pub fn index(self) -> u32 {
        match self {
            Colormap::Viridis => 0,
            Colormap::Grayscale => 1,
            Colormap::Coolwarm => 2,
        }
    }

    pub fn from_index(index: u32) -> Self {
        match index {
            1 => Colormap::Grayscale,
            2 => Colormap::Coolwarm,
            _ => Colormap::Viridis,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Colormap::Viridis => "viridis",
            Colormap::Grayscale => "grayscale",
            Colormap::Coolwarm => "coolwarm",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// sRGB control points, evenly spaced over `[0, 1]`.
    pub fn control_points(self) -> &'static [[u8; 3]] {
        match self {
            Colormap::Viridis => &VIRIDIS,
            Colormap::Grayscale => &GRAYSCALE,
            Colormap::Coolwarm => &COOLWARM,
        }
    }

    /// sRGB color at `t`, clamped to `[0, 1]`, interpolated linearly between control points.
    pub fn sample(self, t: Scalar) -> [u8; 3] {
        let table = self.control_points();
        let segments = table.len() - 1;
        let x = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) } * segments as Scalar;
        let i = (x.floor() as usize).min(segments - 1);
        let frac = x - i as Scalar;
        let (lo, hi) = (table[i], table[i + 1]);
        let mut out = [0u8; 3];
        for c in 0..3 {
            let v = lo[c] as Scalar + frac * (hi[c] as Scalar - lo[c] as Scalar);
            out[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_tables() {
        assert_eq!(Colormap::Viridis.sample(0.0), [68, 1, 84]);
        assert_eq!(Colormap::Viridis.sample(1.0), [253, 231, 37]);
        assert_eq!(Colormap::Grayscale.sample(1.0), [255, 255, 255]);
        assert_eq!(Colormap::Coolwarm.sample(0.5), [221, 221, 221]);
    }

    #[test]
    fn out_of_range_inputs_clamp() {
        assert_eq!(Colormap::Viridis.sample(-3.0), Colormap::Viridis.sample(0.0));
        assert_eq!(Colormap::Viridis.sample(7.0), Colormap::Viridis.sample(1.0));
        assert_eq!(Colormap::Grayscale.sample(f32::NAN), [0, 0, 0]);
    }

    #[test]
    fn grayscale_is_linear() {
        assert_eq!(Colormap::Grayscale.sample(0.5), [128, 128, 128]);
    }

    #[test]
    fn index_and_name_round_trip() {
        for map in Colormap::ALL {
            assert_eq!(Colormap::from_index(map.index()), map);
            assert_eq!(Colormap::from_name(map.name()), Some(map));
        }
        assert_eq!(Colormap::from_index(99), Colormap::Viridis);
        assert_eq!(Colormap::from_name("Jet"), None);
    }
}
