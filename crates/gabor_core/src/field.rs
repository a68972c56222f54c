//! Closed-form evaluation of the Gabor function over a sampling grid.

use std::f32::consts::TAU;

use glam::{Mat2, Vec2};

use crate::config::{GaborParameters, GridSpec};
use crate::metrics::ValueRange;
use crate::Scalar;

/// Field samples in row-major order; row `j` holds the `j`-th y coordinate ascending,
/// so row 0 is the bottom edge of the displayed image.
#[derive(Debug, Clone, PartialEq)]
pub struct GaborField {
    pub width: u32,
    pub height: u32,
    pub values: Vec<Scalar>,
}

impl GaborField {
    pub fn get(&self, col: u32, row: u32) -> Option<Scalar> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.values
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    pub fn shape(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn range(&self) -> ValueRange {
        ValueRange::of(&self.values).unwrap_or_default()
    }

    /// Bytes of one row as uploaded to an `R32Float` texture.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * core::mem::size_of::<Scalar>() as u32
    }
}

/// Rotates `point` into the envelope frame centred on `(x0, y0)` and turned by `theta`.
pub fn local_frame(point: Vec2, params: &GaborParameters) -> Vec2 {
    let offset = point - Vec2::new(params.x0, params.y0);
    Mat2::from_angle(-params.theta) * offset
}

/// Gabor value at a single point.
pub fn gabor(point: Vec2, params: &GaborParameters) -> Scalar {
    let p = local_frame(point, params);
    gabor_local(p, params)
}

#[inline]
fn gabor_local(p: Vec2, params: &GaborParameters) -> Scalar {
    let envelope =
        params.alpha * (-0.5 * (params.beta_x * p.x * p.x + params.beta_y * p.y * p.y)).exp();
    let carrier = (TAU * params.f * p.x + params.phi).cos();
    envelope * carrier
}

/// Evaluates the whole grid.
pub fn evaluate(params: &GaborParameters, grid: &GridSpec) -> GaborField {
    let coords = grid.coordinates();
    let rotation = Mat2::from_angle(-params.theta);
    let center = Vec2::new(params.x0, params.y0);

    let mut values = Vec::with_capacity(grid.sample_count());
    for &y in &coords {
        for &x in &coords {
            let p = rotation * (Vec2::new(x, y) - center);
            values.push(gabor_local(p, params));
        }
    }

    tracing::trace!(resolution = grid.resolution, "evaluated gabor field");
    GaborField {
        width: grid.resolution,
        height: grid.resolution,
        values,
    }
}

/// Evaluates paired sample arrays into an output of the same length.
///
/// # Panics
///
/// Panics if `xs` and `ys` differ in length.
pub fn evaluate_points(params: &GaborParameters, xs: &[Scalar], ys: &[Scalar]) -> Vec<Scalar> {
    assert_eq!(xs.len(), ys.len(), "sample arrays must have matching shapes");
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| gabor(Vec2::new(x, y), params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn local_frame_matches_explicit_rotation() {
        let params = GaborParameters {
            x0: 1.0,
            y0: -2.0,
            theta: 0.7,
            ..GaborParameters::default()
        };
        let point = Vec2::new(3.0, 0.5);
        let (dx, dy) = (point.x - params.x0, point.y - params.y0);
        let (s, c) = params.theta.sin_cos();
        let expected = Vec2::new(dx * c + dy * s, -dx * s + dy * c);
        assert!((local_frame(point, &params) - expected).length() < 1e-5);
    }

    #[test]
    fn quarter_turn_swaps_axes() {
        let params = GaborParameters {
            theta: FRAC_PI_2,
            ..GaborParameters::default()
        };
        let p = local_frame(Vec2::new(0.0, 2.0), &params);
        assert!((p - Vec2::new(2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn grid_and_point_evaluation_agree() {
        let params = GaborParameters::default();
        let grid = GridSpec::with_resolution(9);
        let field = evaluate(&params, &grid);
        let coords = grid.coordinates();
        for (row, &y) in coords.iter().enumerate() {
            for (col, &x) in coords.iter().enumerate() {
                let direct = gabor(Vec2::new(x, y), &params);
                let sampled = field.get(col as u32, row as u32).unwrap();
                assert!((direct - sampled).abs() < 1e-5);
            }
        }
        assert_eq!(field.get(9, 0), None);
    }

    #[test]
    fn evaluate_points_preserves_shape() {
        let params = GaborParameters::default();
        let xs = [0.0, 1.0, -4.0, 7.5];
        let ys = [0.0, -1.0, 2.0, 9.0];
        assert_eq!(evaluate_points(&params, &xs, &ys).len(), 4);
    }

    #[test]
    #[should_panic(expected = "sample arrays must have matching shapes")]
    fn evaluate_points_rejects_mismatched_arrays() {
        let params = GaborParameters::default();
        evaluate_points(&params, &[0.0, 1.0, 2.0], &[0.0]);
    }

    #[test]
    fn envelope_decays_away_from_center() {
        let params = GaborParameters {
            f: 0.01,
            ..GaborParameters::default()
        };
        let near = gabor(Vec2::new(0.5, 0.0), &params).abs();
        let far = gabor(Vec2::new(9.5, 9.5), &params).abs();
        assert!(near > far);
    }
}
