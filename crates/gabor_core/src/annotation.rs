//! Geometry of the standard-deviation arrows drawn over the envelope.

use glam::{Mat2, Vec2};

use crate::config::GaborParameters;
use crate::Scalar;

/// Full width of the arrow head in data units.
pub const HEAD_WIDTH: Scalar = 0.2;
/// Length of the arrow head in data units; part of the arrow's total length.
pub const HEAD_LENGTH: Scalar = 0.3;
/// Vertical offset of the label above the arrow tip, in data units.
pub const LABEL_OFFSET: Scalar = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigmaAxis {
    X,
    Y,
}

impl SigmaAxis {
    pub fn label(self) -> &'static str {
        match self {
            SigmaAxis::X => "σx",
            SigmaAxis::Y => "σy",
        }
    }
}

/// One labelled arrow from the envelope center along a principal axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmaArrow {
    pub axis: SigmaAxis,
    pub start: Vec2,
    pub end: Vec2,
    /// Where the shaft meets the base of the head.
    pub shaft_end: Vec2,
    /// Head triangle: tip, then the two base corners.
    pub head: [Vec2; 3],
    /// Anchor for a horizontally centred label just above the tip.
    pub label_anchor: Vec2,
}

impl SigmaArrow {
    fn new(axis: SigmaAxis, start: Vec2, end: Vec2) -> Self {
        let delta = end - start;
        let length = delta.length();
        let dir = delta.normalize_or_zero();
        let shaft_end = if length > HEAD_LENGTH {
            end - dir * HEAD_LENGTH
        } else {
            start
        };
        let half = dir.perp() * (HEAD_WIDTH * 0.5);
        Self {
            axis,
            start,
            end,
            shaft_end,
            head: [end, shaft_end + half, shaft_end - half],
            label_anchor: end + Vec2::new(0.0, LABEL_OFFSET),
        }
    }

    pub fn length(&self) -> Scalar {
        (self.end - self.start).length()
    }

    pub fn label(&self) -> &'static str {
        self.axis.label()
    }
}

/// Standard deviations `(sigma_x, sigma_y)` implied by the envelope precisions.
pub fn sigmas(params: &GaborParameters) -> (Scalar, Scalar) {
    (params.beta_x.sqrt().recip(), params.beta_y.sqrt().recip())
}

/// Arrows along the rotated local x and y axes, each one standard deviation long.
pub fn sigma_arrows(params: &GaborParameters) -> [SigmaArrow; 2] {
    let center = Vec2::new(params.x0, params.y0);
    let (sigma_x, sigma_y) = sigmas(params);
    let rotation = Mat2::from_angle(params.theta);
    [
        SigmaArrow::new(
            SigmaAxis::X,
            center,
            center + rotation * Vec2::new(sigma_x, 0.0),
        ),
        SigmaArrow::new(
            SigmaAxis::Y,
            center,
            center + rotation * Vec2::new(0.0, sigma_y),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_endpoints_follow_rotated_axes() {
        let params = GaborParameters {
            x0: 1.0,
            y0: 2.0,
            theta: 0.4,
            beta_x: 0.25,
            beta_y: 0.04,
            ..GaborParameters::default()
        };
        let [ax, ay] = sigma_arrows(&params);
        let (s, c) = params.theta.sin_cos();
        assert!((ax.end - Vec2::new(1.0 + 2.0 * c, 2.0 + 2.0 * s)).length() < 1e-5);
        assert!((ay.end - Vec2::new(1.0 - 5.0 * s, 2.0 + 5.0 * c)).length() < 1e-5);
        assert!((ax.label_anchor - (ax.end + Vec2::new(0.0, 0.3))).length() < 1e-6);
        assert_eq!(ax.label(), "σx");
        assert_eq!(ay.label(), "σy");
    }

    #[test]
    fn head_is_included_in_length() {
        let params = GaborParameters {
            theta: 0.0,
            beta_x: 1.0,
            ..GaborParameters::default()
        };
        let [ax, _] = sigma_arrows(&params);
        assert!((ax.shaft_end - Vec2::new(0.7, 0.0)).length() < 1e-5);
        let [tip, left, right] = ax.head;
        assert_eq!(tip, ax.end);
        assert!(((left - right).length() - HEAD_WIDTH).abs() < 1e-5);
    }

    #[test]
    fn short_arrow_collapses_shaft() {
        let start = Vec2::new(0.0, 0.0);
        let arrow = SigmaArrow::new(SigmaAxis::X, start, Vec2::new(0.1, 0.0));
        assert_eq!(arrow.shaft_end, start);
    }
}
