//! Numeric summaries over field samples: value ranges for normalization and a checksum.

use serde::{Deserialize, Serialize};

use crate::Scalar;

/// Closed interval of field values used to normalize the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: Scalar,
    pub max: Scalar,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl ValueRange {
    /// Min/max over the finite samples, `None` when there are none.
    pub fn of(values: &[Scalar]) -> Option<Self> {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Self { min: v, max: v }),
                Some(r) => Some(Self {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    /// Widens the range to `[-m, m]` around zero.
    pub fn symmetric(self) -> Self {
        let m = self.min.abs().max(self.max.abs());
        Self { min: -m, max: m }
    }

    pub fn span(&self) -> Scalar {
        self.max - self.min
    }

    /// Maps `value` into `[0, 1]`; a degenerate range maps everything to 0.
    pub fn normalize(&self, value: Scalar) -> Scalar {
        let span = self.span();
        if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Computes a simple checksum over field samples.
pub fn checksum(values: &[Scalar]) -> Scalar {
    values.iter().copied().fold(0.0, |acc, v| acc + v)
}
