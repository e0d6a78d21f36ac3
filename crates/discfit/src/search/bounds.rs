use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Per-parameter `[min, max]` bounds.
///
/// Continuous searches treat each pair as a closed interval. Grid search
/// enumerates `min, min + 1, ...` while the value stays strictly below `max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct ParameterBox {
    bounds: Vec<[f64; 2]>,
}

impl ParameterBox {
    /// Validate and build a box. Every pair must be finite with `min <= max`.
    pub fn new(bounds: Vec<[f64; 2]>) -> Result<Self, FitError> {
        if bounds.is_empty() {
            return Err(FitError::DimensionMismatch {
                expected: 1,
                got: 0,
            });
        }
        for (index, &[lo, hi]) in bounds.iter().enumerate() {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return Err(FitError::EmptyParameterBox { index });
            }
        }
        Ok(Self { bounds })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    #[inline]
    pub fn bounds(&self) -> &[[f64; 2]] {
        &self.bounds
    }

    /// Box midpoint.
    pub fn center(&self) -> Vec<f64> {
        self.bounds.iter().map(|[lo, hi]| 0.5 * (lo + hi)).collect()
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(&self.bounds)
                .all(|(v, [lo, hi])| *v >= *lo && *v <= *hi)
    }

    /// Clamp `x` into the box in place.
    pub fn clip(&self, x: &mut [f64]) {
        for (v, [lo, hi]) in x.iter_mut().zip(&self.bounds) {
            *v = v.clamp(*lo, *hi);
        }
    }

    pub(crate) fn ensure_dim(&self, expected: usize) -> Result<(), FitError> {
        if self.dim() != expected {
            return Err(FitError::DimensionMismatch {
                expected,
                got: self.dim(),
            });
        }
        Ok(())
    }

    /// Unit-step grid values per axis over the half-open ranges.
    pub fn grid_axes(&self) -> Result<Vec<Vec<f64>>, FitError> {
        self.bounds
            .iter()
            .enumerate()
            .map(|(index, &[lo, hi])| {
                let n = (hi - lo).ceil();
                if n < 1.0 {
                    return Err(FitError::EmptyParameterBox { index });
                }
                Ok((0..n as usize).map(|k| lo + k as f64).collect())
            })
            .collect()
    }
}

impl TryFrom<Vec<[f64; 2]>> for ParameterBox {
    type Error = FitError;

    fn try_from(bounds: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        Self::new(bounds)
    }
}

impl From<ParameterBox> for Vec<[f64; 2]> {
    fn from(b: ParameterBox) -> Self {
        b.bounds
    }
}
