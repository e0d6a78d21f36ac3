//! Exhaustive search over unit-step parameter grids.

use serde::{Deserialize, Serialize};

use crate::error::FitError;

use super::bounds::ParameterBox;
use super::config::GridSearchConfig;
use super::objective::Scorer;
use super::observer::SearchObserver;
use super::result::{ObjectiveSense, SearchMethod, SearchResult};

/// Dense N-dimensional array of grid scores, row-major (last axis fastest).
///
/// Cell `idx` holds the score at `axes[k][idx[k]]` for every axis `k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreGrid {
    pub axes: Vec<Vec<f64>>,
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl ScoreGrid {
    fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1usize; self.shape.len()];
        for k in (0..self.shape.len().saturating_sub(1)).rev() {
            strides[k] = strides[k + 1] * self.shape[k + 1];
        }
        strides
    }

    /// Multi-index of flat cell `flat`.
    pub fn unravel(&self, mut flat: usize) -> Vec<usize> {
        let strides = self.strides();
        strides
            .iter()
            .map(|s| {
                let i = flat / s;
                flat %= s;
                i
            })
            .collect()
    }

    pub fn get(&self, idx: &[usize]) -> Option<f64> {
        if idx.len() != self.shape.len() || idx.iter().zip(&self.shape).any(|(i, n)| i >= n) {
            return None;
        }
        let flat: usize = idx.iter().zip(self.strides()).map(|(i, s)| i * s).sum();
        self.values.get(flat).copied()
    }

    /// Parameter vector at multi-index `idx`.
    pub fn params_at(&self, idx: &[usize]) -> Vec<f64> {
        idx.iter().zip(&self.axes).map(|(&i, axis)| axis[i]).collect()
    }

    /// First cell holding the largest score. NaN never wins.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &v) in self.values.iter().enumerate() {
            if v.is_nan() {
                continue;
            }
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((i, v)),
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Grid search result with the full score array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearchOutcome {
    pub result: SearchResult,
    pub scores: ScoreGrid,
}

/// Score every cell of the unit-step grid spanned by `bounds` and return the
/// maximum.
///
/// Cost grows with the product of the axis lengths, so the cell count is
/// checked against `config.max_cells` before any evaluation. Scorer errors
/// abort the search.
pub fn grid_search<S: Scorer>(
    scorer: &S,
    bounds: &ParameterBox,
    config: &GridSearchConfig,
    observer: &mut dyn SearchObserver,
) -> Result<GridSearchOutcome, FitError> {
    bounds.ensure_dim(scorer.dim())?;
    let axes = bounds.grid_axes()?;
    let shape: Vec<usize> = axes.iter().map(Vec::len).collect();

    let cells = shape
        .iter()
        .try_fold(1u128, |acc, &n| acc.checked_mul(n as u128))
        .unwrap_or(u128::MAX);
    if cells > config.max_cells as u128 {
        tracing::warn!(cells = %cells, limit = config.max_cells, "grid search refused");
        return Err(FitError::GridTooLarge {
            cells,
            limit: config.max_cells as u128,
        });
    }
    let total = cells as usize;

    let mut values = Vec::with_capacity(total);
    let mut idx = vec![0usize; shape.len()];
    let mut params: Vec<f64> = axes.iter().map(|a| a[0]).collect();
    let mut best = f64::NEG_INFINITY;

    for cell in 0..total {
        let s = scorer.score(&params)?;
        values.push(s);
        if s > best {
            best = s;
            observer.on_iteration(cell, &params, s);
        }
        observer.on_progress(cell as u64 + 1, total as u64);

        // Odometer increment, last axis fastest.
        for k in (0..shape.len()).rev() {
            idx[k] += 1;
            if idx[k] < shape[k] {
                params[k] = axes[k][idx[k]];
                break;
            }
            idx[k] = 0;
            params[k] = axes[k][0];
        }
    }

    let scores = ScoreGrid {
        axes,
        shape,
        values,
    };
    let best_flat = scores.argmax().unwrap_or(0);
    let best_idx = scores.unravel(best_flat);
    let best_params = scores.params_at(&best_idx);
    let value = scores.values[best_flat];

    tracing::debug!(cells = total, value, params = ?best_params, "grid search done");

    Ok(GridSearchOutcome {
        result: SearchResult {
            method: SearchMethod::Grid,
            params: best_params,
            value,
            sense: ObjectiveSense::Maximize,
            converged: true,
            evaluations: total,
            iterations: total,
        },
        scores,
    })
}
