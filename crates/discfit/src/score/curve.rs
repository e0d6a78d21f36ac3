//! Intensity aggregated along a sampled ellipse.

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::model::EllipseCurve;
use crate::raster::Image;

use super::mask::ScoreMask;

/// What to do with curve samples that land outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Drop the sample; it contributes nothing.
    #[default]
    Skip,
    /// Fail the call with [`FitError::ModelOutOfBounds`].
    Reject,
}

/// Ellipse sampling controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSampling {
    /// Number of parametric samples over `t ∈ [0, 2π)`.
    pub samples: usize,
    /// Handling of samples outside the image.
    pub bounds: BoundsPolicy,
}

impl Default for CurveSampling {
    fn default() -> Self {
        Self {
            samples: 400,
            bounds: BoundsPolicy::Skip,
        }
    }
}

/// Result of scoring an ellipse curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveScore {
    /// Raw sum of intensity over distinct visited pixels.
    pub sum: f64,
    /// Number of distinct in-bounds pixels visited.
    pub unique_pixels: usize,
    /// Samples dropped by [`BoundsPolicy::Skip`].
    pub skipped_samples: usize,
}

/// Integer pixel hit by each parametric sample of the curve.
///
/// Samples `(r cos t, r cos(inc) sin t)` in the disc frame are rotated back
/// into image space. Center and offset are truncated separately, so the locus
/// is pulled toward the center symmetrically. Coordinates saturate at the
/// `i64` range, which is always outside the image.
pub(crate) fn curve_pixels(
    model: &EllipseCurve,
    samples: usize,
) -> Result<impl Iterator<Item = (i64, i64)>, FitError> {
    let frame = model.frame()?;
    let a = model.r;
    let b = model.r * frame.cos_inc();
    let to_image = Rotation2::new(-model.rot.to_radians());
    let ci = model.x_m.trunc() as i64;
    let cj = model.y_m.trunc() as i64;
    let n = samples.max(1);

    Ok((0..n).map(move |k| {
        let t = 2.0 * std::f64::consts::PI * (k as f64) / (n as f64);
        let off = to_image * Vector2::new(a * t.cos(), b * t.sin());
        (
            ci.saturating_add(off.x.trunc() as i64),
            cj.saturating_add(off.y.trunc() as i64),
        )
    }))
}

fn in_bounds(image_shape: (usize, usize), row: i64, col: i64) -> Option<(usize, usize)> {
    let (h, w) = image_shape;
    if row < 0 || col < 0 || row as usize >= h || col as usize >= w {
        None
    } else {
        Some((row as usize, col as usize))
    }
}

/// Sum image intensity along the ellipse, counting each pixel once.
pub fn score_ellipse_curve(
    model: &EllipseCurve,
    image: &Image,
    sampling: &CurveSampling,
) -> Result<CurveScore, FitError> {
    let shape = image.shape();
    let mut mask = ScoreMask::new(shape);
    let mut sum = 0.0;
    let mut skipped = 0usize;

    for (row, col) in curve_pixels(model, sampling.samples)? {
        let Some((r, c)) = in_bounds(shape, row, col) else {
            match sampling.bounds {
                BoundsPolicy::Skip => {
                    skipped += 1;
                    continue;
                }
                BoundsPolicy::Reject => {
                    return Err(FitError::ModelOutOfBounds {
                        row,
                        col,
                        height: shape.0,
                        width: shape.1,
                    })
                }
            }
        };
        if mask.visit(r, c) {
            sum += image.get(r, c);
        }
    }

    Ok(CurveScore {
        sum,
        unique_pixels: mask.unique(),
        skipped_samples: skipped,
    })
}

/// Visit counts of every curve sample over a grid of `shape`.
///
/// Unlike scoring, repeated hits accumulate; the result shows sampling
/// density along the locus.
pub fn ellipse_visit_mask(
    model: &EllipseCurve,
    shape: (usize, usize),
    sampling: &CurveSampling,
) -> Result<Image, FitError> {
    let mut mask = ScoreMask::new(shape);
    for (row, col) in curve_pixels(model, sampling.samples)? {
        match in_bounds(shape, row, col) {
            Some((r, c)) => {
                mask.visit(r, c);
            }
            None if sampling.bounds == BoundsPolicy::Reject => {
                return Err(FitError::ModelOutOfBounds {
                    row,
                    col,
                    height: shape.0,
                    width: shape.1,
                })
            }
            None => {}
        }
    }
    Ok(mask.to_image())
}
