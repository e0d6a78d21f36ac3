//! Objective functions over flat parameter vectors.
//!
//! [`Scorer`]s are maximized (grid search); [`CostFunction`]s are minimized
//! (Powell, differential evolution). [`ReciprocalScore`] bridges the two.

use crate::error::FitError;
use crate::model::{AnnulusBand, EllipseCurve, ModelKind, ModelParams, RingModel};
use crate::raster::Image;
use crate::score::{score_annulus_band, score_ellipse_curve, score_residual, CurveSampling};

/// Substituted for non-positive scores before taking the reciprocal.
pub const ZERO_SCORE_EPSILON: f64 = 1e-3;

/// Cost assigned to parameter vectors that do not form a valid model.
pub const INVALID_COST: f64 = 1e30;

/// Higher-is-better metric over a parameter vector.
pub trait Scorer {
    fn dim(&self) -> usize;
    fn score(&self, x: &[f64]) -> Result<f64, FitError>;
}

/// Lower-is-better metric over a parameter vector. Never fails: invalid
/// vectors map to [`INVALID_COST`].
pub trait CostFunction {
    fn dim(&self) -> usize;
    fn cost(&self, x: &[f64]) -> f64;
}

impl<T: Scorer + ?Sized> Scorer for &T {
    fn dim(&self) -> usize {
        (**self).dim()
    }
    fn score(&self, x: &[f64]) -> Result<f64, FitError> {
        (**self).score(x)
    }
}

impl<T: CostFunction + ?Sized> CostFunction for &T {
    fn dim(&self) -> usize {
        (**self).dim()
    }
    fn cost(&self, x: &[f64]) -> f64 {
        (**self).cost(x)
    }
}

/// `1 / max(score, ε)`.
#[inline]
pub fn reciprocal_cost(score: f64) -> f64 {
    1.0 / score.max(ZERO_SCORE_EPSILON)
}

/// Turns a scorer into a cost by reciprocation.
#[derive(Debug, Clone)]
pub struct ReciprocalScore<S>(pub S);

impl<S: Scorer> CostFunction for ReciprocalScore<S> {
    fn dim(&self) -> usize {
        self.0.dim()
    }

    fn cost(&self, x: &[f64]) -> f64 {
        match self.0.score(x) {
            Ok(s) => reciprocal_cost(s),
            Err(_) => INVALID_COST,
        }
    }
}

/// Scorer backed by a closure.
pub struct FnScorer<F> {
    dim: usize,
    f: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&[f64]) -> Result<f64, FitError>,
{
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<F> Scorer for FnScorer<F>
where
    F: Fn(&[f64]) -> Result<f64, FitError>,
{
    fn dim(&self) -> usize {
        self.dim
    }
    fn score(&self, x: &[f64]) -> Result<f64, FitError> {
        (self.f)(x)
    }
}

/// Cost backed by a closure.
pub struct FnCost<F> {
    dim: usize,
    f: F,
}

impl<F> FnCost<F>
where
    F: Fn(&[f64]) -> f64,
{
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<F> CostFunction for FnCost<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn dim(&self) -> usize {
        self.dim
    }
    fn cost(&self, x: &[f64]) -> f64 {
        (self.f)(x)
    }
}

/// Raw curve sum of an [`EllipseCurve`] vector against an image.
#[derive(Debug, Clone)]
pub struct CurveScorer<'a> {
    pub image: &'a Image,
    pub sampling: CurveSampling,
}

impl Scorer for CurveScorer<'_> {
    fn dim(&self) -> usize {
        EllipseCurve::dim()
    }

    fn score(&self, x: &[f64]) -> Result<f64, FitError> {
        let model = EllipseCurve::from_slice(x)?;
        Ok(score_ellipse_curve(&model, self.image, &self.sampling)?.sum)
    }
}

/// Mean band intensity of an [`AnnulusBand`] vector against an image.
#[derive(Debug, Clone, Copy)]
pub struct BandScorer<'a> {
    pub image: &'a Image,
}

impl Scorer for BandScorer<'_> {
    fn dim(&self) -> usize {
        AnnulusBand::dim()
    }

    fn score(&self, x: &[f64]) -> Result<f64, FitError> {
        let model = AnnulusBand::from_slice(x)?;
        Ok(score_annulus_band(&model, self.image)?.mean)
    }
}

/// L1 residual between a rendered surface model and an image.
#[derive(Debug, Clone, Copy)]
pub struct ResidualCost<'a> {
    pub kind: ModelKind,
    pub image: &'a Image,
}

impl ResidualCost<'_> {
    /// Residual for `x`, or the error that made it invalid.
    pub fn try_cost(&self, x: &[f64]) -> Result<f64, FitError> {
        let (h, w) = self.image.shape();
        let map = RingModel::from_slice(self.kind, x)?.render(h, w)?;
        score_residual(&map, self.image)
    }
}

impl CostFunction for ResidualCost<'_> {
    fn dim(&self) -> usize {
        self.kind.dim()
    }

    fn cost(&self, x: &[f64]) -> f64 {
        self.try_cost(x).unwrap_or(INVALID_COST)
    }
}
