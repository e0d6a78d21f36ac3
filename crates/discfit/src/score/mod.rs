//! Masked aggregate scores of models against an image.
//!
//! Curve and band scores are maximized; the residual is a cost and is
//! minimized. Each call owns a fresh [`ScoreMask`] so a pixel contributes at
//! most once per call.

mod band;
mod curve;
mod mask;
mod residual;

pub use band::{score_annulus_band, BandScore};
pub use curve::{ellipse_visit_mask, score_ellipse_curve, BoundsPolicy, CurveSampling, CurveScore};
pub use mask::ScoreMask;
pub use residual::score_residual;
