//! discfit: parametric ring and disc model fitting for astronomical images.
//!
//! Fits elliptical curves, annular bands, and scattering-modulated surface
//! brightness rings to 2D intensity images of circumstellar discs. The
//! building blocks are:
//!
//! 1. **Geometry** – rotation about a center and deprojection by
//!    `cos(inclination)`.
//! 2. **Synthetic maps** – Gaussian radial ring profile, optionally modulated
//!    by an azimuthal Mie-like term or the Henyey-Greenstein phase function.
//! 3. **Scores** – deduplicated curve sums and band means, and an L1 residual
//!    for rendered maps.
//! 4. **Search** – exhaustive grid search, Powell refinement, and differential
//!    evolution with an optional Powell polish.
//!
//! # Public API
//! - [`Image`] as the input grid
//! - typed models ([`EllipseCurve`], [`AnnulusBand`], [`GaussianRing`], ...)
//!   and the tagged [`RingModel`]
//! - [`fit`] entry points and [`FitConfig`]
//! - the generic [`search`] strategies for custom objectives
//!
//! Everything is single-threaded and synchronous. Progress is reported through
//! [`SearchObserver`]; the library itself only emits `tracing` events.

mod error;
pub mod fit;
pub mod geometry;
mod model;
mod raster;
pub mod score;
pub mod search;
pub mod synth;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::FitError;
pub use fit::{FitConfig, SurfaceModelKind};
pub use geometry::{
    cut_ellipse, deproject, deproject_with_limit, disc_radius, rotate, DiscFrame,
    DEFAULT_MAX_DEPROJECTED_WIDTH,
};
pub use model::{
    AnnulusBand, EllipseCurve, GaussianRing, HenyeyGreensteinRing, MieGaussianRing, ModelKind,
    ModelParams, RingModel, MIN_THICKNESS,
};
pub use raster::Image;
pub use score::{
    ellipse_visit_mask, score_annulus_band, score_ellipse_curve, score_residual, BandScore,
    BoundsPolicy, CurveSampling, CurveScore,
};
pub use search::{
    NoopObserver, ParameterBox, SearchObserver, SearchResult, TracingObserver, TwoPhaseSearch,
};
pub use synth::{
    flat_annulus_map, gaussian_ring_map, henyey_greenstein_map, mie_ring_map,
};
