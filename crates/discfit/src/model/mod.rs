//! Ring model variants and their flat parameter-vector encoding.
//!
//! Optimizers work on `&[f64]`; [`ModelParams`] is the single place where a
//! vector is turned back into a validated model. Parameter order:
//!
//! | model                  | vector                                                   |
//! |------------------------|----------------------------------------------------------|
//! | [`EllipseCurve`]       | `r, inc, rot, x_m, y_m`                                  |
//! | [`AnnulusBand`]        | `r, th, inc, rot, x_m, y_m`                              |
//! | [`GaussianRing`]       | `r, th, inc, rot, x_m, y_m, surf, back`                  |
//! | [`MieGaussianRing`]    | `r, th, inc, rot, x_m, y_m, surf_0, surf_theta, theta_max, back` |
//! | [`HenyeyGreensteinRing`] | `r, th, inc, rot, x_m, y_m, g, surf, back`             |

mod types;

use serde::{Deserialize, Serialize};

use crate::error::FitError;

pub use types::{
    AnnulusBand, EllipseCurve, GaussianRing, HenyeyGreensteinRing, MieGaussianRing, MIN_THICKNESS,
};

/// Conversion between a typed model and its flat parameter vector.
pub trait ModelParams: Sized + Clone {
    /// Parameter names in vector order.
    const NAMES: &'static [&'static str];

    /// Flatten into vector order.
    fn to_vec(&self) -> Vec<f64>;

    /// Build a validated model from a vector in [`ModelParams::NAMES`] order.
    fn from_slice(x: &[f64]) -> Result<Self, FitError>;

    fn dim() -> usize {
        Self::NAMES.len()
    }
}

fn check_len(x: &[f64], expected: usize) -> Result<(), FitError> {
    if x.len() != expected {
        return Err(FitError::DimensionMismatch {
            expected,
            got: x.len(),
        });
    }
    Ok(())
}

impl ModelParams for EllipseCurve {
    const NAMES: &'static [&'static str] = &["r", "inc", "rot", "x_m", "y_m"];

    fn to_vec(&self) -> Vec<f64> {
        vec![self.r, self.inc, self.rot, self.x_m, self.y_m]
    }

    fn from_slice(x: &[f64]) -> Result<Self, FitError> {
        check_len(x, Self::NAMES.len())?;
        EllipseCurve::new(x[0], x[1], x[2], x[3], x[4])
    }
}

impl ModelParams for AnnulusBand {
    const NAMES: &'static [&'static str] = &["r", "th", "inc", "rot", "x_m", "y_m"];

    fn to_vec(&self) -> Vec<f64> {
        vec![self.r, self.th, self.inc, self.rot, self.x_m, self.y_m]
    }

    fn from_slice(x: &[f64]) -> Result<Self, FitError> {
        check_len(x, Self::NAMES.len())?;
        AnnulusBand::new(x[0], x[1], x[2], x[3], x[4], x[5])
    }
}

impl ModelParams for GaussianRing {
    const NAMES: &'static [&'static str] =
        &["r", "th", "inc", "rot", "x_m", "y_m", "surf", "back"];

    fn to_vec(&self) -> Vec<f64> {
        let mut v = self.band.to_vec();
        v.extend([self.surf, self.back]);
        v
    }

    fn from_slice(x: &[f64]) -> Result<Self, FitError> {
        check_len(x, Self::NAMES.len())?;
        GaussianRing::new(AnnulusBand::from_slice(&x[..6])?, x[6], x[7])
    }
}

impl ModelParams for MieGaussianRing {
    const NAMES: &'static [&'static str] = &[
        "r",
        "th",
        "inc",
        "rot",
        "x_m",
        "y_m",
        "surf_0",
        "surf_theta",
        "theta_max",
        "back",
    ];

    fn to_vec(&self) -> Vec<f64> {
        let mut v = self.ring.band.to_vec();
        v.extend([self.ring.surf, self.surf_theta, self.theta_max, self.ring.back]);
        v
    }

    fn from_slice(x: &[f64]) -> Result<Self, FitError> {
        check_len(x, Self::NAMES.len())?;
        let band = AnnulusBand::from_slice(&x[..6])?;
        MieGaussianRing::new(GaussianRing::new(band, x[6], x[9])?, x[7], x[8])
    }
}

impl ModelParams for HenyeyGreensteinRing {
    const NAMES: &'static [&'static str] =
        &["r", "th", "inc", "rot", "x_m", "y_m", "g", "surf", "back"];

    fn to_vec(&self) -> Vec<f64> {
        let mut v = self.ring.band.to_vec();
        v.extend([self.g, self.ring.surf, self.ring.back]);
        v
    }

    fn from_slice(x: &[f64]) -> Result<Self, FitError> {
        check_len(x, Self::NAMES.len())?;
        let band = AnnulusBand::from_slice(&x[..6])?;
        HenyeyGreensteinRing::new(GaussianRing::new(band, x[7], x[8])?, x[6])
    }
}

/// Discriminant of [`RingModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Ellipse,
    Annulus,
    Gaussian,
    Mie,
    HenyeyGreenstein,
    /// Top-hat annulus with `surf` inside the band and `back` outside.
    FlatAnnulus,
}

impl ModelKind {
    /// Parameter names in vector order.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Self::Ellipse => EllipseCurve::NAMES,
            Self::Annulus => AnnulusBand::NAMES,
            Self::Gaussian | Self::FlatAnnulus => GaussianRing::NAMES,
            Self::Mie => MieGaussianRing::NAMES,
            Self::HenyeyGreenstein => HenyeyGreensteinRing::NAMES,
        }
    }

    pub fn dim(self) -> usize {
        self.names().len()
    }

    /// Whether this model produces a brightness map compared by residual.
    pub fn is_surface(self) -> bool {
        !matches!(self, Self::Ellipse | Self::Annulus)
    }
}

/// Any ring model with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RingModel {
    Ellipse(EllipseCurve),
    Annulus(AnnulusBand),
    Gaussian(GaussianRing),
    Mie(MieGaussianRing),
    HenyeyGreenstein(HenyeyGreensteinRing),
    FlatAnnulus(GaussianRing),
}

impl RingModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Ellipse(_) => ModelKind::Ellipse,
            Self::Annulus(_) => ModelKind::Annulus,
            Self::Gaussian(_) => ModelKind::Gaussian,
            Self::Mie(_) => ModelKind::Mie,
            Self::HenyeyGreenstein(_) => ModelKind::HenyeyGreenstein,
            Self::FlatAnnulus(_) => ModelKind::FlatAnnulus,
        }
    }

    /// Build a validated model of `kind` from a vector.
    pub fn from_slice(kind: ModelKind, x: &[f64]) -> Result<Self, FitError> {
        Ok(match kind {
            ModelKind::Ellipse => Self::Ellipse(EllipseCurve::from_slice(x)?),
            ModelKind::Annulus => Self::Annulus(AnnulusBand::from_slice(x)?),
            ModelKind::Gaussian => Self::Gaussian(GaussianRing::from_slice(x)?),
            ModelKind::Mie => Self::Mie(MieGaussianRing::from_slice(x)?),
            ModelKind::HenyeyGreenstein => {
                Self::HenyeyGreenstein(HenyeyGreensteinRing::from_slice(x)?)
            }
            ModelKind::FlatAnnulus => Self::FlatAnnulus(GaussianRing::from_slice(x)?),
        })
    }

    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Self::Ellipse(m) => m.to_vec(),
            Self::Annulus(m) => m.to_vec(),
            Self::Gaussian(m) | Self::FlatAnnulus(m) => m.to_vec(),
            Self::Mie(m) => m.to_vec(),
            Self::HenyeyGreenstein(m) => m.to_vec(),
        }
    }

    /// Center-line ellipse, the geometry an overlay renderer draws.
    pub fn curve(&self) -> EllipseCurve {
        match self {
            Self::Ellipse(m) => *m,
            Self::Annulus(m) => m.curve(),
            Self::Gaussian(m) | Self::FlatAnnulus(m) => m.band.curve(),
            Self::Mie(m) => m.ring.band.curve(),
            Self::HenyeyGreenstein(m) => m.ring.band.curve(),
        }
    }

    /// Band extent, if the model has a thickness.
    pub fn band(&self) -> Option<AnnulusBand> {
        match self {
            Self::Ellipse(_) => None,
            Self::Annulus(m) => Some(*m),
            Self::Gaussian(m) | Self::FlatAnnulus(m) => Some(m.band),
            Self::Mie(m) => Some(m.ring.band),
            Self::HenyeyGreenstein(m) => Some(m.ring.band),
        }
    }
}
