//! Typed parameter sets for each ring model.
//!
//! Angles (`inc`, `rot`, `theta_max`) are in degrees; lengths and centers in
//! pixels. Constructors validate ranges and clamp thickness.

use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::geometry::{cos_inclination, DiscFrame};

/// Thinnest band allowed, in pixels.
pub const MIN_THICKNESS: f64 = 1.0;

pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, FitError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FitError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, FitError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FitError::InvalidParameter {
            name,
            value,
            reason: "must be finite and non-negative",
        })
    }
}

fn inclination(value: f64) -> Result<f64, FitError> {
    cos_inclination(value)?;
    Ok(value)
}

/// Infinitely thin elliptical curve: a circle of radius `r` seen at
/// inclination `inc`, rotated by `rot`, centered at `(x_m, y_m)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EllipseCurveFields")]
pub struct EllipseCurve {
    pub r: f64,
    pub inc: f64,
    pub rot: f64,
    pub x_m: f64,
    pub y_m: f64,
}

impl EllipseCurve {
    pub fn new(r: f64, inc: f64, rot: f64, x_m: f64, y_m: f64) -> Result<Self, FitError> {
        Ok(Self {
            r: non_negative("r", r)?,
            inc: inclination(inc)?,
            rot: finite("rot", rot)?,
            x_m: finite("x_m", x_m)?,
            y_m: finite("y_m", y_m)?,
        })
    }

    pub fn validated(&self) -> Result<Self, FitError> {
        Self::new(self.r, self.inc, self.rot, self.x_m, self.y_m)
    }

    /// Disc-plane frame for this geometry.
    pub fn frame(&self) -> Result<DiscFrame, FitError> {
        DiscFrame::new(self.inc, self.rot, self.x_m, self.y_m)
    }
}

/// Elliptical band of thickness `th` centered on radius `r`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnnulusBandFields")]
pub struct AnnulusBand {
    pub r: f64,
    pub th: f64,
    pub inc: f64,
    pub rot: f64,
    pub x_m: f64,
    pub y_m: f64,
}

impl AnnulusBand {
    /// Build a band; `th` below [`MIN_THICKNESS`] is clamped, not rejected.
    pub fn new(r: f64, th: f64, inc: f64, rot: f64, x_m: f64, y_m: f64) -> Result<Self, FitError> {
        let curve = EllipseCurve::new(r, inc, rot, x_m, y_m)?;
        let th = finite("th", th)?.max(MIN_THICKNESS);
        Ok(Self::from_curve(curve, th))
    }

    pub(crate) fn from_curve(curve: EllipseCurve, th: f64) -> Self {
        Self {
            r: curve.r,
            th: th.max(MIN_THICKNESS),
            inc: curve.inc,
            rot: curve.rot,
            x_m: curve.x_m,
            y_m: curve.y_m,
        }
    }

    /// Re-run construction checks on a band whose fields were set directly.
    pub fn validated(&self) -> Result<Self, FitError> {
        Self::new(self.r, self.th, self.inc, self.rot, self.x_m, self.y_m)
    }

    /// Center-line ellipse of the band.
    pub fn curve(&self) -> EllipseCurve {
        EllipseCurve {
            r: self.r,
            inc: self.inc,
            rot: self.rot,
            x_m: self.x_m,
            y_m: self.y_m,
        }
    }

    pub fn frame(&self) -> Result<DiscFrame, FitError> {
        self.curve().frame()
    }

    /// Thickness with the 1-pixel floor applied.
    #[inline]
    pub fn thickness(&self) -> f64 {
        self.th.max(MIN_THICKNESS)
    }

    /// `[r - th/2, r + th/2]`.
    #[inline]
    pub fn radial_bounds(&self) -> [f64; 2] {
        let hw = 0.5 * self.thickness();
        [self.r - hw, self.r + hw]
    }

    /// Strict double-sided membership test on a deprojected radius.
    #[inline]
    pub fn contains_radius(&self, z: f64) -> bool {
        let [lo, hi] = self.radial_bounds();
        z > lo && z < hi
    }
}

/// Band with a Gaussian radial brightness profile on a constant background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GaussianRingFields")]
pub struct GaussianRing {
    #[serde(flatten)]
    pub band: AnnulusBand,
    /// Peak surface brightness above background.
    pub surf: f64,
    /// Background level.
    pub back: f64,
}

impl GaussianRing {
    pub fn new(band: AnnulusBand, surf: f64, back: f64) -> Result<Self, FitError> {
        Ok(Self {
            band: band.validated()?,
            surf: finite("surf", surf)?,
            back: finite("back", back)?,
        })
    }
}

/// Gaussian ring whose peak brightness varies with azimuth like forward
/// scattering: `surf_0 + surf_theta * cos²((theta_max - θ + π) / 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MieGaussianRingFields")]
pub struct MieGaussianRing {
    /// Base ring; `ring.surf` is the baseline brightness `surf_0`.
    #[serde(flatten)]
    pub ring: GaussianRing,
    /// Azimuthal modulation amplitude.
    pub surf_theta: f64,
    /// Azimuth of peak brightness, degrees.
    pub theta_max: f64,
}

impl MieGaussianRing {
    pub fn new(ring: GaussianRing, surf_theta: f64, theta_max: f64) -> Result<Self, FitError> {
        Ok(Self {
            ring: GaussianRing::new(ring.band, ring.surf, ring.back)?,
            surf_theta: finite("surf_theta", surf_theta)?,
            theta_max: finite("theta_max", theta_max)?,
        })
    }

    #[inline]
    pub fn surf_0(&self) -> f64 {
        self.ring.surf
    }
}

/// Gaussian ring modulated by the Henyey-Greenstein phase function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HenyeyGreensteinRingFields")]
pub struct HenyeyGreensteinRing {
    #[serde(flatten)]
    pub ring: GaussianRing,
    /// Scattering asymmetry, `-1 < g < 1`.
    pub g: f64,
}

impl HenyeyGreensteinRing {
    pub fn new(ring: GaussianRing, g: f64) -> Result<Self, FitError> {
        if !(g.is_finite() && g > -1.0 && g < 1.0) {
            return Err(FitError::InvalidParameter {
                name: "g",
                value: g,
                reason: "must lie in (-1, 1)",
            });
        }
        Ok(Self {
            ring: GaussianRing::new(ring.band, ring.surf, ring.back)?,
            g,
        })
    }
}

// Deserialized models go through the constructors above. The field structs
// carry the wire layout; `try_from` applies the same checks as `new`.

#[derive(Deserialize)]
struct EllipseCurveFields {
    r: f64,
    inc: f64,
    rot: f64,
    x_m: f64,
    y_m: f64,
}

impl TryFrom<EllipseCurveFields> for EllipseCurve {
    type Error = FitError;

    fn try_from(v: EllipseCurveFields) -> Result<Self, Self::Error> {
        Self::new(v.r, v.inc, v.rot, v.x_m, v.y_m)
    }
}

#[derive(Deserialize)]
struct AnnulusBandFields {
    r: f64,
    th: f64,
    inc: f64,
    rot: f64,
    x_m: f64,
    y_m: f64,
}

impl TryFrom<AnnulusBandFields> for AnnulusBand {
    type Error = FitError;

    fn try_from(v: AnnulusBandFields) -> Result<Self, Self::Error> {
        Self::new(v.r, v.th, v.inc, v.rot, v.x_m, v.y_m)
    }
}

#[derive(Deserialize)]
struct GaussianRingFields {
    #[serde(flatten)]
    band: AnnulusBand,
    surf: f64,
    back: f64,
}

impl TryFrom<GaussianRingFields> for GaussianRing {
    type Error = FitError;

    fn try_from(v: GaussianRingFields) -> Result<Self, Self::Error> {
        Self::new(v.band, v.surf, v.back)
    }
}

#[derive(Deserialize)]
struct MieGaussianRingFields {
    #[serde(flatten)]
    ring: GaussianRing,
    surf_theta: f64,
    theta_max: f64,
}

impl TryFrom<MieGaussianRingFields> for MieGaussianRing {
    type Error = FitError;

    fn try_from(v: MieGaussianRingFields) -> Result<Self, Self::Error> {
        Self::new(v.ring, v.surf_theta, v.theta_max)
    }
}

#[derive(Deserialize)]
struct HenyeyGreensteinRingFields {
    #[serde(flatten)]
    ring: GaussianRing,
    g: f64,
}

impl TryFrom<HenyeyGreensteinRingFields> for HenyeyGreensteinRing {
    type Error = FitError;

    fn try_from(v: HenyeyGreensteinRingFields) -> Result<Self, Self::Error> {
        Self::new(v.ring, v.g)
    }
}
