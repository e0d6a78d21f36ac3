//! Synthetic brightness maps for the surface ring models.
//!
//! Every generator shares one radial kernel,
//! `back + peak * exp(-(R - r)² / (2 (th/2)²))`, and differs only in how the
//! per-pixel `peak` is computed. [`radial_gaussian_map`] is that kernel,
//! parameterized by a peak-brightness closure.

pub mod phase;

use crate::error::FitError;
use crate::geometry::DiscFrame;
use crate::model::{
    AnnulusBand, GaussianRing, HenyeyGreensteinRing, MieGaussianRing, RingModel,
};
use crate::raster::Image;
use crate::score::{ellipse_visit_mask, CurveSampling};

/// Geometry of one pixel relative to a disc, handed to peak closures.
#[derive(Debug, Clone, Copy)]
pub struct PixelSample {
    /// Row index.
    pub i: f64,
    /// Column index.
    pub j: f64,
    /// Rotated-frame coordinates.
    pub x: f64,
    pub y: f64,
    /// Deprojected elliptical radius.
    pub radius: f64,
}

/// Shared Gaussian radial kernel.
///
/// `peak` returns the brightness above background at the ring crest for a
/// given pixel.
pub fn radial_gaussian_map<F>(
    band: &AnnulusBand,
    back: f64,
    height: usize,
    width: usize,
    mut peak: F,
) -> Result<Image, FitError>
where
    F: FnMut(&DiscFrame, &PixelSample) -> f64,
{
    let frame = band.frame()?;
    let sigma = 0.5 * band.thickness();
    let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);

    Ok(Image::from_fn(height, width, |row, col| {
        let i = row as f64;
        let j = col as f64;
        let (x, y) = frame.project(i, j);
        let yd = y / frame.cos_inc();
        let radius = (x * x + yd * yd).sqrt();
        let px = PixelSample {
            i,
            j,
            x,
            y,
            radius,
        };
        let d = radius - band.r;
        back + peak(&frame, &px) * (-d * d * inv_two_sigma_sq).exp()
    }))
}

/// Gaussian ring with constant peak brightness `surf`.
pub fn gaussian_ring_map(model: &GaussianRing, height: usize, width: usize) -> Result<Image, FitError> {
    let surf = model.surf;
    radial_gaussian_map(&model.band, model.back, height, width, |_, _| surf)
}

/// Gaussian ring with azimuth-dependent peak brightness.
///
/// Azimuth is `θ = atan2(i - x_m, j - y_m)`.
pub fn mie_ring_map(model: &MieGaussianRing, height: usize, width: usize) -> Result<Image, FitError> {
    let surf_0 = model.surf_0();
    let surf_theta = model.surf_theta;
    let theta_max = model.theta_max.to_radians();
    radial_gaussian_map(&model.ring.band, model.ring.back, height, width, |frame, px| {
        let theta = (px.i - frame.x_m).atan2(px.j - frame.y_m);
        phase::azimuthal_peak(surf_0, surf_theta, theta_max, theta)
    })
}

/// Gaussian ring modulated by the Henyey-Greenstein phase function of the
/// per-pixel scattering angle.
pub fn henyey_greenstein_map(
    model: &HenyeyGreensteinRing,
    height: usize,
    width: usize,
) -> Result<Image, FitError> {
    let g = model.g;
    let surf = model.ring.surf;
    radial_gaussian_map(&model.ring.band, model.ring.back, height, width, |frame, px| {
        let cos_theta = phase::scattering_cosine(px.x, px.y, frame.tan_inc());
        surf * phase::henyey_greenstein(g, cos_theta)
    })
}

/// Top-hat annulus: `surf` strictly inside the band, `back` elsewhere.
pub fn flat_annulus_map(model: &GaussianRing, height: usize, width: usize) -> Result<Image, FitError> {
    let frame = model.band.frame()?;
    Ok(Image::from_fn(height, width, |row, col| {
        if model.band.contains_radius(frame.radius(row as f64, col as f64)) {
            model.surf
        } else {
            model.back
        }
    }))
}

impl RingModel {
    /// Render the model at `(height, width)`.
    ///
    /// Surface models render their brightness map. A bare annulus renders as a
    /// 0/1 membership image and a bare ellipse as its 0/1 sampled locus.
    pub fn render(&self, height: usize, width: usize) -> Result<Image, FitError> {
        match self {
            Self::Ellipse(m) => {
                let mask = ellipse_visit_mask(m, (height, width), &CurveSampling::default())?;
                Ok(Image::from_fn(height, width, |r, c| {
                    if mask.get(r, c) > 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }))
            }
            Self::Annulus(m) => {
                let ring = GaussianRing {
                    band: *m,
                    surf: 1.0,
                    back: 0.0,
                };
                flat_annulus_map(&ring, height, width)
            }
            Self::Gaussian(m) => gaussian_ring_map(m, height, width),
            Self::Mie(m) => mie_ring_map(m, height, width),
            Self::HenyeyGreenstein(m) => henyey_greenstein_map(m, height, width),
            Self::FlatAnnulus(m) => flat_annulus_map(m, height, width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ring(inc: f64, rot: f64) -> GaussianRing {
        let band = AnnulusBand::new(20.0, 4.0, inc, rot, 25.0, 25.0).unwrap();
        GaussianRing::new(band, 100.0, 0.0).unwrap()
    }

    #[test]
    fn gaussian_peaks_on_the_ring() {
        let m = ring(0.0, 0.0);
        let map = gaussian_ring_map(&m, 50, 50).unwrap();
        assert_eq!(map.shape(), (50, 50));
        assert_relative_eq!(map.get(25, 45), 100.0, epsilon = 1e-9);
        assert_relative_eq!(map.get(5, 25), 100.0, epsilon = 1e-9);
        // One sigma (= th/2 = 2 px) off the crest.
        assert_relative_eq!(map.get(25, 47), 100.0 * (-0.5f64).exp(), epsilon = 1e-9);
        assert!(map.get(25, 25) < 1e-6);
    }

    #[test]
    fn background_is_added_everywhere() {
        let band = AnnulusBand::new(20.0, 4.0, 0.0, 0.0, 25.0, 25.0).unwrap();
        let m = GaussianRing::new(band, 100.0, 7.0).unwrap();
        let map = gaussian_ring_map(&m, 50, 50).unwrap();
        assert_relative_eq!(map.get(25, 25), 7.0, epsilon = 1e-6);
        assert_relative_eq!(map.get(25, 45), 107.0, epsilon = 1e-9);
    }

    #[test]
    fn inclination_compresses_the_minor_axis() {
        let m = ring(60.0, 0.0);
        let map = gaussian_ring_map(&m, 50, 50).unwrap();
        // Minor axis along columns at rot = 0: crest at 20 * cos(60°) = 10 px.
        assert!(map.get(25, 35) > 99.0);
        // Major axis along rows keeps the full radius.
        assert!(map.get(45, 25) > 99.0);
        assert!(map.get(25, 45) < 1.0);
    }

    #[test]
    fn zero_amplitude_mie_matches_gaussian() {
        let g = ring(30.0, 20.0);
        let mie = MieGaussianRing::new(g, 0.0, 45.0).unwrap();
        let a = gaussian_ring_map(&g, 40, 40).unwrap();
        let b = mie_ring_map(&mie, 40, 40).unwrap();
        for r in 0..40 {
            for c in 0..40 {
                assert_relative_eq!(a.get(r, c), b.get(r, c), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn mie_brightens_toward_theta_max_plus_pi() {
        let band = AnnulusBand::new(20.0, 4.0, 0.0, 0.0, 25.0, 25.0).unwrap();
        let g = GaussianRing::new(band, 10.0, 0.0).unwrap();
        // theta = atan2(i - x_m, j - y_m); theta_max = 0 peaks at theta = π,
        // i.e. pixels with j < y_m on the row through the center.
        let mie = MieGaussianRing::new(g, 50.0, 0.0).unwrap();
        let map = mie_ring_map(&mie, 50, 50).unwrap();
        assert_relative_eq!(map.get(25, 5), 60.0, epsilon = 1e-6);
        assert_relative_eq!(map.get(25, 45), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn isotropic_hg_is_scaled_gaussian() {
        let g = ring(40.0, 10.0);
        let hg = HenyeyGreensteinRing::new(g, 0.0).unwrap();
        let a = gaussian_ring_map(&g, 40, 40).unwrap();
        let b = henyey_greenstein_map(&hg, 40, 40).unwrap();
        let k = 1.0 / (4.0 * std::f64::consts::PI);
        for r in 0..40 {
            for c in 0..40 {
                assert_relative_eq!(b.get(r, c), a.get(r, c) * k, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn forward_scattering_brightens_one_side() {
        let g = ring(60.0, 0.0);
        let hg = HenyeyGreensteinRing::new(g, 0.6).unwrap();
        let map = henyey_greenstein_map(&hg, 50, 50).unwrap();
        // Near/far sides lie on the minor axis (columns at rot = 0).
        let near = map.get(25, 35);
        let far = map.get(25, 15);
        assert!(
            (near - far).abs() > 1.0,
            "expected asymmetry, near={} far={}",
            near,
            far
        );
    }

    #[test]
    fn flat_annulus_is_top_hat() {
        let band = AnnulusBand::new(10.0, 2.0, 0.0, 0.0, 15.0, 15.0).unwrap();
        let m = GaussianRing::new(band, 5.0, 1.0).unwrap();
        let map = flat_annulus_map(&m, 30, 30).unwrap();
        assert_eq!(map.get(15, 25), 5.0);
        assert_eq!(map.get(15, 15), 1.0);
        assert_eq!(map.get(15, 27), 1.0);
    }

    #[test]
    fn render_dispatches_by_kind() {
        let g = ring(0.0, 0.0);
        let a = RingModel::Gaussian(g).render(50, 50).unwrap();
        assert_eq!(a, gaussian_ring_map(&g, 50, 50).unwrap());

        let band = RingModel::Annulus(g.band).render(50, 50).unwrap();
        assert_eq!(band.get(25, 45), 1.0);
        assert_eq!(band.get(25, 25), 0.0);

        // Samples next to the axis truncate toward the center, so the locus
        // at 20 px also covers the pixel one step inside.
        let curve = RingModel::Ellipse(g.band.curve()).render(50, 50).unwrap();
        assert_eq!(curve.get(25, 44), 1.0);
        assert_eq!(curve.get(25, 25), 0.0);
    }

    #[test]
    fn edge_on_disc_is_rejected() {
        let mut g = ring(0.0, 0.0);
        g.band.inc = 90.0;
        assert!(matches!(
            gaussian_ring_map(&g, 10, 10),
            Err(FitError::InclinationOutOfRange { .. })
        ));
    }
}
