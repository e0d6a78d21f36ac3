//! Mean intensity inside an elliptical annulus.

use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::model::AnnulusBand;
use crate::raster::Image;

use super::mask::ScoreMask;

/// Result of scoring an annulus band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandScore {
    /// `sum / max(pixels, 1)`.
    pub mean: f64,
    /// Raw sum over included pixels.
    pub sum: f64,
    /// Number of included pixels.
    pub pixels: usize,
}

/// Inclusive pixel window that can contain band members.
///
/// The deprojected radius is never smaller than the planar distance to the
/// center, so members lie within `r + th/2` of it along both axes.
fn search_window(band: &AnnulusBand, shape: (usize, usize)) -> Option<([usize; 2], [usize; 2])> {
    let (h, w) = shape;
    if h == 0 || w == 0 {
        return None;
    }
    let reach = band.radial_bounds()[1].ceil() + 1.0;
    let clip = |center: f64, len: usize| -> Option<[usize; 2]> {
        let lo = (center - reach).floor().max(0.0);
        let hi = (center + reach).ceil().min(len as f64 - 1.0);
        (lo <= hi).then_some([lo as usize, hi as usize])
    };
    Some((clip(band.x_m, h)?, clip(band.y_m, w)?))
}

/// Mean image intensity over pixels strictly inside the band.
///
/// Membership is `r - th/2 < z < r + th/2` on the deprojected radius `z`.
/// Returns a zero score when no pixel qualifies.
pub fn score_annulus_band(band: &AnnulusBand, image: &Image) -> Result<BandScore, FitError> {
    let frame = band.frame()?;
    let mut mask = ScoreMask::new(image.shape());
    let mut sum = 0.0;

    if let Some((rows, cols)) = search_window(band, image.shape()) {
        for row in rows[0]..=rows[1] {
            for col in cols[0]..=cols[1] {
                let z = frame.radius(row as f64, col as f64);
                if band.contains_radius(z) && mask.visit(row, col) {
                    sum += image.get(row, col);
                }
            }
        }
    }

    let pixels = mask.unique();
    Ok(BandScore {
        mean: sum / pixels.max(1) as f64,
        sum,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GaussianRing;
    use crate::synth::gaussian_ring_map;

    fn band(r: f64, th: f64) -> AnnulusBand {
        AnnulusBand::new(r, th, 0.0, 0.0, 25.0, 25.0).unwrap()
    }

    #[test]
    fn true_radius_beats_wrong_radius() {
        let truth = band(20.0, 4.0);
        let ring = GaussianRing::new(truth, 100.0, 0.0).unwrap();
        let map = gaussian_ring_map(&ring, 50, 50).unwrap();

        let at_truth = score_annulus_band(&truth, &map).unwrap();
        let at_wrong = score_annulus_band(&band(10.0, 4.0), &map).unwrap();
        assert!(
            at_truth.mean > at_wrong.mean,
            "truth {} vs wrong {}",
            at_truth.mean,
            at_wrong.mean
        );
        assert!(at_truth.mean > 50.0);
    }

    #[test]
    fn band_outside_image_scores_zero() {
        let img = Image::filled(20, 20, 3.0);
        let far = AnnulusBand::new(5.0, 2.0, 0.0, 0.0, 200.0, 200.0).unwrap();
        let s = score_annulus_band(&far, &img).unwrap();
        assert_eq!(s.pixels, 0);
        assert_eq!(s.mean, 0.0);
    }

    #[test]
    fn band_larger_than_image_scores_zero() {
        // Every pixel lies well inside the inner edge.
        let img = Image::filled(10, 10, 3.0);
        let s = score_annulus_band(&band(100.0, 2.0), &img).unwrap();
        assert_eq!(s.pixels, 0);
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.sum, 0.0);
    }

    #[test]
    fn constant_image_mean_is_the_constant() {
        let img = Image::filled(50, 50, 4.5);
        let s = score_annulus_band(&band(12.0, 3.0), &img).unwrap();
        assert!(s.pixels > 0);
        assert!((s.mean - 4.5).abs() < 1e-12);
        assert!((s.sum - 4.5 * s.pixels as f64).abs() < 1e-9);
    }

    #[test]
    fn window_matches_full_scan() {
        let img = Image::from_fn(40, 50, |r, c| (r * 50 + c) as f64);
        let b = AnnulusBand::new(11.0, 3.0, 55.0, 120.0, 18.5, 23.0).unwrap();
        let frame = b.frame().unwrap();
        let mut sum = 0.0;
        let mut n = 0usize;
        for r in 0..40 {
            for c in 0..50 {
                if b.contains_radius(frame.radius(r as f64, c as f64)) {
                    sum += img.get(r, c);
                    n += 1;
                }
            }
        }
        let s = score_annulus_band(&b, &img).unwrap();
        assert_eq!(s.pixels, n);
        assert!((s.sum - sum).abs() < 1e-9);
    }
}
