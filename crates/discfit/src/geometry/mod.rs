//! Coordinate transforms between image pixels and the disc plane.
//!
//! Conventions:
//! - pixels are `(i, j)` = `(row, col)`;
//! - [`rotate`] turns the center-relative offset `(i - x_m, j - y_m)` by `rot`
//!   degrees counter-clockwise, giving the rotated frame `(x, y)`;
//! - the disc minor axis lies along rotated `y`, so the deprojected radius is
//!   `sqrt(x² + (y / cos inc)²)`.

use crate::error::FitError;
use crate::model::EllipseCurve;
use crate::raster::Image;

/// Smallest accepted `cos(inclination)`; anything flatter is rejected.
pub const MIN_COS_INCLINATION: f64 = 1e-6;

/// Widest output [`deproject`] produces.
pub const DEFAULT_MAX_DEPROJECTED_WIDTH: usize = 1 << 16;

/// Rotate `(i, j)` about `(x_m, y_m)` by `rot` degrees.
///
/// Returns the center-relative coordinates in the rotated frame.
#[inline]
pub fn rotate(i: f64, j: f64, x_m: f64, y_m: f64, rot: f64) -> (f64, f64) {
    let (s, c) = rot.to_radians().sin_cos();
    let di = i - x_m;
    let dj = j - y_m;
    (di * c - dj * s, dj * c + di * s)
}

/// `cos(inc)` for an inclination in degrees, rejecting |inc| ≥ 90°.
pub fn cos_inclination(inc: f64) -> Result<f64, FitError> {
    if !inc.is_finite() || inc.abs() >= 90.0 {
        return Err(FitError::InclinationOutOfRange { inc_deg: inc });
    }
    let c = inc.to_radians().cos();
    if c < MIN_COS_INCLINATION {
        return Err(FitError::InclinationOutOfRange { inc_deg: inc });
    }
    Ok(c)
}

/// Precomputed disc-plane frame for one `(inc, rot, x_m, y_m)` geometry.
///
/// Hot loops evaluate many pixels against one geometry; the trigonometry is
/// done once here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscFrame {
    pub x_m: f64,
    pub y_m: f64,
    sin_rot: f64,
    cos_rot: f64,
    cos_inc: f64,
    tan_inc: f64,
}

impl DiscFrame {
    /// Build a frame; fails if the inclination is at or beyond 90°.
    pub fn new(inc: f64, rot: f64, x_m: f64, y_m: f64) -> Result<Self, FitError> {
        let cos_inc = cos_inclination(inc)?;
        let (sin_rot, cos_rot) = rot.to_radians().sin_cos();
        Ok(Self {
            x_m,
            y_m,
            sin_rot,
            cos_rot,
            cos_inc,
            tan_inc: inc.to_radians().tan(),
        })
    }

    #[inline]
    pub fn cos_inc(&self) -> f64 {
        self.cos_inc
    }

    #[inline]
    pub fn tan_inc(&self) -> f64 {
        self.tan_inc
    }

    /// Same result as [`rotate`] with this frame's center and rotation.
    #[inline]
    pub fn project(&self, i: f64, j: f64) -> (f64, f64) {
        let di = i - self.x_m;
        let dj = j - self.y_m;
        (
            di * self.cos_rot - dj * self.sin_rot,
            dj * self.cos_rot + di * self.sin_rot,
        )
    }

    /// Inverse of [`DiscFrame::project`]: rotated-frame `(x, y)` back to `(i, j)`.
    #[inline]
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.x_m + x * self.cos_rot + y * self.sin_rot,
            self.y_m - x * self.sin_rot + y * self.cos_rot,
        )
    }

    /// Deprojected elliptical radius of pixel `(i, j)`.
    #[inline]
    pub fn radius(&self, i: f64, j: f64) -> f64 {
        let (x, y) = self.project(i, j);
        let yd = y / self.cos_inc;
        (x * x + yd * yd).sqrt()
    }
}

/// Deprojected elliptical distance of `(i, j)` from the disc center.
pub fn disc_radius(i: f64, j: f64, inc: f64, rot: f64, x_m: f64, y_m: f64) -> Result<f64, FitError> {
    Ok(DiscFrame::new(inc, rot, x_m, y_m)?.radius(i, j))
}

/// Stretch image width by `1 / cos(inc)` with nearest-neighbour resampling.
///
/// Output width is `floor(W / cos(inc))`, height is unchanged, and output
/// column `j` reads input column `floor(j * cos(inc))`. Fails with
/// [`FitError::DeprojectionTooWide`] beyond [`DEFAULT_MAX_DEPROJECTED_WIDTH`].
pub fn deproject(image: &Image, inc: f64) -> Result<Image, FitError> {
    deproject_with_limit(image, inc, DEFAULT_MAX_DEPROJECTED_WIDTH)
}

/// [`deproject`] with an explicit output width limit.
pub fn deproject_with_limit(image: &Image, inc: f64, max_width: usize) -> Result<Image, FitError> {
    let c = cos_inclination(inc)?;
    let (h, w) = image.shape();
    if w == 0 {
        return Ok(image.clone());
    }
    let stretched = (w as f64 / c).floor();
    if stretched > max_width as f64 {
        return Err(FitError::DeprojectionTooWide {
            width: stretched as u64,
            limit: max_width as u64,
        });
    }
    let new_w = stretched as usize;
    Ok(Image::from_fn(h, new_w, |row, col| {
        let src = ((col as f64 * c).floor() as usize).min(w - 1);
        image.get(row, src)
    }))
}

/// Copy of `image` with every pixel inside deprojected radius `radius` of the
/// model's geometry set to `value`. The model's own `r` is not used.
pub fn cut_ellipse(
    image: &Image,
    model: &EllipseCurve,
    radius: f64,
    value: f64,
) -> Result<Image, FitError> {
    let frame = model.frame()?;
    let mut out = image.clone();
    for i in 0..image.height() {
        for j in 0..image.width() {
            if frame.radius(i as f64, j as f64) < radius {
                out.set(i, j, value);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rotate_is_periodic_in_360_degrees() {
        for &(i, j, xm, ym, rot) in &[
            (3.0, 7.0, 1.0, 2.0, 0.0),
            (10.5, -4.0, 25.0, 25.0, 33.3),
            (0.0, 0.0, 141.0, 140.0, -271.0),
            (50.0, 12.0, 0.0, 0.0, 719.0),
        ] {
            let a = rotate(i, j, xm, ym, rot);
            let b = rotate(i, j, xm, ym, rot + 360.0);
            assert_abs_diff_eq!(a.0, b.0, epsilon = 1e-9);
            assert_abs_diff_eq!(a.1, b.1, epsilon = 1e-9);
        }
    }

    #[test]
    fn rotate_quarter_turn() {
        let (x, y) = rotate(1.0, 0.0, 0.0, 0.0, 90.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn frame_matches_free_rotate_and_inverts() {
        let frame = DiscFrame::new(30.0, 47.0, 12.0, 19.0).unwrap();
        let (x, y) = frame.project(3.5, 8.25);
        let (x2, y2) = rotate(3.5, 8.25, 12.0, 19.0, 47.0);
        assert_abs_diff_eq!(x, x2, epsilon = 1e-12);
        assert_abs_diff_eq!(y, y2, epsilon = 1e-12);
        let (i, j) = frame.unproject(x, y);
        assert_abs_diff_eq!(i, 3.5, epsilon = 1e-12);
        assert_abs_diff_eq!(j, 8.25, epsilon = 1e-12);
    }

    #[test]
    fn radius_stretches_minor_axis() {
        let frame = DiscFrame::new(60.0, 0.0, 0.0, 0.0).unwrap();
        // Rotated y is the column offset at rot = 0.
        assert_abs_diff_eq!(frame.radius(0.0, 5.0), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(frame.radius(5.0, 0.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn inclination_guard() {
        assert!(cos_inclination(89.0).is_ok());
        assert!(matches!(
            cos_inclination(90.0),
            Err(FitError::InclinationOutOfRange { .. })
        ));
        assert!(cos_inclination(f64::NAN).is_err());
        assert!(cos_inclination(-95.0).is_err());
    }

    #[test]
    fn deproject_zero_inclination_is_identity() {
        let img = Image::from_fn(4, 6, |r, c| (r * 10 + c) as f64);
        let out = deproject(&img, 0.0).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn deproject_width_follows_cosine() {
        let img = Image::from_fn(3, 100, |_, c| c as f64);
        for &inc in &[10.0, 31.0, 45.0, 60.0, 80.0] {
            let out = deproject(&img, inc).unwrap();
            let expected = (100.0 / inc.to_radians().cos()).floor() as usize;
            assert_eq!(out.shape(), (3, expected), "inc={}", inc);
        }
    }

    #[test]
    fn deproject_samples_nearest_source_column() {
        let img = Image::from_fn(1, 10, |_, c| c as f64);
        let out = deproject(&img, 60.0).unwrap();
        assert!(out.width() == 19 || out.width() == 20);
        assert_eq!(out.get(0, 0), 0.0);
        assert_eq!(out.get(0, 3), 1.0);
        assert_eq!(out.get(0, 8), 4.0);
        for col in 1..out.width() {
            assert!(out.get(0, col) >= out.get(0, col - 1));
        }
    }

    #[test]
    fn deproject_rejects_edge_on() {
        let img = Image::zeros(2, 2);
        assert!(deproject(&img, 90.0).is_err());
    }

    #[test]
    fn deproject_refuses_runaway_width() {
        let img = Image::zeros(2, 4);
        assert_eq!(
            deproject(&img, 89.9999).unwrap_err(),
            FitError::DeprojectionTooWide {
                width: (4.0 / 89.9999f64.to_radians().cos()).floor() as u64,
                limit: DEFAULT_MAX_DEPROJECTED_WIDTH as u64,
            }
        );

        let wide = Image::zeros(1, 100);
        assert!(deproject_with_limit(&wide, 60.0, 150).is_err());
        let out = deproject_with_limit(&wide, 60.0, 200).unwrap();
        assert!(out.width() <= 200);
    }

    #[test]
    fn cut_ellipse_masks_inner_region() {
        let img = Image::filled(21, 21, 1.0);
        let model = EllipseCurve::new(8.0, 0.0, 0.0, 10.0, 10.0).unwrap();
        let out = cut_ellipse(&img, &model, 3.0, 0.0).unwrap();
        assert_eq!(out.get(10, 10), 0.0);
        assert_eq!(out.get(10, 12), 0.0);
        assert_eq!(out.get(10, 13), 1.0);
        assert_eq!(out.get(0, 0), 1.0);
    }

    #[test]
    fn cut_ellipse_follows_inclination() {
        let img = Image::filled(21, 21, 1.0);
        let model = EllipseCurve::new(8.0, 60.0, 0.0, 10.0, 10.0).unwrap();
        let out = cut_ellipse(&img, &model, 4.0, 0.0).unwrap();
        // Columns are the compressed axis at rot = 0.
        assert_eq!(out.get(13, 10), 0.0);
        assert_eq!(out.get(10, 11), 0.0);
        assert_eq!(out.get(10, 13), 1.0);

        let flat = EllipseCurve { inc: 90.0, ..model };
        assert!(cut_ellipse(&img, &flat, 4.0, 0.0).is_err());
    }
}
