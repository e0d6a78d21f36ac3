//! Read-only 2D intensity grid consumed by every scorer and generator.
//!
//! Pixels are addressed as `(row, col)` = `(i, j)` with shape `(H, W)`.
//! Conversions from `image` buffers map pixel `(x, y)` to `(row = y, col = x)`.

use image::{GrayImage, ImageBuffer, Luma};
use nalgebra::DMatrix;

use crate::error::FitError;

/// Floating-point intensity image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: DMatrix<f64>,
}

impl Image {
    /// Image of shape `(height, width)` with every pixel set to `value`.
    pub fn filled(height: usize, width: usize, value: f64) -> Self {
        Self {
            data: DMatrix::from_element(height, width, value),
        }
    }

    pub fn zeros(height: usize, width: usize) -> Self {
        Self::filled(height, width, 0.0)
    }

    /// Build from a row-major slice of length `height * width`.
    pub fn from_row_slice(height: usize, width: usize, values: &[f64]) -> Result<Self, FitError> {
        if values.len() != height * width {
            return Err(FitError::DimensionMismatch {
                expected: height * width,
                got: values.len(),
            });
        }
        Ok(Self {
            data: DMatrix::from_row_slice(height, width, values),
        })
    }

    /// Build by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(height: usize, width: usize, f: impl FnMut(usize, usize) -> f64) -> Self {
        Self {
            data: DMatrix::from_fn(height, width, f),
        }
    }

    pub fn from_matrix(data: DMatrix<f64>) -> Self {
        Self { data }
    }

    /// Convert an 8-bit grayscale image, keeping raw `0..=255` values.
    pub fn from_gray(gray: &GrayImage) -> Self {
        let (w, h) = gray.dimensions();
        Self::from_fn(h as usize, w as usize, |row, col| {
            gray.get_pixel(col as u32, row as u32)[0] as f64
        })
    }

    /// Convert a 16-bit grayscale image, keeping raw values.
    pub fn from_luma16(buf: &ImageBuffer<Luma<u16>, Vec<u16>>) -> Self {
        let (w, h) = buf.dimensions();
        Self::from_fn(h as usize, w as usize, |row, col| {
            buf.get_pixel(col as u32, row as u32)[0] as f64
        })
    }

    /// Convert a floating-point grayscale image.
    pub fn from_luma32(buf: &ImageBuffer<Luma<f32>, Vec<f32>>) -> Self {
        let (w, h) = buf.dimensions();
        Self::from_fn(h as usize, w as usize, |row, col| {
            buf.get_pixel(col as u32, row as u32)[0] as f64
        })
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// `(height, width)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    /// Bounds-checked access with signed indices.
    #[inline]
    pub fn get_checked(&self, row: i64, col: i64) -> Option<f64> {
        if row < 0 || col < 0 {
            return None;
        }
        let (r, c) = (row as usize, col as usize);
        if r >= self.height() || c >= self.width() {
            return None;
        }
        Some(self.data[(r, c)])
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[(row, col)] = value;
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.data
    }

    /// Row-major copy of the pixel values.
    pub fn to_row_major(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.data.len());
        for row in 0..self.height() {
            for col in 0..self.width() {
                out.push(self.data[(row, col)]);
            }
        }
        out
    }

    /// Sum of all pixel values.
    pub fn sum(&self) -> f64 {
        self.data.sum()
    }

    pub(crate) fn ensure_same_shape(&self, other: &Image) -> Result<(), FitError> {
        if self.shape() != other.shape() {
            return Err(FitError::ShapeMismatch {
                expected: self.shape(),
                got: other.shape(),
            });
        }
        Ok(())
    }

    /// Replace NaN and infinite pixels with zero.
    pub fn nan_to_zero(&self) -> Image {
        Self {
            data: self.data.map(|v| if v.is_finite() { v } else { 0.0 }),
        }
    }

    /// Sample quantile over finite pixels with linear interpolation between
    /// order statistics. `q` is clamped to `[0, 1]`.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        let mut values: Vec<f64> = self.data.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let pos = (values.len() - 1) as f64 * q.clamp(0.0, 1.0);
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let frac = pos - lo as f64;
        Some(values[lo] + (values[hi] - values[lo]) * frac)
    }

    /// Inverse-hyperbolic-sine contrast stretch:
    /// `asinh((v - lower) / beta) / asinh((upper - lower) / beta)`.
    ///
    /// Maps `lower` to 0 and `upper` to 1 while compressing bright structure.
    pub fn hyperbolic_stretch(&self, beta: f64, upper: f64, lower: f64) -> Result<Image, FitError> {
        if !(beta.is_finite() && beta > 0.0) {
            return Err(FitError::InvalidParameter {
                name: "beta",
                value: beta,
                reason: "must be finite and positive",
            });
        }
        let denom = ((upper - lower) / beta).asinh();
        if !denom.is_finite() || denom == 0.0 {
            return Err(FitError::InvalidParameter {
                name: "upper",
                value: upper,
                reason: "must differ from lower",
            });
        }
        Ok(Self {
            data: self.data.map(|v| ((v - lower) / beta).asinh() / denom),
        })
    }

    /// Linear map of `[lo, hi]` to `0..=255`, clamping outside values.
    pub fn to_gray_normalized(&self, lo: f64, hi: f64) -> GrayImage {
        let span = (hi - lo).abs().max(f64::EPSILON);
        let mut out = GrayImage::new(self.width() as u32, self.height() as u32);
        for row in 0..self.height() {
            for col in 0..self.width() {
                let v = self.data[(row, col)];
                let t = if v.is_finite() {
                    ((v - lo) / span).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                out.put_pixel(col as u32, row as u32, Luma([(t * 255.0).round() as u8]));
            }
        }
        out
    }

    /// Smallest and largest finite values, if any.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl std::ops::Index<(usize, usize)> for Image {
    type Output = f64;

    fn index(&self, idx: (usize, usize)) -> &f64 {
        &self.data[idx]
    }
}
