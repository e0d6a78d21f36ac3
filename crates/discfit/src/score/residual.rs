use crate::error::FitError;
use crate::raster::Image;

/// Sum of absolute differences between a model map and the image.
///
/// A cost: lower is better, zero on a perfect match.
pub fn score_residual(model_map: &Image, image: &Image) -> Result<f64, FitError> {
    image.ensure_same_shape(model_map)?;
    Ok(image
        .as_matrix()
        .iter()
        .zip(model_map.as_matrix().iter())
        .map(|(a, b)| (a - b).abs())
        .sum())
}
