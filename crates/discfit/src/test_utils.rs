//! Shared synthetic images for unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{AnnulusBand, GaussianRing};
use crate::raster::Image;
use crate::synth::gaussian_ring_map;

/// Uniform noise in `[0, 1)`, reproducible from `seed`.
pub(crate) fn noisy_image(height: usize, width: usize, seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    Image::from_fn(height, width, |_, _| rng.gen::<f64>())
}

/// Gaussian ring on a flat background.
pub(crate) fn ring_image(
    size: usize,
    band: AnnulusBand,
    surf: f64,
    back: f64,
) -> Image {
    let ring = GaussianRing::new(band, surf, back).expect("valid ring");
    gaussian_ring_map(&ring, size, size).expect("renderable ring")
}

/// Add uniform noise of amplitude `amp` to `image`.
pub(crate) fn add_noise(image: &Image, amp: f64, seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    let (h, w) = image.shape();
    Image::from_fn(h, w, |r, c| image.get(r, c) + amp * (rng.gen::<f64>() - 0.5))
}
