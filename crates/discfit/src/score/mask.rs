use crate::raster::Image;

/// Per-call visit-count grid with the same shape as the scored image.
///
/// Tracks how often each pixel was hit so aggregate scores count a pixel at
/// most once. Created inside a scoring call and dropped with it.
#[derive(Debug, Clone)]
pub struct ScoreMask {
    height: usize,
    width: usize,
    counts: Vec<u32>,
    unique: usize,
}

impl ScoreMask {
    pub fn new(shape: (usize, usize)) -> Self {
        let (height, width) = shape;
        Self {
            height,
            width,
            counts: vec![0; height * width],
            unique: 0,
        }
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Record a visit; returns `true` on the first visit to this pixel.
    #[inline]
    pub fn visit(&mut self, row: usize, col: usize) -> bool {
        let idx = row * self.width + col;
        let first = self.counts[idx] == 0;
        self.counts[idx] = self.counts[idx].saturating_add(1);
        if first {
            self.unique += 1;
        }
        first
    }

    #[inline]
    pub fn count(&self, row: usize, col: usize) -> u32 {
        self.counts[row * self.width + col]
    }

    /// Number of distinct pixels visited.
    #[inline]
    pub fn unique(&self) -> usize {
        self.unique
    }

    /// Visit counts as an image.
    pub fn to_image(&self) -> Image {
        Image::from_fn(self.height, self.width, |r, c| self.count(r, c) as f64)
    }
}
