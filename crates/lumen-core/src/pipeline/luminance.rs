//! Per-pixel perceptual luminance (ITU-R BT.709).

use super::decode::PixelBuffer;

/// Rec. 709 red weight.
pub const REC709_R: f64 = 0.2126;
/// Rec. 709 green weight.
pub const REC709_G: f64 = 0.7152;
/// Rec. 709 blue weight.
pub const REC709_B: f64 = 0.0722;

/// Luminance of one RGB triple, in `[0, 255]`.
#[inline]
pub fn luminance(rgb: [u8; 3]) -> f64 {
    REC709_R * f64::from(rgb[0]) + REC709_G * f64::from(rgb[1]) + REC709_B * f64::from(rgb[2])
}

/// One luminance sample per pixel, row-major, same dimensions as its source.
///
/// Computed once per analysis and shared read-only by every aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminanceArray {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl LuminanceArray {
    /// Compute luminance for every pixel of a buffer.
    pub fn from_pixels(pixels: &PixelBuffer) -> Self {
        let mut values = Vec::with_capacity(pixels.pixel_count());
        values.extend(pixels.pixels().map(luminance));
        Self {
            width: pixels.width(),
            height: pixels.height(),
            values,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sample at column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Iterate `(x, y, luminance)` in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        let width = self.width as usize;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| ((i % width) as u32, (i / width) as u32, v))
    }
}
