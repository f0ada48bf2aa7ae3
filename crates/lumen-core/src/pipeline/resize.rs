//! Working-resolution bounding.
//!
//! Analysis cost scales with pixel count, so images whose longer side exceeds
//! the working dimension are downscaled with a single uniform factor before
//! luminance is computed. Reported dimensions are never taken from here.

use image::imageops::{self, FilterType};

use crate::error::PipelineResult;

use super::decode::PixelBuffer;

/// Downscales pixel buffers to a bounded working resolution.
pub struct Resizer {
    max_dimension: u32,
}

impl Resizer {
    /// Create a resizer for the given maximum side length.
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }

    /// Target dimensions for an image, or `None` if it already fits.
    pub fn target_dimensions(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width <= self.max_dimension && height <= self.max_dimension {
            return None;
        }

        let scale = f64::from(self.max_dimension) / f64::from(width.max(height));
        let scaled =
            |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, self.max_dimension);
        Some((scaled(width), scaled(height)))
    }

    /// Return the buffer unchanged if it fits, otherwise a Lanczos3-resampled copy.
    pub fn bound(&self, pixels: PixelBuffer) -> PipelineResult<PixelBuffer> {
        match self.target_dimensions(pixels.width(), pixels.height()) {
            None => Ok(pixels),
            Some((width, height)) => {
                tracing::trace!(
                    "Resizing {}x{} -> {}x{}",
                    pixels.width(),
                    pixels.height(),
                    width,
                    height
                );
                let resized =
                    imageops::resize(pixels.as_rgb(), width, height, FilterType::Lanczos3);
                PixelBuffer::new(resized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(RgbImage::from_pixel(width, height, Rgb([90, 90, 90]))).unwrap()
    }

    #[test]
    fn test_no_resize_needed() {
        let resizer = Resizer::new(512);
        assert_eq!(resizer.target_dimensions(100, 100), None);
        assert_eq!(resizer.target_dimensions(512, 512), None);
        let out = resizer.bound(solid(100, 80)).unwrap();
        assert_eq!((out.width(), out.height()), (100, 80));
    }

    #[test]
    fn test_resize_wide_image() {
        let resizer = Resizer::new(512);
        assert_eq!(resizer.target_dimensions(1024, 512), Some((512, 256)));
        let out = resizer.bound(solid(1024, 512)).unwrap();
        assert_eq!((out.width(), out.height()), (512, 256));
    }

    #[test]
    fn test_resize_tall_image() {
        let resizer = Resizer::new(512);
        assert_eq!(resizer.target_dimensions(512, 1024), Some((256, 512)));
    }

    #[test]
    fn test_resize_rounds_to_nearest() {
        // 1000x333 * 0.512 = 512x170.496
        assert_eq!(Resizer::new(512).target_dimensions(1000, 333), Some((512, 170)));
        // 1000x335 * 0.512 = 512x171.52
        assert_eq!(Resizer::new(512).target_dimensions(1000, 335), Some((512, 172)));
    }

    #[test]
    fn test_resize_keeps_one_pixel_minimum() {
        assert_eq!(Resizer::new(512).target_dimensions(5000, 1), Some((512, 1)));
    }

    #[test]
    fn test_bound_extreme_aspect_is_nonempty() {
        let out = Resizer::new(8).bound(solid(4000, 1)).unwrap();
        assert_eq!((out.width(), out.height()), (8, 1));
    }

    #[test]
    fn test_resize_preserves_uniform_color() {
        let out = Resizer::new(512).bound(solid(1030, 700)).unwrap();
        assert!(out
            .pixels()
            .all(|p| p.iter().all(|&c| (89..=91).contains(&c))));
    }
}
