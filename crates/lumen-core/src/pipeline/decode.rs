//! Image decoding with dimension limits and RGB normalization.

use image::{ImageFormat, ImageReader, Limits, RgbImage};
use std::io::Cursor;

use crate::config::LimitsConfig;
use crate::error::AnalysisError;

/// A decoded image as 8-bit RGB, row-major.
///
/// Width and height are always at least 1. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    image: RgbImage,
}

impl PixelBuffer {
    /// Wrap an RGB image, rejecting zero-sized buffers.
    pub fn new(image: RgbImage) -> Result<Self, AnalysisError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(AnalysisError::CorruptInput {
                message: format!(
                    "image has no pixels ({}x{})",
                    image.width(),
                    image.height()
                ),
            });
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel_count(&self) -> usize {
        self.image.width() as usize * self.image.height() as usize
    }

    /// Iterate over `[r, g, b]` triples in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.image.pixels().map(|p| p.0)
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded pixels
    pub pixels: PixelBuffer,
    /// Format the payload was decoded as
    pub format: ImageFormat,
    /// Original width in pixels
    pub width: u32,
    /// Original height in pixels
    pub height: u32,
}

/// Image decoder with configurable limits.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode a validated payload into an RGB pixel buffer.
    ///
    /// Header dimensions are checked before pixels are allocated. Alpha and
    /// other color modes are reduced to plain RGB.
    pub fn decode(&self, bytes: &[u8], format: ImageFormat) -> Result<DecodedImage, AnalysisError> {
        let max_dim = self.limits.max_decode_dimension;

        let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
            .into_dimensions()
            .map_err(corrupt)?;
        if width > max_dim || height > max_dim {
            return Err(AnalysisError::DimensionsTooLarge {
                width,
                height,
                max_dimension: max_dim,
            });
        }

        let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
        let mut limits = Limits::default();
        limits.max_image_width = Some(max_dim);
        limits.max_image_height = Some(max_dim);
        reader.limits(limits);

        let image = reader.decode().map_err(corrupt)?;
        let pixels = PixelBuffer::new(image.to_rgb8())?;

        tracing::trace!(
            "Decoded {} image: {}x{}",
            format_name(format),
            pixels.width(),
            pixels.height()
        );

        Ok(DecodedImage {
            width: pixels.width(),
            height: pixels.height(),
            pixels,
            format,
        })
    }
}

fn corrupt(err: image::ImageError) -> AnalysisError {
    AnalysisError::CorruptInput {
        message: err.to_string(),
    }
}

/// Short lowercase name of an accepted format.
pub fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

    fn encode_png_rgba(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                ExtendedColorType::Rgba8,
            )
            .unwrap();
        buf
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_name(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_name(ImageFormat::Png), "png");
        assert_eq!(format_name(ImageFormat::Gif), "unknown");
    }

    #[test]
    fn test_decode_drops_alpha() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([200, 100, 50, 0]));
        let bytes = encode_png_rgba(&img);

        let decoded = ImageDecoder::new(LimitsConfig::default())
            .decode(&bytes, ImageFormat::Png)
            .unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert!(decoded.pixels.pixels().all(|p| p == [200, 100, 50]));
    }

    #[test]
    fn test_truncated_png_is_corrupt() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 255]));
        let bytes = encode_png_rgba(&img);
        let truncated = &bytes[..bytes.len() / 2];

        let err = ImageDecoder::new(LimitsConfig::default())
            .decode(truncated, ImageFormat::Png)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::CorruptInput { .. }));
    }

    #[test]
    fn test_dimension_limit_checked_from_header() {
        let img = RgbaImage::from_pixel(40, 8, Rgba([0, 0, 0, 255]));
        let bytes = encode_png_rgba(&img);
        let limits = LimitsConfig {
            max_decode_dimension: 32,
            ..LimitsConfig::default()
        };

        let err = ImageDecoder::new(limits)
            .decode(&bytes, ImageFormat::Png)
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DimensionsTooLarge {
                width: 40,
                height: 8,
                max_dimension: 32,
            }
        );
    }

    #[test]
    fn test_pixel_buffer_rejects_empty() {
        assert!(PixelBuffer::new(RgbImage::new(0, 5)).is_err());
        let buffer = PixelBuffer::new(RgbImage::new(4, 5)).unwrap();
        assert_eq!(buffer.pixel_count(), 20);
    }
}
