//! Image analysis pipeline components.
//!
//! This module contains all the stages of the analysis pipeline:
//! - **validate**: Size and format checks before any decode work
//! - **hash**: Result-cache keys
//! - **decode**: Decode JPEG/PNG payloads into RGB pixel buffers
//! - **resize**: Bound images to the working resolution
//! - **luminance**: Per-pixel Rec. 709 luminance
//! - **assemble**: Build the public result from aggregator output
//! - **processor**: Orchestrates the full pipeline

pub mod assemble;
pub mod decode;
pub mod hash;
pub mod luminance;
pub mod processor;
pub mod resize;
pub mod validate;

// Re-exports for convenient access
pub use assemble::ResponseAssembler;
pub use decode::{DecodedImage, ImageDecoder, PixelBuffer};
pub use hash::CacheKey;
pub use luminance::LuminanceArray;
pub use processor::ImageAnalyzer;
pub use resize::Resizer;
pub use validate::Validator;
