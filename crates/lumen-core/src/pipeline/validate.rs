//! Input validation before decoding.

use image::ImageFormat;

use crate::config::{LimitsConfig, ALLOWED_MEDIA_TYPES};
use crate::error::AnalysisError;

/// Validates raw payloads before any decode work happens.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks, in order:
    /// - the payload is not empty
    /// - the payload is within the size cap
    /// - the declared media type (if any) is accepted
    /// - the magic bytes identify JPEG or PNG
    ///
    /// Returns the format the payload should be decoded as.
    pub fn validate(
        &self,
        bytes: &[u8],
        declared: Option<&str>,
    ) -> Result<ImageFormat, AnalysisError> {
        if bytes.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let size = bytes.len() as u64;
        if size > self.limits.max_file_size_bytes {
            return Err(AnalysisError::PayloadTooLarge {
                max_bytes: self.limits.max_file_size_bytes,
                received_bytes: size,
            });
        }

        if let Some(declared) = declared {
            if !is_allowed_media_type(declared) {
                return Err(unsupported(declared.to_string()));
            }
        }

        match (Self::sniff(bytes), declared) {
            (Some(format), _) => Ok(format),
            (None, Some(declared)) => Err(AnalysisError::CorruptInput {
                message: format!("payload declared as {declared} is neither JPEG nor PNG data"),
            }),
            (None, None) => Err(unsupported("unknown".to_string())),
        }
    }

    /// Identify JPEG or PNG data from its signature.
    pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }

        None
    }
}

/// Check a media type against the accepted set, ignoring parameters such as
/// `; charset=binary` and letter case.
pub fn is_allowed_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_MEDIA_TYPES.contains(&essence.as_str())
}

fn unsupported(received: String) -> AnalysisError {
    AnalysisError::UnsupportedFormat {
        allowed: ALLOWED_MEDIA_TYPES.iter().map(|t| t.to_string()).collect(),
        received,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_HEADER: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];

    fn validator() -> Validator {
        Validator::new(LimitsConfig::default())
    }

    #[test]
    fn test_empty_input() {
        let err = validator().validate(&[], Some("image/png")).unwrap_err();
        assert_eq!(err, AnalysisError::EmptyInput);
    }

    #[test]
    fn test_payload_too_large_reports_sizes() {
        let bytes = vec![0u8; 5_242_881];
        let err = validator().validate(&bytes, Some("image/png")).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::PayloadTooLarge {
                max_bytes: 5_242_880,
                received_bytes: 5_242_881,
            }
        );
    }

    #[test]
    fn test_size_checked_before_media_type() {
        let bytes = vec![0u8; 5_242_881];
        let err = validator().validate(&bytes, Some("image/gif")).unwrap_err();
        assert!(matches!(err, AnalysisError::PayloadTooLarge { .. }));
    }

    #[test]
    fn test_exactly_at_limit_is_accepted() {
        let mut bytes = vec![0u8; 5_242_880];
        bytes[..12].copy_from_slice(&PNG_HEADER);
        assert_eq!(
            validator().validate(&bytes, Some("image/png")).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_unsupported_declared_type() {
        let err = validator()
            .validate(b"GIF89a......", Some("image/gif"))
            .unwrap_err();
        match err {
            AnalysisError::UnsupportedFormat { allowed, received } => {
                assert_eq!(allowed, vec!["image/jpeg", "image/png"]);
                assert_eq!(received, "image/gif");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_media_type_parameters_ignored() {
        assert!(is_allowed_media_type("image/PNG; charset=binary"));
        assert!(is_allowed_media_type(" image/jpeg"));
        assert!(!is_allowed_media_type("image/webp"));
        assert!(!is_allowed_media_type(""));
    }

    #[test]
    fn test_sniffed_format_wins_over_declared() {
        let format = validator().validate(&PNG_HEADER, Some("image/jpeg")).unwrap();
        assert_eq!(format, ImageFormat::Png);
    }

    #[test]
    fn test_declared_type_with_garbage_is_corrupt() {
        let err = validator()
            .validate(&[0x00, 0x01, 0x02, 0x03], Some("image/jpeg"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::CorruptInput { .. }));
    }

    #[test]
    fn test_undeclared_unknown_payload_is_unsupported() {
        let err = validator().validate(b"RIFF....WEBP", None).unwrap_err();
        match err {
            AnalysisError::UnsupportedFormat { received, .. } => assert_eq!(received, "unknown"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sniff_signatures() {
        assert_eq!(Validator::sniff(&JPEG_HEADER), Some(ImageFormat::Jpeg));
        assert_eq!(Validator::sniff(&PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(Validator::sniff(&[0x89, b'P', b'N', b'G']), None);
        assert_eq!(Validator::sniff(b"BM"), None);
    }
}
