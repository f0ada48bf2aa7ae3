//! Image acquisition from URLs.
//!
//! The analysis pipeline only ever sees bytes; this module turns a URL into
//! bytes plus the server-declared media type. [`ImageFetcher`] is the seam
//! that lets callers substitute their own transport.

mod guard;
mod http;

pub use guard::{is_blocked_ip, parse_url, redact_url};
pub use http::HttpFetcher;

use async_trait::async_trait;

use crate::error::FetchError;

/// A downloaded image payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// `Content-Type` reported by the server, if any
    pub content_type: Option<String>,
}

/// Fetches image bytes for a URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError>;
}
