//! reqwest-backed [`ImageFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::redirect::Policy;

use super::guard::{check_literal_host, check_resolved, parse_url, redact_url};
use super::{FetchedImage, ImageFetcher};
use crate::config::FetchConfig;
use crate::error::FetchError;

/// HTTP(S) fetcher with host checks, a redirect cap and a streamed size cap.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: u64,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a fetcher. `max_bytes` is the largest body accepted.
    pub fn new(config: &FetchConfig, max_bytes: u64) -> Result<Self, FetchError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let max_redirects = config.max_redirects;

        let redirect = Policy::custom(move |attempt| {
            if attempt.previous().len() >= max_redirects {
                return attempt.error(format!("exceeded {max_redirects} redirects"));
            }
            let next = attempt.url();
            if !matches!(next.scheme(), "http" | "https") || check_literal_host(next).is_err() {
                let target = redact_url(next.as_str());
                return attempt.error(format!("redirect to disallowed target {target}"));
            }
            attempt.follow()
        });

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .redirect(redirect)
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            max_bytes,
            timeout,
        })
    }

    fn request_error(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                message: err.without_url().to_string(),
            }
        }
    }

    fn too_large(&self, received: u64) -> FetchError {
        FetchError::TooLarge {
            max_bytes: self.max_bytes,
            received_bytes: received,
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, raw: &str) -> Result<FetchedImage, FetchError> {
        let url = parse_url(raw)?;
        check_resolved(&url).await?;
        let redacted = redact_url(url.as_str());
        tracing::debug!("Fetching {}", redacted);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(&redacted, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: redacted,
                status: status.as_u16(),
            });
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes {
                return Err(self.too_large(declared));
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string());

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.request_error(&redacted, e))?;
            let received = (body.len() + chunk.len()) as u64;
            if received > self.max_bytes {
                tracing::warn!("Aborting fetch of {}: body exceeds {} bytes", redacted, self.max_bytes);
                return Err(self.too_large(received));
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(
            "Fetched {} bytes from {} ({})",
            body.len(),
            redacted,
            content_type.as_deref().unwrap_or("no content type")
        );

        Ok(FetchedImage {
            bytes: body,
            content_type,
        })
    }
}
