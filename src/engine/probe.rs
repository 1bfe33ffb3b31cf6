// src/engine/probe.rs
// =============================================================================
// Measures remote images with HTTP HEAD requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Reads the Content-Length header to learn the image size
// - Reports failures as errors; the caller decides what they mean
//
// The probe is a trait so the image-size phase can be tested without a
// network (see the fakes in engine/images.rs).
// =============================================================================

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a probe could not produce a size
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server answered HTTP {0}")]
    Status(u16),
}

/// Something that can tell how many bytes an image has
#[async_trait]
pub trait ImageProbe: Send + Sync {
    /// Size in bytes, or None when the server doesn't say
    async fn content_length(&self, url: &str) -> Result<Option<u64>, ProbeError>;
}

/// Probe backed by a reqwest client
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Creates a probe whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        // We'll reuse this client for all requests (connection pooling)
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageProbe for HttpProbe {
    async fn content_length(&self, url: &str) -> Result<Option<u64>, ProbeError> {
        let response = self.client.head(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        // Read the header itself: for HEAD responses the body is empty, so
        // reqwest's own content_length() may not reflect the real size
        let length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());

        Ok(length)
    }
}
