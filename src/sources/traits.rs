//! Source traits
//!
//! The pipeline only needs raw bytes from the provider; decoding and
//! parsing happen downstream so that every fetcher gets the same gzip
//! sniffing and repair fallbacks.

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::AppResult;

/// Retrieves the raw feed body
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Download the body behind `url`
    ///
    /// Implementations fail with [`crate::errors::AppError::Fetch`] on
    /// network errors and [`crate::errors::AppError::HttpStatus`] on a
    /// non-success response. Error messages must not leak credentials
    /// embedded in the URL.
    async fn fetch_bytes(&self, url: &str) -> AppResult<Bytes>;
}
