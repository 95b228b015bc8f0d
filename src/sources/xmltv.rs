//! XMLTV feed source over HTTP

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::traits::FeedFetcher;
use crate::errors::{AppError, AppResult};
use crate::models::GuideSnapshot;
use crate::utils::url::UrlUtils;
use crate::utils::xmltv_parser::parse_guide_lenient;
use crate::utils::DecompressionService;

/// Fetches the feed with a plain GET request
///
/// The body is returned untouched; transfer-level gzip is left in place and
/// detected from the payload's magic bytes later on.
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// Build a fetcher with the given connect timeout and user agent
    pub fn new(connect_timeout: Duration, user_agent: &str) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch_bytes(&self, url: &str) -> AppResult<Bytes> {
        let display_url = UrlUtils::obfuscate_credentials(url);
        info!("Fetching XMLTV data from: {}", display_url);
        let started = Instant::now();

        // reqwest errors carry the full URL, so only the kind is reported
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(&display_url, describe_reqwest_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus {
                status: status.as_u16(),
                url: display_url,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::fetch(&display_url, describe_reqwest_error(&e)))?;

        info!(
            "Downloaded XMLTV content ({} bytes) in {:?}",
            body.len(),
            started.elapsed()
        );
        Ok(body)
    }
}

fn describe_reqwest_error(error: &reqwest::Error) -> String {
    let kind = if error.is_builder() {
        "invalid request"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_timeout() {
        "timed out"
    } else if error.is_body() || error.is_decode() {
        "failed to read response body"
    } else if error.is_redirect() {
        "too many redirects"
    } else {
        "request failed"
    };

    match std::error::Error::source(error) {
        Some(source) => format!("{kind}: {}", UrlUtils::obfuscate_credentials(&source.to_string())),
        None => kind.to_string(),
    }
}

/// Turn a raw feed body into a guide snapshot
///
/// Inflates gzip when present, decodes leniently and parses with the
/// repair fallbacks.
pub fn decode_feed(body: &[u8]) -> AppResult<GuideSnapshot> {
    let text = DecompressionService::decode_text(body)?;
    let snapshot = parse_guide_lenient(&text)?;
    debug!(
        "Decoded feed: channels={} programmes={}",
        snapshot.channels.len(),
        snapshot.programmes.len()
    );
    Ok(snapshot)
}
