//! Error type definitions for the EPG updater
//!
//! Fatal conditions (configuration, fetch, parse, write) surface as
//! [`AppError`] and end the run. Recoverable conditions such as a corrupt
//! history snapshot never reach this type; they are logged and absorbed
//! where they occur.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or incomplete configuration, including missing credentials
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Network failure while retrieving the feed
    #[error("Fetch failed: {url} - {message}")]
    Fetch { url: String, message: String },

    /// Provider answered with a non-success status
    #[error("HTTP error: {status} - {url}")]
    HttpStatus { status: u16, url: String },

    /// Content could not be turned into a guide document
    #[error("Parse error: {source_type} - {message}")]
    Parse { source_type: String, message: String },

    /// Gzip stream could not be inflated or deflated
    #[error("Compression error: {message}")]
    Compression { message: String },

    /// Guide document could not be serialized
    #[error("XML write error: {message}")]
    XmlWrite { message: String },

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a fetch error for the given (already obfuscated) URL
    pub fn fetch<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a parse error, tagged with what was being parsed
    pub fn parse<S: Into<String>, M: Into<String>>(source_type: S, message: M) -> Self {
        Self::Parse {
            source_type: source_type.into(),
            message: message.into(),
        }
    }

    /// Create a compression error
    pub fn compression<S: Into<String>>(message: S) -> Self {
        Self::Compression {
            message: message.into(),
        }
    }

    /// Create an XML serialization error
    pub fn xml_write<S: Into<String>>(message: S) -> Self {
        Self::XmlWrite {
            message: message.into(),
        }
    }

    /// Whether this error came from reaching the provider
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::HttpStatus { .. })
    }
}
