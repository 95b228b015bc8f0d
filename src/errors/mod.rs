//! Centralized error handling for the EPG updater
//!
//! # Usage
//!
//! ```rust
//! use epg_updater::errors::{AppError, AppResult};
//!
//! fn require(value: Option<&str>) -> AppResult<&str> {
//!     value.ok_or_else(|| AppError::configuration("value missing"))
//! }
//!
//! assert!(require(None).is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
