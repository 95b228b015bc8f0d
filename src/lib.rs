//! XMLTV EPG updater
//!
//! Fetches an XMLTV feed, keeps a curated set of channels, shifts programme
//! times to a fixed display offset and merges the result into a persisted
//! gzip guide so that programmes the provider has already dropped remain
//! available as history.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use errors::{AppError, AppResult};
