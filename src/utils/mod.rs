//! Utility modules for the EPG updater
//!
//! This module contains the I/O-facing helpers used around the guide
//! pipeline: compression, XML repair, XMLTV reading and writing, time and
//! URL handling.

pub mod decompression;
pub mod time;
pub mod url;
pub mod xml_repair;
pub mod xmltv_parser;
pub mod xmltv_writer;

// Re-export commonly used types for convenience
pub use decompression::{CompressionFormat, DecompressionService};
