use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// Gzip member header magic
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Supported compression formats detected by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Gzip,
    Uncompressed,
}

/// Magic byte detection and gzip (de)compression
pub struct DecompressionService;

impl DecompressionService {
    /// Detect compression format using magic bytes
    pub fn detect_compression_format(data: &[u8]) -> CompressionFormat {
        if data.len() >= 2 && data[..2] == GZIP_MAGIC {
            CompressionFormat::Gzip
        } else {
            CompressionFormat::Uncompressed
        }
    }

    /// Decompress data based on detected format
    pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
        match Self::detect_compression_format(data) {
            CompressionFormat::Gzip => Self::decompress_gzip(data),
            CompressionFormat::Uncompressed => Ok(data.to_vec()),
        }
    }

    /// Decompress gzip data
    fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("Failed to decompress gzip data")?;
        Ok(decompressed)
    }

    /// Compress data as a single gzip member
    pub fn compress_gzip(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(data)
            .context("Failed to write gzip stream")?;
        encoder.finish().context("Failed to finish gzip stream")
    }

    /// Turn raw content into text, inflating gzip when the magic is present
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected and a
    /// leading byte order mark is dropped.
    pub fn decode_text(data: &[u8]) -> AppResult<String> {
        let format = Self::detect_compression_format(data);
        debug!("Detected compression format: {:?}", format);

        let bytes = Self::decompress(data).map_err(|e| AppError::compression(format!("{e:#}")))?;

        let text = String::from_utf8_lossy(&bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();

        debug!(
            "Decoded {} bytes into {} bytes of text (compression: {:?})",
            data.len(),
            text.len(),
            format
        );
        Ok(text)
    }
}
