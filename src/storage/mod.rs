//! Persisted guide snapshot
//!
//! The snapshot is the previous run's output: a gzip-compressed XMLTV
//! file. Reading it is best effort; a missing or damaged file only costs
//! the accumulated history. Writing goes through a temporary file in the
//! same directory followed by a rename, so readers never observe a
//! partially written guide.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};
use crate::models::GuideSnapshot;
use crate::utils::xmltv_parser::parse_guide;
use crate::utils::xmltv_writer::write_guide;
use crate::utils::DecompressionService;

/// Gzip XMLTV snapshot on the local filesystem
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous snapshot
    ///
    /// Returns `None` when the file does not exist or cannot be read,
    /// inflated or parsed. Never fails the run.
    pub fn load(&self) -> Option<GuideSnapshot> {
        if !self.path.exists() {
            info!(
                "No previous snapshot at {}, starting from fresh data",
                self.path.display()
            );
            return None;
        }

        match self.read_snapshot() {
            Ok(snapshot) => {
                info!(
                    "Loaded previous snapshot from {}: channels={} programmes={}",
                    self.path.display(),
                    snapshot.channels.len(),
                    snapshot.programmes.len()
                );
                Some(snapshot)
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable snapshot {} ({}), history will be rebuilt",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    fn read_snapshot(&self) -> AppResult<GuideSnapshot> {
        let raw = fs::read(&self.path)?;
        let text = DecompressionService::decode_text(&raw)?;
        parse_guide(&text)
    }

    /// Serialize, compress and atomically replace the snapshot
    ///
    /// Returns the number of compressed bytes written.
    pub fn save(&self, guide: &GuideSnapshot) -> AppResult<u64> {
        let xml = write_guide(guide)?;
        let compressed = DecompressionService::compress_gzip(&xml)
            .map_err(|e| AppError::compression(format!("{e:#}")))?;

        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&directory)?;

        let mut temp = NamedTempFile::new_in(&directory)?;
        temp.write_all(&compressed)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| AppError::Io(e.error))?;

        debug!(
            "Wrote {} bytes of XML as {} compressed bytes",
            xml.len(),
            compressed.len()
        );
        info!(
            "Saved snapshot to {}: channels={} programmes={}",
            self.path.display(),
            guide.channels.len(),
            guide.programmes.len()
        );
        Ok(compressed.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Channel, Programme};
    use tempfile::TempDir;
    use tracing_test::traced_test;

    fn sample_guide() -> GuideSnapshot {
        GuideSnapshot::new(
            vec![("generator-info-name".to_string(), "centra".to_string())],
            vec![Channel::with_display_name("kayo.1", "Kayo Sports")],
            vec![Programme::with_title(
                "kayo.1",
                "20260110180000 +0530",
                "20260110190000 +0530",
                "Big Bash",
            )],
        )
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested").join("epg.xml.gz"));

        let written = store.save(&sample_guide()).unwrap();
        let raw = fs::read(store.path()).unwrap();

        assert_eq!(written, raw.len() as u64);
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
        assert_eq!(store.load(), Some(sample_guide()));
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("epg.xml.gz"));
        fs::write(store.path(), b"stale").unwrap();

        store.save(&sample_guide()).unwrap();

        assert_eq!(store.load(), Some(sample_guide()));
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    #[traced_test]
    fn test_missing_snapshot_is_none() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("epg.xml.gz"));

        assert_eq!(store.load(), None);
        assert!(logs_contain("No previous snapshot"));
    }

    #[test]
    #[traced_test]
    fn test_corrupt_snapshot_is_none_with_warning() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("epg.xml.gz"));
        fs::write(store.path(), [0x1f, 0x8b, 0x00, 0x01, 0x02, 0x03]).unwrap();

        assert_eq!(store.load(), None);
        assert!(logs_contain("Ignoring unreadable snapshot"));
    }

    #[test]
    fn test_plain_xml_snapshot_is_accepted() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("epg.xml.gz"));
        fs::write(store.path(), write_guide(&sample_guide()).unwrap()).unwrap();

        assert_eq!(store.load(), Some(sample_guide()));
    }
}
