//! Time normalization stage
//!
//! Shifts freshly fetched programme timestamps from the feed clock to the
//! display offset. The shift is plain wall-clock arithmetic on the naive
//! date-time: any offset already present in the source string is ignored,
//! because the feed is assumed to always be published in the same fixed
//! upstream zone.

use chrono::{FixedOffset, TimeDelta};
use tracing::debug;

use crate::models::GuideSnapshot;
use crate::utils::time::{format_offset_suffix, parse_xmltv_naive, XMLTV_NAIVE_FORMAT};

/// Converts XMLTV timestamps to a fixed target offset
#[derive(Debug, Clone)]
pub struct TimeNormalizer {
    shift: TimeDelta,
    suffix: String,
}

impl TimeNormalizer {
    /// Normalizer that shifts by the target offset and tags with its suffix
    pub fn new(target_offset: FixedOffset) -> Self {
        Self {
            shift: TimeDelta::seconds(i64::from(target_offset.local_minus_utc())),
            suffix: format_offset_suffix(&target_offset),
        }
    }

    /// Normalize one timestamp
    ///
    /// Empty input gives an empty string. Input that does not start with a
    /// `YYYYMMDDHHMMSS` token is returned unchanged.
    pub fn normalize(&self, timestamp: &str) -> String {
        if timestamp.trim().is_empty() {
            return String::new();
        }

        parse_xmltv_naive(timestamp)
            .and_then(|naive| naive.checked_add_signed(self.shift))
            .map(|shifted| format!("{} {}", shifted.format(XMLTV_NAIVE_FORMAT), self.suffix))
            .unwrap_or_else(|| timestamp.to_string())
    }

    /// Rewrite `start` and `stop` of every programme in the snapshot
    ///
    /// Returns how many timestamps could not be parsed and were passed
    /// through.
    pub fn normalize_snapshot(&self, snapshot: &mut GuideSnapshot) -> usize {
        let mut passthrough = 0usize;

        for programme in &mut snapshot.programmes {
            let start = self.normalize(programme.start().unwrap_or(""));
            let stop = self.normalize(programme.stop().unwrap_or(""));

            for value in [&start, &stop] {
                if !value.is_empty() && !value.ends_with(self.suffix.as_str()) {
                    passthrough += 1;
                }
            }

            programme.set_start(start);
            programme.set_stop(stop);
        }

        debug!(
            "Normalized {} programmes to {} ({} timestamps passed through)",
            snapshot.programmes.len(),
            self.suffix,
            passthrough
        );
        passthrough
    }
}
