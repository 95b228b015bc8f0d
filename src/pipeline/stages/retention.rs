//! Retention stage
//!
//! Prunes programmes that fall outside the configured retention policy.
//! Exactly one policy is active per deployment. The two policies lean in
//! opposite directions on bad data: the cutoff policy drops a programme
//! whose start cannot be parsed, the rolling window keeps a programme whose
//! stop cannot be parsed.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::duration_serde;
use crate::models::Programme;
use crate::utils::time::parse_xmltv_naive;

/// Which programmes survive a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep programmes starting on or after a fixed date-time
    Cutoff { cutoff: NaiveDateTime },
    /// Keep programmes that stopped less than `window` ago
    RollingWindow {
        #[serde(with = "duration_serde::duration")]
        window: Duration,
    },
}

impl RetentionPolicy {
    /// Whether a programme is kept
    ///
    /// `now` is the current wall-clock time in the target offset, the same
    /// clock the normalized timestamps are written in.
    pub fn retains(&self, programme: &Programme, now: NaiveDateTime) -> bool {
        match self {
            Self::Cutoff { cutoff } => programme
                .start()
                .and_then(parse_xmltv_naive)
                .is_some_and(|start| start >= *cutoff),
            Self::RollingWindow { window } => {
                match programme.stop().and_then(parse_xmltv_naive) {
                    Some(stop) => stop > window_start(now, *window),
                    None => true,
                }
            }
        }
    }

    /// Filter programmes, returning the survivors and the number dropped
    pub fn apply(&self, programmes: Vec<Programme>, now: NaiveDateTime) -> (Vec<Programme>, usize) {
        let before = programmes.len();
        let kept: Vec<Programme> = programmes
            .into_iter()
            .filter(|programme| {
                let keep = self.retains(programme, now);
                if !keep {
                    debug!(
                        "Pruning programme channel={} start={:?} stop={:?}",
                        programme.channel_id(),
                        programme.start(),
                        programme.stop()
                    );
                }
                keep
            })
            .collect();
        let dropped = before - kept.len();

        info!(
            "Retention ({}): kept={} dropped={}",
            self.describe(),
            kept.len(),
            dropped
        );
        (kept, dropped)
    }

    /// Human-readable policy summary for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Cutoff { cutoff } => format!("cutoff {cutoff}"),
            Self::RollingWindow { window } => {
                format!("rolling window {}", humantime::format_duration(*window))
            }
        }
    }
}

/// Oldest stop time still inside the window; saturates for huge windows
fn window_start(now: NaiveDateTime, window: Duration) -> NaiveDateTime {
    TimeDelta::from_std(window)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(NaiveDateTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn programme_starting(start: &str) -> Programme {
        Programme::with_title("kayo.1", start, "20260110233000 +0530", "Show")
    }

    fn programme_stopping(stop: &str) -> Programme {
        Programme::with_title("kayo.1", "20250101000000 +0530", stop, "Show")
    }

    fn stamp(dt: NaiveDateTime) -> String {
        format!("{} +0530", dt.format("%Y%m%d%H%M%S"))
    }

    #[test]
    fn test_cutoff_boundary() {
        let policy = RetentionPolicy::Cutoff {
            cutoff: at(2026, 1, 10, 0, 0, 0),
        };
        let now = at(2026, 6, 1, 0, 0, 0);

        assert!(!policy.retains(&programme_starting("20260109235959 +0530"), now));
        assert!(policy.retains(&programme_starting("20260110000000 +0530"), now));
        assert!(policy.retains(&programme_starting("20260215120000 +0530"), now));
    }

    #[test]
    fn test_cutoff_drops_unparsable_start() {
        let policy = RetentionPolicy::Cutoff {
            cutoff: at(2026, 1, 10, 0, 0, 0),
        };
        let now = at(2026, 6, 1, 0, 0, 0);

        assert!(!policy.retains(&programme_starting("soon"), now));
        assert!(!policy.retains(&programme_starting(""), now));
    }

    #[test]
    fn test_rolling_window() {
        let policy = RetentionPolicy::RollingWindow {
            window: Duration::from_secs(30 * 24 * 3600),
        };
        let now = at(2026, 3, 15, 12, 0, 0);

        let d_minus_31 = now - TimeDelta::days(31);
        let d_minus_29 = now - TimeDelta::days(29);

        assert!(!policy.retains(&programme_stopping(&stamp(d_minus_31)), now));
        assert!(policy.retains(&programme_stopping(&stamp(d_minus_29)), now));
        assert!(policy.retains(&programme_stopping("unknown"), now));
    }

    #[test]
    fn test_rolling_window_boundary_is_exclusive() {
        let policy = RetentionPolicy::RollingWindow {
            window: Duration::from_secs(24 * 3600),
        };
        let now = at(2026, 3, 15, 12, 0, 0);

        assert!(!policy.retains(&programme_stopping("20260314120000 +0530"), now));
        assert!(policy.retains(&programme_stopping("20260314120001 +0530"), now));
    }

    #[test]
    fn test_rolling_window_missing_stop_is_kept() {
        let policy = RetentionPolicy::RollingWindow {
            window: Duration::from_secs(3600),
        };
        let programme = Programme::new(
            crate::models::XmlElement::new("programme")
                .with_attribute("channel", "kayo.1")
                .with_attribute("start", "20200101000000 +0530"),
        );
        assert!(policy.retains(&programme, at(2026, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_apply_counts_drops() {
        let policy = RetentionPolicy::Cutoff {
            cutoff: at(2026, 1, 10, 0, 0, 0),
        };
        let programmes = vec![
            programme_starting("20260109000000 +0530"),
            programme_starting("20260111000000 +0530"),
            programme_starting("bad"),
        ];

        let (kept, dropped) = policy.apply(programmes, at(2026, 1, 12, 0, 0, 0));
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped, 2);
        assert_eq!(kept[0].start(), Some("20260111000000 +0530"));
    }

    #[test]
    fn test_huge_window_keeps_everything() {
        let policy = RetentionPolicy::RollingWindow {
            window: Duration::from_secs(u64::MAX),
        };
        assert!(policy.retains(
            &programme_stopping("19700101000000 +0530"),
            at(2026, 1, 1, 0, 0, 0)
        ));
    }
}
