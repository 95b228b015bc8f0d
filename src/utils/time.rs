//! Time utilities for XMLTV timestamps and UTC offsets

use chrono::{FixedOffset, NaiveDateTime};
use regex::Regex;

/// Date-time component of an XMLTV timestamp, without the offset
pub const XMLTV_NAIVE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parse the date-time component of an XMLTV timestamp
///
/// Only the first whitespace-separated token is read, so any trailing UTC
/// offset is ignored. Returns `None` for empty or malformed input.
pub fn parse_xmltv_naive(timestamp: &str) -> Option<NaiveDateTime> {
    let token = timestamp.split_whitespace().next()?;
    NaiveDateTime::parse_from_str(token, XMLTV_NAIVE_FORMAT).ok()
}

/// Format an offset the way XMLTV suffixes timestamps, e.g. `+0530`
pub fn format_offset_suffix(offset: &FixedOffset) -> String {
    let total_seconds = offset.local_minus_utc();
    let sign = if total_seconds < 0 { '-' } else { '+' };
    let total_minutes = total_seconds.abs() / 60;
    format!("{sign}{:02}{:02}", total_minutes / 60, total_minutes % 60)
}

/// Parse fixed offset timezone formats like "+05:30", "+0530", "-0100"
pub fn parse_fixed_offset(offset_str: &str) -> Result<FixedOffset, String> {
    let offset_str = offset_str.trim();

    if offset_str.eq_ignore_ascii_case("UTC") || offset_str.eq_ignore_ascii_case("Z") {
        return FixedOffset::east_opt(0).ok_or_else(|| "Invalid timezone offset".to_string());
    }

    let re = Regex::new(r"^([+-])(\d{2}):?(\d{2})$").map_err(|e| format!("Regex error: {e}"))?;

    let caps = re
        .captures(offset_str)
        .ok_or_else(|| format!("Invalid offset format: '{offset_str}'"))?;

    let sign = if &caps[1] == "+" { 1 } else { -1 };
    let hours: i32 = caps[2]
        .parse()
        .map_err(|_| "Invalid hours in offset".to_string())?;
    let minutes: i32 = caps[3]
        .parse()
        .map_err(|_| "Invalid minutes in offset".to_string())?;

    if hours > 23 || minutes > 59 {
        return Err("Invalid time values in offset".to_string());
    }

    let total_seconds = sign * (hours * 3600 + minutes * 60);

    FixedOffset::east_opt(total_seconds).ok_or_else(|| "Invalid timezone offset".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_parse_xmltv_naive_ignores_offset() {
        let parsed = parse_xmltv_naive("20260110180000 +0000").unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2026, 1, 10)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap()
        );

        let without_offset = parse_xmltv_naive("20260110180000").unwrap();
        assert_eq!(parsed, without_offset);
    }

    #[test]
    fn test_parse_xmltv_naive_rejects_garbage() {
        assert!(parse_xmltv_naive("").is_none());
        assert!(parse_xmltv_naive("   ").is_none());
        assert!(parse_xmltv_naive("tomorrow evening").is_none());
        assert!(parse_xmltv_naive("20261340180000 +0000").is_none());
    }

    #[test]
    fn test_parse_fixed_offset() {
        let ist = parse_fixed_offset("+05:30").unwrap();
        assert_eq!(ist.local_minus_utc(), 19800);
        assert_eq!(parse_fixed_offset("+0530").unwrap(), ist);
        assert_eq!(parse_fixed_offset("-05:00").unwrap().local_minus_utc(), -18000);
        assert_eq!(parse_fixed_offset("UTC").unwrap().local_minus_utc(), 0);
        assert!(parse_fixed_offset("+25:00").is_err());
        assert!(parse_fixed_offset("India").is_err());
    }

    #[test]
    fn test_format_offset_suffix() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        assert_eq!(format_offset_suffix(&ist), "+0530");

        let west = FixedOffset::west_opt(3 * 3600 + 30 * 60).unwrap();
        assert_eq!(format_offset_suffix(&west), "-0330");

        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(format_offset_suffix(&utc), "+0000");
        assert_eq!(parse_xmltv_naive("20260110180000").unwrap().hour(), 18);
    }
}
