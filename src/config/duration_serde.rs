//! Serde helpers for human-readable durations in configuration.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::{fmt, time::Duration};

/// Custom serde functions for Duration that support human-readable strings
pub mod duration {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration_str = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&duration_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationVisitor;

        impl<'de> Visitor<'de> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(
                    "a duration as seconds (number) or human-readable string (e.g., '30days', '7d', '1h30m')",
                )
            }

            fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_secs(seconds))
            }

            fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(seconds)
                    .map(Duration::from_secs)
                    .map_err(|_| de::Error::custom(format!("Duration cannot be negative: {seconds}")))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                humantime::parse_duration(value)
                    .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Window {
        #[serde(with = "super::duration")]
        window: Duration,
    }

    #[test]
    fn test_parses_human_readable_strings() {
        let parsed: Window = toml::from_str("window = \"7d\"").unwrap();
        assert_eq!(parsed.window, Duration::from_secs(7 * 24 * 3600));

        let parsed: Window = toml::from_str("window = \"1h30m\"").unwrap();
        assert_eq!(parsed.window, Duration::from_secs(5400));
    }

    #[test]
    fn test_parses_plain_seconds() {
        let parsed: Window = toml::from_str("window = 90").unwrap();
        assert_eq!(parsed.window, Duration::from_secs(90));
        assert!(toml::from_str::<Window>("window = -5").is_err());
    }

    #[test]
    fn test_serializes_human_readable() {
        let window = Window {
            window: Duration::from_secs(30 * 24 * 3600),
        };
        let text = toml::to_string(&window).unwrap();
        assert_eq!(text.trim(), "window = \"30days\"");
        assert_eq!(toml::from_str::<Window>(&text).unwrap(), window);
    }
}
