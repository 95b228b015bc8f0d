/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
use crate::pipeline::stages::filtering::ChannelRule;

// Provider defaults
pub const DEFAULT_PROVIDER_URL: &str =
    "https://centra.ink/xmltv.php?username={username}&password={password}";
pub const DEFAULT_USERNAME_ENV: &str = "CENTRA_USERNAME";
pub const DEFAULT_PASSWORD_ENV: &str = "CENTRA_PASSWORD";
pub const DEFAULT_CONNECT_TIMEOUT: &str = "30s";
pub const DEFAULT_USER_AGENT: &str = concat!("epg-updater/", env!("CARGO_PKG_VERSION"));

// Storage defaults
pub const DEFAULT_SNAPSHOT_PATH: &str = "epg.xml.gz";

// Timezone defaults (IST)
pub const DEFAULT_TARGET_OFFSET: &str = "+05:30";

// Retention defaults
pub const DEFAULT_RETENTION_WINDOW: &str = "30days";

// Config file and environment
pub const DEFAULT_CONFIG_FILE: &str = "epg-updater.toml";
pub const ENV_PREFIX: &str = "EPG_UPDATER_";

/// Fox channel numbers carried by the curated guide
const FOX_CHANNEL_NUMBERS: [&str; 8] = ["501", "502", "503", "504", "505", "506", "507", "508"];

/// Built-in channel rule table
pub fn default_channel_rules() -> Vec<ChannelRule> {
    let mut fox_qualifiers: Vec<&str> = FOX_CHANNEL_NUMBERS.to_vec();
    fox_qualifiers.extend(["news", "cricket", "league", "footy"]);

    vec![
        ChannelRule::new("kayo", &[&["kayo"]]),
        ChannelRule::new("fox", &[&["fox"], fox_qualifiers.as_slice()]),
        ChannelRule::new("sky-sports", &[&["sky"], &["sports"]]),
        ChannelRule::new("tnt-sports", &[&["tnt"], &["sports"]]),
    ]
}
