use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

use crate::errors::{AppError, AppResult};
use crate::pipeline::stages::filtering::{ChannelClassifier, ChannelRule};
use crate::pipeline::stages::retention::RetentionPolicy;
use crate::utils::time::parse_fixed_offset;
use crate::utils::url::UrlUtils;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub storage: StorageConfig,
    pub timezone: TimezoneConfig,
    pub retention: RetentionPolicy,
    pub channels: ChannelsConfig,
}

/// Upstream XMLTV provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Feed URL; `{username}` and `{password}` are filled from the environment
    #[serde(default = "default_provider_url")]
    pub url: String,
    /// Environment variable holding the account username
    #[serde(default = "default_username_env")]
    pub username_env: String,
    /// Environment variable holding the account password
    #[serde(default = "default_password_env")]
    pub password_env: String,
    #[serde(default = "default_connect_timeout", with = "duration_serde::duration")]
    pub connect_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Gzip-compressed XMLTV file holding the guide history
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimezoneConfig {
    /// Offset programme times are shifted to, e.g. "+05:30"
    #[serde(default = "default_target_offset")]
    pub target_offset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelsConfig {
    #[serde(default = "default_channel_rules")]
    pub rules: Vec<ChannelRule>,
}

fn default_provider_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

fn default_username_env() -> String {
    DEFAULT_USERNAME_ENV.to_string()
}

fn default_password_env() -> String {
    DEFAULT_PASSWORD_ENV.to_string()
}

fn default_connect_timeout() -> Duration {
    humantime::parse_duration(DEFAULT_CONNECT_TIMEOUT).unwrap_or(Duration::from_secs(30))
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_PATH)
}

fn default_target_offset() -> String {
    DEFAULT_TARGET_OFFSET.to_string()
}

fn default_retention_window() -> Duration {
    humantime::parse_duration(DEFAULT_RETENTION_WINDOW)
        .unwrap_or(Duration::from_secs(30 * 24 * 3600))
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: default_provider_url(),
            username_env: default_username_env(),
            password_env: default_password_env(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            target_offset: default_target_offset(),
        }
    }
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            rules: default_channel_rules(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            storage: StorageConfig::default(),
            timezone: TimezoneConfig::default(),
            retention: RetentionPolicy::RollingWindow {
                window: default_retention_window(),
            },
            channels: ChannelsConfig::default(),
        }
    }
}

impl TimezoneConfig {
    pub fn fixed_offset(&self) -> AppResult<chrono::FixedOffset> {
        parse_fixed_offset(&self.target_offset).map_err(|e| {
            AppError::configuration(format!("timezone.target_offset: {e}"))
        })
    }
}

impl ChannelsConfig {
    pub fn classifier(&self) -> AppResult<ChannelClassifier> {
        ChannelClassifier::new(self.rules.clone())
    }
}

/// Provider account credentials
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env(provider: &ProviderConfig) -> AppResult<Self> {
        Self::from_lookup(provider, |name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup
    ///
    /// Unset and empty variables are both treated as missing.
    pub fn from_lookup<F>(provider: &ProviderConfig, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let missing: Vec<&str> = [provider.username_env.as_str(), provider.password_env.as_str()]
            .into_iter()
            .filter(|&name| read(name).is_none())
            .collect();

        match (read(&provider.username_env), read(&provider.password_env)) {
            (Some(username), Some(password)) => Ok(Self { username, password }),
            _ => Err(AppError::configuration(format!(
                "{} not found in environment",
                missing.join(" and ")
            ))),
        }
    }
}

impl ProviderConfig {
    /// Feed URL with credentials filled in
    pub fn resolve_url(&self, credentials: &Credentials) -> String {
        UrlUtils::fill_credentials(&self.url, &credentials.username, &credentials.password)
    }
}

impl Config {
    /// Load configuration: built-in defaults, then the TOML file (if it
    /// exists), then `EPG_UPDATER_*` environment variables
    ///
    /// Nested keys use a double underscore in the environment, e.g.
    /// `EPG_UPDATER_STORAGE__SNAPSHOT_PATH`.
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match config_file {
            Some(path) if path.exists() => {
                info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            Some(path) => {
                debug!("Config file {} not found, using defaults", path.display());
            }
            None => {}
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    /// Extract and validate configuration from a prepared figment
    pub fn from_figment(figment: Figment) -> AppResult<Self> {
        let config: Config = figment
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that cannot be expressed through serde alone
    pub fn validate(&self) -> AppResult<()> {
        self.timezone.fixed_offset()?;
        self.channels.classifier()?;

        let sample = self.provider.resolve_url(&Credentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        });
        UrlUtils::validate_http_url(&sample)
            .map_err(|e| AppError::configuration(format!("provider.url: {e}")))?;

        if self.storage.snapshot_path.as_os_str().is_empty() {
            return Err(AppError::configuration("storage.snapshot_path must not be empty"));
        }
        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::configuration(e.to_string()))
    }
}
