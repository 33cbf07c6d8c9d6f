//! TOML-based application configuration.
//!
//! Stores:
//! - Remote endpoint URLs and the bearer token reference
//! - The local user id written into check-in records
//! - Tick/resync cadence for the time projection
//! - The day's configured floor actions
//! - Reminder scheduler settings
//!
//! Configuration is stored at `~/.config/forge/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;

/// Remote endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Time authority endpoint (unauthenticated GET).
    #[serde(default = "default_time_authority_url")]
    pub time_authority_url: String,
    /// Day-timer-check endpoint (bearer-token POST).
    #[serde(default = "default_day_check_url")]
    pub day_check_url: String,
    /// Bearer token for authenticated endpoints. Left empty until the
    /// user signs in; writes fail fast with a not-authenticated error.
    #[serde(default)]
    pub bearer_token: String,
}

/// Time projection cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// UI tick interval in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_interval_secs: u64,
    /// Resync-against-authority interval in seconds.
    #[serde(default = "default_resync_secs")]
    pub resync_interval_secs: u64,
}

/// Floor action configuration: the day's dynamic checklist texts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloorConfig {
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Reminder scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cadence between nudges, in minutes.
    #[serde(default = "default_reminder_cadence_min")]
    pub cadence_min: u64,
    /// No reminders before this UTC hour.
    #[serde(default = "default_reminder_start_hour")]
    pub start_hour: u8,
    /// No reminders at or after this UTC hour.
    #[serde(default = "default_reminder_end_hour")]
    pub end_hour: u8,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/forge/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// User id written into check-in records.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub floor: FloorConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
}

// Default functions
fn default_user_id() -> String {
    "local".into()
}
fn default_time_authority_url() -> String {
    "https://forge.local/api/time".into()
}
fn default_day_check_url() -> String {
    "https://forge.local/api/day-check".into()
}
fn default_tick_secs() -> u64 {
    1
}
fn default_resync_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}
fn default_reminder_cadence_min() -> u64 {
    60
}
fn default_reminder_start_hour() -> u8 {
    8
}
fn default_reminder_end_hour() -> u8 {
    22
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            time_authority_url: default_time_authority_url(),
            day_check_url: default_day_check_url(),
            bearer_token: String::new(),
        }
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_secs(),
            resync_interval_secs: default_resync_secs(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cadence_min: default_reminder_cadence_min(),
            start_hour: default_reminder_start_hour(),
            end_hour: default_reminder_end_hour(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            endpoints: EndpointsConfig::default(),
            time: TimeConfig::default(),
            floor: FloorConfig::default(),
            reminders: RemindersConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }
}
