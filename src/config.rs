//! Shell configuration, read from a TOML file with environment overrides.
//!
//! Lookup order for the file: `$EZO_SHELL_CONFIG`, then `ezo-shell.toml` in
//! the working directory, then built-in defaults. `$THINGSPEAK_API_KEY`
//! replaces the configured write key.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::common::address::EzoAddr;
use crate::common::timing::CommandTimeouts;
use crate::publisher::ThingSpeak;

pub const CONFIG_ENV: &str = "EZO_SHELL_CONFIG";
pub const API_KEY_ENV: &str = "THINGSPEAK_API_KEY";
pub const DEFAULT_CONFIG_FILE: &str = "ezo-shell.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bus: BusConfig,
    pub timing: TimingConfig,
    pub scd30: Scd30Config,
    pub thingspeak: ThingSpeakConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    /// I2C character device, e.g. `/dev/i2c-1` on a Raspberry Pi.
    pub path: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            path: "/dev/i2c-1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub long_timeout_ms: u64,
    pub short_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let defaults = CommandTimeouts::default();
        Self {
            long_timeout_ms: defaults.long.as_millis() as u64,
            short_timeout_ms: defaults.short.as_millis() as u64,
        }
    }
}

impl TimingConfig {
    pub fn timeouts(&self) -> CommandTimeouts {
        CommandTimeouts {
            long: Duration::from_millis(self.long_timeout_ms),
            short: Duration::from_millis(self.short_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Scd30Config {
    pub enabled: bool,
    pub address: u8,
    pub measurement_interval_s: u16,
    /// 0 disables pressure compensation.
    pub ambient_pressure_mbar: u16,
}

impl Default for Scd30Config {
    fn default() -> Self {
        Self {
            enabled: true,
            address: EzoAddr::SCD30_DEFAULT.value(),
            measurement_interval_s: 2,
            ambient_pressure_mbar: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ThingSpeakConfig {
    pub channel_id: Option<u64>,
    /// Channel write key. Publishing is off without one.
    pub api_key: Option<String>,
    pub url: String,
    pub timeout_s: u64,
}

impl Default for ThingSpeakConfig {
    fn default() -> Self {
        Self {
            channel_id: None,
            api_key: None,
            url: ThingSpeak::DEFAULT_URL.to_string(),
            timeout_s: 10,
        }
    }
}

impl ThingSpeakConfig {
    /// The write key, if publishing is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_s)
    }

    /// Update URL plus the channel id when one is configured, for logs.
    pub fn target(&self) -> String {
        match self.channel_id {
            Some(channel) => format!("{} (channel {})", self.url, channel),
            None => self.url.clone(),
        }
    }
}

impl Config {
    /// Loads the configuration following the lookup order in the module docs.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = explicit.or_else(|| {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.exists().then_some(local)
        });

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                log::info!("no config file, using defaults");
                Config::default()
            }
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.thingspeak.api_key = Some(key);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("loading config from {}", path.display());
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.long_timeout_ms < self.timing.short_timeout_ms {
            return Err(ConfigError::Invalid {
                field: "timing.long_timeout_ms",
                message: "must not be shorter than timing.short_timeout_ms".to_string(),
            });
        }
        self.scd30_address()?;
        Ok(())
    }

    pub fn scd30_address(&self) -> Result<EzoAddr, ConfigError> {
        EzoAddr::new(self.scd30.address).map_err(|e| ConfigError::Invalid {
            field: "scd30.address",
            message: e.to_string(),
        })
    }
}
