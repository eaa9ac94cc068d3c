//! Configuration management

use anyhow::{Context, Result, anyhow};
use protocol::{DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::usb::{DEFAULT_ECHO_COUNT, DEFAULT_TIMEOUT};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SensorConfig {
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub echo: EchoSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Which device to open and how to talk to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// USB vendor ID, `0x` hex (e.g. "0x16C0")
    #[serde(default = "DeviceSettings::default_vendor_id")]
    pub vendor_id: String,
    /// USB product ID, `0x` hex (e.g. "0x05DC")
    #[serde(default = "DeviceSettings::default_product_id")]
    pub product_id: String,
    /// Control transfer timeout in milliseconds
    #[serde(default = "DeviceSettings::default_timeout_ms")]
    pub timeout_ms: u64,
    /// Configuration value selected when the device is opened
    #[serde(default = "DeviceSettings::default_configuration")]
    pub configuration: u8,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            vendor_id: Self::default_vendor_id(),
            product_id: Self::default_product_id(),
            timeout_ms: Self::default_timeout_ms(),
            configuration: Self::default_configuration(),
        }
    }
}

impl DeviceSettings {
    fn default_vendor_id() -> String {
        format!("{:#06X}", DEFAULT_VENDOR_ID)
    }

    fn default_product_id() -> String {
        format!("{:#06X}", DEFAULT_PRODUCT_ID)
    }

    fn default_timeout_ms() -> u64 {
        DEFAULT_TIMEOUT.as_millis() as u64
    }

    fn default_configuration() -> u8 {
        1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoSettings {
    /// Number of echo transfers per test
    #[serde(default = "EchoSettings::default_iterations")]
    pub iterations: u32,
}

impl Default for EchoSettings {
    fn default() -> Self {
        Self {
            iterations: Self::default_iterations(),
        }
    }
}

impl EchoSettings {
    fn default_iterations() -> u32 {
        DEFAULT_ECHO_COUNT
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "LoggingSettings::default_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl LoggingSettings {
    fn default_level() -> String {
        "warn".to_string()
    }
}

impl SensorConfig {
    /// Load configuration from file
    ///
    /// Without an explicit path the first existing standard location is used.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_path().ok_or_else(|| anyhow!("No configuration file found"))?,
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: SensorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", config_path.display()))?;

        Ok(config)
    }

    /// Load configuration from the standard locations
    ///
    /// Falls back to defaults only when no file exists. A file that exists
    /// but cannot be read, parsed or validated is an error.
    pub fn load_or_default() -> Result<Self> {
        match Self::find_path() {
            Some(path) => Self::load(Some(path)),
            None => Ok(Self::default()),
        }
    }

    /// First existing file among the standard locations
    pub fn find_path() -> Option<PathBuf> {
        [
            Self::default_path(),
            PathBuf::from("/etc/usbsht/config.toml"),
        ]
        .into_iter()
        .find(|p| p.exists())
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("usbsht").join("config.toml")
        } else {
            PathBuf::from(".config/usbsht/config.toml")
        }
    }

    /// Configured vendor ID
    pub fn vendor_id(&self) -> Result<u16> {
        parse_hex_id(&self.device.vendor_id, "VID")
    }

    /// Configured product ID
    pub fn product_id(&self) -> Result<u16> {
        parse_hex_id(&self.device.product_id, "PID")
    }

    /// Control transfer timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.device.timeout_ms)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        self.vendor_id()?;
        self.product_id()?;

        if self.device.timeout_ms == 0 {
            return Err(anyhow!("timeout_ms must be greater than 0"));
        }

        Ok(())
    }
}

/// Parse a `0x`-prefixed hex ID (VID or PID)
pub fn parse_hex_id(id: &str, name: &str) -> Result<u16> {
    if !id.starts_with("0x") && !id.starts_with("0X") {
        return Err(anyhow!(
            "Invalid {} '{}', must start with '0x' (e.g., '0x16C0')",
            name,
            id
        ));
    }

    let hex_part = &id[2..];
    if hex_part.is_empty() || hex_part.len() > 4 {
        return Err(anyhow!(
            "Invalid {} '{}', hex part must be 1-4 digits",
            name,
            id
        ));
    }

    u16::from_str_radix(hex_part, 16)
        .map_err(|_| anyhow!("Invalid {} '{}', not a valid hex number", name, id))
}

/// Expand a leading `~` in a config path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Load configuration from a path that may start with `~`
pub fn load_config(path: &str) -> Result<SensorConfig> {
    SensorConfig::load(Some(expand_path(path)))
}
