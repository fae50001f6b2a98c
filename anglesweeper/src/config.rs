/*!
Configuration management for the angle sweeper application.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::protocol::{DEFAULT_BAUD_RATE, DEFAULT_PRECISION};
use shared::SampleFormat;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

impl AppConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse config file as TOML")?;

        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.channel.baud_rate == 0 {
            anyhow::bail!("baud_rate must be greater than zero");
        }
        self.sweeper.sample_format()?;
        Ok(())
    }
}

/// Output channel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Serial device path; standard output is used when absent
    pub serial_port: Option<String>,

    /// Baud rate for the serial device, also used for pacing
    pub baud_rate: u32,

    /// Write timeout for the serial device in milliseconds
    pub timeout_ms: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: 1000,
        }
    }
}

/// Sweep loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Fractional digits for cos/sin
    pub precision: usize,

    /// Stop after this many complete sweeps; runs forever when absent
    pub sweep_limit: Option<u64>,

    /// Throttle non-serial channels to the configured baud rate
    pub pace_to_baud: bool,

    /// Statistics reporting interval in sweeps
    pub stats_interval_sweeps: u64,
}

impl SweeperConfig {
    pub fn sample_format(&self) -> Result<SampleFormat> {
        SampleFormat::new(self.precision).with_context(|| "Invalid sweeper.precision")
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            sweep_limit: None,
            pace_to_baud: false,
            stats_interval_sweeps: 100,
        }
    }
}
