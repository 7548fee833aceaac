use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::CatalogProfile;
use crate::dispatcher::DelayWindow;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which content catalog answers requests
    pub profile: CatalogProfile,

    /// Fixed RNG seed for reproducible replies and delays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Simulated reply latency
    pub delay: DelayConfig,

    /// UI preferences
    pub ui: UiConfig,

    /// SpendCast home directory
    #[serde(skip)]
    pub spendcast_home: PathBuf,
}

/// Bounds of the simulated reply latency, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub min_ms: u64,
    pub max_ms: u64,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_timestamps: bool,
    pub tick_rate_ms: u64, // milliseconds between redraws
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            min_ms: 1000,
            max_ms: 3000,
        }
    }
}

impl DelayConfig {
    pub fn window(&self) -> crate::error::Result<DelayWindow> {
        DelayWindow::from_millis(self.min_ms, self.max_ms)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            tick_rate_ms: 250,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            profile: CatalogProfile::default(),
            seed: None,
            delay: DelayConfig::default(),
            ui: UiConfig::default(),
            spendcast_home: home.join(".spendcast"),
        }
    }
}

impl Config {
    /// Load configuration from `~/.spendcast/config.toml`, falling back to defaults
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let spendcast_home = home.join(".spendcast");

        fs::create_dir_all(&spendcast_home)
            .context("Failed to create .spendcast directory")?;

        let mut config = Self::load_from(&spendcast_home.join("config.toml"))?;
        config.spendcast_home = spendcast_home;
        Ok(config)
    }

    /// Load configuration from an explicit file; a missing file yields defaults
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            Self::parse(&content)?
        } else {
            Config::default()
        };

        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.spendcast_home)
            .context("Failed to create .spendcast directory")?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(self.config_path(), content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.delay.window()?;
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.spendcast_home.join("config.toml")
    }

    /// File the interactive chat logs into, keeping the terminal clean
    pub fn log_path(&self) -> PathBuf {
        self.spendcast_home.join("spendcast.log")
    }

    pub fn with_profile(mut self, profile: CatalogProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
