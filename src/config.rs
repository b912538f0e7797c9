//! Runtime configuration
//!
//! Every field has a default so a partial (or missing) config file still
//! yields a usable [`Config`].

use crate::analytics::{IndicatorSelection, DEFAULT_PERIOD};
use crate::currency::CurrencyPair;
use crate::data::sources::frankfurter::FRANKFURTER_BASE_URL;
use crate::error::{ChartError, Result};
use crate::timeframe::Timeframe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "cli")]
use std::path::Path;

/// Directory under the home directory holding config and saved state
pub const CONFIG_DIR_NAME: &str = ".rusty-fxchart";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub indicator_period: usize,
    pub default_from: String,
    pub default_to: String,
    pub default_timeframe: Timeframe,
    pub default_indicator: IndicatorSelection,
    pub watchlist_refresh_secs: u64,
    /// Where the watchlist is saved; in-memory only when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: FRANKFURTER_BASE_URL.to_string(),
            request_timeout_secs: 10,
            indicator_period: DEFAULT_PERIOD,
            default_from: "USD".to_string(),
            default_to: "EUR".to_string(),
            default_timeframe: Timeframe::OneWeek,
            default_indicator: IndicatorSelection::None,
            watchlist_refresh_secs: 60,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(ChartError::ConfigError("api_base_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ChartError::ConfigError(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.indicator_period == 0 {
            return Err(ChartError::ConfigError(
                "indicator_period must be greater than 0".into(),
            ));
        }
        if self.watchlist_refresh_secs == 0 {
            return Err(ChartError::ConfigError(
                "watchlist_refresh_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn watchlist_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.watchlist_refresh_secs)
    }

    pub fn default_pair(&self) -> CurrencyPair {
        CurrencyPair::new(&self.default_from, &self.default_to)
    }

    #[cfg(feature = "cli")]
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| ChartError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file location (`~/.rusty-fxchart/config.toml`)
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load from `path`, or the default location when `None`.
    ///
    /// Unreadable or invalid files fall back to defaults with a warning.
    #[cfg(feature = "cli")]
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) if p.exists() => p,
            _ => return Config::default(),
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Ignoring config {}: {}", path.display(), e);
                    Config::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config {}: {}", path.display(), e);
                Config::default()
            }
        }
    }
}
