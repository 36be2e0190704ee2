use std::path::PathBuf;
use std::time::Duration;

use crate::engine::{BookingError, Catalog, CatalogSeed};

const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;
const DEFAULT_SWEEP_SECS: u64 = 3600;

/// Start-up settings, read from `COURTSIDE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// JSON catalogue to seed facilities and equipment from.
    pub catalog_path: Option<PathBuf>,
    pub metrics_port: Option<u16>,
    pub utc_offset_hours: i32,
    pub sweep_period: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: None,
            metrics_port: None,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            sweep_period: Duration::from_secs(DEFAULT_SWEEP_SECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            catalog_path: lookup("COURTSIDE_CATALOG").map(PathBuf::from),
            metrics_port: lookup("COURTSIDE_METRICS_PORT").and_then(|s| s.parse().ok()),
            utc_offset_hours: lookup("COURTSIDE_UTC_OFFSET_HOURS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.utc_offset_hours),
            sweep_period: lookup("COURTSIDE_SWEEP_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_period),
        }
    }

    /// Load the configured catalogue, or an empty one when no path is set.
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        let Some(path) = &self.catalog_path else {
            return Ok(Catalog::new());
        };
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        parse_catalog(&raw)
    }
}

pub fn parse_catalog(raw: &str) -> Result<Catalog, ConfigError> {
    let seed: CatalogSeed = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
    Catalog::from_seed(&seed).map_err(ConfigError::Catalog)
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Catalog(BookingError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read catalogue: {e}"),
            ConfigError::Parse(e) => write!(f, "malformed catalogue: {e}"),
            ConfigError::Catalog(e) => write!(f, "invalid catalogue entry: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
