use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::error::SolarError;
use crate::models::solar::{ClimateType, DEFAULT_LATITUDE_LIMIT, GeoLocation};

fn default_latitude_limit() -> f64 { DEFAULT_LATITUDE_LIMIT }
fn default_from_day() -> i32 { 1 }
fn default_to_day() -> i32 { 366 }
fn default_precompute() -> bool { true }

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate site id: {0}")]
    DuplicateSite(String),

    #[error("site {id}: {source}")]
    InvalidSite {
        id: String,
        #[source]
        source: SolarError,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    /// Largest accepted |latitude| in degrees
    #[serde(default = "default_latitude_limit")]
    pub max_abs_latitude: f64,
    #[serde(default)]
    pub report: ReportConfig,
    pub sites: Vec<SiteConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Yearly report computed for every site at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_from_day")]
    pub from_day: i32,
    /// Exclusive
    #[serde(default = "default_to_day")]
    pub to_day: i32,
    #[serde(default = "default_precompute")]
    pub precompute: bool,
    /// When set, precomputed reports are also written here as CSV, JSON and XML
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            from_day: default_from_day(),
            to_day: default_to_day(),
            precompute: default_precompute(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, ToSchema)]
pub struct SiteConfig {
    pub id: String,
    pub name: String,
    /// Degrees, positive north
    pub latitude: f64,
    /// Degrees, positive east
    #[serde(default)]
    pub longitude: Option<f64>,
    pub altitude_m: f64,
    #[schema(value_type = String, example = "MIDLATITUDE SUMMER")]
    pub climate: ClimateType,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Site ids must be unique and every latitude inside the configured bound.
    /// Climate names are already checked during deserialisation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for site in &self.sites {
            if !seen.insert(site.id.as_str()) {
                return Err(ConfigError::DuplicateSite(site.id.clone()));
            }
            GeoLocation::with_limit(site.latitude, site.longitude, self.max_abs_latitude)
                .map_err(|source| ConfigError::InvalidSite {
                    id: site.id.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    pub fn site(&self, id: &str) -> Option<&SiteConfig> {
        self.sites.iter().find(|s| s.id == id)
    }
}
