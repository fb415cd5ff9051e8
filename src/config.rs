use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use liboffload::Thresholds;
use serde::Deserialize;

use crate::bounds::Bounds;

const DEFAULT_PATH: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub bounds: Bounds,
    pub sectors: SectorConfig,
    pub stats: Option<StatsConfig>,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SectorConfig {
    pub radius_m: f64,
    pub angle_deg: f64,
    pub arc_steps: usize,

    // polygons kept in memory while exporting; 0 disables the cache
    pub cache_capacity: usize,
}

impl Default for SectorConfig {
    fn default() -> Self {
        Self {
            radius_m: 500.0,
            angle_deg: 60.0,
            arc_steps: liboffload::geometry::DEFAULT_ARC_STEPS,
            cache_capacity: 4096,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatsConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub timestamp: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            timestamp: false,
        }
    }
}

/// Load the configuration file.
///
/// An explicit path must exist. Without one `config.toml` is used when
/// present and the built-in defaults otherwise.
pub fn load(path: Option<&Path>) -> Result<Config> {
    load_or_default(path, Path::new(DEFAULT_PATH))
}

/// An explicit path must exist; a missing `default` file means built-in defaults.
fn load_or_default(path: Option<&Path>, default: &Path) -> Result<Config> {
    let path = match path {
        Some(x) => x,
        None => {
            if !default.exists() {
                return Ok(Config::default());
            }
            default
        }
    };

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse(&data)
}

fn parse(data: &str) -> Result<Config> {
    let config = toml::from_str(data).context("Failed to parse config")?;
    Ok(config)
}
