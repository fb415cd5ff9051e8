use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use liboffload::{Summary, Thresholds};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Stats {
    pub generated_at: DateTime<Utc>,
    pub thresholds: Thresholds,
    #[serde(flatten)]
    pub summary: Summary,
}

impl Stats {
    pub fn new(thresholds: Thresholds, summary: Summary) -> Self {
        Self {
            generated_at: Utc::now(),
            thresholds,
            summary,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("Failed to write stats {}", path.display()))
    }
}
