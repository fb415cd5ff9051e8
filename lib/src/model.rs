use serde::{Deserialize, Serialize};

/// A radio cell with its site position and antenna heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Degrees clockwise from north.
    pub azimuth: f64,
}

impl CellRecord {
    pub fn new(name: impl Into<String>, longitude: f64, latitude: f64, azimuth: f64) -> Self {
        Self {
            name: name.into(),
            longitude,
            latitude,
            azimuth,
        }
    }

    pub fn has_finite_position(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }
}
