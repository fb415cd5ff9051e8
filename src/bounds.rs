use liboffload::CellRecord;
use serde::Deserialize;

/// Plausible range for cell coordinates and headings; rows outside are dropped on load.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_azimuth: f64,
    pub max_azimuth: f64,
}

impl Default for Bounds {
    // mainland China
    fn default() -> Self {
        Self {
            min_lon: 73.0,
            max_lon: 135.0,
            min_lat: 18.0,
            max_lat: 53.0,
            min_azimuth: 0.0,
            max_azimuth: 360.0,
        }
    }
}

impl Bounds {
    pub fn contains(&self, cell: &CellRecord) -> bool {
        (self.min_lon..=self.max_lon).contains(&cell.longitude)
            && (self.min_lat..=self.max_lat).contains(&cell.latitude)
            && (self.min_azimuth..=self.max_azimuth).contains(&cell.azimuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_edges() {
        let b = Bounds::default();
        assert!(b.contains(&CellRecord::new("a", 73.0, 18.0, 0.0)));
        assert!(b.contains(&CellRecord::new("b", 135.0, 53.0, 360.0)));
        assert!(!b.contains(&CellRecord::new("c", 72.9, 30.0, 0.0)));
        assert!(!b.contains(&CellRecord::new("d", 114.0, 53.1, 0.0)));
        assert!(!b.contains(&CellRecord::new("e", 114.0, 30.0, -1.0)));
        assert!(!b.contains(&CellRecord::new("f", 114.0, 30.0, 361.0)));
    }
}
