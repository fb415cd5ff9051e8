use std::{fs::File, io, path::Path};

use anyhow::{Context, Result};
use liboffload::ClassificationResult;
use serde::Serialize;

/// One output row: the 4G cell followed by its classification
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    name: &'a str,
    longitude: f64,
    latitude: f64,
    azimuth: f64,
    category: &'static str,
    result: String,
    associated_cell: &'a str,
    distance_m: Option<String>,
    angle_diff_deg: Option<String>,
    nearby_count: Option<usize>,
}

impl<'a> From<&'a ClassificationResult> for ResultRow<'a> {
    fn from(value: &'a ClassificationResult) -> Self {
        let cell = value.source();
        Self {
            name: &cell.name,
            longitude: cell.longitude,
            latitude: cell.latitude,
            azimuth: cell.azimuth,
            category: value.category().label(),
            result: value.describe(),
            associated_cell: value.associated_cell_name(),
            distance_m: value.distance_m().map(|d| format!("{d:.2}")),
            angle_diff_deg: value.angle_diff_deg().map(|a| format!("{a:.2}")),
            nearby_count: value.nearby_count(),
        }
    }
}

pub fn write<W: io::Write>(writer: W, results: &[ClassificationResult]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for result in results {
        writer.serialize(ResultRow::from(result))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save(path: &Path, results: &[ClassificationResult]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write(file, results).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use liboffload::{classify, CellRecord, Thresholds};

    use super::*;

    #[test]
    fn one_row_per_result() {
        let lte = vec![
            CellRecord::new("L1", 114.0, 30.0, 10.0),
            CellRecord::new("L2", 115.0, 31.0, 10.0),
        ];
        let nr = vec![CellRecord::new("N1", 114.0, 30.0, 20.0)];
        let results = classify(&lte, &nr, Thresholds::default(), None).unwrap();

        let mut out = Vec::new();
        write(&mut out, &results).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "name,longitude,latitude,azimuth,category,result,associated_cell,distance_m,angle_diff_deg,nearby_count"
        );
        assert_eq!(
            lines[1],
            "L1,114.0,30.0,10.0,co_located_offload,\"co-located 5G offload (cell: N1, distance: 0.00m, angle: 10.00°)\",N1,0.00,10.00,"
        );
        assert_eq!(lines[2], "L2,115.0,31.0,10.0,needs_planning,5G planning required,N/A,,,");
        assert_eq!(lines.len(), 3);
    }
}
