use std::{fs, path::Path};

use anyhow::{Context, Result};
use geo::{Point, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use liboffload::{Category, CellRecord, ClassificationResult, SectorCache};
use log::{debug, info};
use serde_json::json;

use crate::{analyze, config::Config, config::SectorConfig};

const NR_COLOR: &str = "#1f77b4";

fn color(category: Category) -> &'static str {
    match category {
        Category::CoLocatedOffload => "#28a745",
        Category::CoLocatedTune => "#ffc107",
        Category::NonColocatedOffload => "#17a2b8",
        Category::NeedsPlanning => "#dc3545",
    }
}

pub fn run(config: &Config, lte: &Path, nr: &Path, output: &Path) -> Result<()> {
    let (four_g, five_g) = analyze::load_tables(config, lte, nr)?;
    let results = analyze::classify_cells(config, &four_g, &five_g, false)?;

    let collection = features(&results, &five_g, &config.sectors);
    let count = collection.features.len();
    let data = GeoJson::from(collection).to_string();
    fs::write(output, data).with_context(|| format!("Failed to write {}", output.display()))?;
    info!("wrote {count} features to {}", output.display());

    Ok(())
}

/// One sector polygon per 4G cell followed by one point per 5G cell.
fn features(
    results: &[ClassificationResult],
    five_g: &[CellRecord],
    sectors: &SectorConfig,
) -> FeatureCollection {
    let mut cache = SectorCache::new(sectors.cache_capacity);
    let mut features = Vec::with_capacity(results.len() + five_g.len());

    for result in results {
        let cell = result.source();
        let ring = match cache.get_or_build(
            cell.longitude,
            cell.latitude,
            cell.azimuth,
            sectors.radius_m,
            sectors.angle_deg,
            sectors.arc_steps,
        ) {
            Ok(x) => x,
            Err(e) => {
                debug!("skipping sector for {}: {e}", cell.name);
                continue;
            }
        };

        let category = result.category();
        let mut properties = JsonObject::new();
        properties.insert("name".to_owned(), json!(cell.name));
        properties.insert("generation".to_owned(), json!("4G"));
        properties.insert("category".to_owned(), json!(category.label()));
        properties.insert("title".to_owned(), json!(category.title()));
        properties.insert("result".to_owned(), json!(result.describe()));
        properties.insert("associated_cell".to_owned(), json!(result.associated_cell_name()));
        properties.insert("color".to_owned(), json!(color(category)));

        let polygon = Polygon::new(ring, vec![]);
        features.push(feature(Value::from(&polygon), properties));
    }
    debug!(
        "sector cache: {} hits, {} misses",
        cache.hits(),
        cache.misses()
    );

    for cell in five_g {
        let mut properties = JsonObject::new();
        properties.insert("name".to_owned(), json!(cell.name));
        properties.insert("generation".to_owned(), json!("5G"));
        properties.insert("azimuth".to_owned(), json!(cell.azimuth));
        properties.insert("color".to_owned(), json!(NR_COLOR));

        let point = Point::new(cell.longitude, cell.latitude);
        features.push(feature(Value::from(&point), properties));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use liboffload::{classify, Thresholds};

    use super::*;

    #[test]
    fn sectors_and_points() {
        let lte = vec![
            CellRecord::new("L1", 114.0, 30.0, 0.0),
            CellRecord::new("L2", 114.0, 30.0, 120.0),
            CellRecord::new("L3", 114.0, 30.0, f64::NAN),
        ];
        let nr = vec![CellRecord::new("N1", 114.0, 30.0, 0.0)];
        let results = classify(&lte, &nr, Thresholds::default(), None).unwrap();

        let collection = features(&results, &nr, &SectorConfig::default());
        // L3 has no heading and is left out
        assert_eq!(collection.features.len(), 3);

        let first = &collection.features[0];
        let props = first.properties.as_ref().unwrap();
        assert_eq!(props["name"], "L1");
        assert_eq!(props["category"], "co_located_offload");
        assert_eq!(props["associated_cell"], "N1");
        assert_eq!(props["color"], "#28a745");
        match &first.geometry.as_ref().unwrap().value {
            Value::Polygon(rings) => {
                assert_eq!(rings[0].len(), SectorConfig::default().arc_steps + 3);
                assert_eq!(rings[0].first(), rings[0].last());
            }
            other => panic!("expected a polygon, got {other:?}"),
        }

        let second = collection.features[1].properties.as_ref().unwrap();
        assert_eq!(second["category"], "co_located_tune");

        let point = &collection.features[2];
        assert_eq!(point.properties.as_ref().unwrap()["generation"], "5G");
        assert!(matches!(
            point.geometry.as_ref().unwrap().value,
            Value::Point(_)
        ));
    }
}
