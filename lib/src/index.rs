use log::debug;
use rstar::{RTree, RTreeObject, AABB};

use crate::model::CellRecord;

/// Approximate degrees of latitude per meter.
pub const DEGREES_PER_METER: f64 = 1.0 / 111_320.0;

// widens the envelope so rounding in the degree conversion never drops a cell
// that the exact haversine check would keep
const ENVELOPE_SLACK: f64 = 1.01;

#[derive(Debug, Clone, Copy)]
struct IndexedCell {
    idx: usize,
    lat: f64,
    lon: f64,
}

impl RTreeObject for IndexedCell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lon])
    }
}

/// Read-only spatial index over a set of cells, addressed by their input position.
pub struct CellIndex {
    tree: RTree<IndexedCell>,
}

impl CellIndex {
    /// Bulk-load every cell with a finite position; the others can never be a candidate.
    pub fn build(cells: &[CellRecord]) -> Self {
        let indexed: Vec<IndexedCell> = cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.has_finite_position())
            .map(|(idx, c)| IndexedCell {
                idx,
                lat: c.latitude,
                lon: c.longitude,
            })
            .collect();

        let skipped = cells.len() - indexed.len();
        if skipped > 0 {
            debug!("{skipped} cells without a usable position left out of the index");
        }

        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Input indices of cells that may lie within `radius_m` of the point, sorted ascending.
    ///
    /// The result is a superset of the cells inside the great circle of that
    /// radius, at any radius. Longitude is widened to the exact extent of the
    /// circle, `asin(sin(r) / cos(lat))`, and the whole band is used once that
    /// circle reaches a pole. Envelopes crossing the antimeridian are searched
    /// on both sides.
    pub fn within(&self, lat: f64, lon: f64, radius_m: f64) -> Vec<usize> {
        if !lat.is_finite() || !lon.is_finite() || !radius_m.is_finite() || radius_m < 0.0 {
            return Vec::new();
        }

        let dlat = radius_m * DEGREES_PER_METER * ENVELOPE_SLACK;
        let dlon = longitude_extent(lat, dlat);

        let mut found: Vec<usize> = Vec::new();
        for shift in [0.0, 360.0, -360.0] {
            let (west, east) = (lon - dlon + shift, lon + dlon + shift);
            if east < -180.0 || west > 180.0 {
                continue;
            }
            let envelope = AABB::from_corners([lat - dlat, west], [lat + dlat, east]);
            found.extend(self.tree.locate_in_envelope(&envelope).map(|c| c.idx));
        }
        found.sort_unstable();
        found.dedup();
        found
    }
}

/// Half width in degrees of longitude of a circle with angular radius `dlat`
/// degrees centred at `lat`; 360 when the circle covers a pole.
fn longitude_extent(lat: f64, dlat: f64) -> f64 {
    if dlat >= 90.0 {
        return 360.0;
    }
    let ratio = dlat.to_radians().sin() / lat.to_radians().cos().abs();
    if !ratio.is_finite() || ratio >= 1.0 {
        360.0
    } else {
        ratio.asin().to_degrees()
    }
}
