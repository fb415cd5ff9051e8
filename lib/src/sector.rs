use std::collections::{BTreeMap, VecDeque};

use geo::LineString;

use crate::geometry::{sector_polygon, GeometryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SectorKey {
    // micro-degrees
    lon: i64,
    lat: i64,
    // centi-degrees
    azimuth: i64,
    angle: i64,
    // centimeters
    radius: i64,
    arc_steps: usize,
}

impl SectorKey {
    fn new(lon: f64, lat: f64, azimuth: f64, radius_m: f64, angle_deg: f64, arc_steps: usize) -> Self {
        Self {
            lon: (lon * 1e6).round() as i64,
            lat: (lat * 1e6).round() as i64,
            azimuth: (azimuth * 100.0).round() as i64,
            angle: (angle_deg * 100.0).round() as i64,
            radius: (radius_m * 100.0).round() as i64,
            arc_steps,
        }
    }
}

/// Keeps at most `capacity` polygons and evicts the oldest entry first.
///
/// A capacity of zero disables caching. Failed geometry is never stored.
#[derive(Debug)]
pub struct SectorCache {
    capacity: usize,
    entries: BTreeMap<SectorKey, LineString<f64>>,
    order: VecDeque<SectorKey>,
    hits: u64,
    misses: u64,
}

impl SectorCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: BTreeMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn get_or_build(
        &mut self,
        lon: f64,
        lat: f64,
        azimuth: f64,
        radius_m: f64,
        angle_deg: f64,
        arc_steps: usize,
    ) -> Result<LineString<f64>, GeometryError> {
        let all_finite = [lon, lat, azimuth, radius_m, angle_deg]
            .iter()
            .all(|v| v.is_finite());
        if self.capacity == 0 || !all_finite {
            return sector_polygon(lon, lat, azimuth, radius_m, angle_deg, arc_steps);
        }

        let key = SectorKey::new(lon, lat, azimuth, radius_m, angle_deg, arc_steps);
        if let Some(ring) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(ring.clone());
        }

        self.misses += 1;
        let ring = sector_polygon(lon, lat, azimuth, radius_m, angle_deg, arc_steps)?;
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, ring.clone());
        self.order.push_back(key);
        Ok(ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_sector_hits_cache() {
        let mut cache = SectorCache::new(8);
        let a = cache.get_or_build(108.38, 22.82, 120.0, 500.0, 60.0, 20).unwrap();
        let b = cache.get_or_build(108.38, 22.82, 120.0, 500.0, 60.0, 20).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, sector_polygon(108.38, 22.82, 120.0, 500.0, 60.0, 20).unwrap());
        assert_eq!(cache.len(), 1);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn evicts_oldest_first() {
        let mut cache = SectorCache::new(2);
        for azimuth in [0.0, 120.0, 240.0] {
            cache.get_or_build(114.0, 30.0, azimuth, 500.0, 60.0, 20).unwrap();
        }
        assert_eq!(cache.len(), 2);

        // 0 was evicted, 240 is still there
        cache.get_or_build(114.0, 30.0, 240.0, 500.0, 60.0, 20).unwrap();
        assert_eq!(cache.hits(), 1);
        cache.get_or_build(114.0, 30.0, 0.0, 500.0, 60.0, 20).unwrap();
        assert_eq!(cache.misses(), 4);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let mut cache = SectorCache::new(4);
        assert!(cache.get_or_build(114.0, 30.0, f64::NAN, 500.0, 60.0, 20).is_err());
        assert!(cache.get_or_build(114.0, 30.0, 0.0, -1.0, 60.0, 20).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let mut cache = SectorCache::new(0);
        cache.get_or_build(114.0, 30.0, 0.0, 500.0, 60.0, 20).unwrap();
        cache.get_or_build(114.0, 30.0, 0.0, 500.0, 60.0, 20).unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
    }
}
