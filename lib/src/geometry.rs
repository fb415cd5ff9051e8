//! Distance, bearing and sector geometry on geographic coordinates.
//!
//! Invalid input never panics here. `distance` and `bearing_difference`
//! return `f64::INFINITY` so callers can feed them straight into a minimum
//! search, and `sector_polygon` reports the reason through `GeometryError`.

use geo::{Coord, Distance, Haversine, LineString, Point};
use thiserror::Error;

/// Radius used by [`distance`]; the WGS84 mean radius, as used by `geo`'s haversine.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Radius used by [`sector_polygon`] for its local offsets; the WGS84 equatorial radius.
pub const SECTOR_EARTH_RADIUS_M: f64 = 6_378_137.0;

pub const DEFAULT_ARC_STEPS: usize = 20;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{0} is not a finite number")]
    NonFiniteInput(&'static str),
    #[error("sector radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("sector needs at least one arc step")]
    NoArcSteps,
    #[error("sector at latitude {0} has no usable longitude scale")]
    Degenerate(f64),
}

/// Great-circle distance in meters between two points given as latitude/longitude degrees.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if ![lat1, lon1, lat2, lon2].iter().all(|v| v.is_finite()) {
        return f64::INFINITY;
    }

    let d = Haversine::distance(Point::new(lon1, lat1), Point::new(lon2, lat2));
    if d.is_finite() {
        d
    } else {
        f64::INFINITY
    }
}

/// Smallest angle in degrees between two headings, always within `[0, 180]`.
pub fn bearing_difference(a1: f64, a2: f64) -> f64 {
    if !a1.is_finite() || !a2.is_finite() {
        return f64::INFINITY;
    }

    let diff = (a1 - a2).abs() % 360.0;
    diff.min(360.0 - diff)
}

/// Closed fan polygon for an antenna sector, as `(lon, lat)` coordinates.
///
/// The ring starts at the center, walks `arc_steps + 1` points along the arc
/// from `azimuth - angle_deg / 2` to `azimuth + angle_deg / 2`, and returns
/// to the center. Offsets use a local equirectangular approximation, which
/// is accurate enough for sectors of a few kilometers.
pub fn sector_polygon(
    center_lon: f64,
    center_lat: f64,
    azimuth: f64,
    radius_m: f64,
    angle_deg: f64,
    arc_steps: usize,
) -> Result<LineString<f64>, GeometryError> {
    for (value, field) in [
        (center_lon, "longitude"),
        (center_lat, "latitude"),
        (azimuth, "azimuth"),
        (radius_m, "radius"),
        (angle_deg, "angle"),
    ] {
        if !value.is_finite() {
            return Err(GeometryError::NonFiniteInput(field));
        }
    }
    if radius_m <= 0.0 {
        return Err(GeometryError::NonPositiveRadius(radius_m));
    }
    if arc_steps == 0 {
        return Err(GeometryError::NoArcSteps);
    }

    let lon_scale = center_lat.to_radians().cos();
    if lon_scale.abs() < 1e-12 {
        return Err(GeometryError::Degenerate(center_lat));
    }

    let center = Coord {
        x: center_lon,
        y: center_lat,
    };
    let start = (azimuth - angle_deg / 2.0).to_radians();
    let span = angle_deg.to_radians();

    let mut coords = Vec::with_capacity(arc_steps + 3);
    coords.push(center);
    for i in 0..=arc_steps {
        let theta = start + span * i as f64 / arc_steps as f64;
        let lat_offset = radius_m * theta.cos() / SECTOR_EARTH_RADIUS_M;
        let lon_offset = radius_m * theta.sin() / (SECTOR_EARTH_RADIUS_M * lon_scale);
        let point = Coord {
            x: center_lon + lon_offset.to_degrees(),
            y: center_lat + lat_offset.to_degrees(),
        };
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(GeometryError::Degenerate(center_lat));
        }
        coords.push(point);
    }
    coords.push(center);

    Ok(LineString::new(coords))
}
