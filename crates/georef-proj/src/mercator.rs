//! Spherical Web Mercator (EPSG:3857) in degrees and meters.
//!
//!   forward: x = λ·shift/180, y = ln(tan((90 + φ)·π/360)) / (π/180) · shift/180
//!   inverse: λ = x·180/shift, φ = atan(exp(y·180/shift · π/180))·360/π - 90
//!
//! where `shift = π·R` is half the projected world width.

use std::f64::consts::PI;

use georef_linalg::Point2D;
use serde::{Deserialize, Serialize};

/// Width and height of a map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Sphere radius used by Web Mercator (meters).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Meters per pixel at zoom level 0.
pub const INITIAL_RESOLUTION: f64 = 2.0 * PI * EARTH_RADIUS / TILE_SIZE;

/// Half the circumference: meters from the projection origin to the map edge.
pub const ORIGIN_SHIFT: f64 = 2.0 * PI * EARTH_RADIUS / 2.0;

/// Zoom levels added on top of the level where the image fits one tile.
pub const MIN_ZOOM_OFFSET: i32 = 3;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl LatLon {
    /// Create a new position.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Project a geographic position to Web-Mercator meters.
pub fn lat_lon_to_meters(lat_lon: LatLon) -> Point2D {
    let mx = lat_lon.lon * ORIGIN_SHIFT / 180.0;
    let my = ((90.0 + lat_lon.lat) * PI / 360.0).tan().ln() / (PI / 180.0);
    Point2D::new(mx, my * ORIGIN_SHIFT / 180.0)
}

/// Unproject Web-Mercator meters to a geographic position.
pub fn meters_to_lat_lon(meters: Point2D) -> LatLon {
    let lon = meters.x * 180.0 / ORIGIN_SHIFT;
    let lat = meters.y * 180.0 / ORIGIN_SHIFT;
    let lat = ((lat * (PI / 180.0)).exp().atan() * 360.0) / PI - 90.0;
    LatLon { lat, lon }
}

/// Meters per pixel at the given zoom level.
pub fn resolution(zoom: i32) -> f64 {
    INITIAL_RESOLUTION / 2f64.powi(zoom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin() {
        let m = lat_lon_to_meters(LatLon::new(0.0, 0.0));
        assert_relative_eq!(m.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(m.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_epsg3857_reference() {
        let m = lat_lon_to_meters(LatLon::new(0.0, 180.0));
        assert_relative_eq!(m.x, 20_037_508.342_789_244, epsilon = 1e-6);

        // the square map ends at ~85.0511 degrees
        let m = lat_lon_to_meters(LatLon::new(85.051_128_779_806_59, 0.0));
        assert_relative_eq!(m.y, 20_037_508.342_789_244, epsilon = 1e-3);
    }

    #[test]
    fn test_meters_roundtrip() {
        let cases = [
            LatLon::new(0.0, 0.0),
            LatLon::new(45.0, 10.0),
            LatLon::new(40.7484, -73.9857),
            LatLon::new(35.6895, 139.6917),
            LatLon::new(-33.8688, 151.2093),
        ];
        for ll in cases {
            let back = meters_to_lat_lon(lat_lon_to_meters(ll));
            assert_relative_eq!(back.lat, ll.lat, epsilon = 1e-9);
            assert_relative_eq!(back.lon, ll.lon, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_resolution() {
        assert_relative_eq!(resolution(0), 156_543.033_928_041, epsilon = 1e-6);
        assert_relative_eq!(resolution(1), resolution(0) / 2.0);
        assert_relative_eq!(resolution(-1), resolution(0) * 2.0);
    }
}
