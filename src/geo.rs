//! Spherical-earth distance helpers.

use std::f64::consts::FRAC_PI_2;

use crate::domain::types::{Coordinates, RangeKm};

/// Mean earth radius used for both distance annotation and radius filtering.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers.
///
/// Symmetric by construction and exactly `0.0` for identical points. The
/// haversine term is clamped to `[0, 1]` so antipodal inputs cannot push
/// `asin` out of its domain.
pub fn distance(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    let half_dlat = ((b.latitude() - a.latitude()).abs().to_radians() / 2.0).sin();
    let half_dlon = ((b.longitude() - a.longitude()).abs().to_radians() / 2.0).sin();

    let h = half_dlat * half_dlat + lat_a.cos() * lat_b.cos() * half_dlon * half_dlon;
    let central_angle = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Latitude/longitude rectangle enclosing every point within a radius.
///
/// Used as an index-friendly prefilter; callers still check the exact
/// [`distance`] afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    /// `None` when the box wraps a pole or the antimeridian.
    pub longitude: Option<(f64, f64)>,
}

impl BoundingBox {
    pub fn around(center: Coordinates, range: RangeKm) -> Self {
        let angular = range.get() / EARTH_RADIUS_KM;
        let lat = center.latitude().to_radians();
        let lon = center.longitude().to_radians();

        let min_lat = lat - angular;
        let max_lat = lat + angular;

        if min_lat <= -FRAC_PI_2 || max_lat >= FRAC_PI_2 {
            return Self {
                min_latitude: min_lat.max(-FRAC_PI_2).to_degrees(),
                max_latitude: max_lat.min(FRAC_PI_2).to_degrees(),
                longitude: None,
            };
        }

        let delta_lon = (angular.sin() / lat.cos()).clamp(-1.0, 1.0).asin();
        let min_lon = (lon - delta_lon).to_degrees();
        let max_lon = (lon + delta_lon).to_degrees();
        let longitude = if min_lon < -180.0 || max_lon > 180.0 {
            None
        } else {
            Some((min_lon, max_lon))
        };

        Self {
            min_latitude: min_lat.to_degrees(),
            max_latitude: max_lat.to_degrees(),
            longitude,
        }
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        let lat_ok = (self.min_latitude..=self.max_latitude).contains(&point.latitude());
        let lon_ok = match self.longitude {
            Some((min, max)) => (min..=max).contains(&point.longitude()),
            None => true,
        };
        lat_ok && lon_ok
    }
}
