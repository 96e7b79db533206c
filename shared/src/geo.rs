use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Span used when the map has not reported a region yet.
pub const DEFAULT_FOCUS_DELTA: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("coordinate is not a finite number")]
    NonFinite,
    #[error("latitude {0} out of range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} out of range [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A finite latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(self) -> f64 {
        self.lng
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        haversine_distance(self, other)
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = CoordinateError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lat, lng)
    }
}

/// Great-circle distance in meters.
///
/// Deltas are taken as absolute values so that `d(a, b)` and `d(b, a)` are
/// bit-for-bit equal. `h` is clamped because rounding pushes it past 1.0 for
/// antipodal points.
#[must_use]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).abs().to_radians();
    let d_lng = (b.lng - a.lng).abs().to_radians();

    let sin_d_lat = (d_lat / 2.0).sin();
    let sin_d_lng = (d_lng / 2.0).sin();
    let h = (sin_d_lat * sin_d_lat + (lat1.cos() * lat2.cos()) * sin_d_lng * sin_d_lng)
        .clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

#[must_use]
pub fn format_distance(meters: f64) -> String {
    if !meters.is_finite() || meters < 0.0 {
        return "Desconocida".to_string();
    }

    if meters < 1000.0 {
        format!("{meters:.0} m")
    } else if meters < 10_000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{:.0} km", meters / 1000.0)
    }
}

/// Visible map window, mirrored from the shell's map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    #[must_use]
    pub fn centered_on(center: Coordinate, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude: center.lat(),
            longitude: center.lng(),
            latitude_delta,
            longitude_delta,
        }
    }

    /// Region centred on `center` that keeps the zoom of `current`, if known.
    #[must_use]
    pub fn focus(center: Coordinate, current: Option<&MapRegion>) -> Self {
        let (lat_delta, lng_delta) = current
            .filter(|r| r.has_valid_span())
            .map_or((DEFAULT_FOCUS_DELTA, DEFAULT_FOCUS_DELTA), |r| {
                (r.latitude_delta, r.longitude_delta)
            });
        Self::centered_on(center, lat_delta, lng_delta)
    }

    #[must_use]
    pub fn center(&self) -> Option<Coordinate> {
        Coordinate::new(self.latitude, self.longitude).ok()
    }

    fn has_valid_span(&self) -> bool {
        self.latitude_delta.is_finite()
            && self.longitude_delta.is_finite()
            && self.latitude_delta > 0.0
            && self.longitude_delta > 0.0
    }
}

impl Default for MapRegion {
    /// Morelia, where the service started collecting reports.
    fn default() -> Self {
        Self {
            latitude: 19.621_880_7,
            longitude: -101.255_213_2,
            latitude_delta: 0.05,
            longitude_delta: 0.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn coordinate_rejects_non_finite() {
        assert_eq!(Coordinate::new(f64::NAN, 0.0), Err(CoordinateError::NonFinite));
        assert_eq!(Coordinate::new(0.0, f64::INFINITY), Err(CoordinateError::NonFinite));
    }

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -181.0).is_err());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = coord(19.7, -101.2);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = haversine_distance(coord(0.0, 0.0), coord(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn antipodes_are_half_circumference_apart() {
        let d = haversine_distance(coord(0.0, 0.0), coord(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1e-6);
    }

    #[test]
    fn near_antipodes_stay_finite() {
        let d = haversine_distance(coord(0.08, 0.0), coord(-0.08, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn distance_crosses_antimeridian() {
        let d = haversine_distance(coord(0.0, 179.5), coord(0.0, -179.5));
        assert!(d < 112_000.0, "got {d}");
    }

    #[test]
    fn format_distance_units() {
        assert_eq!(format_distance(850.0), "850 m");
        assert_eq!(format_distance(2_340.0), "2.3 km");
        assert_eq!(format_distance(25_000.0), "25 km");
        assert_eq!(format_distance(f64::NAN), "Desconocida");
    }

    #[test]
    fn focus_keeps_current_zoom() {
        let current = MapRegion {
            latitude: 0.0,
            longitude: 0.0,
            latitude_delta: 0.3,
            longitude_delta: 0.4,
        };
        let region = MapRegion::focus(coord(19.0, -101.0), Some(&current));
        assert_eq!(region.latitude, 19.0);
        assert_eq!(region.latitude_delta, 0.3);
        assert_eq!(region.longitude_delta, 0.4);
    }

    #[test]
    fn focus_defaults_without_region() {
        let region = MapRegion::focus(coord(19.0, -101.0), None);
        assert_eq!(region.latitude_delta, DEFAULT_FOCUS_DELTA);
        assert_eq!(region.longitude_delta, DEFAULT_FOCUS_DELTA);
    }

    proptest! {
        #[test]
        fn haversine_is_symmetric(
            lat1 in -90.0f64..=90.0,
            lng1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0,
            lng2 in -180.0f64..=180.0,
        ) {
            let a = coord(lat1, lng1);
            let b = coord(lat2, lng2);
            prop_assert_eq!(haversine_distance(a, b), haversine_distance(b, a));
        }

        #[test]
        fn haversine_is_bounded(
            lat1 in -90.0f64..=90.0,
            lng1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0,
            lng2 in -180.0f64..=180.0,
        ) {
            let d = haversine_distance(coord(lat1, lng1), coord(lat2, lng2));
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_M + 1e-6);
        }
    }
}
