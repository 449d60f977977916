use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two degree-valued coordinates.
///
/// Haversine formula. Inputs are not validated; callers pass latitudes in
/// [-90, 90] and longitudes in [-180, 180].
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        check_degrees("latitude", latitude, 90.0)?;
        check_degrees("longitude", longitude, 180.0)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_meters(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

fn check_degrees(name: &'static str, value: f64, bound: f64) -> Result<(), DomainError> {
    if !value.is_finite() {
        return Err(DomainError::NonFiniteCoordinate { name });
    }
    if !(-bound..=bound).contains(&value) {
        return Err(DomainError::CoordinateOutOfRange {
            name,
            value,
            min: -bound,
            max: bound,
        });
    }
    Ok(())
}
