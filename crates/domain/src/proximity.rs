use serde::Serialize;

use crate::GeoPoint;

/// Captures farther than this from the property are flagged.
pub const PROXIMITY_THRESHOLD_METERS: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Proximity {
    WithinRange { distance_meters: f64 },
    OutOfRange { distance_meters: f64 },
    NoLocationData,
    NoPropertyLocation,
}

impl Proximity {
    pub fn classify(property: Option<GeoPoint>, capture: Option<GeoPoint>, threshold: f64) -> Self {
        let Some(capture) = capture else {
            return Self::NoLocationData;
        };
        let Some(property) = property else {
            return Self::NoPropertyLocation;
        };
        let distance_meters = property.distance_to(&capture);
        if distance_meters <= threshold {
            Self::WithinRange { distance_meters }
        } else {
            Self::OutOfRange { distance_meters }
        }
    }

    pub fn distance_meters(&self) -> Option<f64> {
        match self {
            Self::WithinRange { distance_meters } | Self::OutOfRange { distance_meters } => {
                Some(*distance_meters)
            }
            Self::NoLocationData | Self::NoPropertyLocation => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::WithinRange { distance_meters } => {
                format!("{} from property", format_distance(*distance_meters))
            }
            Self::OutOfRange { distance_meters } => {
                format!("{} from property (too far)", format_distance(*distance_meters))
            }
            Self::NoLocationData => "no location data".to_string(),
            Self::NoPropertyLocation => "property location not set".to_string(),
        }
    }
}

pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as u64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: GeoPoint = GeoPoint {
        latitude: 0.0,
        longitude: 0.0,
    };

    #[test]
    fn classifies_against_fifty_meter_threshold() {
        let far = Proximity::classify(
            Some(ORIGIN),
            Some(GeoPoint {
                latitude: 0.0005,
                longitude: 0.0,
            }),
            PROXIMITY_THRESHOLD_METERS,
        );
        let near = Proximity::classify(
            Some(ORIGIN),
            Some(GeoPoint {
                latitude: 0.0002,
                longitude: 0.0,
            }),
            PROXIMITY_THRESHOLD_METERS,
        );
        assert!(matches!(far, Proximity::OutOfRange { .. }));
        assert!(matches!(near, Proximity::WithinRange { .. }));
        assert_eq!(near.label(), "22 m from property");
        assert_eq!(far.label(), "56 m from property (too far)");
    }

    #[test]
    fn missing_locations_are_reported_explicitly() {
        assert_eq!(
            Proximity::classify(Some(ORIGIN), None, PROXIMITY_THRESHOLD_METERS),
            Proximity::NoLocationData
        );
        assert_eq!(
            Proximity::classify(None, Some(ORIGIN), PROXIMITY_THRESHOLD_METERS),
            Proximity::NoPropertyLocation
        );
    }

    #[test]
    fn long_distances_are_shown_in_kilometers() {
        assert_eq!(format_distance(1234.0), "1.2 km");
        assert_eq!(format_distance(999.4), "999 m");
    }

    #[test]
    fn serializes_with_a_kind_tag() {
        let json = serde_json::to_value(Proximity::WithinRange {
            distance_meters: 22.0,
        })
        .expect("json");
        assert_eq!(json["kind"], "within_range");
        assert_eq!(json["distance_meters"], 22.0);

        let json = serde_json::to_value(Proximity::NoLocationData).expect("json");
        assert_eq!(json, serde_json::json!({ "kind": "no_location_data" }));
    }
}
