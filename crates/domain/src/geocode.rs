use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// Queries shorter than this never reach the geocoder.
pub const MIN_QUERY_LENGTH: usize = 3;
pub const SUGGESTION_LIMIT: usize = 5;
pub const SEARCH_TYPES: &str = "address,poi,place";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub features: Vec<GeocodeFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeFeature {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub place_type: Vec<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub place_name: String,
    /// `[longitude, latitude]`
    pub center: [f64; 2],
    #[serde(default)]
    pub context: Vec<GeocodeContext>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeContext {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub short_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub address: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub postcode: Option<String>,
    pub place_name: String,
    pub point: GeoPoint,
}

impl GeocodeFeature {
    fn context_text(&self, prefixes: &[&str]) -> Option<&str> {
        self.context
            .iter()
            .find(|entry| prefixes.iter().any(|prefix| entry.id.starts_with(prefix)))
            .map(|entry| entry.text.as_str())
    }

    pub fn point(&self) -> GeoPoint {
        let [longitude, latitude] = self.center;
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// Splits a feature into the address fields of a listing form.
    pub fn resolve(&self) -> ResolvedLocation {
        let address = self
            .context_text(&["address"])
            .map(str::to_string)
            .or_else(|| (!self.text.is_empty()).then(|| self.text.clone()))
            .unwrap_or_else(|| self.place_name.clone());

        ResolvedLocation {
            address,
            city: self
                .context_text(&["place", "locality", "district"])
                .unwrap_or_default()
                .to_string(),
            region: self.context_text(&["region"]).unwrap_or_default().to_string(),
            country: self.context_text(&["country"]).unwrap_or_default().to_string(),
            postcode: self.context_text(&["postcode"]).map(str::to_string),
            place_name: self.place_name.clone(),
            point: self.point(),
        }
    }
}
