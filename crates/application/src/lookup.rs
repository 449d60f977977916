use std::sync::Arc;

use livi_media_domain::{
    GeoPoint, GeocodeFeature, ResolvedLocation, MIN_QUERY_LENGTH, SEARCH_TYPES, SUGGESTION_LIMIT,
};
use tracing::{debug, warn};

use crate::GeocodingClient;

/// Address search for the property location. Lookup failures never reach
/// the caller; they show up as an empty result.
#[derive(Clone)]
pub struct LocationLookup {
    client: Arc<dyn GeocodingClient>,
}

impl LocationLookup {
    pub fn new(client: Arc<dyn GeocodingClient>) -> Self {
        Self { client }
    }

    pub async fn suggest(&self, query: &str) -> Vec<GeocodeFeature> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LENGTH {
            return Vec::new();
        }
        match self.client.forward(query, SUGGESTION_LIMIT, SEARCH_TYPES).await {
            Ok(features) => {
                debug!(query, count = features.len(), "address suggestions");
                features
            }
            Err(error) => {
                warn!(%error, query, "address search failed");
                Vec::new()
            }
        }
    }

    /// Best match for `query`, split into address fields.
    pub async fn resolve(&self, query: &str) -> Option<ResolvedLocation> {
        self.suggest(query)
            .await
            .first()
            .map(GeocodeFeature::resolve)
    }

    pub async fn reverse(&self, point: GeoPoint) -> Option<ResolvedLocation> {
        match self.client.reverse(point, 1).await {
            Ok(features) => features.first().map(GeocodeFeature::resolve),
            Err(error) => {
                warn!(%error, "reverse geocoding failed");
                None
            }
        }
    }
}
