use std::time::Duration;

use async_trait::async_trait;
use livi_media_application::{ApplicationError, GeocodingClient};
use livi_media_domain::{GeoPoint, GeocodeFeature, GeocodeResponse};
use reqwest::{Client, Url};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Mapbox Places geocoding over HTTP.
#[derive(Debug, Clone)]
pub struct MapboxGeocodingClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl MapboxGeocodingClient {
    pub fn new(base_url: String, access_token: String) -> Result<Self, ApplicationError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| ApplicationError::Geocoding(error.to_string()))?;
        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    /// `{base}/geocoding/v5/mapbox.places/{search}.json`, with the search
    /// text percent-encoded as one path segment.
    fn places_url(&self, search: &str) -> Result<Url, ApplicationError> {
        let file = format!("{search}.json");
        let mut url = Url::parse(&self.base_url)
            .map_err(|error| ApplicationError::Geocoding(format!("invalid base url: {error}")))?;
        url.path_segments_mut()
            .map_err(|()| ApplicationError::Geocoding("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places", file.as_str()]);
        Ok(url)
    }

    async fn fetch(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<Vec<GeocodeFeature>, ApplicationError> {
        if self.access_token.is_empty() {
            return Err(ApplicationError::Geocoding(
                "no Mapbox access token configured".to_string(),
            ));
        }
        let response = self
            .client
            .get(url)
            .query(&[("access_token", self.access_token.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|error| ApplicationError::Geocoding(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApplicationError::Geocoding(format!(
                "geocoder answered {status}"
            )));
        }
        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|error| ApplicationError::Geocoding(format!("malformed response: {error}")))?;
        debug!(features = body.features.len(), "geocoder response");
        Ok(body.features)
    }
}

#[async_trait]
impl GeocodingClient for MapboxGeocodingClient {
    async fn forward(
        &self,
        query: &str,
        limit: usize,
        types: &str,
    ) -> Result<Vec<GeocodeFeature>, ApplicationError> {
        let url = self.places_url(query)?;
        self.fetch(
            url,
            &[("limit", limit.to_string()), ("types", types.to_string())],
        )
        .await
    }

    async fn reverse(
        &self,
        point: GeoPoint,
        limit: usize,
    ) -> Result<Vec<GeocodeFeature>, ApplicationError> {
        let url = self.places_url(&format!("{},{}", point.longitude, point.latitude))?;
        self.fetch(url, &[("limit", limit.to_string())]).await
    }
}
