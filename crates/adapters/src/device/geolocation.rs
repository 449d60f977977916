use async_trait::async_trait;
use livi_media_application::{ApplicationError, GeolocationProvider};
use livi_media_domain::{GeoPoint, GeolocationOptions};

/// Reports a configured device position, or none when the device has no
/// position source.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocation {
    position: Option<GeoPoint>,
}

impl FixedGeolocation {
    pub fn new(position: Option<GeoPoint>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn current_position(
        &self,
        _options: GeolocationOptions,
    ) -> Result<GeoPoint, ApplicationError> {
        self.position.ok_or_else(|| {
            ApplicationError::Device("geolocation is not available on this device".to_string())
        })
    }
}
