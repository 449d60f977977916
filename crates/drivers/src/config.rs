use livi_media_adapters::DEFAULT_BASE_URL;
use livi_media_domain::GeoPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub draft_path: String,
    pub cache_dir: String,
    pub mapbox_base_url: String,
    pub mapbox_access_token: String,
    pub camera_dir: String,
    pub device_location: Option<GeoPoint>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            draft_path: "draft.sqlite3".to_string(),
            cache_dir: "cache".to_string(),
            mapbox_base_url: DEFAULT_BASE_URL.to_string(),
            mapbox_access_token: String::new(),
            camera_dir: "camera".to_string(),
            device_location: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup("LIVI_DRAFT_PATH") {
            config.draft_path = value;
        }
        if let Some(value) = lookup("LIVI_CACHE_DIR") {
            config.cache_dir = value;
        }
        if let Some(value) = lookup("MAPBOX_BASE_URL") {
            config.mapbox_base_url = value;
        }
        if let Some(value) = lookup("MAPBOX_ACCESS_TOKEN") {
            config.mapbox_access_token = value;
        }
        if let Some(value) = lookup("LIVI_CAMERA_DIR") {
            config.camera_dir = value;
        }

        config.device_location = match (lookup("LIVI_DEVICE_LAT"), lookup("LIVI_DEVICE_LON")) {
            (None, None) => None,
            (Some(latitude), Some(longitude)) => Some(parse_point(&latitude, &longitude)?),
            _ => {
                return Err(
                    "LIVI_DEVICE_LAT and LIVI_DEVICE_LON must be set together".to_string(),
                )
            }
        };
        Ok(config)
    }

    pub fn image_dir(&self) -> String {
        format!("{}/draft-images", self.cache_dir)
    }
}

pub fn parse_point(latitude: &str, longitude: &str) -> Result<GeoPoint, String> {
    let latitude = latitude
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid latitude: {latitude}"))?;
    let longitude = longitude
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid longitude: {longitude}"))?;
    GeoPoint::new(latitude, longitude).map_err(|error| error.to_string())
}
