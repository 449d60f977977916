use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Opaque, revocable reference used to display a local image without
/// re-reading its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewHandle(u64);

impl PreviewHandle {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for PreviewHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "preview:{}", self.0)
    }
}

/// Reference to an image already persisted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RemoteImage(String);

impl RemoteImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A captured image that has not been submitted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl LocalImage {
    pub fn jpeg(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: "image/jpeg".to_string(),
            bytes,
        }
    }
}

/// Key of the location side table. Remote images are keyed by reference,
/// local images by their preview handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageKey {
    Remote(RemoteImage),
    Preview(PreviewHandle),
}

pub fn capture_file_name(unix_millis: u128) -> String {
    format!("property-photo-{unix_millis}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_file_name_embeds_timestamp() {
        assert_eq!(
            capture_file_name(1_733_600_000_123),
            "property-photo-1733600000123.jpg"
        );
    }

    #[test]
    fn local_jpeg_sets_mime_type() {
        let image = LocalImage::jpeg("a.jpg", vec![0xFF, 0xD8]);
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.bytes.len(), 2);
    }
}
