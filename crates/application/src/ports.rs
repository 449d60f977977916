use std::sync::Arc;

use async_trait::async_trait;
use livi_media_domain::{
    GeoPoint, GeocodeFeature, GeolocationOptions, PreviewHandle, RemoteImage, VideoConstraints,
};

use crate::ApplicationError;

/// One RGB8 still grabbed from a live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// A live camera stream. Implementations must make `stop` idempotent.
pub trait CameraStream: Send + Sync {
    fn grab_frame(&self) -> Result<Frame, ApplicationError>;

    fn stop(&self);

    fn is_live(&self) -> bool;
}

#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open_stream(
        &self,
        constraints: VideoConstraints,
    ) -> Result<Arc<dyn CameraStream>, ApplicationError>;
}

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(
        &self,
        options: GeolocationOptions,
    ) -> Result<GeoPoint, ApplicationError>;
}

pub trait FrameEncoder: Send + Sync {
    fn encode_jpeg(&self, frame: &Frame, quality: u8) -> Result<Vec<u8>, ApplicationError>;
}

pub trait GeotagWriter: Send + Sync {
    fn embed_location(&self, jpeg: &[u8], point: GeoPoint) -> Result<Vec<u8>, ApplicationError>;
}

/// Issues and revokes preview handles. Every handle returned by `create`
/// must eventually be passed to `release`.
pub trait PreviewRegistry: Send + Sync {
    fn create(&self, bytes: &[u8]) -> PreviewHandle;

    /// Returns false when the handle was unknown or already released.
    fn release(&self, handle: PreviewHandle) -> bool;

    fn live_count(&self) -> usize;
}

#[async_trait]
pub trait GeocodingClient: Send + Sync {
    async fn forward(
        &self,
        query: &str,
        limit: usize,
        types: &str,
    ) -> Result<Vec<GeocodeFeature>, ApplicationError>;

    async fn reverse(
        &self,
        point: GeoPoint,
        limit: usize,
    ) -> Result<Vec<GeocodeFeature>, ApplicationError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredLocalImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredDraft {
    pub property_location: Option<GeoPoint>,
    pub existing_remote: Vec<(RemoteImage, Option<GeoPoint>)>,
    pub new_images: Vec<StoredLocalImage>,
}

pub trait DraftRepository {
    fn initialize(&self) -> Result<(), ApplicationError>;

    fn load_draft(&self) -> Result<Option<StoredDraft>, ApplicationError>;

    fn save_draft(&self, draft: &StoredDraft) -> Result<(), ApplicationError>;

    fn clear_draft(&self) -> Result<(), ApplicationError>;
}

pub trait SubmissionOutbox {
    /// Writes the local files of a submission and returns where they went.
    /// Remote images come first in slot order, followed by `files`.
    fn write_files(
        &self,
        outbox_dir: &str,
        existing_remote: &[(RemoteImage, Option<GeoPoint>)],
        files: &[StoredLocalImage],
    ) -> Result<Vec<String>, ApplicationError>;
}

pub trait Clock: Send + Sync {
    fn now_unix_millis(&self) -> u128;
}
