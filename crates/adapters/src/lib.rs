pub mod device;
pub mod encode;
pub mod fs;
pub mod mapbox;
pub mod migrations;
pub mod presenters;
pub mod preview;
pub mod sqlite;

pub use device::{FixedGeolocation, FolderCamera};
pub use encode::{read_location, ExifGeotagWriter, ImageJpegEncoder};
pub use fs::{FsSubmissionOutbox, SystemClock};
pub use mapbox::{MapboxGeocodingClient, DEFAULT_BASE_URL};
pub use presenters::{
    present_capture, present_draft, present_location, present_slot_row,
    present_submit,
};
pub use preview::InMemoryPreviewRegistry;
pub use sqlite::SqliteDraftRepository;
