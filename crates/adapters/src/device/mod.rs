mod camera;
mod geolocation;

pub use camera::FolderCamera;
pub use geolocation::FixedGeolocation;
