mod geotag;
mod jpeg;

pub use geotag::{read_location, ExifGeotagWriter};
pub use jpeg::ImageJpegEncoder;
