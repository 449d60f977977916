mod backing;
mod capture;
mod drag;
mod error;
mod geo;
mod geocode;
mod location_index;
mod media;
mod proximity;
mod slot;

pub use backing::{BackingLists, BackingRef};
pub use capture::{
    CaptureState, FacingMode, GeolocationOptions, VideoConstraints, IDEAL_FRAME_HEIGHT,
    IDEAL_FRAME_WIDTH, JPEG_QUALITY,
};
pub use drag::{
    check_activation, closest_center, grid_rects, Activation, Point, PointerKind, Rect,
    POINTER_ACTIVATION_DISTANCE, TOUCH_ACTIVATION_DELAY, TOUCH_TOLERANCE,
};
pub use error::DomainError;
pub use geo::{distance_meters, GeoPoint, EARTH_RADIUS_METERS};
pub use geocode::{
    GeocodeContext, GeocodeFeature, GeocodeResponse, ResolvedLocation, MIN_QUERY_LENGTH,
    SEARCH_TYPES, SUGGESTION_LIMIT,
};
pub use location_index::ImageLocationIndex;
pub use media::{capture_file_name, ImageKey, LocalImage, PreviewHandle, RemoteImage};
pub use proximity::{format_distance, Proximity, PROXIMITY_THRESHOLD_METERS};
pub use slot::{
    array_move, reconstruct, reorder_backing, ImageSlot, SlotContent, SlotLayout,
    LISTING_MINIMUM_IMAGES, MAX_IMAGES,
};
