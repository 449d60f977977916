mod annotate;
mod arbiter;
mod capture;
mod error;
mod lookup;
mod ports;
mod reorder;
mod service;
mod slot_store;
mod use_cases;

#[cfg(test)]
mod testing;

pub use annotate::{DistanceAnnotator, SlotBadge};
pub use arbiter::{CameraArbiter, CameraLease};
pub use capture::{CaptureDevices, CaptureSession, CapturedImage, TeardownSignal};
pub use error::ApplicationError;
pub use lookup::LocationLookup;
pub use ports::{
    CameraDevice, CameraStream, Clock, DraftRepository, Frame, FrameEncoder, GeocodingClient,
    GeolocationProvider, GeotagWriter, PreviewRegistry, StoredDraft, StoredLocalImage,
    SubmissionOutbox,
};
pub use reorder::{move_order, ReorderEngine};
pub use service::ApplicationService;
pub use slot_store::{SlotStore, Submission};
pub use use_cases::{
    BootstrapDraftCommand, CancelDraftCommand, CaptureIntoSlotCommand, CaptureReport,
    DraftView, LookupAddressCommand, MoveSlotCommand, RemoveSlotCommand, ReorderSlotsCommand,
    ReverseLookupCommand, SetPropertyLocationCommand, ShowSlotsQuery, SlotSource, SlotView,
    StartDraftCommand, SubmitDraftCommand, SubmitReport,
};
