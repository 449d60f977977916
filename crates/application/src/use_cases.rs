use livi_media_domain::{FacingMode, GeoPoint, Proximity, RemoteImage};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct BootstrapDraftCommand;

/// Begins a new draft. Non-empty `existing_remote` opens an existing
/// listing for editing.
#[derive(Debug, Clone, Default)]
pub struct StartDraftCommand {
    pub existing_remote: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SetPropertyLocationCommand {
    pub location: GeoPoint,
}

#[derive(Debug, Clone)]
pub struct LookupAddressCommand {
    pub query: String,
    /// Store the best match as the property location.
    pub apply: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ReverseLookupCommand {
    pub location: GeoPoint,
}

/// Runs one capture session. Without a slot the photo goes into the next
/// empty one.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureIntoSlotCommand {
    pub slot: Option<usize>,
    pub facing_mode: FacingMode,
}

#[derive(Debug, Clone, Copy)]
pub struct RemoveSlotCommand {
    pub slot: usize,
}

#[derive(Debug, Clone)]
pub struct ReorderSlotsCommand {
    pub order: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct MoveSlotCommand {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ShowSlotsQuery;

#[derive(Debug, Clone)]
pub struct SubmitDraftCommand {
    pub outbox_dir: String,
}

#[derive(Debug, Clone, Default)]
pub struct CancelDraftCommand;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    Remote(RemoteImage),
    Local { file_name: String, bytes: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub slot: usize,
    pub source: Option<SlotSource>,
    pub location: Option<GeoPoint>,
    pub proximity: Option<Proximity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftView {
    pub property_location: Option<GeoPoint>,
    pub slots: Vec<SlotView>,
    pub filled: usize,
    pub overflow: usize,
    pub meets_listing_minimum: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReport {
    pub slot: usize,
    pub file_name: String,
    pub location: Option<GeoPoint>,
    pub proximity: Proximity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReport {
    pub existing_remote: Vec<RemoteImage>,
    pub written_files: Vec<String>,
}
