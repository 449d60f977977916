use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("{name} must be finite")]
    NonFiniteCoordinate { name: &'static str },
    #[error("{name} must be within [{min}, {max}], got {value}")]
    CoordinateOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("slot index {index} is out of range for {capacity} slots")]
    SlotOutOfRange { index: usize, capacity: usize },
    #[error("slot {0} is empty")]
    EmptySlot(usize),
    #[error("all {0} image slots are filled")]
    CapacityExceeded(usize),
    #[error("local file list has {files} entries but preview list has {previews}")]
    MismatchedLocalLists { files: usize, previews: usize },
    #[error("invalid slot order: {0}")]
    InvalidOrder(String),
}
