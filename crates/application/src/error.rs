use livi_media_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("device error: {0}")]
    Device(String),
    #[error("capture session is closed")]
    SessionClosed,
    #[error("capture session is {state}, cannot {action}")]
    InvalidState {
        state: &'static str,
        action: &'static str,
    },
    #[error("io error: {0}")]
    Io(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("geocoding error: {0}")]
    Geocoding(String),
}
