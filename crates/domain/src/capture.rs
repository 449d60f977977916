use std::time::Duration;

pub const IDEAL_FRAME_WIDTH: u32 = 1280;
pub const IDEAL_FRAME_HEIGHT: u32 = 720;
pub const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    User,
    #[default]
    Environment,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "environment" => Some(Self::Environment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub audio: bool,
}

impl VideoConstraints {
    pub fn for_facing(facing_mode: FacingMode) -> Self {
        Self {
            facing_mode,
            ideal_width: IDEAL_FRAME_WIDTH,
            ideal_height: IDEAL_FRAME_HEIGHT,
            audio: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(5),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Lifecycle of one camera capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Initializing,
    Streaming,
    Captured,
    Failed(String),
    Closed,
}

impl CaptureState {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_mode_toggles_and_parses() {
        assert_eq!(FacingMode::default(), FacingMode::Environment);
        assert_eq!(FacingMode::User.toggled(), FacingMode::Environment);
        assert_eq!(FacingMode::parse("user"), Some(FacingMode::User));
        assert_eq!(FacingMode::parse("rear"), None);
    }

    #[test]
    fn constraints_request_720p_without_audio() {
        let constraints = VideoConstraints::for_facing(FacingMode::User);
        assert_eq!(constraints.ideal_width, 1280);
        assert_eq!(constraints.ideal_height, 720);
        assert!(!constraints.audio);
    }
}
