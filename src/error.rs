// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the capture engine.

use std::fmt;

use crate::landmark::LandmarkType;

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Result of a single measurement over a frame.
///
/// Landmark absence is an expected, frequent condition, so measurements carry it
/// as a value instead of a [`CaptureError`].
pub type Measure<T> = std::result::Result<T, MissingLandmark>;

/// A required joint was not present in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MissingLandmark(pub LandmarkType);

impl fmt::Display for MissingLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "landmark '{}' not detected", self.0)
    }
}

impl std::error::Error for MissingLandmark {}

/// Main error type for the capture engine.
#[derive(Debug)]
pub enum CaptureError {
    /// A required joint is absent from the current frame.
    MissingLandmark(LandmarkType),
    /// Camera intrinsics are missing or invalid at session start.
    PreconditionError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Malformed landmark frame input.
    FrameError(String),
    /// The background capture session stopped unexpectedly.
    SessionError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLandmark(kind) => write!(f, "Missing landmark: {kind}"),
            Self::PreconditionError(msg) => write!(f, "Precondition error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::FrameError(msg) => write!(f, "Frame error: {msg}"),
            Self::SessionError(msg) => write!(f, "Session error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<MissingLandmark> for CaptureError {
    fn from(err: MissingLandmark) -> Self {
        Self::MissingLandmark(err.0)
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        Self::FrameError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CaptureError::PreconditionError("no focal length".to_string());
        assert_eq!(err.to_string(), "Precondition error: no focal length");

        let err = CaptureError::from(MissingLandmark(LandmarkType::LeftEye));
        assert_eq!(err.to_string(), "Missing landmark: left_eye");
    }

    #[test]
    fn test_json_error_is_frame_error() {
        let err: CaptureError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, CaptureError::FrameError(_)));
    }
}
