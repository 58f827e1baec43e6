//! Error types for the host application.

use thiserror::Error;

/// Failures of a hand-tracking collaborator.  None of these are fatal to the
/// session: they switch it to pointer-only mode.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The device, model or stream could not be opened.
    #[error("tracking unavailable: {0}")]
    Unavailable(String),

    #[error("tracker I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A landmark frame that could not be turned into a hand position.
    #[error("malformed landmark frame: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::Malformed(e.to_string())
    }
}

/// Errors that end the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
}
