//! Error types for shot resolution and capture

use thiserror::Error;

/// Result type alias for pageshots operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while preparing or capturing shots
#[derive(Error, Debug)]
pub enum Error {
    /// The page driver could not be launched or could not open a page
    #[error("Driver initialization failed: {0}")]
    InitializationError(String),

    /// Failed to load a URL. This is the only error a run survives.
    #[error("Failed to load URL: {0}")]
    LoadError(String),

    /// Failed while settling or evaluating the page
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// The capture primitive failed
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// Invalid or unreadable configuration file
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The run was cancelled before every job finished
    #[error("Run interrupted")]
    Interrupted,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the run may continue with the next job after this error
    pub fn is_navigation(&self) -> bool {
        matches!(self, Error::LoadError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_load_errors_are_recoverable() {
        assert!(Error::LoadError("net::ERR_NAME_NOT_RESOLVED".into()).is_navigation());
        assert!(!Error::CaptureError("disk full".into()).is_navigation());
        assert!(!Error::Other("browser is closed".into()).is_navigation());
    }
}
