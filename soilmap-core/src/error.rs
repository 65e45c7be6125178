/// Error types for the soils adapter
use crate::normalize::ResponseBody;
use thiserror::Error;

/// Main error type for soil information queries
#[derive(Error, Debug)]
pub enum SoilsError {
    /// Required service setting missing, or query kind unsupported by the mode
    #[error("Invalid soils service configuration: {0}")]
    Configuration(String),

    /// The HTTP request itself failed
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Soils service returned HTTP {status}: {body}")]
    Service { status: u16, body: ResponseBody },

    /// A body that had to be JSON could not be decoded
    #[error("Failed to decode service response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for SoilsError {
    fn from(e: serde_json::Error) -> Self {
        SoilsError::Decode(e.to_string())
    }
}

/// Type alias for Results using SoilsError
pub type Result<T> = std::result::Result<T, SoilsError>;
