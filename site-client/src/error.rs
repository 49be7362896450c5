//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error body returned by the server (`ApiResponse` envelope)
    #[error("API error {code}: {message}")]
    Api {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Local cache failure
///
/// Only ever logged; a broken cache degrades to a cold start.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache entry is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Settings accessor failure, as seen by callers
#[derive(Debug, Error)]
pub enum SettingsError {
    /// `getConfig` failed; the last good value stays in place
    #[error("Failed to fetch settings: {0}")]
    FetchFailed(#[source] ClientError),

    /// `replaceConfig` failed; the optimistic value was rolled back
    #[error("Failed to save settings: {0}")]
    WriteFailed(#[source] ClientError),
}

impl SettingsError {
    pub fn is_write(&self) -> bool {
        matches!(self, SettingsError::WriteFailed(_))
    }
}
