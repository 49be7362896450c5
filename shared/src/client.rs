//! Client-related types shared between server and client
//!
//! Request/response DTOs used by site-server handlers and site-client.

use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub username: String,
}

// =============================================================================
// Upload API DTOs
// =============================================================================

/// Upload response data
///
/// `path` is the storage-relative reference (`/uploads/<file>`) to put into
/// an image field of the settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub format: String,
    pub path: String,
}

// =============================================================================
// Health
// =============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
