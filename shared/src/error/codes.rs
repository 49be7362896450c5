//! Unified error codes for the site backend
//!
//! Error codes are shared between site-server, site-client and the
//! admin frontend. They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Settings errors
//! - 5xxx: Upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Settings ====================
    /// Settings document failed validation
    SettingsInvalid = 4001,
    /// An image field holds an unrecognized reference
    ImageRefInvalid = 4002,

    // ==================== 5xxx: Upload ====================
    /// Uploaded file exceeds size limit
    FileTooLarge = 5001,
    /// File extension is not an accepted image type
    UnsupportedFileFormat = 5002,
    /// Content is not a decodable image
    InvalidImageFile = 5003,
    /// Multipart request has no `file` field
    NoFileProvided = 5004,
    /// Uploaded file is empty
    EmptyFile = 5005,
    /// Writing the file to storage failed
    FileStorageFailed = 5006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Timeout error
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",

            Self::NotAuthenticated => "Authentication required",
            Self::InvalidCredentials => "Invalid username or password",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Invalid token",

            Self::PermissionDenied => "Permission denied",

            Self::SettingsInvalid => "Settings document is invalid",
            Self::ImageRefInvalid => "Image reference is not recognized",

            Self::FileTooLarge => "File is too large",
            Self::UnsupportedFileFormat => "Unsupported file format",
            Self::InvalidImageFile => "Invalid image file",
            Self::NoFileProvided => "No file provided",
            Self::EmptyFile => "Empty file provided",
            Self::FileStorageFailed => "Failed to store file",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::NetworkError => "Network error",
            Self::TimeoutError => "Operation timed out",
            Self::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when converting an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            5 => Self::InvalidRequest,
            6 => Self::InvalidFormat,

            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,

            2001 => Self::PermissionDenied,

            4001 => Self::SettingsInvalid,
            4002 => Self::ImageRefInvalid,

            5001 => Self::FileTooLarge,
            5002 => Self::UnsupportedFileFormat,
            5003 => Self::InvalidImageFile,
            5004 => Self::NoFileProvided,
            5005 => Self::EmptyFile,
            5006 => Self::FileStorageFailed,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::NetworkError,
            9004 => Self::TimeoutError,
            9005 => Self::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
