//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 4xxx: Settings errors
/// - 5xxx: Upload errors
/// - 9xxx (and anything unassigned): System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Settings document errors (4xxx)
    Settings,
    /// Upload errors (5xxx)
    Upload,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            4000..5000 => Self::Settings,
            5000..6000 => Self::Upload,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Settings => "settings",
            Self::Upload => "upload",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(4002), ErrorCategory::Settings);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Upload);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        // 3xxx is unassigned
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::ImageRefInvalid.category(),
            ErrorCategory::Settings
        );
        assert_eq!(ErrorCode::EmptyFile.category(), ErrorCategory::Upload);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Settings).unwrap();
        assert_eq!(json, "\"settings\"");
        let category: ErrorCategory = serde_json::from_str("\"upload\"").unwrap();
        assert_eq!(category, ErrorCategory::Upload);
    }
}
