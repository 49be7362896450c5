//! Shared types for the rental site backend
//!
//! Settings document model, image reference resolution, the unified error
//! system and the request/response DTOs used by both server and client.

pub mod client;
pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use models::{AssetResolver, ImageRef, SiteSettings, SiteSettingsUpdate, resolve_asset_url};
