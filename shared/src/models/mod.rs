//! Data models
//!
//! Shared between site-server, site-client and the frontend (via API).

pub mod image_ref;
pub mod site_settings;

// Re-exports
pub use image_ref::*;
pub use site_settings::*;
