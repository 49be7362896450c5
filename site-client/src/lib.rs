//! Site Client - settings access for public pages and the back office
//!
//! - [`SettingsAccessor`]: cache-first, optimistic settings state
//! - [`NetworkSettingsClient`]: HTTP transport to the site server
//! - [`consumer`]: display fallbacks and the admin write helper

pub mod accessor;
pub mod cache;
pub mod config;
pub mod consumer;
pub mod error;
pub mod http;
pub mod notice;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use accessor::{SettingsAccessor, SettingsStatus, SettingsView, SharedAccessor};
pub use cache::{CacheStore, FileCacheStore, MemoryCacheStore, SETTINGS_CACHE_KEY};
pub use config::ClientConfig;
pub use consumer::{PublicContact, SettingsEditor, whatsapp_link};
pub use error::{CacheError, ClientError, ClientResult, SettingsError};
pub use http::NetworkSettingsClient;
pub use notice::{MemoryNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use service::SettingsService;

// Re-export shared types for convenience
pub use shared::client::{LoginResponse, UploadResponse};
pub use shared::models::{AssetResolver, ImageRef, PageKey, SiteSettings, SiteSettingsUpdate};

/// Accessor wired to the network client and the on-disk cache
pub type NetworkAccessor = SettingsAccessor<Arc<NetworkSettingsClient>, FileCacheStore>;

/// Build the process-wide accessor from configuration
///
/// Returns the shared network client too, so the back office can log in and
/// upload through the same connection.
pub fn connect(
    config: &ClientConfig,
) -> ClientResult<(Arc<NetworkAccessor>, Arc<NetworkSettingsClient>)> {
    let client = Arc::new(NetworkSettingsClient::new(config)?);
    let cache = FileCacheStore::new(config.cache_dir.clone());
    let accessor = SettingsAccessor::new(client.clone(), cache).shared();
    Ok((accessor, client))
}
