//! Config Service port
//!
//! The two operations the accessor needs from the server side. The network
//! implementation lives in [`crate::http`]; tests plug in scripted fakes.

use async_trait::async_trait;
use shared::models::SiteSettings;

use crate::error::ClientResult;

/// Fetch / replace the settings document
#[async_trait]
pub trait SettingsService: Send + Sync {
    /// Current document; the empty default when nothing was ever stored
    async fn get_config(&self) -> ClientResult<SiteSettings>;

    /// Persist `settings` as the whole new document, returning what was stored
    async fn replace_config(&self, settings: &SiteSettings) -> ClientResult<SiteSettings>;
}

#[async_trait]
impl<T: SettingsService + ?Sized> SettingsService for std::sync::Arc<T> {
    async fn get_config(&self) -> ClientResult<SiteSettings> {
        (**self).get_config().await
    }

    async fn replace_config(&self, settings: &SiteSettings) -> ClientResult<SiteSettings> {
        (**self).replace_config(settings).await
    }
}
