//! Consumer helpers
//!
//! Public pages read through [`PublicContact`] and the image helpers, which
//! give every field a defined fallback. Admin forms write through
//! [`SettingsEditor`], which always submits a full merged document.

use shared::models::{AssetResolver, ImageRef, PageKey, SiteSettings, SiteSettingsUpdate};

use crate::accessor::SharedAccessor;
use crate::cache::CacheStore;
use crate::error::SettingsError;
use crate::service::SettingsService;

/// WhatsApp deep link for a display phone number
///
/// Keeps the digits only (`"+62 811-000"` → `https://wa.me/62811000`);
/// `None` when there are no digits at all.
pub fn whatsapp_link(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(format!("https://wa.me/{}", digits))
    }
}

/// Renderable hero image URL for a page, `""` when unset
pub fn hero_image_url(settings: &SiteSettings, page: PageKey, resolver: &AssetResolver) -> String {
    resolver.resolve(settings.hero_images.get(page))
}

/// Renderable logo URL, `""` when unset
pub fn logo_url(settings: &SiteSettings, resolver: &AssetResolver) -> String {
    resolver.resolve(&settings.logo)
}

/// Renderable avatar URL, `""` when unset
pub fn avatar_url(settings: &SiteSettings, resolver: &AssetResolver) -> String {
    resolver.resolve(&settings.profile.avatar)
}

/// Text shown when a contact field is missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFallbacks {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub hours: String,
}

impl Default for ContactFallbacks {
    fn default() -> Self {
        Self {
            phone: "-".to_string(),
            email: "-".to_string(),
            address: "-".to_string(),
            hours: "-".to_string(),
        }
    }
}

/// Contact block as public pages render it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicContact {
    pub phone: String,
    pub whatsapp: Option<String>,
    pub sales_email: String,
    /// Falls back to the sales address before the generic fallback
    pub support_email: String,
    pub address: String,
    pub weekday_hours: String,
    pub emergency_hours: String,
    /// Trusted embed markup, `None` hides the map
    pub map_embed: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl PublicContact {
    pub fn new(settings: &SiteSettings, fallbacks: &ContactFallbacks) -> Self {
        let contact = &settings.contact;
        let phone = non_blank(&contact.phone);

        let sales = non_blank(&contact.email.sales);
        let support = non_blank(&contact.email.support).or(sales);

        let address_parts: Vec<&str> = [
            &contact.address.street,
            &contact.address.city,
            &contact.address.zip,
        ]
        .into_iter()
        .filter_map(non_blank)
        .collect();

        Self {
            phone: phone.unwrap_or(&fallbacks.phone).to_string(),
            whatsapp: phone.and_then(whatsapp_link),
            sales_email: sales.unwrap_or(&fallbacks.email).to_string(),
            support_email: support.unwrap_or(&fallbacks.email).to_string(),
            address: if address_parts.is_empty() {
                fallbacks.address.clone()
            } else {
                address_parts.join(", ")
            },
            weekday_hours: non_blank(&contact.hours.weekday)
                .unwrap_or(&fallbacks.hours)
                .to_string(),
            emergency_hours: non_blank(&contact.hours.emergency)
                .unwrap_or(&fallbacks.hours)
                .to_string(),
            map_embed: non_blank(&contact.map_embed).map(str::to_string),
        }
    }
}

impl From<&SiteSettings> for PublicContact {
    fn from(settings: &SiteSettings) -> Self {
        Self::new(settings, &ContactFallbacks::default())
    }
}

/// Admin-side write helper
///
/// Reads the accessor's current document at submit time, merges the form's
/// field groups over it and submits the whole thing.
pub struct SettingsEditor<S, C> {
    accessor: SharedAccessor<S, C>,
}

impl<S: SettingsService, C: CacheStore> SettingsEditor<S, C> {
    pub fn new(accessor: SharedAccessor<S, C>) -> Self {
        Self { accessor }
    }

    pub fn accessor(&self) -> &SharedAccessor<S, C> {
        &self.accessor
    }

    /// Merge `patch` into the current document and save it
    pub async fn apply(&self, patch: SiteSettingsUpdate) -> Result<SiteSettings, SettingsError> {
        let merged = patch.apply_to(&self.accessor.current());
        self.accessor.update(merged).await
    }

    /// Change just the phone number
    pub async fn set_phone(&self, phone: impl Into<String>) -> Result<SiteSettings, SettingsError> {
        let mut contact = self.accessor.current().contact;
        contact.phone = Some(phone.into());
        self.apply(SiteSettingsUpdate {
            contact: Some(contact),
            ..Default::default()
        })
        .await
    }

    /// Point a page's hero image at `image` (typically a fresh upload path)
    pub async fn set_hero_image(
        &self,
        page: PageKey,
        image: ImageRef,
    ) -> Result<SiteSettings, SettingsError> {
        let mut hero_images = self.accessor.current().hero_images;
        hero_images.set(page, image);
        self.apply(SiteSettingsUpdate {
            hero_images: Some(hero_images),
            ..Default::default()
        })
        .await
    }

    pub async fn set_logo(&self, image: ImageRef) -> Result<SiteSettings, SettingsError> {
        self.apply(SiteSettingsUpdate {
            logo: Some(image),
            ..Default::default()
        })
        .await
    }
}
