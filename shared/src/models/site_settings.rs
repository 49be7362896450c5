//! Site Settings Model
//!
//! 站点配置文档 (singleton per deployment)。所有字段在线上格式中都是可选的，
//! 刚部署时文档可能只填了一部分。

use serde::{Deserialize, Serialize};

use super::image_ref::ImageRef;

/// Site-wide configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    pub contact: ContactInfo,
    pub hero_images: HeroImages,
    pub logo: ImageRef,
    pub profile: Profile,
}

/// Contact block shown on public pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    pub address: Address,
    pub email: EmailAddresses,
    /// Display phone number, also used for WhatsApp links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub hours: BusinessHours,
    /// Raw map embed markup (trusted HTML)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_embed: Option<String>,
}

/// Headquarters address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

/// Email addresses by purpose
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailAddresses {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<String>,
}

/// Business hours (free text, e.g. "Mon-Fri 09:00-18:00")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessHours {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency: Option<String>,
}

/// Public page that carries a hero image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKey {
    Home,
    About,
    Services,
    Portfolio,
    Contact,
}

impl PageKey {
    pub const ALL: [PageKey; 5] = [
        PageKey::Home,
        PageKey::About,
        PageKey::Services,
        PageKey::Portfolio,
        PageKey::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageKey::Home => "home",
            PageKey::About => "about",
            PageKey::Services => "services",
            PageKey::Portfolio => "portfolio",
            PageKey::Contact => "contact",
        }
    }
}

impl std::fmt::Display for PageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hero image per page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroImages {
    pub home: ImageRef,
    pub about: ImageRef,
    pub services: ImageRef,
    pub portfolio: ImageRef,
    pub contact: ImageRef,
}

impl HeroImages {
    pub fn get(&self, page: PageKey) -> &ImageRef {
        match page {
            PageKey::Home => &self.home,
            PageKey::About => &self.about,
            PageKey::Services => &self.services,
            PageKey::Portfolio => &self.portfolio,
            PageKey::Contact => &self.contact,
        }
    }

    pub fn set(&mut self, page: PageKey, image: ImageRef) {
        let slot = match page {
            PageKey::Home => &mut self.home,
            PageKey::About => &mut self.about,
            PageKey::Services => &mut self.services,
            PageKey::Portfolio => &mut self.portfolio,
            PageKey::Contact => &mut self.contact,
        };
        *slot = image;
    }
}

/// Admin profile display data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub avatar: ImageRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl SiteSettings {
    /// Every image-bearing field with its dotted path
    pub fn image_fields(&self) -> Vec<(String, &ImageRef)> {
        let mut fields = vec![("logo".to_string(), &self.logo)];
        for page in PageKey::ALL {
            fields.push((format!("heroImages.{}", page), self.hero_images.get(page)));
        }
        fields.push(("profile.avatar".to_string(), &self.profile.avatar));
        fields
    }
}

/// Field-group level patch built by admin forms
///
/// `None` leaves the group untouched; `Some` replaces the whole group.
/// Applying a patch always starts from a full document, so groups the form
/// does not know about keep whatever is currently loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettingsUpdate {
    pub contact: Option<ContactInfo>,
    pub hero_images: Option<HeroImages>,
    pub logo: Option<ImageRef>,
    pub profile: Option<Profile>,
}

impl SiteSettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.contact.is_none()
            && self.hero_images.is_none()
            && self.logo.is_none()
            && self.profile.is_none()
    }

    /// Merge this patch over `base`, returning the full document to submit
    pub fn apply_to(&self, base: &SiteSettings) -> SiteSettings {
        SiteSettings {
            contact: self.contact.clone().unwrap_or_else(|| base.contact.clone()),
            hero_images: self
                .hero_images
                .clone()
                .unwrap_or_else(|| base.hero_images.clone()),
            logo: self.logo.clone().unwrap_or_else(|| base.logo.clone()),
            profile: self.profile.clone().unwrap_or_else(|| base.profile.clone()),
        }
    }
}
