//! Input validation helpers
//!
//! Text length limits and the settings document check run before every
//! replace. The store itself never enforces any of this.

use shared::error::ErrorCode;
use shared::models::SiteSettings;
use validator::ValidateEmail;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Names, roles, short labels
pub const MAX_NAME_LEN: usize = 200;

/// Phone numbers, zip codes, opening hours
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Inline data URIs are much bigger than URLs
pub const MAX_DATA_URI_LEN: usize = 2 * 1024 * 1024;

/// Map embed markup
pub const MAX_EMBED_LEN: usize = 10_000;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate an optional email address. Blank counts as unset.
pub fn validate_optional_email(value: &Option<String>, field: &str) -> Result<(), AppError> {
    validate_optional_text(value, field, MAX_EMAIL_LEN)?;
    if let Some(v) = value
        && !v.trim().is_empty()
        && !v.trim().validate_email()
    {
        return Err(
            AppError::validation(format!("{field} is not a valid email address"))
                .with_detail("field", field),
        );
    }
    Ok(())
}

/// Validate the whole settings document before it is stored.
///
/// Every image reference must be one of the storable forms; free text
/// fields are length-checked; emails must parse when non-blank.
pub fn validate_settings(settings: &SiteSettings) -> Result<(), AppError> {
    for (field, image) in settings.image_fields() {
        if !image.is_storable() {
            return Err(AppError::with_message(
                ErrorCode::ImageRefInvalid,
                format!("{field} is not a storable image reference"),
            )
            .with_detail("field", field.clone())
            .with_detail("value", image.as_str()));
        }
        let max_len = if image.as_str().starts_with("data:") {
            MAX_DATA_URI_LEN
        } else {
            MAX_URL_LEN
        };
        if image.as_str().len() > max_len {
            return Err(AppError::with_message(
                ErrorCode::ImageRefInvalid,
                format!("{field} is too long"),
            )
            .with_detail("field", field.clone()));
        }
    }

    let contact = &settings.contact;
    validate_optional_text(&contact.address.street, "contact.address.street", MAX_ADDRESS_LEN)?;
    validate_optional_text(&contact.address.city, "contact.address.city", MAX_NAME_LEN)?;
    validate_optional_text(&contact.address.zip, "contact.address.zip", MAX_SHORT_TEXT_LEN)?;
    validate_optional_email(&contact.email.sales, "contact.email.sales")?;
    validate_optional_email(&contact.email.support, "contact.email.support")?;
    validate_optional_text(&contact.phone, "contact.phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&contact.hours.weekday, "contact.hours.weekday", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(
        &contact.hours.emergency,
        "contact.hours.emergency",
        MAX_SHORT_TEXT_LEN,
    )?;
    validate_optional_text(&contact.map_embed, "contact.mapEmbed", MAX_EMBED_LEN)?;

    validate_optional_text(&settings.profile.name, "profile.name", MAX_NAME_LEN)?;
    validate_optional_text(&settings.profile.role, "profile.role", MAX_NAME_LEN)?;

    Ok(())
}
