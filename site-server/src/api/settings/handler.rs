//! Site Settings API Handlers

use axum::{
    Json,
    extract::{Extension, State},
};
use shared::models::SiteSettings;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::validate_settings;

/// Get current settings document
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<SiteSettings>> {
    let settings = state.settings.get_or_default()?;
    Ok(Json(settings))
}

/// Replace the settings document
///
/// Whole-document replace; the response body is what was stored.
pub async fn replace(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<SiteSettings>,
) -> AppResult<Json<SiteSettings>> {
    validate_settings(&payload)?;

    let stored = state.settings.replace(&payload)?;

    tracing::info!(
        operator = %current_user.username,
        images = stored.image_fields().iter().filter(|(_, i)| !i.is_empty()).count(),
        "Site settings replaced"
    );

    Ok(Json(stored))
}
