//! Authentication Handlers
//!
//! Single-administrator login against the configured argon2 hash

use std::time::Duration;

use axum::{Json, extract::State};
use shared::client::{LoginRequest, LoginResponse};

use crate::AppError;
use crate::auth::password::verify_password;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::validation::{MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_required_text};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Role carried in admin tokens
const ADMIN_ROLE: &str = "admin";

/// Login handler
///
/// Authenticates the administrator and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_required_text(&req.username, "username", MAX_NAME_LEN)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;

    let admin = &state.config.admin;

    let valid = match admin.password_hash.as_deref() {
        Some(hash) if req.username == admin.username => verify_password(&req.password, hash)
            .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?,
        _ => false,
    };

    // Fixed delay before answering, same for every outcome
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    if !valid {
        security_log!("WARN", "login_failed", username = req.username.clone());
        tracing::warn!(username = %req.username, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(&admin.username, ADMIN_ROLE)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(username = %admin.username, "Admin logged in successfully");

    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt_service.expires_in_seconds(),
        username: admin.username.clone(),
    }))
}
