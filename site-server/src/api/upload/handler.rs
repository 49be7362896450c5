//! Image Upload Handler
//!
//! Accepts PNG, JPEG and WebP images from the admin. Files are stored
//! as-is under the uploads directory, named by content hash so the same
//! image uploaded twice maps to the same reference.

use axum::Json;
use axum::extract::{Extension, Multipart, State};
use sha2::{Digest, Sha256};
use shared::client::UploadResponse;
use shared::error::ErrorCode;
use shared::models::ImageRef;
use std::path::PathBuf;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::AppError;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Rejects anything that could escape the uploads directory
pub(super) fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
}

/// Validate image file
///
/// Returns the normalized extension.
fn validate_image(data: &[u8], ext: &str, max_size: usize) -> Result<String, AppError> {
    if data.len() > max_size {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!(
                "File too large. Maximum size is {} bytes ({}MB)",
                max_size,
                max_size / 1024 / 1024
            ),
        ));
    }

    let ext_lower = ext.to_lowercase();
    if !SUPPORTED_FORMATS.contains(&ext_lower.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!(
                "Unsupported file format '{}'. Supported: {}",
                ext_lower,
                SUPPORTED_FORMATS.join(", ")
            ),
        ));
    }

    // Verify it's actually an image by trying to load it
    if let Err(e) = image::load_from_memory(data) {
        return Err(AppError::with_message(
            ErrorCode::InvalidImageFile,
            format!("Invalid image file ({}): {}", ext_lower, e),
        ));
    }

    // jpeg and jpg are the same file
    Ok(if ext_lower == "jpeg" {
        "jpg".to_string()
    } else {
        ext_lower
    })
}

/// Upload image handler
pub async fn upload(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let uploads_dir = state.config.uploads_dir();
    tokio::fs::create_dir_all(&uploads_dir).await.map_err(|e| {
        AppError::with_message(
            ErrorCode::FileStorageFailed,
            format!("Failed to create uploads directory: {}", e),
        )
    })?;

    // Find the file field
    let mut field_data: Option<Vec<u8>> = None;
    let mut original_filename = None;

    while let Some(f) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(format!("Invalid multipart request: {}", e)))?
    {
        if f.name() == Some("file") {
            original_filename = f.file_name().map(|s| s.to_string());
            field_data = Some(
                f.bytes()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Multipart error: {}", e)))?
                    .to_vec(),
            );
            break;
        }
    }

    let data = field_data.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::NoFileProvided,
            "No 'file' field found. Field name must be 'file'",
        )
    })?;

    let filename = original_filename.ok_or_else(|| {
        AppError::with_message(ErrorCode::NoFileProvided, "No filename provided in file field")
    })?;

    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }

    let ext = PathBuf::from(&filename)
        .extension()
        .and_then(|ext| ext.to_str().map(|s| s.to_string()))
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!("Invalid file extension for: {}", filename),
            )
        })?;

    let ext = validate_image(&data, &ext, state.config.max_upload_bytes)?;

    let file_id = calculate_hash(&data);
    let stored_name = format!("{}.{}", file_id, ext);
    let file_path = uploads_dir.join(&stored_name);

    if tokio::fs::try_exists(&file_path).await.unwrap_or(false) {
        tracing::info!(
            original_name = %filename,
            existing_file = %stored_name,
            "Duplicate image detected, returning existing file"
        );
    } else {
        tokio::fs::write(&file_path, &data).await.map_err(|e| {
            AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to save file: {}", e),
            )
        })?;

        tracing::info!(
            operator = %current_user.username,
            original_name = %filename,
            size = %data.len(),
            hash = %file_id,
            "Image uploaded successfully"
        );
    }

    Ok(Json(UploadResponse {
        file_id,
        path: ImageRef::stored(&stored_name).as_str().to_string(),
        filename: stored_name,
        original_name: filename,
        size: data.len(),
        format: ext,
    }))
}
