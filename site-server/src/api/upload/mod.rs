//! Upload Routes
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/uploads | POST | 上传图片 (multipart, 字段名 `file`) | 管理员 |
//! | /uploads/{filename} | GET | 读取已上传图片 | 无 |

mod handler;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use http::header;

use crate::core::ServerState;

/// Hard request body cap for uploads; the configured per-file limit is
/// checked in the handler and must stay below this
const MAX_UPLOAD_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Upload file response
enum UploadFileResponse {
    Ok(Bytes, String),
    NotFound,
    BadRequest(&'static str),
}

impl IntoResponse for UploadFileResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            UploadFileResponse::Ok(content, mime) => (
                http::StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime),
                    (
                        header::CACHE_CONTROL,
                        "public, max-age=31536000, immutable".to_string(),
                    ),
                ],
                content,
            )
                .into_response(),
            UploadFileResponse::NotFound => {
                (http::StatusCode::NOT_FOUND, "File not found").into_response()
            }
            UploadFileResponse::BadRequest(msg) => {
                (http::StatusCode::BAD_REQUEST, msg).into_response()
            }
        }
    }
}

/// Serve uploaded file handler
///
/// Stored files are content-addressed, so they can be cached forever.
async fn serve_uploaded_file(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> UploadFileResponse {
    // Security check: prevent path traversal
    if !handler::is_safe_filename(&filename) {
        return UploadFileResponse::BadRequest("Invalid filename");
    }

    let file_path = state.config.uploads_dir().join(&filename);

    match tokio::fs::read(&file_path).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&file_path)
                .first_or_octet_stream()
                .to_string();
            UploadFileResponse::Ok(content.into(), mime)
        }
        Err(e) => {
            tracing::debug!(filename = %filename, error = %e, "Uploaded file not found");
            UploadFileResponse::NotFound
        }
    }
}

/// Build upload router
pub fn router() -> Router<ServerState> {
    Router::new()
        // Upload image API - authentication required
        .route(
            "/api/uploads",
            post(handler::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        // Serve uploaded images - public access
        .route("/uploads/{filename}", get(serve_uploaded_file))
}
