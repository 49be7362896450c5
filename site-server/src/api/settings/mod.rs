//! Site Settings API Module
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/settings | GET | 读取当前配置 (从未写入时返回空文档) | 无 |
//! | /api/settings | PUT | 整体替换配置 | 管理员 |

mod handler;

use axum::{Router, extract::DefaultBodyLimit, routing::get};

use crate::core::ServerState;
use crate::utils::validation::MAX_DATA_URI_LEN;

/// Request body cap for `PUT /api/settings`
///
/// Leaves room for several inline data URIs at their per-field maximum, so an
/// oversized image is reported by validation rather than by the body limit.
pub const MAX_SETTINGS_BODY_BYTES: usize = 8 * MAX_DATA_URI_LEN;

/// Settings router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/settings", get(handler::get).put(handler::replace))
        .layer(DefaultBodyLimit::max(MAX_SETTINGS_BODY_BYTES))
}
