//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 管理员登录
//! - [`settings`] - 站点配置读写
//! - [`upload`] - 图片上传与静态访问

pub mod auth;
pub mod health;
pub mod settings;
pub mod upload;

// Re-export common types for handlers
pub use crate::utils::AppResult;
