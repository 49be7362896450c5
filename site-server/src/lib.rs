//! Site Server - 站点配置同步服务端
//!
//! # 架构概述
//!
//! 公开站点和后台共用的配置服务：
//!
//! - **数据库** (`db`): 嵌入式 redb 存储，单例配置文档
//! - **认证** (`auth`): JWT + Argon2，单管理员
//! - **HTTP API** (`api`): 配置读写、图片上传、登录、健康检查
//!
//! # 模块结构
//!
//! ```text
//! site-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # JWT 认证、密码校验、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志、输入校验
//! └── db/            # 配置文档存储
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState, build_router};
pub use db::SettingsStore;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境
///
/// 1. 加载 `.env` (不存在时忽略)
/// 2. 加载 [`Config`]
/// 3. 按配置中的日志级别 / 日志目录初始化日志
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   _____ _ __
  / ___/(_) /____
  \__ \/ / __/ _ \
 ___/ / / /_/  __/
/____/_/\__/\___/  settings server v{}
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
