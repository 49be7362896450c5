use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库 + 上传文件) |
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 日志目录，设置后按天滚动写文件 |
/// | ADMIN_USERNAME | admin | 后台管理员用户名 |
/// | ADMIN_PASSWORD_HASH | (无) | 管理员密码 argon2 哈希 (PHC 格式) |
/// | MAX_UPLOAD_BYTES | 5242880 | 单个上传文件大小上限 |
/// | CORS_ALLOW_ORIGIN | (无) | 允许的前端来源，未设置时放行所有来源 |
///
/// JWT 相关变量见 [`JwtConfig`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/site HTTP_PORT=8080 cargo run -p site-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放数据库和上传文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
    /// 日志目录 (可选)
    pub log_dir: Option<String>,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 后台管理员凭据
    pub admin: AdminCredentials,
    /// 上传文件大小上限 (字节)
    pub max_upload_bytes: usize,
    /// CORS 允许的来源
    pub cors_allow_origin: Option<String>,
}

/// 后台管理员凭据 (单管理员部署)
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    /// argon2 PHC string; login is refused while unset
    pub password_hash: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            jwt: JwtConfig::default(),
            admin: AdminCredentials {
                username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
                password_hash: std::env::var("ADMIN_PASSWORD_HASH")
                    .ok()
                    .filter(|s| !s.is_empty()),
            },
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5 * 1024 * 1024),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("database/settings.redb")
    }

    /// 上传文件目录
    pub fn uploads_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("uploads")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
