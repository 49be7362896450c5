use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::SettingsStore;

/// 服务器状态 - 所有请求处理器共享
///
/// 克隆成本低 (内部都是 Arc)。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 启动配置 (不可变) |
/// | settings | 站点配置存储 (redb) |
/// | jwt_service | 管理员令牌签发/校验 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub settings: SettingsStore,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, settings: SettingsStore, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            settings,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录和上传目录存在
    /// 2. 打开 (或创建) 设置数据库
    /// 3. 构造 JWT 服务
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        std::fs::create_dir_all(config.uploads_dir())?;

        let db_path = config.database_path();
        let settings = SettingsStore::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Settings store opened");

        if config.admin.password_hash.is_none() {
            tracing::warn!("ADMIN_PASSWORD_HASH is not set, admin login is disabled");
        }

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(config.clone(), settings, jwt_service))
    }
}
