use thiserror::Error;

use crate::db::StoreError;

/// 启动和运行期间的服务器错误
///
/// 请求级错误走 [`AppError`](crate::AppError)，这里只覆盖进程级失败。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("存储初始化失败: {0}")]
    Store(#[from] StoreError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
