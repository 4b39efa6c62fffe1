// ==========================================
// 预制构件日产组合排产 - 配置模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置模块错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置 JSON 格式错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("未知配置键: {0}")]
    UnknownKey(String),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置锁获取失败: {0}")]
    LockPoisoned(String),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
