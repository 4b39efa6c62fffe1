// ==========================================
// 预制构件日产组合排产 - 配置层
// ==========================================
// 职责: 排产参数定义、读取、覆写、快照
// 存储: JSON 配置文件（key-value）
// ==========================================

pub mod config_manager;
pub mod error;
pub mod mix_config_trait;
pub mod planner_config;

// 重导出核心配置类型
pub use config_manager::{default_config_path, ConfigManager, CONFIG_PATH_ENV};
pub use error::{ConfigError, ConfigResult};
pub use mix_config_trait::MixConfigReader;
pub use planner_config::{config_keys, PlannerConfig};
