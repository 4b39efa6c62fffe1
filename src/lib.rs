// ==========================================
// 预制构件日产组合排产 - 核心库
// ==========================================
// 业务: 按序列生产窗口与日均产能，逐日生成构件生产组合
// 技术栈: Rust + CSV/Excel 导入 + JSON 配置
// 系统定位: 决策支持（排产结果由计划员审核）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 排产规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - 结果文件
pub mod export;

// 配置层 - 排产参数
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 对外入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DqLevel, PendingReason, ViewMode};

// 领域实体
pub use domain::{
    AllocationEvent, Lot, MixOutputs, MixRow, PendingItem, PieceRecord, RawPieceRecord,
    RawSequenceRecord, SequenceWindow,
};

// 引擎
pub use engine::{MixScheduler, Normalizer};

// 配置
pub use config::{ConfigManager, PlannerConfig};

// API
pub use api::{MixApi, MixReport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "预制构件日产组合排产";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
