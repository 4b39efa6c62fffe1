// ==========================================
// 预制构件日产组合排产 - API 层
// ==========================================
// 职责: 对外入口（CLI 调用），编排导入、排产、报表与导出
// ==========================================

pub mod error;
pub mod mix_api;

pub use error::{ApiError, ApiResult};
pub use mix_api::{
    build_pending_view, period_mix_file, render_validation_messages, MixApi, MixReport,
    PendingView, RunSummary,
};
