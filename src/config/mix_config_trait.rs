// ==========================================
// 预制构件日产组合排产 - 排产配置读取 Trait
// ==========================================
// 职责: 定义 API 层所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::planner_config::PlannerConfig;
use crate::domain::types::ViewMode;
use async_trait::async_trait;

// ==========================================
// MixConfigReader Trait
// ==========================================
// 实现者: ConfigManager
#[async_trait]
pub trait MixConfigReader: Send + Sync {
    /// 日均产能（m³/天），默认 30.0
    async fn get_daily_capacity_m3(&self) -> ConfigResult<f64>;

    /// 是否仅排工作日，默认 true
    async fn get_use_business_days(&self) -> ConfigResult<bool>;

    /// 展示语言，默认 pt-BR
    async fn get_locale(&self) -> ConfigResult<String>;

    /// 缺主键待处理项展示上限，默认 200
    async fn get_pending_display_limit(&self) -> ConfigResult<usize>;

    /// CT/SEQUENCIA 不匹配展示上限，默认 100
    async fn get_sequence_mismatch_display_limit(&self) -> ConfigResult<usize>;

    /// 深化设计提前工作日数（D-N），默认 5
    async fn get_detailing_lead_business_days(&self) -> ConfigResult<u32>;

    /// 周期视图，默认 daily
    async fn get_view_mode(&self) -> ConfigResult<ViewMode>;

    /// 汇总为 PlannerConfig
    async fn load_planner_config(&self) -> ConfigResult<PlannerConfig> {
        Ok(PlannerConfig {
            daily_capacity_m3: self.get_daily_capacity_m3().await?,
            use_business_days: self.get_use_business_days().await?,
            locale: self.get_locale().await?,
            pending_display_limit: self.get_pending_display_limit().await?,
            sequence_mismatch_display_limit: self.get_sequence_mismatch_display_limit().await?,
            detailing_lead_business_days: self.get_detailing_lead_business_days().await?,
            view_mode: self.get_view_mode().await?,
        })
    }
}
