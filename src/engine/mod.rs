// ==========================================
// 预制构件日产组合排产 - 引擎层
// ==========================================
// 职责: 纯计算（规范化、批次、日历、分配、聚合、分析）
// 红线: 引擎不做 I/O，不读取全局状态（含语言设置），从不报错
// ==========================================

pub mod aggregation;
pub mod allocator;
pub mod calendar;
pub mod detailing;
pub mod lot_builder;
pub mod normalizer;
pub mod scheduler;
pub mod utilization;

// 重导出核心引擎
pub use aggregation::{period_label, MixAggregator};
pub use allocator::{
    AllocationOutcome, AllocationState, DayAllocator, StreamPlan, DRAIN_EPSILON,
    PENDING_EPSILON,
};
pub use calendar::{is_business_day, sub_business_days, ProductionCalendar};
pub use detailing::DetailingPlanner;
pub use lot_builder::{LotBuildResult, LotBuilder};
pub use normalizer::Normalizer;
pub use scheduler::MixScheduler;
pub use utilization::{UtilizationAnalyzer, DEFAULT_HEAVIEST_DAYS};
