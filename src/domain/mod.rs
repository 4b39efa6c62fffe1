// ==========================================
// 预制构件日产组合排产 - 领域模型层
// ==========================================
// 职责: 定义构件、序列、批次、排产输出与报表实体
// 红线: 不含文件访问逻辑,不含引擎逻辑
// ==========================================

pub mod lot;
pub mod mix;
pub mod piece;
pub mod report;
pub mod sequence;
pub mod types;

// 重导出核心类型
pub use lot::{Lot, LotId};
pub use mix::{AllocationEvent, MixOutputs, MixRow, PendingItem};
pub use piece::{PieceRecord, RawPieceRecord};
pub use report::{
    DailyUtilization, DemandPoint, DetailingDeadline, MixTotals, PeriodMixRow, ValidationIssue,
    ValidationReport,
};
pub use sequence::{RawSequenceRecord, SequenceKey, SequenceWindow, StreamKey};
pub use types::{DqLevel, PendingReason, ViewMode};
