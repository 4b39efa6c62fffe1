// ==========================================
// 预制构件日产组合排产 - 领域类型定义
// ==========================================
// 职责: 枚举类型（待处理原因、数据质量级别、视图周期）
// 红线: 引擎只输出原因代码，文案在展示边界渲染
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 待处理原因 (Pending Reason)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE（导出文件中的 reason_code 列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingReason {
    NoValidWindows,   // 没有任何带有效生产日期的序列
    EmptyPieceList,   // 构件清单为空
    MissingKey,       // 构件缺少 CT/ETAPA/SEQUENCIA
    ZeroVolumeLot,    // 批次体积 <= 0（未参与分配）
    NoPositiveVolume, // 全部批次体积 <= 0
    DidNotFit,        // 在生产窗口内按日产能未能排完
}

impl PendingReason {
    /// 原因代码（稳定，不随语言变化）
    pub fn code(&self) -> &'static str {
        match self {
            PendingReason::NoValidWindows => "NO_VALID_WINDOWS",
            PendingReason::EmptyPieceList => "EMPTY_PIECE_LIST",
            PendingReason::MissingKey => "MISSING_KEY",
            PendingReason::ZeroVolumeLot => "ZERO_VOLUME_LOT",
            PendingReason::NoPositiveVolume => "NO_POSITIVE_VOLUME",
            PendingReason::DidNotFit => "DID_NOT_FIT",
        }
    }

    /// 国际化文案键
    pub fn message_key(&self) -> &'static str {
        match self {
            PendingReason::NoValidWindows => "pending.no_valid_windows",
            PendingReason::EmptyPieceList => "pending.empty_piece_list",
            PendingReason::MissingKey => "pending.missing_key",
            PendingReason::ZeroVolumeLot => "pending.zero_volume_lot",
            PendingReason::NoPositiveVolume => "pending.no_positive_volume",
            PendingReason::DidNotFit => "pending.did_not_fit",
        }
    }

    /// 是否为提前终止类原因（排产结果为空）
    pub fn is_early_exit(&self) -> bool {
        matches!(
            self,
            PendingReason::NoValidWindows
                | PendingReason::EmptyPieceList
                | PendingReason::NoPositiveVolume
        )
    }
}

impl fmt::Display for PendingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 数据质量级别 (DQ Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,   // 错误（结构性问题，排产结果不可信）
    Warning, // 警告（排产照常，部分行会进入待处理）
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Error => write!(f, "ERROR"),
            DqLevel::Warning => write!(f, "WARNING"),
        }
    }
}

// ==========================================
// 视图周期 (View Mode)
// ==========================================
// 日 / 周（ISO 周）/ 月
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Daily => write!(f, "daily"),
            ViewMode::Weekly => write!(f, "weekly"),
            ViewMode::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "diaria" | "diária" | "d" => Ok(ViewMode::Daily),
            "weekly" | "semanal" | "w" => Ok(ViewMode::Weekly),
            "monthly" | "mensal" | "m" => Ok(ViewMode::Monthly),
            other => Err(format!("未知视图周期: {}", other)),
        }
    }
}
