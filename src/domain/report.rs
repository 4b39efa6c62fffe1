// ==========================================
// 预制构件日产组合排产 - 报表领域模型
// ==========================================
// 周期视图 / 需求产能曲线 / 合计行 / 日利用率 / 深化设计截止日
// ==========================================

use crate::domain::types::DqLevel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// PeriodMixRow - 周期视图行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMixRow {
    pub period: String,             // 日 YYYY-MM-DD / 周 YYYY-Www / 月 YYYY-MM
    pub typology: String,
    pub reinforcement: String,
    pub height_cm: f64,
    pub width_cm: f64,
    pub setup: String,
    pub total_length_m: f64,
    pub volume_m3: f64,
    pub sequences: Vec<String>,
    pub piece_names: Vec<String>,
}

// ==========================================
// DemandPoint - 需求 x 产能
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandPoint {
    pub period: String,
    pub demand_m3: f64,       // 周期内已排体积
    pub production_days: usize, // 周期内有排产的天数
    pub capacity_m3: f64,     // production_days × 日产能
}

// ==========================================
// MixTotals - 合计行
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MixTotals {
    pub total_length_m: f64,
    pub volume_m3: f64,
}

// ==========================================
// DailyUtilization - 日产能利用率
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUtilization {
    pub date: NaiveDate,
    pub volume_m3: f64,
    pub setups: usize,          // 当日不同换模签名数
    pub capacity_m3: f64,
    pub utilization: f64,       // volume / capacity（产能 <= 0 时为 0）
}

// ==========================================
// DetailingDeadline - 深化设计截止日（D-N）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailingDeadline {
    pub ct: String,
    pub etapa: String,
    pub sequence: String,
    pub first_production_date: NaiveDate,
    pub detailing_deadline: NaiveDate,
    pub piece_names: Vec<String>,
}

// ==========================================
// ValidationIssue / ValidationReport - 输入校验报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub level: DqLevel,
    pub code: String,                 // 稳定代码（如 MISSING_COLUMN）
    pub table: String,                // pieces / sequences
    pub field: Option<String>,
    pub row_number: Option<usize>,
    pub detail: String,               // 列名、键值等（非本地化）
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    pub missing_sequence_keys: Vec<(String, String)>, // 构件中存在但序列表缺失的 (CT, SEQUENCIA)
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        !self.issues.iter().any(|i| i.level == DqLevel::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.level == DqLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.level == DqLevel::Warning)
    }
}
