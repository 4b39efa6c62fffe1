// ==========================================
// 预制构件日产组合排产 - 规范化器
// ==========================================
// 职责: 构件表 / 序列表 去空白、数值与日期强制转换、序列键提取
// 红线: 从不报错；无法解析的值降级为 None，由下游归类为待处理
// ==========================================

use crate::domain::piece::{PieceRecord, RawPieceRecord};
use crate::domain::sequence::{RawSequenceRecord, SequenceWindow};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// 序列在作业流内的排序值
///
/// 数字序列按数值升序（先比位数再比数字串，不受整数宽度限制）；
/// 非数字序列排在所有数字序列之后
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SequenceRank {
    Numeric { digits: usize, value: String },
    NonNumeric,
}

// 日在前的日期格式（先尝试纯日期，再尝试带时间）
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d", "%Y%m%d",
];
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

// ==========================================
// Normalizer - 规范化器（无状态）
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// 规范化构件表
    pub fn normalize_pieces(&self, raw: &[RawPieceRecord]) -> Vec<PieceRecord> {
        let pieces: Vec<PieceRecord> = raw
            .iter()
            .map(|r| PieceRecord {
                row_number: r.row_number,
                ct: clean_text(r.ct.as_deref()),
                etapa: clean_text(r.etapa.as_deref()),
                sequence_key: r
                    .sequencia
                    .as_deref()
                    .map(extract_sequence_key)
                    .unwrap_or_default(),
                piece_name: clean_text(r.piece_name.as_deref()),
                typology: clean_text(r.typology.as_deref()),
                reinforcement: clean_text(r.reinforcement.as_deref()),
                height_cm: parse_number(r.height_cm.as_deref()),
                width_cm: parse_number(r.width_cm.as_deref()),
                quantity: parse_number(r.quantity.as_deref()),
                unit_length_m: parse_number(r.unit_length_m.as_deref()),
                volume_m3: parse_number(r.volume_m3.as_deref()),
            })
            .collect();

        debug!(rows = pieces.len(), "构件表规范化完成");
        pieces
    }

    /// 规范化序列表
    pub fn normalize_windows(&self, raw: &[RawSequenceRecord]) -> Vec<SequenceWindow> {
        let windows: Vec<SequenceWindow> = raw
            .iter()
            .map(|r| SequenceWindow {
                row_number: r.row_number,
                ct: clean_text(r.ct.as_deref()),
                etapa: clean_text(r.etapa.as_deref()),
                sequence_key: r
                    .sequencia
                    .as_deref()
                    .map(extract_sequence_key)
                    .unwrap_or_default(),
                production_start: parse_date_dayfirst(r.production_start.as_deref()),
                production_end: parse_date_dayfirst(r.production_end.as_deref()),
                assembly_start: parse_date_dayfirst(r.assembly_start.as_deref()),
                assembly_end: parse_date_dayfirst(r.assembly_end.as_deref()),
            })
            .collect();

        debug!(
            rows = windows.len(),
            usable = windows.iter().filter(|w| w.is_usable()).count(),
            "序列表规范化完成"
        );
        windows
    }
}

/// 去除首尾空白（None → 空串）
pub fn clean_text(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// 序列键提取：前导整数规则
///
/// 去空白后若以十进制数字开头，取该数字串对应的整数文本（"03" → "3"）；
/// 否则返回去空白后的原文。
///
/// ```
/// use precast_mix::engine::normalizer::extract_sequence_key;
/// assert_eq!(extract_sequence_key("3 - SETOR A2"), "3");
/// assert_eq!(extract_sequence_key("SETOR A"), "SETOR A");
/// ```
pub fn extract_sequence_key(value: &str) -> String {
    let trimmed = value.trim();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return trimmed.to_string();
    }
    match digits.parse::<u64>() {
        Ok(n) => n.to_string(),
        // 超长数字串：保留原数字串
        Err(_) => digits,
    }
}

/// 序列排序值（前导数字串；无数字时排最后）
pub fn sequence_rank(sequence_key: &str) -> SequenceRank {
    let digits: String = sequence_key
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return SequenceRank::NonNumeric;
    }
    let value = match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        significant => significant.to_string(),
    };
    SequenceRank::Numeric {
        digits: value.len(),
        value,
    }
}

/// 宽松数值解析：空白/无法解析/非有限值 → None
///
/// 兼容单个逗号作小数点（"1,5"）
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    let s = value?.trim();
    if s.is_empty() {
        return None;
    }
    let parsed = s.parse::<f64>().ok().or_else(|| {
        if s.matches(',').count() == 1 && !s.contains('.') {
            s.replace(',', ".").parse::<f64>().ok()
        } else {
            None
        }
    });
    parsed.filter(|v| v.is_finite())
}

/// 日期解析（日在前）；带时间的值截断到日期
pub fn parse_date_dayfirst(value: Option<&str>) -> Option<NaiveDate> {
    let s = value?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}
