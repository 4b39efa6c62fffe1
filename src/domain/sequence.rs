// ==========================================
// 预制构件日产组合排产 - 安装序列领域模型
// ==========================================
// 序列表列: CT / ETAPA / SEQUENCIA / DATA_INICIO_PRODUÇÃO / DATA_FIM_PRODUÇÃO
// 安装日期列仅做透传，排产不使用
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// SequenceKey - 合同/阶段/序列 三元键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceKey {
    pub ct: String,
    pub etapa: String,
    pub sequence: String,
}

impl SequenceKey {
    pub fn new(ct: &str, etapa: &str, sequence: &str) -> Self {
        Self {
            ct: ct.to_string(),
            etapa: etapa.to_string(),
            sequence: sequence.to_string(),
        }
    }

    /// 所属作业流（合同 + 阶段）
    pub fn stream(&self) -> StreamKey {
        StreamKey {
            ct: self.ct.clone(),
            etapa: self.etapa.clone(),
        }
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.ct, self.etapa, self.sequence)
    }
}

// ==========================================
// StreamKey - 作业流键（合同 + 阶段）
// ==========================================
// 排序: 先合同后阶段（分配器按此顺序访问作业流）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamKey {
    pub ct: String,
    pub etapa: String,
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ct, self.etapa)
    }
}

// ==========================================
// RawSequenceRecord - 序列原始行
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSequenceRecord {
    pub row_number: usize,
    pub ct: Option<String>,
    pub etapa: Option<String>,
    pub sequencia: Option<String>,
    pub production_start: Option<String>,  // DATA_INICIO_PRODUÇÃO（日在前）
    pub production_end: Option<String>,    // DATA_FIM_PRODUÇÃO（日在前）
    pub assembly_start: Option<String>,    // DATA_INICIO_MONTAGEM（透传）
    pub assembly_end: Option<String>,      // DATA_FIM_MONTAGEM（透传）
    pub volume: Option<String>,            // VOLUME（透传）
}

impl RawSequenceRecord {
    /// 以主键与生产日期构造原始行
    pub fn new(ct: &str, etapa: &str, sequencia: &str, start: &str, end: &str) -> Self {
        Self {
            ct: Some(ct.to_string()),
            etapa: Some(etapa.to_string()),
            sequencia: Some(sequencia.to_string()),
            production_start: Some(start.to_string()),
            production_end: Some(end.to_string()),
            ..Default::default()
        }
    }
}

// ==========================================
// SequenceWindow - 规范化后的序列生产窗口
// ==========================================
// 红线: 仅当起止日期均有效时窗口可用；不校验 start <= end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceWindow {
    pub row_number: usize,
    pub ct: String,
    pub etapa: String,
    pub sequence_key: String,
    pub production_start: Option<NaiveDate>,
    pub production_end: Option<NaiveDate>,
    pub assembly_start: Option<NaiveDate>,
    pub assembly_end: Option<NaiveDate>,
}

impl SequenceWindow {
    /// 主键与生产日期齐全
    pub fn is_usable(&self) -> bool {
        !self.ct.is_empty()
            && !self.etapa.is_empty()
            && !self.sequence_key.is_empty()
            && self.production_start.is_some()
            && self.production_end.is_some()
    }

    /// 起始日期晚于结束日期（不修正，仅供校验报告提示）
    pub fn is_inverted(&self) -> bool {
        matches!(
            (self.production_start, self.production_end),
            (Some(start), Some(end)) if start > end
        )
    }

    pub fn key(&self) -> SequenceKey {
        SequenceKey::new(&self.ct, &self.etapa, &self.sequence_key)
    }

    /// 生产区间（仅可用窗口）
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.production_start, self.production_end) {
            (Some(start), Some(end)) if self.is_usable() => Some((start, end)),
            _ => None,
        }
    }
}
