// ==========================================
// 预制构件日产组合排产 - 排产输出领域模型
// ==========================================
// 输出: 日产组合行（MixRow）、原始分配事件、待处理项
// ==========================================

use crate::domain::lot::{Lot, LotId};
use crate::domain::types::PendingReason;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// AllocationEvent - 单次分配事件
// ==========================================
// 分配器每从一个批次取量一次即产生一条；用于审计体积守恒与顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEvent {
    pub date: NaiveDate,
    pub lot_id: LotId,
    pub ct: String,
    pub etapa: String,
    pub sequence: String,
    pub typology: String,
    pub reinforcement: String,
    pub height_cm: f64,
    pub width_cm: f64,
    pub setup: String,
    pub length_m: f64,    // 按体积比例分摊的底模长度
    pub volume_m3: f64,   // 本次取量
    pub piece_names: String,
}

// ==========================================
// MixRow - 日产组合行（聚合后）
// ==========================================
// 聚合键: 日期 / 类型 / 配筋 / 底宽 / 侧高 / 换模签名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixRow {
    pub date: NaiveDate,                // Data
    pub typology: String,               // Tipologia
    pub reinforcement: String,          // Tipo Armação
    pub height_cm: f64,                 // Fundo (cm)
    pub width_cm: f64,                  // Lateral (cm)
    pub setup: String,                  // Setup
    pub total_length_m: f64,            // Comprimento Total de Fundo (m)
    pub volume_m3: f64,                 // Volume
    pub sequences: Vec<String>,         // Seq de Montagem（去重排序）
    pub piece_names: Vec<String>,       // Nome Peças（去重排序）
}

impl MixRow {
    pub fn sequences_joined(&self) -> String {
        self.sequences.join(";")
    }

    pub fn piece_names_joined(&self) -> String {
        self.piece_names.join(";")
    }
}

// ==========================================
// PendingItem - 待处理项
// ==========================================
// 字段按原因不同而部分为空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingItem {
    pub reason: PendingReason,
    pub ct: Option<String>,
    pub etapa: Option<String>,
    pub sequence: Option<String>,
    pub piece_name: Option<String>,
    pub row_number: Option<usize>,
    pub remaining_volume_m3: Option<f64>,
}

impl PendingItem {
    /// 仅含原因的待处理项（提前终止）
    pub fn reason_only(reason: PendingReason) -> Self {
        Self {
            reason,
            ct: None,
            etapa: None,
            sequence: None,
            piece_name: None,
            row_number: None,
            remaining_volume_m3: None,
        }
    }

    /// 序列级待处理项（剩余体积）
    pub fn for_sequence(
        reason: PendingReason,
        ct: &str,
        etapa: &str,
        sequence: &str,
        remaining_volume_m3: f64,
    ) -> Self {
        Self {
            reason,
            ct: Some(ct.to_string()),
            etapa: Some(etapa.to_string()),
            sequence: Some(sequence.to_string()),
            piece_name: None,
            row_number: None,
            remaining_volume_m3: Some(remaining_volume_m3),
        }
    }
}

// ==========================================
// MixOutputs - 一次排产的完整输出
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixOutputs {
    pub daily_mix: Vec<MixRow>,
    pub pending: Vec<PendingItem>,
    pub allocations: Vec<AllocationEvent>,
    pub lots: Vec<Lot>,
}

impl MixOutputs {
    /// 提前终止：空排产 + 待处理说明
    pub fn early_exit(pending: Vec<PendingItem>) -> Self {
        Self {
            pending,
            ..Default::default()
        }
    }

    pub fn total_scheduled_m3(&self) -> f64 {
        self.daily_mix.iter().map(|row| row.volume_m3).sum()
    }

    pub fn total_pending_m3(&self) -> f64 {
        self.pending
            .iter()
            .filter_map(|item| item.remaining_volume_m3)
            .sum()
    }
}
