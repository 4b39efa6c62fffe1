// ==========================================
// 预制构件日产组合排产 - 生产批次领域模型
// ==========================================
// 批次 = 同一 合同/阶段/序列/类型/配筋/截面 的构件集合
// 红线: 批次本身不可变；剩余体积由分配器的 AllocationState 单独持有
// ==========================================

use crate::domain::sequence::SequenceKey;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// LotId - 批次标识（本次运行内的下标）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LotId(pub usize);

impl LotId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LOT-{:04}", self.0)
    }
}

// ==========================================
// Lot - 生产批次
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub key: SequenceKey,           // 所属序列
    pub typology: String,           // 大写
    pub reinforcement: String,      // 大写
    pub height_cm: f64,             // FUNDO（缺失按 0）
    pub width_cm: f64,              // LATERAL（缺失按 0）
    pub setup: String,              // 换模签名 "底宽x侧高"（截断取整）
    pub total_volume_m3: f64,       // 批次体积合计
    pub total_length_m: f64,        // 底模总长度合计
    pub piece_names: Vec<String>,   // 去重排序后的构件名称
}

impl Lot {
    /// 换模签名: floor(height) x floor(width)
    ///
    /// 截断取整（向零取整，-3.7 → -3）；非有限值按 0 处理
    pub fn setup_signature(height_cm: f64, width_cm: f64) -> String {
        format!("{}x{}", truncate_cm(height_cm), truncate_cm(width_cm))
    }

    /// 按体积比例分摊底模长度
    pub fn proportional_length(&self, volume_m3: f64, epsilon: f64) -> f64 {
        if self.total_volume_m3 > epsilon {
            self.total_length_m * (volume_m3 / self.total_volume_m3)
        } else {
            0.0
        }
    }

    pub fn piece_names_joined(&self) -> String {
        self.piece_names.join(";")
    }
}

fn truncate_cm(value: f64) -> i64 {
    if value.is_finite() {
        value.trunc() as i64
    } else {
        0
    }
}
