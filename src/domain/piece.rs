// ==========================================
// 预制构件日产组合排产 - 构件领域模型
// ==========================================
// 构件清单列: CT / ETAPA / SEQUENCIA / NOME PEÇA / TIPOLOGIA / TIPO ARMAÇÃO /
//             FUNDO (CM) / LATERAL (CM) / QTDE / COMPRIMENTO (M) / VOLUME (M3)
// 口径: VOLUME 为整行合计；COMPRIMENTO 为单件长度（需乘以 QTDE）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// RawPieceRecord - 构件原始行（导入层输出）
// ==========================================
// 所有字段保持文本形态，由 Normalizer 统一转换
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPieceRecord {
    pub row_number: usize,               // 源文件行号（从 1 开始，不含表头）
    pub ct: Option<String>,              // 合同号
    pub etapa: Option<String>,           // 阶段
    pub sequencia: Option<String>,       // 安装序列（自由文本，如 "3 - SETOR A2"）
    pub piece_name: Option<String>,      // 构件名称
    pub typology: Option<String>,        // 构件类型
    pub reinforcement: Option<String>,   // 配筋类型
    pub height_cm: Option<String>,       // 截面底宽 FUNDO（cm）
    pub width_cm: Option<String>,        // 截面侧高 LATERAL（cm）
    pub quantity: Option<String>,        // 数量
    pub unit_length_m: Option<String>,   // 单件长度（m）
    pub volume_m3: Option<String>,       // 整行体积（m³）
}

impl RawPieceRecord {
    /// 以主键字段构造原始行（其余字段为空）
    pub fn new(ct: &str, etapa: &str, sequencia: &str) -> Self {
        Self {
            ct: Some(ct.to_string()),
            etapa: Some(etapa.to_string()),
            sequencia: Some(sequencia.to_string()),
            ..Default::default()
        }
    }
}

// ==========================================
// PieceRecord - 规范化后的构件行
// ==========================================
// 数值字段解析失败时为 None（汇总时按 0 处理）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceRecord {
    pub row_number: usize,
    pub ct: String,                  // 去空白
    pub etapa: String,               // 去空白
    pub sequence_key: String,        // 序列键（前导整数规则）
    pub piece_name: String,          // 去空白
    pub typology: String,            // 去空白（批次构建时转大写）
    pub reinforcement: String,       // 去空白（批次构建时转大写）
    pub height_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub quantity: Option<f64>,
    pub unit_length_m: Option<f64>,
    pub volume_m3: Option<f64>,
}

impl PieceRecord {
    /// 主键是否完整（CT / ETAPA / SEQUENCIA 均非空）
    pub fn has_key(&self) -> bool {
        !self.ct.is_empty() && !self.etapa.is_empty() && !self.sequence_key.is_empty()
    }

    /// 整行底模总长度 = QTDE × COMPRIMENTO（缺失按 0）
    pub fn total_length_m(&self) -> f64 {
        self.quantity.unwrap_or(0.0) * self.unit_length_m.unwrap_or(0.0)
    }

    /// 整行体积（缺失按 0）
    pub fn total_volume_m3(&self) -> f64 {
        self.volume_m3.unwrap_or(0.0)
    }
}
