// ==========================================
// 预制构件日产组合排产 - 字段映射器实现
// ==========================================
// 职责: 源表头 → 标准列（同义词匹配）+ 行 → 原始记录
// 匹配口径: 规范化表头后去重音、下划线视同空格，按同义词顺序取第一个命中的源列
// ==========================================

use crate::domain::piece::RawPieceRecord;
use crate::domain::sequence::RawSequenceRecord;
use crate::importer::file_parser::{normalize_header, RawRow, RawTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ==========================================
// 标准列名
// ==========================================
pub mod columns {
    pub const CT: &str = "CT";
    pub const ETAPA: &str = "ETAPA";
    pub const SEQUENCIA: &str = "SEQUENCIA";
    pub const NOME_PECA: &str = "NOME PEÇA";
    pub const TIPOLOGIA: &str = "TIPOLOGIA";
    pub const TIPO_ARMACAO: &str = "TIPO ARMAÇÃO";
    pub const FUNDO_CM: &str = "FUNDO (CM)";
    pub const LATERAL_CM: &str = "LATERAL (CM)";
    pub const QTDE: &str = "QTDE";
    pub const COMPRIMENTO_M: &str = "COMPRIMENTO (M)";
    pub const VOLUME_M3: &str = "VOLUME (M3)";

    pub const VOLUME: &str = "VOLUME";
    pub const DATA_INICIO_PRODUCAO: &str = "DATA_INICIO_PRODUÇÃO";
    pub const DATA_FIM_PRODUCAO: &str = "DATA_FIM_PRODUÇÃO";
    pub const DATA_INICIO_MONTAGEM: &str = "DATA_INICIO_MONTAGEM";
    pub const DATA_FIM_MONTAGEM: &str = "DATA_FIM_MONTAGEM";
}

pub const PIECES_TABLE: &str = "pieces";
pub const SEQUENCES_TABLE: &str = "sequences";

// ==========================================
// ColumnSpec - 标准列定义
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub target: &'static str,
    pub synonyms: &'static [&'static str],
    pub required: bool,
}

const CT_SYNONYMS: &[&str] = &[
    "CT",
    "CONTRATO",
    "NUMERO CONTRATO",
    "Nº CONTRATO",
    "CONTRATO Nº",
    "NR CONTRATO",
];
const ETAPA_SYNONYMS: &[&str] = &["ETAPA", "FASE"];
const SEQUENCIA_SYNONYMS: &[&str] = &[
    "SEQUENCIA",
    "SEQ",
    "SEQ MONTAGEM",
    "SEQUENCIA MONTAGEM",
    "SEQ. MONTAGEM",
];

/// 构件清单
pub const PIECE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { target: columns::CT, synonyms: CT_SYNONYMS, required: true },
    ColumnSpec { target: columns::ETAPA, synonyms: ETAPA_SYNONYMS, required: true },
    ColumnSpec { target: columns::SEQUENCIA, synonyms: SEQUENCIA_SYNONYMS, required: true },
    ColumnSpec {
        target: columns::NOME_PECA,
        synonyms: &["NOME PEÇA", "PEÇA", "DESCRIÇÃO"],
        required: true,
    },
    ColumnSpec {
        target: columns::TIPOLOGIA,
        synonyms: &["TIPOLOGIA", "TIPO", "ELEMENTO", "PRODUTO"],
        required: true,
    },
    ColumnSpec {
        target: columns::TIPO_ARMACAO,
        synonyms: &["TIPO ARMAÇÃO", "ARMAÇÃO", "ARMADURA"],
        required: true,
    },
    ColumnSpec {
        target: columns::FUNDO_CM,
        synonyms: &["FUNDO (CM)", "FUNDO_CM", "FUNDO", "ALTURA", "ALTURA (CM)", "H (CM)"],
        required: true,
    },
    ColumnSpec {
        target: columns::LATERAL_CM,
        synonyms: &["LATERAL (CM)", "LATERAL_CM", "LATERAL", "LARGURA", "LARGURA (CM)", "B (CM)"],
        required: true,
    },
    ColumnSpec {
        target: columns::QTDE,
        synonyms: &["QTDE", "QTD", "QUANTIDADE", "QTY"],
        required: true,
    },
    ColumnSpec {
        target: columns::COMPRIMENTO_M,
        synonyms: &["COMPRIMENTO (M)", "COMPRIMENTO_M", "COMPRIMENTO", "COMP (M)", "L (M)", "LENGTH"],
        required: true,
    },
    ColumnSpec {
        target: columns::VOLUME_M3,
        synonyms: &["VOLUME (M3)", "VOLUME (M³)", "VOLUME_M3", "VOLUME", "VOLUME TOTAL", "M3", "M³"],
        required: true,
    },
];

/// 序列表（生产/安装窗口）
pub const SEQUENCE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { target: columns::CT, synonyms: CT_SYNONYMS, required: true },
    ColumnSpec { target: columns::ETAPA, synonyms: ETAPA_SYNONYMS, required: true },
    ColumnSpec { target: columns::SEQUENCIA, synonyms: SEQUENCIA_SYNONYMS, required: true },
    ColumnSpec {
        target: columns::DATA_INICIO_PRODUCAO,
        synonyms: &["DATA_INICIO_PRODUÇÃO", "INICIO PRODUÇÃO", "DATA INICIO PROD", "INICIO PROD"],
        required: true,
    },
    ColumnSpec {
        target: columns::DATA_FIM_PRODUCAO,
        synonyms: &["DATA_FIM_PRODUÇÃO", "FIM PRODUÇÃO", "DATA FIM PROD", "FIM PROD"],
        required: true,
    },
    ColumnSpec {
        target: columns::DATA_INICIO_MONTAGEM,
        synonyms: &["DATA_INICIO_MONTAGEM", "INICIO MONTAGEM"],
        required: false,
    },
    ColumnSpec {
        target: columns::DATA_FIM_MONTAGEM,
        synonyms: &["DATA_FIM_MONTAGEM", "FIM MONTAGEM"],
        required: false,
    },
    ColumnSpec {
        target: columns::VOLUME,
        synonyms: &["VOLUME", "VOLUME (M3)", "VOLUME (M³)", "VOLUME_M3", "M3"],
        required: false,
    },
];

// ==========================================
// ColumnMapping - 列映射报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedColumn {
    pub target: String,
    pub source: Option<String>, // 命中的源表头（规范化后）
    pub index: Option<usize>,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub table: String,
    pub columns: Vec<MappedColumn>,
}

impl ColumnMapping {
    pub fn index_of(&self, target: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.target == target)
            .and_then(|c| c.index)
    }

    pub fn is_mapped(&self, target: &str) -> bool {
        self.index_of(target).is_some()
    }

    /// 未能映射的必填列
    pub fn missing_required(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.required && c.index.is_none())
            .map(|c| c.target.as_str())
    }
}

/// 去重音（仅用于匹配）
pub fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'á' | 'à' | 'â' | 'ã' | 'ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' | 'é' | 'è' | 'ê' | 'ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' | 'í' | 'ì' | 'î' | 'ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' | 'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' | 'ú' | 'ù' | 'û' | 'ü' => 'U',
            'Ç' | 'ç' => 'C',
            other => other,
        })
        .collect()
}

/// 匹配键：规范化 + 去重音 + 下划线视同空格
fn match_key(header: &str) -> String {
    normalize_header(&fold_accents(header).replace('_', " "))
}

// ==========================================
// FieldMapper - 字段映射器（无状态）
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldMapper;

impl FieldMapper {
    pub fn new() -> Self {
        Self
    }

    /// 猜测列映射
    pub fn guess_mapping(&self, headers: &[String], specs: &[ColumnSpec], table: &str) -> ColumnMapping {
        let keys: Vec<String> = headers.iter().map(|h| match_key(h)).collect();

        let columns = specs
            .iter()
            .map(|spec| {
                let index = spec.synonyms.iter().find_map(|syn| {
                    let wanted = match_key(syn);
                    keys.iter().position(|k| *k == wanted)
                });
                MappedColumn {
                    target: spec.target.to_string(),
                    source: index.map(|i| headers[i].clone()),
                    index,
                    required: spec.required,
                }
            })
            .collect();

        let mapping = ColumnMapping {
            table: table.to_string(),
            columns,
        };
        for missing in mapping.missing_required() {
            warn!(table, column = missing, "必填列未能映射");
        }
        mapping
    }

    /// 构件清单 → 原始构件行
    pub fn map_pieces(&self, table: &RawTable) -> (Vec<RawPieceRecord>, ColumnMapping) {
        let mapping = self.guess_mapping(&table.headers, PIECE_COLUMNS, PIECES_TABLE);
        let cell = |row: &RawRow, target: &str| -> Option<String> {
            mapping
                .index_of(target)
                .and_then(|i| row.get(i))
                .map(str::to_string)
        };

        let records: Vec<RawPieceRecord> = table
            .rows
            .iter()
            .map(|row| RawPieceRecord {
                row_number: row.row_number,
                ct: cell(row, columns::CT),
                etapa: cell(row, columns::ETAPA),
                sequencia: cell(row, columns::SEQUENCIA),
                piece_name: cell(row, columns::NOME_PECA),
                typology: cell(row, columns::TIPOLOGIA),
                reinforcement: cell(row, columns::TIPO_ARMACAO),
                height_cm: cell(row, columns::FUNDO_CM),
                width_cm: cell(row, columns::LATERAL_CM),
                quantity: cell(row, columns::QTDE),
                unit_length_m: cell(row, columns::COMPRIMENTO_M),
                volume_m3: cell(row, columns::VOLUME_M3),
            })
            .collect();

        debug!(rows = records.len(), "构件清单映射完成");
        (records, mapping)
    }

    /// 序列表 → 原始序列行
    pub fn map_sequences(&self, table: &RawTable) -> (Vec<RawSequenceRecord>, ColumnMapping) {
        let mapping = self.guess_mapping(&table.headers, SEQUENCE_COLUMNS, SEQUENCES_TABLE);
        let cell = |row: &RawRow, target: &str| -> Option<String> {
            mapping
                .index_of(target)
                .and_then(|i| row.get(i))
                .map(str::to_string)
        };

        let records: Vec<RawSequenceRecord> = table
            .rows
            .iter()
            .map(|row| RawSequenceRecord {
                row_number: row.row_number,
                ct: cell(row, columns::CT),
                etapa: cell(row, columns::ETAPA),
                sequencia: cell(row, columns::SEQUENCIA),
                production_start: cell(row, columns::DATA_INICIO_PRODUCAO),
                production_end: cell(row, columns::DATA_FIM_PRODUCAO),
                assembly_start: cell(row, columns::DATA_INICIO_MONTAGEM),
                assembly_end: cell(row, columns::DATA_FIM_MONTAGEM),
                volume: cell(row, columns::VOLUME),
            })
            .collect();

        debug!(rows = records.len(), "序列表映射完成");
        (records, mapping)
    }
}
