// ==========================================
// 预制构件日产组合排产 - 数据质量校验器实现
// ==========================================
// 职责: 结构校验（列映射）+ 内容校验（整列为空、日期无效、窗口倒置）
//       + 交叉校验（构件的 CT/SEQUENCIA 在序列表中不存在）
// 红线: 只报告不阻断；排产照常进行
// ==========================================

use crate::domain::piece::PieceRecord;
use crate::domain::report::{ValidationIssue, ValidationReport};
use crate::domain::sequence::SequenceWindow;
use crate::domain::types::DqLevel;
use crate::importer::field_mapper::{columns, ColumnMapping, PIECES_TABLE, SEQUENCES_TABLE};
use std::collections::BTreeSet;
use tracing::info;

// 校验代码
pub const MISSING_COLUMN: &str = "MISSING_COLUMN";
pub const EMPTY_KEY_COLUMN: &str = "EMPTY_KEY_COLUMN";
pub const EMPTY_NUMERIC_COLUMN: &str = "EMPTY_NUMERIC_COLUMN";
pub const SEQUENCE_NOT_FOUND: &str = "SEQUENCE_NOT_FOUND";
pub const INVALID_PRODUCTION_DATES: &str = "INVALID_PRODUCTION_DATES";
pub const INVERTED_WINDOW: &str = "INVERTED_WINDOW";

#[derive(Debug, Default, Clone, Copy)]
pub struct DqValidator;

impl DqValidator {
    pub fn new() -> Self {
        Self
    }

    /// 完整校验
    pub fn validate(
        &self,
        piece_mapping: &ColumnMapping,
        sequence_mapping: &ColumnMapping,
        pieces: &[PieceRecord],
        windows: &[SequenceWindow],
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        self.validate_columns(piece_mapping, &mut report);
        self.validate_columns(sequence_mapping, &mut report);
        self.validate_piece_columns(piece_mapping, pieces, &mut report);
        self.validate_windows(windows, &mut report);
        self.cross_check(pieces, windows, &mut report);

        info!(
            errors = report.errors().count(),
            warnings = report.warnings().count(),
            missing_sequences = report.missing_sequence_keys.len(),
            "数据质量校验完成"
        );
        report
    }

    /// 必填列未能映射 → 错误
    pub fn validate_columns(&self, mapping: &ColumnMapping, report: &mut ValidationReport) {
        for column in mapping.missing_required() {
            report.issues.push(ValidationIssue {
                level: DqLevel::Error,
                code: MISSING_COLUMN.to_string(),
                table: mapping.table.clone(),
                field: Some(column.to_string()),
                row_number: None,
                detail: column.to_string(),
            });
        }
    }

    /// 整列为空：关键列 → 错误；数值列 → 警告
    ///
    /// 未映射的列已由结构校验报告，此处跳过
    pub fn validate_piece_columns(
        &self,
        mapping: &ColumnMapping,
        pieces: &[PieceRecord],
        report: &mut ValidationReport,
    ) {
        if pieces.is_empty() {
            return;
        }

        let key_columns: [(&str, fn(&PieceRecord) -> bool); 4] = [
            (columns::CT, |p| !p.ct.is_empty()),
            (columns::SEQUENCIA, |p| !p.sequence_key.is_empty()),
            (columns::NOME_PECA, |p| !p.piece_name.is_empty()),
            (columns::TIPOLOGIA, |p| !p.typology.is_empty()),
        ];
        for (column, has_value) in key_columns {
            if mapping.is_mapped(column) && !pieces.iter().any(has_value) {
                report.issues.push(column_issue(DqLevel::Error, EMPTY_KEY_COLUMN, column));
            }
        }

        let numeric_columns: [(&str, fn(&PieceRecord) -> bool); 5] = [
            (columns::QTDE, |p| p.quantity.is_some()),
            (columns::COMPRIMENTO_M, |p| p.unit_length_m.is_some()),
            (columns::VOLUME_M3, |p| p.volume_m3.is_some()),
            (columns::FUNDO_CM, |p| p.height_cm.is_some()),
            (columns::LATERAL_CM, |p| p.width_cm.is_some()),
        ];
        for (column, has_value) in numeric_columns {
            if mapping.is_mapped(column) && !pieces.iter().any(has_value) {
                report
                    .issues
                    .push(column_issue(DqLevel::Warning, EMPTY_NUMERIC_COLUMN, column));
            }
        }
    }

    /// 序列行：生产日期缺失/无效、起始晚于结束
    pub fn validate_windows(&self, windows: &[SequenceWindow], report: &mut ValidationReport) {
        for window in windows {
            let key = format!("{}/{}/{}", window.ct, window.etapa, window.sequence_key);
            if window.production_start.is_none() || window.production_end.is_none() {
                report.issues.push(ValidationIssue {
                    level: DqLevel::Warning,
                    code: INVALID_PRODUCTION_DATES.to_string(),
                    table: SEQUENCES_TABLE.to_string(),
                    field: None,
                    row_number: Some(window.row_number),
                    detail: key,
                });
            } else if window.is_inverted() {
                report.issues.push(ValidationIssue {
                    level: DqLevel::Warning,
                    code: INVERTED_WINDOW.to_string(),
                    table: SEQUENCES_TABLE.to_string(),
                    field: None,
                    row_number: Some(window.row_number),
                    detail: key,
                });
            }
        }
    }

    /// 构件中出现、序列表中不存在的 (CT, SEQUENCIA)
    ///
    /// 完整列表写入报告；展示截断由调用方负责
    pub fn cross_check(
        &self,
        pieces: &[PieceRecord],
        windows: &[SequenceWindow],
        report: &mut ValidationReport,
    ) {
        let known: BTreeSet<(&str, &str)> = windows
            .iter()
            .map(|w| (w.ct.as_str(), w.sequence_key.as_str()))
            .collect();
        let missing: BTreeSet<(&str, &str)> = pieces
            .iter()
            .filter(|p| !p.ct.is_empty() && !p.sequence_key.is_empty())
            .map(|p| (p.ct.as_str(), p.sequence_key.as_str()))
            .filter(|pair| !known.contains(pair))
            .collect();

        if missing.is_empty() {
            return;
        }

        report.issues.push(ValidationIssue {
            level: DqLevel::Warning,
            code: SEQUENCE_NOT_FOUND.to_string(),
            table: PIECES_TABLE.to_string(),
            field: Some(columns::SEQUENCIA.to_string()),
            row_number: None,
            detail: missing.len().to_string(),
        });
        report.missing_sequence_keys = missing
            .into_iter()
            .map(|(ct, seq)| (ct.to_string(), seq.to_string()))
            .collect();
    }
}

fn column_issue(level: DqLevel, code: &str, column: &str) -> ValidationIssue {
    ValidationIssue {
        level,
        code: code.to_string(),
        table: PIECES_TABLE.to_string(),
        field: Some(column.to_string()),
        row_number: None,
        detail: column.to_string(),
    }
}
