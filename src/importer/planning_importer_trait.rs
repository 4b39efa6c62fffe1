// ==========================================
// 预制构件日产组合排产 - 导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::piece::RawPieceRecord;
use crate::domain::sequence::RawSequenceRecord;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawTable;
use crate::importer::planning_importer::{ImportedTable, PlanningInputs};
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// PlanningImporter Trait
// ==========================================
// 用途: 排产输入导入主接口
// 实现者: PlanningImporterImpl
#[async_trait]
pub trait PlanningImporter: Send + Sync {
    /// 导入构件清单（解析 + 列映射）
    async fn import_pieces(&self, file_path: &Path) -> ImportResult<ImportedTable<RawPieceRecord>>;

    /// 导入序列表（解析 + 列映射）
    async fn import_sequences(
        &self,
        file_path: &Path,
    ) -> ImportResult<ImportedTable<RawSequenceRecord>>;

    /// 并发导入两张输入表
    ///
    /// 任一文件失败即整体失败
    async fn import_inputs(
        &self,
        pieces_path: &Path,
        sequences_path: &Path,
    ) -> ImportResult<PlanningInputs>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表（表头已规范化）
    fn parse(&self, file_path: &Path) -> ImportResult<RawTable>;
}
