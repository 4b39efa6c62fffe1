// ==========================================
// 预制构件日产组合排产 - 排产输入导入器实现
// ==========================================
// 流程: 解析（阻塞任务）→ 列映射 → 原始记录
// 并发: 构件清单与序列表同时导入
// ==========================================

use crate::domain::piece::RawPieceRecord;
use crate::domain::sequence::RawSequenceRecord;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{ColumnMapping, FieldMapper};
use crate::importer::file_parser::{RawTable, UniversalFileParser};
use crate::importer::planning_importer_trait::{FileParser, PlanningImporter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

// ==========================================
// ImportedTable - 单表导入结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedTable<T> {
    pub source: String, // 源文件路径
    pub records: Vec<T>,
    pub mapping: ColumnMapping,
}

// ==========================================
// PlanningInputs - 一次排产的全部输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningInputs {
    pub batch_id: String,
    pub imported_at: DateTime<Utc>,
    pub pieces: ImportedTable<RawPieceRecord>,
    pub sequences: ImportedTable<RawSequenceRecord>,
}

// ==========================================
// PlanningImporterImpl - 导入器实现
// ==========================================
pub struct PlanningImporterImpl {
    file_parser: Arc<dyn FileParser>,
    field_mapper: FieldMapper,
}

impl Default for PlanningImporterImpl {
    fn default() -> Self {
        Self::new(Arc::new(UniversalFileParser))
    }
}

impl PlanningImporterImpl {
    pub fn new(file_parser: Arc<dyn FileParser>) -> Self {
        Self {
            file_parser,
            field_mapper: FieldMapper::new(),
        }
    }

    /// 在阻塞线程池中解析文件
    async fn parse_blocking(&self, file_path: &Path) -> ImportResult<RawTable> {
        let parser = Arc::clone(&self.file_parser);
        let path: PathBuf = file_path.to_path_buf();
        tokio::task::spawn_blocking(move || parser.parse(&path)).await?
    }
}

#[async_trait]
impl PlanningImporter for PlanningImporterImpl {
    #[instrument(skip(self), fields(path = %file_path.display()))]
    async fn import_pieces(&self, file_path: &Path) -> ImportResult<ImportedTable<RawPieceRecord>> {
        let table = self.parse_blocking(file_path).await?;
        let (records, mapping) = self.field_mapper.map_pieces(&table);
        info!(rows = records.len(), "构件清单导入完成");
        Ok(ImportedTable {
            source: file_path.display().to_string(),
            records,
            mapping,
        })
    }

    #[instrument(skip(self), fields(path = %file_path.display()))]
    async fn import_sequences(
        &self,
        file_path: &Path,
    ) -> ImportResult<ImportedTable<RawSequenceRecord>> {
        let table = self.parse_blocking(file_path).await?;
        let (records, mapping) = self.field_mapper.map_sequences(&table);
        info!(rows = records.len(), "序列表导入完成");
        Ok(ImportedTable {
            source: file_path.display().to_string(),
            records,
            mapping,
        })
    }

    #[instrument(skip(self, pieces_path, sequences_path), fields(batch_id))]
    async fn import_inputs(
        &self,
        pieces_path: &Path,
        sequences_path: &Path,
    ) -> ImportResult<PlanningInputs> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let (pieces, sequences) = futures::try_join!(
            self.import_pieces(pieces_path),
            self.import_sequences(sequences_path)
        )?;

        info!(
            pieces = pieces.records.len(),
            sequences = sequences.records.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "排产输入导入完成"
        );

        Ok(PlanningInputs {
            batch_id,
            imported_at: Utc::now(),
            pieces,
            sequences,
        })
    }
}
