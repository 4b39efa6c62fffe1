// ==========================================
// 预制构件日产组合排产 - 导入层
// ==========================================
// 职责: 外部文件 → 原始记录 + 列映射报告 + 数据质量报告
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod planning_importer;
pub mod planning_importer_trait;

// 重导出核心类型
pub use dq_validator::DqValidator;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{
    columns, ColumnMapping, ColumnSpec, FieldMapper, MappedColumn, PIECE_COLUMNS,
    SEQUENCE_COLUMNS,
};
pub use file_parser::{CsvParser, ExcelParser, RawRow, RawTable, UniversalFileParser};
pub use planning_importer::{ImportedTable, PlanningImporterImpl, PlanningInputs};

// 重导出 Trait 接口
pub use planning_importer_trait::{FileParser, PlanningImporter};
