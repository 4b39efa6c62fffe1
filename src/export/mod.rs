// ==========================================
// 预制构件日产组合排产 - 导出层
// ==========================================
// 职责: 排产结果写出为 CSV / JSON
// ==========================================

pub mod csv_writer;
pub mod error;
pub mod json_report;

pub use csv_writer::MixCsvExporter;
pub use error::{ExportError, ExportResult};
pub use json_report::{write_json, write_json_file};
