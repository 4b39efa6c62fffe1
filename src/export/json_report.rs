// ==========================================
// 预制构件日产组合排产 - JSON 报告导出
// ==========================================

use crate::export::error::ExportResult;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// 写出任意可序列化报告（缩进格式）
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> ExportResult<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// 写出到文件
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> ExportResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(&mut writer, value)?;
    writer.flush()?;
    debug!(path = %path.display(), "JSON 报告已写出");
    Ok(())
}
