// ==========================================
// 预制构件日产组合排产 - CSV 导出
// ==========================================
// 职责: 日产组合、周期视图、待处理项、利用率、深化设计截止日 → CSV
// 红线: 表头与原因文案按导出语言渲染；数值不做业务取整
// ==========================================

use crate::domain::mix::{MixRow, PendingItem};
use crate::domain::report::{DailyUtilization, DetailingDeadline, MixTotals, PeriodMixRow};
use crate::export::error::ExportResult;
use crate::i18n;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

// 多值单元格分隔符
const LIST_SEPARATOR: &str = "; ";

#[derive(Debug, Clone)]
pub struct MixCsvExporter {
    locale: String,
}

impl Default for MixCsvExporter {
    fn default() -> Self {
        Self::new(i18n::DEFAULT_LOCALE)
    }
}

impl MixCsvExporter {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    fn header(&self, keys: &[&str]) -> Vec<String> {
        keys.iter().map(|key| i18n::t_in(key, &self.locale)).collect()
    }

    // ==========================================
    // 日产组合（末行为合计）
    // ==========================================

    pub fn write_daily_mix<W: Write>(
        &self,
        writer: W,
        rows: &[MixRow],
        totals: &MixTotals,
    ) -> ExportResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.header(&[
            "export.mix.date",
            "export.mix.typology",
            "export.mix.reinforcement",
            "export.mix.height",
            "export.mix.width",
            "export.mix.setup",
            "export.mix.total_length",
            "export.mix.volume",
            "export.mix.sequences",
            "export.mix.piece_names",
        ]))?;

        for row in rows {
            csv.write_record([
                row.date.format(DATE_FORMAT).to_string(),
                row.typology.clone(),
                row.reinforcement.clone(),
                format_number(row.height_cm),
                format_number(row.width_cm),
                row.setup.clone(),
                format_length(row.total_length_m),
                format_volume(row.volume_m3),
                row.sequences.join(LIST_SEPARATOR),
                row.piece_names.join(LIST_SEPARATOR),
            ])?;
        }

        if !rows.is_empty() {
            let mut total_row = vec![String::new(); 10];
            total_row[0] = i18n::t_in("export.mix.total", &self.locale);
            total_row[6] = format_length(totals.total_length_m);
            total_row[7] = format_volume(totals.volume_m3);
            csv.write_record(&total_row)?;
        }

        csv.flush()?;
        Ok(())
    }

    pub fn write_daily_mix_file(
        &self,
        path: &Path,
        rows: &[MixRow],
        totals: &MixTotals,
    ) -> ExportResult<()> {
        self.write_daily_mix(File::create(path)?, rows, totals)?;
        debug!(path = %path.display(), rows = rows.len(), "日产组合已导出");
        Ok(())
    }

    // ==========================================
    // 周期视图
    // ==========================================

    pub fn write_period_mix<W: Write>(&self, writer: W, rows: &[PeriodMixRow]) -> ExportResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.header(&[
            "export.mix.period",
            "export.mix.typology",
            "export.mix.reinforcement",
            "export.mix.height",
            "export.mix.width",
            "export.mix.setup",
            "export.mix.total_length",
            "export.mix.volume",
            "export.mix.sequences",
            "export.mix.piece_names",
        ]))?;

        for row in rows {
            csv.write_record([
                row.period.clone(),
                row.typology.clone(),
                row.reinforcement.clone(),
                format_number(row.height_cm),
                format_number(row.width_cm),
                row.setup.clone(),
                format_length(row.total_length_m),
                format_volume(row.volume_m3),
                row.sequences.join(LIST_SEPARATOR),
                row.piece_names.join(LIST_SEPARATOR),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }

    pub fn write_period_mix_file(&self, path: &Path, rows: &[PeriodMixRow]) -> ExportResult<()> {
        self.write_period_mix(File::create(path)?, rows)?;
        debug!(path = %path.display(), rows = rows.len(), "周期视图已导出");
        Ok(())
    }

    // ==========================================
    // 待处理项（原因按导出语言渲染）
    // ==========================================

    pub fn write_pending<W: Write>(&self, writer: W, items: &[PendingItem]) -> ExportResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.header(&[
            "export.pending.reason_code",
            "export.pending.reason",
            "export.pending.ct",
            "export.pending.etapa",
            "export.pending.sequence",
            "export.pending.piece_name",
            "export.pending.row",
            "export.pending.remaining_volume",
        ]))?;

        for item in items {
            csv.write_record([
                item.reason.code().to_string(),
                i18n::pending_reason_text(item.reason, &self.locale),
                item.ct.clone().unwrap_or_default(),
                item.etapa.clone().unwrap_or_default(),
                item.sequence.clone().unwrap_or_default(),
                item.piece_name.clone().unwrap_or_default(),
                item.row_number.map(|n| n.to_string()).unwrap_or_default(),
                item.remaining_volume_m3.map(format_volume).unwrap_or_default(),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }

    pub fn write_pending_file(&self, path: &Path, items: &[PendingItem]) -> ExportResult<()> {
        self.write_pending(File::create(path)?, items)?;
        debug!(path = %path.display(), rows = items.len(), "待处理项已导出");
        Ok(())
    }

    // ==========================================
    // 日利用率
    // ==========================================

    pub fn write_utilization<W: Write>(
        &self,
        writer: W,
        days: &[DailyUtilization],
    ) -> ExportResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.header(&[
            "export.utilization.date",
            "export.utilization.volume",
            "export.mix.setup",
            "export.utilization.capacity",
            "export.utilization.utilization",
        ]))?;

        for day in days {
            csv.write_record([
                day.date.format(DATE_FORMAT).to_string(),
                format_volume(day.volume_m3),
                day.setups.to_string(),
                format_volume(day.capacity_m3),
                format!("{:.4}", day.utilization),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }

    pub fn write_utilization_file(&self, path: &Path, days: &[DailyUtilization]) -> ExportResult<()> {
        self.write_utilization(File::create(path)?, days)?;
        debug!(path = %path.display(), rows = days.len(), "日利用率已导出");
        Ok(())
    }

    // ==========================================
    // 深化设计截止日（D-N）
    // ==========================================

    pub fn write_detailing<W: Write>(
        &self,
        writer: W,
        deadlines: &[DetailingDeadline],
    ) -> ExportResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.header(&[
            "export.detailing.ct",
            "export.detailing.etapa",
            "export.detailing.sequence",
            "export.detailing.first_production",
            "export.detailing.deadline",
            "export.mix.piece_names",
        ]))?;

        for deadline in deadlines {
            csv.write_record([
                deadline.ct.clone(),
                deadline.etapa.clone(),
                deadline.sequence.clone(),
                deadline.first_production_date.format(DATE_FORMAT).to_string(),
                deadline.detailing_deadline.format(DATE_FORMAT).to_string(),
                deadline.piece_names.join(LIST_SEPARATOR),
            ])?;
        }

        csv.flush()?;
        Ok(())
    }

    pub fn write_detailing_file(
        &self,
        path: &Path,
        deadlines: &[DetailingDeadline],
    ) -> ExportResult<()> {
        self.write_detailing(File::create(path)?, deadlines)?;
        debug!(path = %path.display(), rows = deadlines.len(), "深化设计截止日已导出");
        Ok(())
    }
}

/// 尺寸：整数不带小数
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn format_length(value: f64) -> String {
    format!("{:.2}", value)
}

fn format_volume(value: f64) -> String {
    format!("{:.3}", value)
}
