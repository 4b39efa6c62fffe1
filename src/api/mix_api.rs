// ==========================================
// 预制构件日产组合排产 - 排产 API
// ==========================================
// 职责: 读取配置 → 导入 → 数据质量校验 → 排产 → 报表 → 导出
// 红线: 展示截断只作用于视图，完整结果保留在 outputs 中
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::mix_config_trait::MixConfigReader;
use crate::config::planner_config::PlannerConfig;
use crate::domain::mix::{MixOutputs, PendingItem};
use crate::domain::report::{
    DailyUtilization, DemandPoint, DetailingDeadline, MixTotals, PeriodMixRow, ValidationReport,
};
use crate::domain::types::{PendingReason, ViewMode};
use crate::engine::{
    DetailingPlanner, MixAggregator, MixScheduler, Normalizer, UtilizationAnalyzer,
    DEFAULT_HEAVIEST_DAYS,
};
use crate::export::{write_json_file, MixCsvExporter};
use crate::i18n;
use crate::importer::field_mapper::ColumnMapping;
use crate::importer::planning_importer::PlanningInputs;
use crate::importer::planning_importer_trait::PlanningImporter;
use crate::importer::DqValidator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

// 导出文件名
pub const DAILY_MIX_FILE: &str = "mix_diario.csv";
pub const PENDING_FILE: &str = "pendencias.csv";
pub const UTILIZATION_FILE: &str = "utilizacao.csv";
pub const DETAILING_FILE: &str = "detalhamento.csv";
pub const REPORT_FILE: &str = "report.json";

/// 周期视图文件名（mix_daily.csv / mix_weekly.csv / mix_monthly.csv）
pub fn period_mix_file(mode: ViewMode) -> String {
    format!("mix_{}.csv", mode)
}

// ==========================================
// 视图类型
// ==========================================

/// 待处理项展示行（原因按报告语言渲染）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingView {
    #[serde(flatten)]
    pub item: PendingItem,
    pub reason_code: String,
    pub reason_text: String,
}

/// 运行摘要
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub piece_rows: usize,
    pub sequence_rows: usize,
    pub lots: usize,
    pub mix_rows: usize,
    pub production_days: usize,
    pub scheduled_m3: f64,
    pub pending_items: usize,
    pub pending_m3: f64,
    pub dq_errors: usize,
    pub dq_warnings: usize,
}

/// 一次排产运行的完整报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixReport {
    pub run_id: String,
    pub batch_id: String,
    pub generated_at: DateTime<Utc>,
    pub config: PlannerConfig,
    pub piece_mapping: ColumnMapping,
    pub sequence_mapping: ColumnMapping,
    pub validation: ValidationReport,
    pub outputs: MixOutputs,
    pub period_view: Vec<PeriodMixRow>,
    pub demand: Vec<DemandPoint>,
    pub totals: MixTotals,
    pub utilization: Vec<DailyUtilization>,
    pub heaviest_days: Vec<DailyUtilization>,
    pub detailing: Vec<DetailingDeadline>,
    pub pending_view: Vec<PendingView>,
    pub pending_hidden: usize,                        // 因展示上限隐藏的缺主键项
    pub missing_sequence_view: Vec<(String, String)>, // 截断后的 (CT, SEQUENCIA)
    pub validation_messages: Vec<String>,
    pub summary: RunSummary,
}

// ==========================================
// MixApi - 排产 API
// ==========================================
pub struct MixApi {
    config_reader: Arc<dyn MixConfigReader>,
    importer: Arc<dyn PlanningImporter>,
    normalizer: Normalizer,
    validator: DqValidator,
    scheduler: MixScheduler,
    aggregator: MixAggregator,
    utilization: UtilizationAnalyzer,
}

impl MixApi {
    pub fn new(
        config_reader: Arc<dyn MixConfigReader>,
        importer: Arc<dyn PlanningImporter>,
    ) -> Self {
        Self {
            config_reader,
            importer,
            normalizer: Normalizer::new(),
            validator: DqValidator::new(),
            scheduler: MixScheduler::new(),
            aggregator: MixAggregator::new(),
            utilization: UtilizationAnalyzer::new(),
        }
    }

    /// 当前生效的排产参数
    pub async fn load_config(&self) -> ApiResult<PlannerConfig> {
        Ok(self.config_reader.load_planner_config().await?)
    }

    /// 从文件运行一次完整排产
    #[instrument(skip(self, pieces_path, sequences_path), fields(
        pieces = %pieces_path.display(),
        sequences = %sequences_path.display()
    ))]
    pub async fn run_from_files(
        &self,
        pieces_path: &Path,
        sequences_path: &Path,
    ) -> ApiResult<MixReport> {
        let config = self.load_config().await?;
        let inputs = self
            .importer
            .import_inputs(pieces_path, sequences_path)
            .await?;
        self.run(inputs, &config)
    }

    /// 对已导入的输入运行排产
    pub fn run(&self, inputs: PlanningInputs, config: &PlannerConfig) -> ApiResult<MixReport> {
        config.validate()?;

        let pieces = self.normalizer.normalize_pieces(&inputs.pieces.records);
        let windows = self.normalizer.normalize_windows(&inputs.sequences.records);

        let validation = self.validator.validate(
            &inputs.pieces.mapping,
            &inputs.sequences.mapping,
            &pieces,
            &windows,
        );

        let outputs = self.scheduler.build_daily_mix(
            &pieces,
            &windows,
            config.daily_capacity_m3,
            config.use_business_days,
        );

        let period_view = self
            .aggregator
            .aggregate_period(&outputs.daily_mix, config.view_mode);
        let demand = self.aggregator.demand_series(
            &outputs.daily_mix,
            config.view_mode,
            config.daily_capacity_m3,
        );
        let totals = self.aggregator.totals(&outputs.daily_mix);
        let utilization = self
            .utilization
            .daily(&outputs.daily_mix, config.daily_capacity_m3);
        let heaviest_days = self
            .utilization
            .heaviest_days(&utilization, DEFAULT_HEAVIEST_DAYS);
        let detailing =
            DetailingPlanner::new(config.detailing_lead_business_days).deadlines(&outputs.allocations);

        let (pending_view, pending_hidden) =
            build_pending_view(&outputs.pending, config.pending_display_limit, &config.locale);
        let missing_sequence_view: Vec<(String, String)> = validation
            .missing_sequence_keys
            .iter()
            .take(config.sequence_mismatch_display_limit)
            .cloned()
            .collect();
        let validation_messages = render_validation_messages(&validation, &config.locale);

        let summary = RunSummary {
            piece_rows: pieces.len(),
            sequence_rows: windows.len(),
            lots: outputs.lots.len(),
            mix_rows: outputs.daily_mix.len(),
            production_days: utilization.len(),
            scheduled_m3: totals.volume_m3,
            pending_items: outputs.pending.len(),
            pending_m3: outputs.total_pending_m3(),
            dq_errors: validation.errors().count(),
            dq_warnings: validation.warnings().count(),
        };

        let run_id = Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            batch_id = %inputs.batch_id,
            mix_rows = summary.mix_rows,
            scheduled_m3 = summary.scheduled_m3,
            pending_items = summary.pending_items,
            "排产运行完成"
        );

        Ok(MixReport {
            run_id,
            batch_id: inputs.batch_id,
            generated_at: Utc::now(),
            config: config.clone(),
            piece_mapping: inputs.pieces.mapping,
            sequence_mapping: inputs.sequences.mapping,
            validation,
            outputs,
            period_view,
            demand,
            totals,
            utilization,
            heaviest_days,
            detailing,
            pending_view,
            pending_hidden,
            missing_sequence_view,
            validation_messages,
            summary,
        })
    }

    /// 导出全部结果文件，返回写出的路径
    pub fn export(&self, report: &MixReport, out_dir: &Path) -> ApiResult<Vec<PathBuf>> {
        if out_dir.exists() && !out_dir.is_dir() {
            return Err(ApiError::InvalidInput(format!(
                "输出路径不是目录: {}",
                out_dir.display()
            )));
        }
        std::fs::create_dir_all(out_dir).map_err(crate::export::ExportError::from)?;

        let exporter = MixCsvExporter::new(&report.config.locale);
        let pending: Vec<PendingItem> = report
            .pending_view
            .iter()
            .map(|view| view.item.clone())
            .collect();

        let daily_path = out_dir.join(DAILY_MIX_FILE);
        exporter.write_daily_mix_file(&daily_path, &report.outputs.daily_mix, &report.totals)?;

        let period_path = out_dir.join(period_mix_file(report.config.view_mode));
        exporter.write_period_mix_file(&period_path, &report.period_view)?;

        let pending_path = out_dir.join(PENDING_FILE);
        exporter.write_pending_file(&pending_path, &pending)?;

        let utilization_path = out_dir.join(UTILIZATION_FILE);
        exporter.write_utilization_file(&utilization_path, &report.utilization)?;

        let detailing_path = out_dir.join(DETAILING_FILE);
        exporter.write_detailing_file(&detailing_path, &report.detailing)?;

        let report_path = out_dir.join(REPORT_FILE);
        write_json_file(&report_path, report)?;

        info!(out_dir = %out_dir.display(), "结果文件已导出");
        Ok(vec![
            daily_path,
            period_path,
            pending_path,
            utilization_path,
            detailing_path,
            report_path,
        ])
    }
}

/// 待处理项展示：仅截断缺主键项，其余全部保留；返回（视图, 隐藏数）
pub fn build_pending_view(
    pending: &[PendingItem],
    missing_key_limit: usize,
    locale: &str,
) -> (Vec<PendingView>, usize) {
    let mut shown_missing = 0usize;
    let mut hidden = 0usize;
    let mut views = Vec::with_capacity(pending.len());

    for item in pending {
        if item.reason == PendingReason::MissingKey {
            if shown_missing >= missing_key_limit {
                hidden += 1;
                continue;
            }
            shown_missing += 1;
        }
        views.push(PendingView {
            item: item.clone(),
            reason_code: item.reason.code().to_string(),
            reason_text: i18n::pending_reason_text(item.reason, locale),
        });
    }

    (views, hidden)
}

/// 校验问题本地化文案
pub fn render_validation_messages(report: &ValidationReport, locale: &str) -> Vec<String> {
    report
        .issues
        .iter()
        .map(|issue| {
            let text = i18n::t_in(&format!("validation.{}", issue.code), locale);
            match issue.row_number {
                Some(row) => format!("[{}] {} ({}, #{}): {}", issue.level, text, issue.table, row, issue.detail),
                None => format!("[{}] {} ({}): {}", issue.level, text, issue.table, issue.detail),
            }
        })
        .collect()
}
