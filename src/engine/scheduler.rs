// ==========================================
// 预制构件日产组合排产 - 排产编排器
// ==========================================
// 职责: 规范化 → 批次构建 → 生产日历 → 逐日分配 → 日产组合聚合
// 红线: 从不报错；不可用数据一律转为待处理项
// ==========================================
// 提前终止（空排产 + 待处理说明），按判定顺序:
// 1) 无任何有效生产窗口 → NO_VALID_WINDOWS
// 2) 构件清单为空       → EMPTY_PIECE_LIST
// 3) 全部构件缺主键     → 仅返回 MISSING_KEY 待处理
// 4) 无正体积批次       → MISSING_KEY + NO_POSITIVE_VOLUME
// 正常结束时待处理顺序: MISSING_KEY → ZERO_VOLUME_LOT → DID_NOT_FIT
// ==========================================

use crate::domain::mix::{MixOutputs, PendingItem};
use crate::domain::piece::{PieceRecord, RawPieceRecord};
use crate::domain::sequence::{RawSequenceRecord, SequenceWindow};
use crate::domain::types::PendingReason;
use crate::engine::aggregation::MixAggregator;
use crate::engine::allocator::{DayAllocator, StreamPlan};
use crate::engine::calendar::ProductionCalendar;
use crate::engine::lot_builder::LotBuilder;
use crate::engine::normalizer::Normalizer;
use tracing::{info, instrument, warn};

// ==========================================
// MixScheduler - 日产组合排产
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct MixScheduler {
    normalizer: Normalizer,
    lot_builder: LotBuilder,
    aggregator: MixAggregator,
}

impl MixScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 原始表输入：先规范化再排产
    pub fn build_mix(
        &self,
        raw_pieces: &[RawPieceRecord],
        raw_windows: &[RawSequenceRecord],
        daily_capacity_m3: f64,
        use_business_days: bool,
    ) -> MixOutputs {
        let pieces = self.normalizer.normalize_pieces(raw_pieces);
        let windows = self.normalizer.normalize_windows(raw_windows);
        self.build_daily_mix(&pieces, &windows, daily_capacity_m3, use_business_days)
    }

    /// 日产组合排产（规范化后的输入）
    ///
    /// 同一输入多次调用结果完全一致
    #[instrument(skip(self, pieces, windows), fields(
        pieces = pieces.len(),
        windows = windows.len()
    ))]
    pub fn build_daily_mix(
        &self,
        pieces: &[PieceRecord],
        windows: &[SequenceWindow],
        daily_capacity_m3: f64,
        use_business_days: bool,
    ) -> MixOutputs {
        // 1) 作业流与窗口
        let plan = StreamPlan::from_windows(windows);
        if plan.is_empty() {
            warn!("没有任何带有效生产日期的序列");
            return MixOutputs::early_exit(vec![PendingItem::reason_only(
                PendingReason::NoValidWindows,
            )]);
        }

        // 2) 构件清单
        if pieces.is_empty() {
            warn!("构件清单为空");
            return MixOutputs::early_exit(vec![PendingItem::reason_only(
                PendingReason::EmptyPieceList,
            )]);
        }

        // 3) 批次
        let built = self.lot_builder.build(pieces);
        if built.grouped_rows == 0 {
            warn!(missing_key = built.missing_key.len(), "全部构件缺少主键");
            return MixOutputs::early_exit(built.missing_key);
        }
        if !built.has_lots() {
            warn!("没有正体积的批次");
            let mut pending = built.missing_key;
            pending.push(PendingItem::reason_only(PendingReason::NoPositiveVolume));
            return MixOutputs::early_exit(pending);
        }

        // 4) 日历（所有窗口的并集范围）
        let calendar = ProductionCalendar::spanning(plan.bounds(), use_business_days)
            .unwrap_or_else(|| ProductionCalendar::empty(use_business_days));

        // 5) 逐日分配
        let allocator = DayAllocator::new(daily_capacity_m3);
        let outcome = allocator.allocate(&built.lots, &built.queues, &plan, &calendar);

        // 6) 聚合
        let daily_mix = self.aggregator.aggregate_daily(&outcome.events);

        let mut pending = built.missing_key;
        pending.extend(built.zero_volume);
        pending.extend(outcome.leftovers);

        let outputs = MixOutputs {
            daily_mix,
            pending,
            allocations: outcome.events,
            lots: built.lots,
        };

        info!(
            mix_rows = outputs.daily_mix.len(),
            pending = outputs.pending.len(),
            scheduled_m3 = outputs.total_scheduled_m3(),
            pending_m3 = outputs.total_pending_m3(),
            "日产组合排产完成"
        );
        outputs
    }
}
