// ==========================================
// 预制构件日产组合排产 - 逐日分配器
// ==========================================
// 职责: 按日历逐日消耗日产能，严格按序列顺序从批次队列取量
// 红线: 同一作业流内，后序列在前序列排完之前不得开始
// 红线: 序列只能在自身 [开始, 结束] 窗口内生产，窗口外只等待不跳序
// ==========================================
// 输入: 批次 + 序列队列 + 序列窗口 + 日历 + 日产能
// 输出: 分配事件 + 剩余体积待处理项
// ==========================================

use crate::domain::lot::{Lot, LotId};
use crate::domain::mix::{AllocationEvent, PendingItem};
use crate::domain::sequence::{SequenceKey, SequenceWindow, StreamKey};
use crate::domain::types::PendingReason;
use crate::engine::calendar::ProductionCalendar;
use crate::engine::normalizer::sequence_rank;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument, trace};

/// 循环内"已排完"判定容差
pub const DRAIN_EPSILON: f64 = 1e-9;

/// 最终"确有剩余"判定容差（忽略浮点残差）
pub const PENDING_EPSILON: f64 = 1e-6;

// ==========================================
// StreamPlan - 作业流与序列窗口
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StreamPlan {
    /// 序列 → 生产窗口（同键多行时后出现者覆盖）
    windows: HashMap<SequenceKey, (NaiveDate, NaiveDate)>,
    /// 作业流 → 有序序列列表（按前导整数，稳定排序）
    streams: BTreeMap<StreamKey, Vec<SequenceKey>>,
}

impl StreamPlan {
    /// 由可用窗口构建作业流
    pub fn from_windows(windows: &[SequenceWindow]) -> Self {
        let mut plan = StreamPlan::default();

        for window in windows {
            let Some(bounds) = window.bounds() else {
                continue;
            };
            let key = window.key();
            if plan.windows.insert(key.clone(), bounds).is_none() {
                plan.streams.entry(key.stream()).or_default().push(key);
            }
        }

        for sequences in plan.streams.values_mut() {
            sequences.sort_by_key(|key| sequence_rank(&key.sequence));
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn window(&self, key: &SequenceKey) -> Option<(NaiveDate, NaiveDate)> {
        self.windows.get(key).copied()
    }

    pub fn streams(&self) -> &BTreeMap<StreamKey, Vec<SequenceKey>> {
        &self.streams
    }

    /// 全部窗口（用于生成日历范围）
    pub fn bounds(&self) -> impl Iterator<Item = (NaiveDate, NaiveDate)> + '_ {
        self.windows.values().copied()
    }
}

// ==========================================
// AllocationState - 本次运行的批次剩余体积
// ==========================================
#[derive(Debug, Clone)]
pub struct AllocationState {
    remaining: Vec<f64>,
}

impl AllocationState {
    pub fn new(lots: &[Lot]) -> Self {
        Self {
            remaining: lots.iter().map(|lot| lot.total_volume_m3).collect(),
        }
    }

    pub fn remaining(&self, id: LotId) -> f64 {
        self.remaining[id.index()]
    }

    /// 队列剩余体积合计（忽略已排完批次的残量）
    pub fn queue_remaining(&self, queue: &[LotId]) -> f64 {
        queue
            .iter()
            .map(|id| self.remaining(*id))
            .filter(|v| *v > DRAIN_EPSILON)
            .sum()
    }

    fn take(&mut self, id: LotId, amount: f64) {
        self.remaining[id.index()] -= amount;
    }
}

// ==========================================
// AllocationOutcome - 分配结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AllocationOutcome {
    pub events: Vec<AllocationEvent>,
    pub leftovers: Vec<PendingItem>,
}

// ==========================================
// DayAllocator - 逐日分配器
// ==========================================
pub struct DayAllocator {
    daily_capacity_m3: f64,
}

impl DayAllocator {
    /// 非有限或非正的日产能按 0 处理（当日无可分配量）
    pub fn new(daily_capacity_m3: f64) -> Self {
        let capacity = if daily_capacity_m3.is_finite() && daily_capacity_m3 > 0.0 {
            daily_capacity_m3
        } else {
            0.0
        };
        Self {
            daily_capacity_m3: capacity,
        }
    }

    pub fn daily_capacity_m3(&self) -> f64 {
        self.daily_capacity_m3
    }

    /// 逐日分配
    ///
    /// 每日:
    /// 1) 产能重置为日产能
    /// 2) 按 (合同, 阶段) 顺序访问作业流
    /// 3) 作业流内: 游标跳过已排完序列 → 今日不在当前序列窗口则等待 →
    ///    按队列顺序取 min(批次剩余, 产能剩余)，直到产能用尽或作业流排完
    #[instrument(skip_all, fields(
        lots = lots.len(),
        streams = plan.streams().len(),
        days = calendar.len(),
        capacity = self.daily_capacity_m3
    ))]
    pub fn allocate(
        &self,
        lots: &[Lot],
        queues: &BTreeMap<SequenceKey, Vec<LotId>>,
        plan: &StreamPlan,
        calendar: &ProductionCalendar,
    ) -> AllocationOutcome {
        let mut state = AllocationState::new(lots);
        let mut cursors: HashMap<&StreamKey, usize> = HashMap::new();
        let mut events = Vec::new();
        let empty_queue: Vec<LotId> = Vec::new();

        for &day in calendar.days() {
            let mut capacity_left = self.daily_capacity_m3;

            for (stream, sequences) in plan.streams() {
                if capacity_left <= DRAIN_EPSILON {
                    break;
                }

                let cursor = cursors.entry(stream).or_insert(0);

                while capacity_left > DRAIN_EPSILON {
                    // a. 跳过已排完的序列
                    while *cursor < sequences.len() {
                        let queue = queues.get(&sequences[*cursor]).unwrap_or(&empty_queue);
                        if state.queue_remaining(queue) > DRAIN_EPSILON {
                            break;
                        }
                        *cursor += 1;
                    }

                    // b. 作业流已排完
                    if *cursor >= sequences.len() {
                        break;
                    }

                    // c. 不在当前序列窗口内：等待（不跳到后续序列）
                    let sequence = &sequences[*cursor];
                    let in_window = plan
                        .window(sequence)
                        .map(|(start, end)| start <= day && day <= end)
                        .unwrap_or(false);
                    if !in_window {
                        trace!(%day, %sequence, "不在生产窗口内，作业流等待");
                        break;
                    }

                    // d. 按队列顺序消耗
                    let queue = queues.get(sequence).unwrap_or(&empty_queue);
                    for &lot_id in queue {
                        if capacity_left <= DRAIN_EPSILON {
                            break;
                        }
                        let remaining = state.remaining(lot_id);
                        if remaining <= DRAIN_EPSILON {
                            continue;
                        }

                        let take = remaining.min(capacity_left);
                        capacity_left -= take;
                        state.take(lot_id, take);

                        let lot = &lots[lot_id.index()];
                        events.push(AllocationEvent {
                            date: day,
                            lot_id,
                            ct: lot.key.ct.clone(),
                            etapa: lot.key.etapa.clone(),
                            sequence: lot.key.sequence.clone(),
                            typology: lot.typology.clone(),
                            reinforcement: lot.reinforcement.clone(),
                            height_cm: lot.height_cm,
                            width_cm: lot.width_cm,
                            setup: lot.setup.clone(),
                            length_m: lot.proportional_length(take, DRAIN_EPSILON),
                            volume_m3: take,
                            piece_names: lot.piece_names_joined(),
                        });
                    }
                }
            }
        }

        let leftovers = collect_leftovers(queues, &state);

        info!(
            events = events.len(),
            leftovers = leftovers.len(),
            "逐日分配完成"
        );
        AllocationOutcome { events, leftovers }
    }
}

/// 序列级剩余体积 → 待处理项（序列键顺序）
fn collect_leftovers(
    queues: &BTreeMap<SequenceKey, Vec<LotId>>,
    state: &AllocationState,
) -> Vec<PendingItem> {
    let mut leftovers = Vec::new();
    for (key, queue) in queues {
        let remaining = state.queue_remaining(queue);
        if remaining > PENDING_EPSILON {
            debug!(sequence = %key, remaining_m3 = remaining, "序列未能在窗口内排完");
            leftovers.push(PendingItem::for_sequence(
                PendingReason::DidNotFit,
                &key.ct,
                &key.etapa,
                &key.sequence,
                remaining,
            ));
        }
    }
    leftovers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn lot(id: usize, seq: &str, volume: f64) -> Lot {
        Lot {
            id: LotId(id),
            key: SequenceKey::new("C1", "E1", seq),
            typology: "VIGA".to_string(),
            reinforcement: "A".to_string(),
            height_cm: 20.0,
            width_cm: 40.0,
            setup: "20x40".to_string(),
            total_volume_m3: volume,
            total_length_m: volume * 2.0,
            piece_names: vec![format!("P{}", id)],
        }
    }

    fn window(seq: &str, start: NaiveDate, end: NaiveDate) -> SequenceWindow {
        SequenceWindow {
            row_number: 1,
            ct: "C1".to_string(),
            etapa: "E1".to_string(),
            sequence_key: seq.to_string(),
            production_start: Some(start),
            production_end: Some(end),
            assembly_start: None,
            assembly_end: None,
        }
    }

    fn queues(lots: &[Lot]) -> BTreeMap<SequenceKey, Vec<LotId>> {
        let mut q: BTreeMap<SequenceKey, Vec<LotId>> = BTreeMap::new();
        for l in lots {
            q.entry(l.key.clone()).or_default().push(l.id);
        }
        q
    }

    #[test]
    fn test_stream_plan_orders_by_leading_integer() {
        let plan = StreamPlan::from_windows(&[
            window("10", d(1), d(2)),
            window("2", d(1), d(2)),
            window("SETOR", d(1), d(2)),
            window("1", d(1), d(2)),
        ]);
        let stream = StreamKey {
            ct: "C1".to_string(),
            etapa: "E1".to_string(),
        };
        let order: Vec<&str> = plan.streams()[&stream]
            .iter()
            .map(|k| k.sequence.as_str())
            .collect();
        assert_eq!(order, vec!["1", "2", "10", "SETOR"]);
    }

    #[test]
    fn test_duplicate_window_last_row_wins() {
        let plan = StreamPlan::from_windows(&[window("1", d(1), d(2)), window("1", d(3), d(4))]);
        assert_eq!(plan.window(&SequenceKey::new("C1", "E1", "1")), Some((d(3), d(4))));
        assert_eq!(plan.streams().values().next().unwrap().len(), 1);
    }

    #[test]
    fn test_capacity_split_across_days() {
        let lots = vec![lot(0, "1", 50.0)];
        let plan = StreamPlan::from_windows(&[window("1", d(1), d(2))]);
        let calendar = ProductionCalendar::new(d(1), d(2), true);

        let outcome = DayAllocator::new(30.0).allocate(&lots, &queues(&lots), &plan, &calendar);
        assert_eq!(outcome.events.len(), 2);
        assert_eq!(outcome.events[0].volume_m3, 30.0);
        assert_eq!(outcome.events[1].volume_m3, 20.0);
        assert_eq!(outcome.events[0].length_m, 60.0);
        assert!(outcome.leftovers.is_empty());
    }

    #[test]
    fn test_later_sequence_waits_for_earlier() {
        // 序列 1: 窗口 1-3 日，90m³；序列 2: 窗口 1-5 日，20m³；日产能 30
        let lots = vec![lot(0, "1", 90.0), lot(1, "2", 20.0)];
        let plan = StreamPlan::from_windows(&[window("1", d(1), d(3)), window("2", d(1), d(5))]);
        let calendar = ProductionCalendar::new(d(1), d(5), false);

        let outcome = DayAllocator::new(30.0).allocate(&lots, &queues(&lots), &plan, &calendar);
        let seq2_days: Vec<NaiveDate> = outcome
            .events
            .iter()
            .filter(|e| e.sequence == "2")
            .map(|e| e.date)
            .collect();
        assert_eq!(seq2_days, vec![d(4)]);
    }

    #[test]
    fn test_outside_window_does_not_skip_ahead() {
        // 序列 1 窗口在后（3 日），序列 2 窗口在前（1-2 日）：序列 2 不得提前开工
        let lots = vec![lot(0, "1", 10.0), lot(1, "2", 10.0)];
        let plan = StreamPlan::from_windows(&[window("1", d(3), d(3)), window("2", d(1), d(2))]);
        let calendar = ProductionCalendar::new(d(1), d(3), false);

        let outcome = DayAllocator::new(30.0).allocate(&lots, &queues(&lots), &plan, &calendar);
        assert!(outcome.events.iter().all(|e| e.sequence == "1"));
        assert_eq!(outcome.leftovers.len(), 1);
        assert_eq!(outcome.leftovers[0].sequence.as_deref(), Some("2"));
        assert_eq!(outcome.leftovers[0].remaining_volume_m3, Some(10.0));
    }

    #[test]
    fn test_lot_without_window_is_leftover() {
        let lots = vec![lot(0, "1", 10.0), lot(1, "9", 5.0)];
        let plan = StreamPlan::from_windows(&[window("1", d(1), d(1))]);
        let calendar = ProductionCalendar::new(d(1), d(1), false);

        let outcome = DayAllocator::new(30.0).allocate(&lots, &queues(&lots), &plan, &calendar);
        assert_eq!(outcome.leftovers.len(), 1);
        assert_eq!(outcome.leftovers[0].sequence.as_deref(), Some("9"));
    }

    #[test]
    fn test_non_positive_capacity_allocates_nothing() {
        let lots = vec![lot(0, "1", 10.0)];
        let plan = StreamPlan::from_windows(&[window("1", d(1), d(2))]);
        let calendar = ProductionCalendar::new(d(1), d(2), false);

        for capacity in [0.0, -5.0, f64::NAN] {
            let outcome =
                DayAllocator::new(capacity).allocate(&lots, &queues(&lots), &plan, &calendar);
            assert!(outcome.events.is_empty());
            assert_eq!(outcome.leftovers[0].remaining_volume_m3, Some(10.0));
        }
    }
}
