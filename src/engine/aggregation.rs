// ==========================================
// 预制构件日产组合排产 - 排产结果聚合
// ==========================================
// 职责:
// 1) 分配事件 → 日产组合行（同日同换模合并）
// 2) 日产组合行 → 周期视图（日/周/月）+ 需求产能曲线 + 合计行
// ==========================================

use crate::domain::mix::{AllocationEvent, MixRow};
use crate::domain::report::{DemandPoint, MixTotals, PeriodMixRow};
use crate::domain::types::ViewMode;
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// MixAggregator - 聚合器（无状态）
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct MixAggregator;

impl MixAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 分配事件按 (日期, 类型, 配筋, 底宽, 侧高, 换模签名) 合并
    ///
    /// 体积、长度求和；序列与构件名称去重排序
    pub fn aggregate_daily(&self, events: &[AllocationEvent]) -> Vec<MixRow> {
        let mut sorted: Vec<&AllocationEvent> = events.iter().collect();
        sorted.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| compare_setup_key(
                    (&a.typology, &a.reinforcement, a.height_cm, a.width_cm, &a.setup),
                    (&b.typology, &b.reinforcement, b.height_cm, b.width_cm, &b.setup),
                ))
        });

        let mut rows: Vec<MixRow> = Vec::new();
        let mut sequences: BTreeSet<String> = BTreeSet::new();
        let mut names: BTreeSet<String> = BTreeSet::new();

        for event in sorted {
            let same_group = rows.last().map_or(false, |row| {
                row.date == event.date
                    && compare_setup_key(
                        (&row.typology, &row.reinforcement, row.height_cm, row.width_cm, &row.setup),
                        (&event.typology, &event.reinforcement, event.height_cm, event.width_cm, &event.setup),
                    ) == Ordering::Equal
            });

            if !same_group {
                flush_sets(rows.last_mut(), &mut sequences, &mut names);
                rows.push(MixRow {
                    date: event.date,
                    typology: event.typology.clone(),
                    reinforcement: event.reinforcement.clone(),
                    height_cm: event.height_cm,
                    width_cm: event.width_cm,
                    setup: event.setup.clone(),
                    total_length_m: 0.0,
                    volume_m3: 0.0,
                    sequences: Vec::new(),
                    piece_names: Vec::new(),
                });
            }

            if let Some(row) = rows.last_mut() {
                row.total_length_m += event.length_m;
                row.volume_m3 += event.volume_m3;
            }
            sequences.insert(event.sequence.clone());
            names.extend(split_names(&event.piece_names));
        }
        flush_sets(rows.last_mut(), &mut sequences, &mut names);

        rows
    }

    /// 周期视图
    ///
    /// 分组: (周期, 类型, 配筋, 底宽, 侧高, 换模签名)；
    /// 输出按 (周期, 换模签名, 类型, 配筋) 稳定排序
    pub fn aggregate_period(&self, rows: &[MixRow], mode: ViewMode) -> Vec<PeriodMixRow> {
        let mut grouped: Vec<PeriodMixRow> = Vec::new();
        let mut sorted: Vec<(String, &MixRow)> =
            rows.iter().map(|row| (period_label(row.date, mode), row)).collect();
        sorted.sort_by(|(pa, a), (pb, b)| {
            pa.cmp(pb).then_with(|| {
                compare_setup_key(
                    (&a.typology, &a.reinforcement, a.height_cm, a.width_cm, &a.setup),
                    (&b.typology, &b.reinforcement, b.height_cm, b.width_cm, &b.setup),
                )
            })
        });

        let mut sequences: BTreeSet<String> = BTreeSet::new();
        let mut names: BTreeSet<String> = BTreeSet::new();

        for (period, row) in sorted {
            let same_group = grouped.last().map_or(false, |g| {
                g.period == period
                    && compare_setup_key(
                        (&g.typology, &g.reinforcement, g.height_cm, g.width_cm, &g.setup),
                        (&row.typology, &row.reinforcement, row.height_cm, row.width_cm, &row.setup),
                    ) == Ordering::Equal
            });

            if !same_group {
                if let Some(last) = grouped.last_mut() {
                    last.sequences = std::mem::take(&mut sequences).into_iter().collect();
                    last.piece_names = std::mem::take(&mut names).into_iter().collect();
                }
                grouped.push(PeriodMixRow {
                    period,
                    typology: row.typology.clone(),
                    reinforcement: row.reinforcement.clone(),
                    height_cm: row.height_cm,
                    width_cm: row.width_cm,
                    setup: row.setup.clone(),
                    total_length_m: 0.0,
                    volume_m3: 0.0,
                    sequences: Vec::new(),
                    piece_names: Vec::new(),
                });
            }

            if let Some(last) = grouped.last_mut() {
                last.total_length_m += row.total_length_m;
                last.volume_m3 += row.volume_m3;
            }
            sequences.extend(row.sequences.iter().cloned());
            names.extend(row.piece_names.iter().cloned());
        }
        if let Some(last) = grouped.last_mut() {
            last.sequences = sequences.into_iter().collect();
            last.piece_names = names.into_iter().collect();
        }

        // 展示排序（稳定）
        grouped.sort_by(|a, b| {
            a.period
                .cmp(&b.period)
                .then_with(|| a.setup.cmp(&b.setup))
                .then_with(|| a.typology.cmp(&b.typology))
                .then_with(|| a.reinforcement.cmp(&b.reinforcement))
        });
        grouped
    }

    /// 需求 x 产能：产能 = 周期内有排产的天数 × 日产能
    pub fn demand_series(
        &self,
        rows: &[MixRow],
        mode: ViewMode,
        daily_capacity_m3: f64,
    ) -> Vec<DemandPoint> {
        let mut per_period: BTreeMap<String, (f64, BTreeSet<NaiveDate>)> = BTreeMap::new();
        for row in rows {
            let entry = per_period
                .entry(period_label(row.date, mode))
                .or_insert_with(|| (0.0, BTreeSet::new()));
            entry.0 += row.volume_m3;
            entry.1.insert(row.date);
        }

        per_period
            .into_iter()
            .map(|(period, (demand_m3, days))| DemandPoint {
                period,
                demand_m3,
                production_days: days.len(),
                capacity_m3: days.len() as f64 * daily_capacity_m3,
            })
            .collect()
    }

    /// 合计行
    pub fn totals(&self, rows: &[MixRow]) -> MixTotals {
        rows.iter().fold(MixTotals::default(), |acc, row| MixTotals {
            total_length_m: acc.total_length_m + row.total_length_m,
            volume_m3: acc.volume_m3 + row.volume_m3,
        })
    }
}

/// 周期标签：日 YYYY-MM-DD / 周 ISO YYYY-Www / 月 YYYY-MM
pub fn period_label(date: NaiveDate, mode: ViewMode) -> String {
    match mode {
        ViewMode::Daily => date.format("%Y-%m-%d").to_string(),
        ViewMode::Weekly => {
            let week = date.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        ViewMode::Monthly => date.format("%Y-%m").to_string(),
    }
}

/// "A;B" → ["A", "B"]（去空白，丢弃空项）
fn split_names(joined: &str) -> impl Iterator<Item = String> + '_ {
    joined
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn flush_sets(
    row: Option<&mut MixRow>,
    sequences: &mut BTreeSet<String>,
    names: &mut BTreeSet<String>,
) {
    if let Some(row) = row {
        row.sequences = std::mem::take(sequences).into_iter().collect();
        row.piece_names = std::mem::take(names).into_iter().collect();
    }
}

fn compare_setup_key(
    a: (&String, &String, f64, f64, &String),
    b: (&String, &String, f64, f64, &String),
) -> Ordering {
    a.0.cmp(b.0)
        .then_with(|| a.1.cmp(b.1))
        .then_with(|| a.2.total_cmp(&b.2))
        .then_with(|| a.3.total_cmp(&b.3))
        .then_with(|| a.4.cmp(b.4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lot::LotId;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn event(date: NaiveDate, seq: &str, typ: &str, volume: f64, names: &str) -> AllocationEvent {
        AllocationEvent {
            date,
            lot_id: LotId(0),
            ct: "C1".to_string(),
            etapa: "E1".to_string(),
            sequence: seq.to_string(),
            typology: typ.to_string(),
            reinforcement: "A".to_string(),
            height_cm: 20.0,
            width_cm: 40.0,
            setup: "20x40".to_string(),
            length_m: volume * 2.0,
            volume_m3: volume,
            piece_names: names.to_string(),
        }
    }

    #[test]
    fn test_same_day_same_setup_merges() {
        let events = vec![
            event(d(1, 2), "2", "VIGA", 10.0, "V3"),
            event(d(1, 2), "1", "VIGA", 5.0, "V1;V2"),
            event(d(1, 2), "1", "PILAR", 4.0, "P1"),
            event(d(1, 3), "2", "VIGA", 1.0, "V3"),
        ];

        let rows = MixAggregator::new().aggregate_daily(&events);
        assert_eq!(rows.len(), 3);

        // 分组键排序: 日期 → 类型
        assert_eq!(rows[0].typology, "PILAR");
        let viga = &rows[1];
        assert_eq!(viga.volume_m3, 15.0);
        assert_eq!(viga.total_length_m, 30.0);
        assert_eq!(viga.sequences_joined(), "1;2");
        assert_eq!(viga.piece_names_joined(), "V1;V2;V3");
        assert_eq!(rows[2].date, d(1, 3));
        assert_eq!(rows[2].piece_names, vec!["V3".to_string()]);
    }

    #[test]
    fn test_period_labels() {
        assert_eq!(period_label(d(1, 2), ViewMode::Daily), "2024-01-02");
        assert_eq!(period_label(d(1, 2), ViewMode::Weekly), "2024-W01");
        assert_eq!(period_label(d(1, 2), ViewMode::Monthly), "2024-01");
        // 2024-12-30 属于 2025 年第 1 周
        assert_eq!(period_label(d(12, 30), ViewMode::Weekly), "2025-W01");
    }

    #[test]
    fn test_weekly_view_and_demand() {
        let events = vec![
            event(d(1, 1), "1", "VIGA", 30.0, "V1"),
            event(d(1, 2), "1", "VIGA", 20.0, "V1"),
            event(d(1, 8), "2", "VIGA", 10.0, "V2"),
        ];
        let agg = MixAggregator::new();
        let daily = agg.aggregate_daily(&events);

        let weekly = agg.aggregate_period(&daily, ViewMode::Weekly);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].period, "2024-W01");
        assert_eq!(weekly[0].volume_m3, 50.0);
        assert_eq!(weekly[1].sequences, vec!["2".to_string()]);

        let demand = agg.demand_series(&daily, ViewMode::Weekly, 30.0);
        assert_eq!(demand[0].production_days, 2);
        assert_eq!(demand[0].capacity_m3, 60.0);
        assert_eq!(demand[1].demand_m3, 10.0);

        let totals = agg.totals(&daily);
        assert_eq!(totals.volume_m3, 60.0);
        assert_eq!(totals.total_length_m, 120.0);
    }

    #[test]
    fn test_period_view_sorted_by_setup() {
        let mut a = event(d(1, 1), "1", "AAA", 1.0, "X");
        a.setup = "30x30".to_string();
        a.height_cm = 30.0;
        a.width_cm = 30.0;
        let b = event(d(1, 1), "1", "ZZZ", 1.0, "Y");

        let agg = MixAggregator::new();
        let daily = agg.aggregate_daily(&[a, b]);
        let view = agg.aggregate_period(&daily, ViewMode::Daily);
        let setups: Vec<&str> = view.iter().map(|r| r.setup.as_str()).collect();
        assert_eq!(setups, vec!["20x40", "30x30"]);
    }
}
