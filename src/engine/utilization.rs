// ==========================================
// 预制构件日产组合排产 - 产能利用率
// ==========================================
// 职责: 按日统计已排体积、换模数与利用率；挑出负荷最重的日期
// ==========================================

use crate::domain::mix::MixRow;
use crate::domain::report::DailyUtilization;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// 负荷最重日期的默认展示条数
pub const DEFAULT_HEAVIEST_DAYS: usize = 20;

#[derive(Debug, Default, Clone, Copy)]
pub struct UtilizationAnalyzer;

impl UtilizationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// 每个有排产的日期一行（日期升序）
    pub fn daily(&self, rows: &[MixRow], daily_capacity_m3: f64) -> Vec<DailyUtilization> {
        let mut per_day: BTreeMap<NaiveDate, (f64, BTreeSet<&str>)> = BTreeMap::new();
        for row in rows {
            let entry = per_day
                .entry(row.date)
                .or_insert_with(|| (0.0, BTreeSet::new()));
            entry.0 += row.volume_m3;
            entry.1.insert(row.setup.as_str());
        }

        per_day
            .into_iter()
            .map(|(date, (volume_m3, setups))| DailyUtilization {
                date,
                volume_m3,
                setups: setups.len(),
                capacity_m3: daily_capacity_m3,
                utilization: if daily_capacity_m3 > 0.0 {
                    volume_m3 / daily_capacity_m3
                } else {
                    0.0
                },
            })
            .collect()
    }

    /// 利用率降序、日期升序，取前 n 条
    pub fn heaviest_days(&self, daily: &[DailyUtilization], n: usize) -> Vec<DailyUtilization> {
        let mut sorted = daily.to_vec();
        sorted.sort_by(|a, b| {
            b.utilization
                .total_cmp(&a.utilization)
                .then_with(|| a.date.cmp(&b.date))
        });
        sorted.truncate(n);
        sorted
    }
}
