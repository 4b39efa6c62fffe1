// ==========================================
// 预制构件日产组合排产 - 深化设计截止日（D-N）
// ==========================================
// 规则: 截止日 = 序列首个排产日 - N 个工作日
// 粒度: (CT, ETAPA, SEQUENCIA)，附该序列已排构件名称
// ==========================================

use crate::domain::mix::AllocationEvent;
use crate::domain::report::DetailingDeadline;
use crate::domain::sequence::SequenceKey;
use crate::engine::calendar::sub_business_days;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy)]
pub struct DetailingPlanner {
    lead_business_days: u32,
}

impl DetailingPlanner {
    pub fn new(lead_business_days: u32) -> Self {
        Self { lead_business_days }
    }

    pub fn lead_business_days(&self) -> u32 {
        self.lead_business_days
    }

    /// 按序列键升序输出截止日
    pub fn deadlines(&self, events: &[AllocationEvent]) -> Vec<DetailingDeadline> {
        let mut first_dates: BTreeMap<SequenceKey, (NaiveDate, BTreeSet<String>)> =
            BTreeMap::new();

        for event in events {
            let key = SequenceKey::new(&event.ct, &event.etapa, &event.sequence);
            let entry = first_dates
                .entry(key)
                .or_insert_with(|| (event.date, BTreeSet::new()));
            entry.0 = entry.0.min(event.date);
            entry.1.extend(
                event
                    .piece_names
                    .split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }

        first_dates
            .into_iter()
            .map(|(key, (first, names))| DetailingDeadline {
                ct: key.ct,
                etapa: key.etapa,
                sequence: key.sequence,
                first_production_date: first,
                detailing_deadline: sub_business_days(first, self.lead_business_days)
                    .unwrap_or(NaiveDate::MIN),
                piece_names: names.into_iter().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lot::LotId;

    fn event(day: u32, seq: &str, names: &str) -> AllocationEvent {
        AllocationEvent {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            lot_id: LotId(0),
            ct: "C1".to_string(),
            etapa: "E1".to_string(),
            sequence: seq.to_string(),
            typology: "VIGA".to_string(),
            reinforcement: "A".to_string(),
            height_cm: 20.0,
            width_cm: 40.0,
            setup: "20x40".to_string(),
            length_m: 1.0,
            volume_m3: 1.0,
            piece_names: names.to_string(),
        }
    }

    #[test]
    fn test_deadline_from_first_production_day() {
        // 2024-01-09 周二 - 5 工作日 = 2024-01-02 周二
        let events = vec![event(10, "1", "V2"), event(9, "1", "V1;V2"), event(12, "2", "P1")];
        let deadlines = DetailingPlanner::new(5).deadlines(&events);

        assert_eq!(deadlines.len(), 2);
        let first = &deadlines[0];
        assert_eq!(first.sequence, "1");
        assert_eq!(first.first_production_date, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert_eq!(first.detailing_deadline, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(first.piece_names, vec!["V1".to_string(), "V2".to_string()]);
    }

    #[test]
    fn test_deadline_saturates_at_min_date() {
        let mut early = event(9, "1", "V1");
        early.date = NaiveDate::MIN + chrono::Duration::days(3);
        let deadlines = DetailingPlanner::new(365).deadlines(&[early]);
        assert_eq!(deadlines[0].detailing_deadline, NaiveDate::MIN);
    }

    #[test]
    fn test_no_events_no_deadlines() {
        assert!(DetailingPlanner::new(5).deadlines(&[]).is_empty());
    }
}
