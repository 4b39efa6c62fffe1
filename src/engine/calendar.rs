// ==========================================
// 预制构件日产组合排产 - 生产日历
// ==========================================
// 工作日模式: 周一至周五；自然日模式: 每一天
// 范围: [最早开始日期, 最晚结束日期]（闭区间）
// ==========================================

use chrono::{Datelike, NaiveDate, Weekday};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionCalendar {
    days: Vec<NaiveDate>,
    business_days_only: bool,
}

impl ProductionCalendar {
    /// 构建日历；start > end 时为空日历
    pub fn new(start: NaiveDate, end: NaiveDate, business_days_only: bool) -> Self {
        let mut days = Vec::new();
        let mut day = start;
        while day <= end {
            if !business_days_only || is_business_day(day) {
                days.push(day);
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        Self {
            days,
            business_days_only,
        }
    }

    pub fn empty(business_days_only: bool) -> Self {
        Self {
            days: Vec::new(),
            business_days_only,
        }
    }

    /// 由多个窗口的并集范围构建
    pub fn spanning<I>(windows: I, business_days_only: bool) -> Option<Self>
    where
        I: IntoIterator<Item = (NaiveDate, NaiveDate)>,
    {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for (start, end) in windows {
            bounds = Some(match bounds {
                None => (start, end),
                Some((lo, hi)) => (lo.min(start), hi.max(end)),
            });
        }
        bounds.map(|(lo, hi)| Self::new(lo, hi, business_days_only))
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn business_days_only(&self) -> bool {
        self.business_days_only
    }
}

/// 周一至周五
pub fn is_business_day(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 向前回推 N 个工作日（day 本身不计）；越过最小日期时返回 None
pub fn sub_business_days(day: NaiveDate, n: u32) -> Option<NaiveDate> {
    let mut current = day;
    let mut remaining = n;
    while remaining > 0 {
        current = current.pred_opt()?;
        if is_business_day(current) {
            remaining -= 1;
        }
    }
    Some(current)
}
