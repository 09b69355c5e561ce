use crate::entities::CreditFrequency;
use chrono::{Datelike, Months, NaiveDate};

pub fn periods_per_year(frequency: CreditFrequency) -> i64 {
    match frequency {
        CreditFrequency::Monthly => 12,
        CreditFrequency::Quarterly => 4,
        CreditFrequency::Semiannual => 2,
        CreditFrequency::Annual => 1,
    }
}

fn months_per_period(frequency: CreditFrequency) -> u32 {
    12 / periods_per_year(frequency) as u32
}

/// date 所在周期的起止日期 (含两端), 周期按自然月/季/半年/年对齐
pub fn period_bounds(frequency: CreditFrequency, date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let span = months_per_period(frequency);
    let start_month = (date.month0() / span) * span + 1;

    let bounds = NaiveDate::from_ymd_opt(date.year(), start_month, 1).and_then(|start| {
        start
            .checked_add_months(Months::new(span))
            .and_then(|next| next.pred_opt())
            .map(|end| (start, end))
    });
    bounds.unwrap_or((date, date))
}

/// 存储的周期起点早于 today 所在周期时, 返回新的周期起点
pub fn rollover_start(
    frequency: CreditFrequency,
    period_start: NaiveDate,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let (current_start, _) = period_bounds(frequency, today);
    (period_start < current_start).then_some(current_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_period_bounds() {
        assert_eq!(
            period_bounds(CreditFrequency::Monthly, d(2024, 2, 17)),
            (d(2024, 2, 1), d(2024, 2, 29))
        );
        assert_eq!(
            period_bounds(CreditFrequency::Quarterly, d(2025, 8, 3)),
            (d(2025, 7, 1), d(2025, 9, 30))
        );
        assert_eq!(
            period_bounds(CreditFrequency::Semiannual, d(2025, 6, 30)),
            (d(2025, 1, 1), d(2025, 6, 30))
        );
        assert_eq!(
            period_bounds(CreditFrequency::Annual, d(2025, 12, 31)),
            (d(2025, 1, 1), d(2025, 12, 31))
        );
    }

    #[test]
    fn test_rollover_start() {
        let today = d(2025, 4, 2);
        assert_eq!(
            rollover_start(CreditFrequency::Quarterly, d(2025, 1, 1), today),
            Some(d(2025, 4, 1))
        );
        assert_eq!(
            rollover_start(CreditFrequency::Quarterly, d(2025, 4, 1), today),
            None
        );
        assert_eq!(
            rollover_start(CreditFrequency::Annual, d(2025, 1, 1), today),
            None
        );
    }
}
