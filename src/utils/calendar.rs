//! 日历视图: 按月汇总优惠起止与订阅扣费

use crate::entities::BillingCycle;
use crate::error::{AppError, AppResult};
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq)]
pub struct OfferSpan {
    pub offer_id: i64,
    pub title: String,
    pub merchant: String,
    pub value_cents: i64,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionSchedule {
    pub subscription_id: i64,
    pub name: String,
    pub amount_cents: i64,
    pub cycle: BillingCycle,
    /// 任意一次已知扣费日期, 向前向后推算
    pub anchor: NaiveDate,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalendarEvent {
    OfferStarts {
        offer_id: i64,
        title: String,
        merchant: String,
        value_cents: i64,
    },
    OfferExpires {
        offer_id: i64,
        title: String,
        merchant: String,
        value_cents: i64,
    },
    SubscriptionCharge {
        subscription_id: i64,
        name: String,
        amount_cents: i64,
    },
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
    /// 与本月有交集的优惠
    pub active_offer_ids: Vec<i64>,
    pub subscription_total_cents: i64,
}

/// 指定月份的首日与末日
pub fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid month: {year}-{month}")))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::ValidationError(format!("Invalid month: {year}-{month}")))?;
    Ok((first, last))
}

/// 闭区间是否相交
pub fn overlaps(a_start: NaiveDate, a_end: NaiveDate, b_start: NaiveDate, b_end: NaiveDate) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// 从 anchor 偏移 k 个周期; 月末日期按目标月份的最后一天截断, 且不会累积漂移
pub fn shift(anchor: NaiveDate, cycle: BillingCycle, k: i64) -> Option<NaiveDate> {
    let add_months = |months: i64| {
        let n = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
        if months >= 0 {
            anchor.checked_add_months(n)
        } else {
            anchor.checked_sub_months(n)
        }
    };
    match cycle {
        BillingCycle::Weekly => anchor.checked_add_signed(Duration::days(k.checked_mul(7)?)),
        BillingCycle::Monthly => add_months(k),
        BillingCycle::Yearly => add_months(k.checked_mul(12)?),
    }
}

/// [from, to] 区间内的全部扣费日期
pub fn occurrences(
    anchor: NaiveDate,
    cycle: BillingCycle,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<NaiveDate> {
    if from > to {
        return Vec::new();
    }

    // 起始估计值保证落在 from 之前
    let mut k = match cycle {
        BillingCycle::Weekly => (from - anchor).num_days().div_euclid(7),
        BillingCycle::Monthly => month_index(from) - month_index(anchor) - 1,
        BillingCycle::Yearly => i64::from(from.year() - anchor.year()) - 1,
    };

    let mut dates = Vec::new();
    while let Some(date) = shift(anchor, cycle, k) {
        if date > to {
            break;
        }
        if date >= from {
            dates.push(date);
        }
        k += 1;
    }
    dates
}

/// anchor 推算出的、落在 today 当天或之后的第一次扣费日
pub fn next_billing_on_or_after(
    anchor: NaiveDate,
    cycle: BillingCycle,
    today: NaiveDate,
) -> Option<NaiveDate> {
    if anchor >= today {
        return Some(anchor);
    }

    // 起始估计值不会越过 today
    let mut k = match cycle {
        BillingCycle::Weekly => (today - anchor).num_days().div_euclid(7),
        BillingCycle::Monthly => month_index(today) - month_index(anchor) - 1,
        BillingCycle::Yearly => i64::from(today.year() - anchor.year()) - 1,
    }
    .max(1);
    while let Some(date) = shift(anchor, cycle, k) {
        if date >= today {
            return Some(date);
        }
        k += 1;
    }
    None
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

pub fn build_month(
    year: i32,
    month: u32,
    offers: &[OfferSpan],
    subscriptions: &[SubscriptionSchedule],
) -> AppResult<MonthView> {
    let (first, last) = month_bounds(year, month)?;
    let in_month = |d: NaiveDate| d >= first && d <= last;

    let mut events: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    let mut active_offer_ids = Vec::new();

    for offer in offers {
        if !overlaps(offer.starts_on, offer.ends_on, first, last) {
            continue;
        }
        active_offer_ids.push(offer.offer_id);
        if in_month(offer.starts_on) {
            events
                .entry(offer.starts_on)
                .or_default()
                .push(CalendarEvent::OfferStarts {
                    offer_id: offer.offer_id,
                    title: offer.title.clone(),
                    merchant: offer.merchant.clone(),
                    value_cents: offer.value_cents,
                });
        }
        if in_month(offer.ends_on) {
            events
                .entry(offer.ends_on)
                .or_default()
                .push(CalendarEvent::OfferExpires {
                    offer_id: offer.offer_id,
                    title: offer.title.clone(),
                    merchant: offer.merchant.clone(),
                    value_cents: offer.value_cents,
                });
        }
    }

    let mut subscription_total_cents = 0i64;
    for sub in subscriptions {
        for date in occurrences(sub.anchor, sub.cycle, first, last) {
            subscription_total_cents += sub.amount_cents;
            events
                .entry(date)
                .or_default()
                .push(CalendarEvent::SubscriptionCharge {
                    subscription_id: sub.subscription_id,
                    name: sub.name.clone(),
                    amount_cents: sub.amount_cents,
                });
        }
    }

    let days = first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| CalendarDay {
            date,
            events: events.remove(&date).unwrap_or_default(),
        })
        .collect();

    Ok(MonthView {
        year,
        month,
        days,
        active_offer_ids,
        subscription_total_cents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2024, 2).unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(month_bounds(2025, 12).unwrap(), (d(2025, 12, 1), d(2025, 12, 31)));
        assert!(month_bounds(2025, 13).is_err());
        assert!(month_bounds(2025, 0).is_err());
    }

    #[test]
    fn test_overlaps_is_inclusive() {
        assert!(overlaps(d(2025, 1, 1), d(2025, 1, 31), d(2025, 1, 31), d(2025, 2, 5)));
        assert!(!overlaps(d(2025, 1, 1), d(2025, 1, 30), d(2025, 1, 31), d(2025, 2, 5)));
    }

    #[test]
    fn test_monthly_occurrences_clamp_without_drift() {
        let anchor = d(2025, 1, 31);
        let dates = occurrences(anchor, BillingCycle::Monthly, d(2025, 2, 1), d(2025, 4, 30));
        assert_eq!(dates, vec![d(2025, 2, 28), d(2025, 3, 31), d(2025, 4, 30)]);
    }

    #[test]
    fn test_occurrences_project_backwards() {
        let anchor = d(2025, 6, 15);
        let dates = occurrences(anchor, BillingCycle::Monthly, d(2025, 3, 1), d(2025, 3, 31));
        assert_eq!(dates, vec![d(2025, 3, 15)]);

        let dates = occurrences(anchor, BillingCycle::Yearly, d(2023, 1, 1), d(2023, 12, 31));
        assert_eq!(dates, vec![d(2023, 6, 15)]);
    }

    #[test]
    fn test_weekly_occurrences() {
        let anchor = d(2025, 3, 3);
        let dates = occurrences(anchor, BillingCycle::Weekly, d(2025, 3, 1), d(2025, 3, 20));
        assert_eq!(dates, vec![d(2025, 3, 3), d(2025, 3, 10), d(2025, 3, 17)]);
        assert!(occurrences(anchor, BillingCycle::Weekly, d(2025, 3, 20), d(2025, 3, 1)).is_empty());
    }

    #[test]
    fn test_next_billing_on_or_after() {
        let anchor = d(2025, 1, 31);
        assert_eq!(
            next_billing_on_or_after(anchor, BillingCycle::Monthly, d(2025, 3, 5)),
            Some(d(2025, 3, 31))
        );
        assert_eq!(
            next_billing_on_or_after(anchor, BillingCycle::Monthly, d(2025, 1, 2)),
            Some(anchor)
        );
    }

    #[test]
    fn test_next_billing_from_anchor_keeps_month_end() {
        let anchor = d(2024, 1, 31);
        let cycle = BillingCycle::Monthly;
        assert_eq!(next_billing_on_or_after(anchor, cycle, d(2024, 2, 15)), Some(d(2024, 2, 29)));
        assert_eq!(next_billing_on_or_after(anchor, cycle, d(2024, 3, 1)), Some(d(2024, 3, 31)));
        assert_eq!(next_billing_on_or_after(anchor, cycle, d(2025, 2, 28)), Some(d(2025, 2, 28)));
        assert_eq!(next_billing_on_or_after(anchor, cycle, d(2025, 3, 1)), Some(d(2025, 3, 31)));

        let leap = d(2024, 2, 29);
        assert_eq!(
            next_billing_on_or_after(leap, BillingCycle::Yearly, d(2026, 6, 1)),
            Some(d(2027, 2, 28))
        );
        assert_eq!(
            next_billing_on_or_after(leap, BillingCycle::Yearly, d(2027, 3, 1)),
            Some(d(2028, 2, 29))
        );

        let weekly = d(2025, 3, 3);
        assert_eq!(
            next_billing_on_or_after(weekly, BillingCycle::Weekly, d(2025, 3, 18)),
            Some(d(2025, 3, 24))
        );
        assert_eq!(
            next_billing_on_or_after(weekly, BillingCycle::Weekly, d(2025, 3, 17)),
            Some(d(2025, 3, 17))
        );
    }

    #[test]
    fn test_build_month() {
        let offers = vec![
            OfferSpan {
                offer_id: 1,
                title: "10% back".into(),
                merchant: "Grocer".into(),
                value_cents: 1_000,
                starts_on: d(2025, 2, 20),
                ends_on: d(2025, 3, 10),
            },
            OfferSpan {
                offer_id: 2,
                title: "old".into(),
                merchant: "Shop".into(),
                value_cents: 500,
                starts_on: d(2025, 1, 1),
                ends_on: d(2025, 1, 31),
            },
        ];
        let subs = vec![SubscriptionSchedule {
            subscription_id: 9,
            name: "Streaming".into(),
            amount_cents: 1_599,
            cycle: BillingCycle::Weekly,
            anchor: d(2025, 3, 7),
        }];

        let view = build_month(2025, 3, &offers, &subs).unwrap();
        assert_eq!(view.days.len(), 31);
        assert_eq!(view.active_offer_ids, vec![1]);
        // 3/7, 3/14, 3/21, 3/28
        assert_eq!(view.subscription_total_cents, 4 * 1_599);

        let tenth = &view.days[9];
        assert_eq!(tenth.date, d(2025, 3, 10));
        assert!(matches!(
            tenth.events.as_slice(),
            [CalendarEvent::OfferExpires { offer_id: 1, .. }]
        ));
        assert!(view.days[0].events.is_empty());
    }
}
