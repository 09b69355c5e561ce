//! Background scheduled tasks for the application.
//!
//! Recurring jobs: rolling card credits into their current period and
//! advancing past-due subscription billing dates.
//! Call `spawn_all` once during startup to launch them.

use crate::config::PlannerConfig;
use crate::services::{CalendarService, CreditCardService};
use chrono::Utc;

/// Spawn all background tasks.
///
/// Notes
/// - Each task is idempotent as implemented in its service and runs on its own schedule.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(
    planner: &PlannerConfig,
    credit_card_service: CreditCardService,
    calendar_service: CalendarService,
) {
    // 报销额度周期滚动 (默认每小时)
    {
        let svc = credit_card_service.clone();
        let interval = std::time::Duration::from_secs(planner.credit_rollover_secs.max(1));
        tokio::spawn(async move {
            loop {
                let today = Utc::now().date_naive();
                match svc.roll_over_credits(today).await {
                    Ok(n) if n > 0 => log::info!("Card credits rolled over: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to roll over card credits: {e:?}"),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }

    // 订阅扣费日推进 (默认每 6 小时)
    {
        let svc = calendar_service.clone();
        let interval = std::time::Duration::from_secs(planner.subscription_advance_secs.max(1));
        tokio::spawn(async move {
            loop {
                let today = Utc::now().date_naive();
                match svc.advance_subscriptions(today).await {
                    Ok(n) if n > 0 => log::info!("Subscriptions advanced: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to advance subscriptions: {e:?}"),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }
}
