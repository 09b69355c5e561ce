use crate::entities::{offer_entity as offers, subscription_entity as subscriptions};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::CreditCardService;
use crate::utils::calendar::{
    self, MonthView, OfferSpan, SubscriptionSchedule, month_bounds, next_billing_on_or_after,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};

#[derive(Clone)]
pub struct CalendarService {
    pool: DatabaseConnection,
    credit_card_service: CreditCardService,
}

impl CalendarService {
    pub fn new(pool: DatabaseConnection, credit_card_service: CreditCardService) -> Self {
        Self {
            pool,
            credit_card_service,
        }
    }

    pub async fn create_offer(
        &self,
        user_id: i64,
        request: CreateOfferRequest,
    ) -> AppResult<OfferResponse> {
        require_text("merchant", &request.merchant)?;
        require_text("title", &request.title)?;
        if request.value_cents < 0 {
            return Err(AppError::ValidationError(
                "value_cents must not be negative".to_string(),
            ));
        }
        if request.ends_on < request.starts_on {
            return Err(AppError::ValidationError(
                "ends_on must not be before starts_on".to_string(),
            ));
        }
        if let Some(card_id) = request.card_id {
            self.credit_card_service
                .find_owned_card(user_id, card_id)
                .await?;
        }

        let offer = offers::ActiveModel {
            user_id: Set(user_id),
            card_id: Set(request.card_id),
            merchant: Set(request.merchant.trim().to_string()),
            title: Set(request.title.trim().to_string()),
            value_cents: Set(request.value_cents),
            starts_on: Set(request.starts_on),
            ends_on: Set(request.ends_on),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Created offer {} for user {user_id}", offer.id);
        Ok(offer.into())
    }

    /// 与 [from, to] 有交集的优惠; 未给出的一端不限
    pub async fn list_offers(
        &self,
        user_id: i64,
        query: OfferQuery,
    ) -> AppResult<Vec<OfferResponse>> {
        if let (Some(from), Some(to)) = (query.from, query.to)
            && to < from
        {
            return Err(AppError::ValidationError(
                "to must not be before from".to_string(),
            ));
        }

        let mut select = offers::Entity::find().filter(offers::Column::UserId.eq(user_id));
        if let Some(from) = query.from {
            select = select.filter(offers::Column::EndsOn.gte(from));
        }
        if let Some(to) = query.to {
            select = select.filter(offers::Column::StartsOn.lte(to));
        }

        let rows = select
            .order_by_asc(offers::Column::EndsOn)
            .order_by_asc(offers::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn delete_offer(&self, user_id: i64, offer_id: i64) -> AppResult<()> {
        let result = offers::Entity::delete_many()
            .filter(offers::Column::Id.eq(offer_id))
            .filter(offers::Column::UserId.eq(user_id))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Offer not found".to_string()));
        }
        log::info!("Deleted offer {offer_id} for user {user_id}");
        Ok(())
    }

    pub async fn create_subscription(
        &self,
        user_id: i64,
        request: CreateSubscriptionRequest,
    ) -> AppResult<SubscriptionResponse> {
        require_text("name", &request.name)?;
        if request.amount_cents < 0 {
            return Err(AppError::ValidationError(
                "amount_cents must not be negative".to_string(),
            ));
        }
        if let Some(card_id) = request.card_id {
            self.credit_card_service
                .find_owned_card(user_id, card_id)
                .await?;
        }

        let subscription = subscriptions::ActiveModel {
            user_id: Set(user_id),
            card_id: Set(request.card_id),
            name: Set(request.name.trim().to_string()),
            amount_cents: Set(request.amount_cents),
            billing_cycle: Set(request.billing_cycle),
            billing_anchor_on: Set(request.next_billing_on),
            next_billing_on: Set(request.next_billing_on),
            active: Set(true),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Created {} subscription {} for user {user_id}",
            subscription.billing_cycle,
            subscription.id
        );
        Ok(subscription.into())
    }

    pub async fn list_subscriptions(&self, user_id: i64) -> AppResult<Vec<SubscriptionResponse>> {
        let rows = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .order_by_asc(subscriptions::Column::NextBillingOn)
            .order_by_asc(subscriptions::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn delete_subscription(&self, user_id: i64, subscription_id: i64) -> AppResult<()> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::Id.eq(subscription_id))
            .filter(subscriptions::Column::UserId.eq(user_id))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Subscription not found".to_string()));
        }
        log::info!("Deleted subscription {subscription_id} for user {user_id}");
        Ok(())
    }

    /// 月视图: 与本月相交的优惠, 以及有效订阅在本月的扣费日
    pub async fn month_view(&self, user_id: i64, year: i32, month: u32) -> AppResult<MonthView> {
        let (first, last) = month_bounds(year, month)?;

        let offer_spans: Vec<OfferSpan> = offers::Entity::find()
            .filter(offers::Column::UserId.eq(user_id))
            .filter(offers::Column::StartsOn.lte(last))
            .filter(offers::Column::EndsOn.gte(first))
            .order_by_asc(offers::Column::Id)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|o| OfferSpan {
                offer_id: o.id,
                title: o.title,
                merchant: o.merchant,
                value_cents: o.value_cents,
                starts_on: o.starts_on,
                ends_on: o.ends_on,
            })
            .collect();

        let schedules: Vec<SubscriptionSchedule> = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::Active.eq(true))
            .order_by_asc(subscriptions::Column::Id)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|s| SubscriptionSchedule {
                subscription_id: s.id,
                name: s.name,
                amount_cents: s.amount_cents,
                cycle: s.billing_cycle,
                anchor: s.billing_anchor_on,
            })
            .collect();

        calendar::build_month(year, month, &offer_spans, &schedules)
    }

    /// 把已过期的 next_billing_on 推进到 today 当天或之后; 返回被推进的条数
    ///
    /// 新日期总是从 billing_anchor_on 推算, 不会基于上一次截断后的日期.
    pub async fn advance_subscriptions(&self, today: NaiveDate) -> AppResult<u64> {
        let due = subscriptions::Entity::find()
            .filter(subscriptions::Column::Active.eq(true))
            .filter(subscriptions::Column::NextBillingOn.lt(today))
            .all(&self.pool)
            .await?;

        let mut advanced = 0u64;
        for subscription in due {
            let Some(next) =
                next_billing_on_or_after(subscription.billing_anchor_on, subscription.billing_cycle, today)
            else {
                log::warn!(
                    "Subscription {} has no billing date after {today}",
                    subscription.id
                );
                continue;
            };
            let mut am = subscription.into_active_model();
            am.next_billing_on = Set(next);
            am.update(&self.pool).await?;
            advanced += 1;
        }

        if advanced > 0 {
            log::info!("Advanced {advanced} subscriptions to billing dates on or after {today}");
        }
        Ok(advanced)
    }
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}
