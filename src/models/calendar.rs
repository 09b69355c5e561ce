use crate::entities::{BillingCycle, offer_entity, subscription_entity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOfferRequest {
    pub card_id: Option<i64>,
    #[schema(example = "Whole Foods")]
    pub merchant: String,
    #[schema(example = "Spend $60, get $10 back")]
    pub title: String,
    #[serde(default)]
    pub value_cents: i64,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OfferQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OfferResponse {
    pub id: i64,
    pub card_id: Option<i64>,
    pub merchant: String,
    pub title: String,
    pub value_cents: i64,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<offer_entity::Model> for OfferResponse {
    fn from(m: offer_entity::Model) -> Self {
        Self {
            id: m.id,
            card_id: m.card_id,
            merchant: m.merchant,
            title: m.title,
            value_cents: m.value_cents,
            starts_on: m.starts_on,
            ends_on: m.ends_on,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    pub card_id: Option<i64>,
    #[schema(example = "Streaming")]
    pub name: String,
    #[schema(example = 1599)]
    pub amount_cents: i64,
    pub billing_cycle: BillingCycle,
    pub next_billing_on: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub card_id: Option<i64>,
    pub name: String,
    pub amount_cents: i64,
    pub billing_cycle: BillingCycle,
    pub billing_anchor_on: NaiveDate,
    pub next_billing_on: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<subscription_entity::Model> for SubscriptionResponse {
    fn from(m: subscription_entity::Model) -> Self {
        Self {
            id: m.id,
            card_id: m.card_id,
            name: m.name,
            amount_cents: m.amount_cents,
            billing_cycle: m.billing_cycle,
            billing_anchor_on: m.billing_anchor_on,
            next_billing_on: m.next_billing_on,
            active: m.active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalendarQuery {
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
}
