use crate::entities::{GiftCardStatus, gift_card_entity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGiftCardRequest {
    #[schema(example = "Target")]
    pub merchant: String,
    pub card_number: Option<String>,
    /// 当前余额(美分), 同时作为初始面值
    #[schema(example = 5000)]
    pub balance_cents: i64,
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateGiftCardRequest {
    pub merchant: Option<String>,
    pub card_number: Option<String>,
    /// 直接设置余额, status 随余额重新计算
    pub balance_cents: Option<i64>,
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SpendGiftCardRequest {
    #[schema(example = 1250)]
    pub amount_cents: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GiftCardQuery {
    /// active / spent
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GiftCardResponse {
    pub id: i64,
    pub merchant: String,
    pub card_number: Option<String>,
    pub initial_balance_cents: i64,
    pub balance_cents: i64,
    pub status: GiftCardStatus,
    pub expires_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<gift_card_entity::Model> for GiftCardResponse {
    fn from(m: gift_card_entity::Model) -> Self {
        Self {
            id: m.id,
            merchant: m.merchant,
            card_number: m.card_number,
            initial_balance_cents: m.initial_balance_cents,
            balance_cents: m.balance_cents,
            status: m.status,
            expires_on: m.expires_on,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MerchantBalance {
    pub merchant: String,
    pub card_count: i64,
    pub balance_cents: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GiftCardSummaryResponse {
    pub merchants: Vec<MerchantBalance>,
    pub total_balance_cents: i64,
}
