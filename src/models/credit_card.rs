use crate::entities::{
    CreditFrequency, card_bonus_category_entity, card_credit_entity, credit_card_entity,
};
use crate::utils::credit_period::period_bounds;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BonusCategoryInput {
    #[schema(example = "dining")]
    pub category: String,
    /// basis points, 3% = 300
    #[schema(example = 300)]
    pub reward_bp: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCreditCardRequest {
    #[schema(example = "Chase")]
    pub issuer: String,
    #[schema(example = "Sapphire Preferred")]
    pub name: String,
    #[schema(example = "4242")]
    pub last_four: Option<String>,
    #[schema(example = "visa")]
    pub network: Option<String>,
    #[serde(default)]
    pub annual_fee_cents: i64,
    #[serde(default = "default_base_reward_bp")]
    pub base_reward_bp: i32,
    pub opened_on: Option<NaiveDate>,
    #[serde(default)]
    pub bonus_categories: Vec<BonusCategoryInput>,
}

fn default_base_reward_bp() -> i32 {
    100
}

/// 未提供的字段保持不变; bonus_categories 提供时整体替换
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCreditCardRequest {
    pub issuer: Option<String>,
    pub name: Option<String>,
    pub last_four: Option<String>,
    pub network: Option<String>,
    pub annual_fee_cents: Option<i64>,
    pub base_reward_bp: Option<i32>,
    pub opened_on: Option<NaiveDate>,
    pub bonus_categories: Option<Vec<BonusCategoryInput>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BonusCategoryResponse {
    pub category: String,
    pub reward_bp: i32,
}

impl From<card_bonus_category_entity::Model> for BonusCategoryResponse {
    fn from(m: card_bonus_category_entity::Model) -> Self {
        Self {
            category: m.category,
            reward_bp: m.reward_bp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCardCreditRequest {
    #[schema(example = "Dining credit")]
    pub name: String,
    #[schema(example = 1000)]
    pub amount_cents: i64,
    pub frequency: CreditFrequency,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UseCreditRequest {
    #[schema(example = 500)]
    pub amount_cents: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CardCreditResponse {
    pub id: i64,
    pub card_id: i64,
    pub name: String,
    pub amount_cents: i64,
    pub frequency: CreditFrequency,
    pub used_cents: i64,
    pub remaining_cents: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

impl From<card_credit_entity::Model> for CardCreditResponse {
    fn from(m: card_credit_entity::Model) -> Self {
        let (_, period_end) = period_bounds(m.frequency, m.period_start);
        Self {
            remaining_cents: m.remaining_cents(),
            id: m.id,
            card_id: m.card_id,
            name: m.name,
            amount_cents: m.amount_cents,
            frequency: m.frequency,
            used_cents: m.used_cents,
            period_start: m.period_start,
            period_end,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreditCardResponse {
    pub id: i64,
    pub issuer: String,
    pub name: String,
    pub last_four: Option<String>,
    pub network: Option<String>,
    pub annual_fee_cents: i64,
    pub base_reward_bp: i32,
    pub opened_on: Option<NaiveDate>,
    pub bonus_categories: Vec<BonusCategoryResponse>,
    pub credits: Vec<CardCreditResponse>,
    /// 报销额度折算的年度总价值
    pub annual_credit_value_cents: i64,
    /// 年费 - 年度报销额度, 可以为负
    pub effective_annual_fee_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl CreditCardResponse {
    pub fn from_parts(
        card: credit_card_entity::Model,
        bonus: Vec<card_bonus_category_entity::Model>,
        credits: Vec<card_credit_entity::Model>,
    ) -> Self {
        let annual_credit_value = crate::utils::rewards::annual_credit_value(
            credits.iter().map(|c| (c.amount_cents, c.frequency)),
        );
        Self {
            effective_annual_fee_cents: crate::utils::rewards::effective_annual_fee(
                card.annual_fee_cents,
                annual_credit_value,
            ),
            annual_credit_value_cents: annual_credit_value,
            id: card.id,
            issuer: card.issuer,
            name: card.name,
            last_four: card.last_four,
            network: card.network,
            annual_fee_cents: card.annual_fee_cents,
            base_reward_bp: card.base_reward_bp,
            opened_on: card.opened_on,
            bonus_categories: bonus.into_iter().map(Into::into).collect(),
            credits: credits.into_iter().map(Into::into).collect(),
            created_at: card.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecommendationQuery {
    /// 只返回单个类别的推荐
    pub category: Option<String>,
}
