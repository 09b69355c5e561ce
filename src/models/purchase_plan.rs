use crate::entities::{
    PlanPriority, PlanStatus, StackComponentKind, merchant_option_entity,
    product_option_entity, purchase_plan_entity, stack_component_entity,
};
use crate::models::GiftCardResponse;
use crate::utils::savings::{self, PlanComparison};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePurchasePlanRequest {
    #[schema(example = "New laptop")]
    pub name: String,
    pub priority: Option<PlanPriority>,
    #[schema(example = 150000)]
    pub budget_cents: Option<i64>,
    #[schema(example = "electronics")]
    pub category: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePurchasePlanRequest {
    pub name: Option<String>,
    pub priority: Option<PlanPriority>,
    pub budget_cents: Option<i64>,
    pub category: Option<String>,
    pub status: Option<PlanStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchasePlanQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// planning / purchased / abandoned
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StackComponentInput {
    pub kind: StackComponentKind,
    #[schema(example = "5% card reward")]
    pub label: String,
    #[schema(example = 500)]
    pub value_cents: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProductOptionRequest {
    #[schema(example = "ThinkPad X1 Carbon")]
    pub name: String,
    #[serde(default)]
    pub list_price_cents: i64,
    /// 规格参数 (JSON object)
    #[schema(value_type = Object)]
    pub specs: Option<serde_json::Value>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMerchantOptionRequest {
    #[schema(example = "Best Buy")]
    pub merchant: String,
    #[schema(example = 129999)]
    pub price_cents: i64,
    pub url: Option<String>,
    #[serde(default)]
    pub stack: Vec<StackComponentInput>,
}

/// stack 提供时整体替换
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMerchantOptionRequest {
    pub price_cents: Option<i64>,
    pub url: Option<String>,
    pub stack: Option<Vec<StackComponentInput>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StackComponentResponse {
    pub id: i64,
    pub kind: StackComponentKind,
    pub label: String,
    pub value_cents: i64,
}

impl From<stack_component_entity::Model> for StackComponentResponse {
    fn from(m: stack_component_entity::Model) -> Self {
        Self {
            id: m.id,
            kind: m.kind,
            label: m.label,
            value_cents: m.value_cents,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MerchantOptionResponse {
    pub id: i64,
    pub product_option_id: i64,
    pub merchant: String,
    pub price_cents: i64,
    pub net_price_cents: i64,
    pub stack_savings_cents: i64,
    pub percent_saved: f64,
    pub url: Option<String>,
    pub stack: Vec<StackComponentResponse>,
}

impl MerchantOptionResponse {
    pub fn from_parts(
        m: merchant_option_entity::Model,
        stack: Vec<stack_component_entity::Model>,
    ) -> Self {
        let applied = m.price_cents.max(0) - m.net_price_cents;
        Self {
            stack_savings_cents: savings::stack_savings(stack.iter().map(|c| c.value_cents)),
            percent_saved: savings::percent_saved(m.price_cents, applied),
            id: m.id,
            product_option_id: m.product_option_id,
            merchant: m.merchant,
            price_cents: m.price_cents,
            net_price_cents: m.net_price_cents,
            url: m.url,
            stack: stack.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductOptionResponse {
    pub id: i64,
    pub plan_id: i64,
    pub name: String,
    pub list_price_cents: i64,
    #[schema(value_type = Object)]
    pub specs: serde_json::Value,
    pub url: Option<String>,
    pub merchants: Vec<MerchantOptionResponse>,
    pub created_at: DateTime<Utc>,
}

impl ProductOptionResponse {
    pub fn from_parts(
        p: product_option_entity::Model,
        merchants: Vec<MerchantOptionResponse>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            specs: serde_json::from_str(&p.specs)?,
            id: p.id,
            plan_id: p.plan_id,
            name: p.name,
            list_price_cents: p.list_price_cents,
            url: p.url,
            merchants,
            created_at: p.created_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchasePlanResponse {
    pub id: i64,
    pub name: String,
    pub priority: PlanPriority,
    pub budget_cents: Option<i64>,
    pub category: Option<String>,
    pub status: PlanStatus,
    pub notes: Option<String>,
    /// 列表接口不展开, 详情接口返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductOptionResponse>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<purchase_plan_entity::Model> for PurchasePlanResponse {
    fn from(m: purchase_plan_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            priority: m.priority,
            budget_cents: m.budget_cents,
            category: m.category,
            status: m.status,
            notes: m.notes,
            products: None,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// 计划类别下推荐使用的卡, 以及按最优商家价格折算的返现
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CardSuggestion {
    pub card_id: i64,
    pub card_name: String,
    pub category: String,
    pub reward_bp: i32,
    pub reward_value_cents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlanComparisonResponse {
    pub plan_id: i64,
    pub comparison: PlanComparison,
    pub recommended_card: Option<CardSuggestion>,
    /// 商家名与某个商家报价匹配的可用礼品卡
    pub applicable_gift_cards: Vec<GiftCardResponse>,
}
