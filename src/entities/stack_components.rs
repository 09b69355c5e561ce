use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum StackComponentKind {
    #[sea_orm(string_value = "card_reward")]
    CardReward,
    #[sea_orm(string_value = "store_promo")]
    StorePromo,
    #[sea_orm(string_value = "cashback")]
    Cashback,
    #[sea_orm(string_value = "coupon")]
    Coupon,
    #[sea_orm(string_value = "gift_card")]
    GiftCard,
    #[sea_orm(string_value = "other")]
    Other,
}

/// 一条叠加优惠, value_cents 为折算后的美分金额
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "stack_components")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub merchant_option_id: i64,
    pub kind: StackComponentKind,
    pub label: String,
    pub value_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
