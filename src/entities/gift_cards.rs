use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum GiftCardStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "spent")]
    Spent,
}

impl GiftCardStatus {
    /// 余额为 0 即视为已用完
    pub fn for_balance(balance_cents: i64) -> Self {
        if balance_cents > 0 {
            GiftCardStatus::Active
        } else {
            GiftCardStatus::Spent
        }
    }
}

impl std::fmt::Display for GiftCardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GiftCardStatus::Active => write!(f, "active"),
            GiftCardStatus::Spent => write!(f, "spent"),
        }
    }
}

impl std::str::FromStr for GiftCardStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(GiftCardStatus::Active),
            "spent" => Ok(GiftCardStatus::Spent),
            other => Err(format!("Unknown gift card status: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "gift_cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub merchant: String,
    pub card_number: Option<String>,
    pub initial_balance_cents: i64,
    pub balance_cents: i64,
    pub status: GiftCardStatus,
    pub expires_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_balance() {
        assert_eq!(GiftCardStatus::for_balance(1), GiftCardStatus::Active);
        assert_eq!(GiftCardStatus::for_balance(0), GiftCardStatus::Spent);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Active".parse::<GiftCardStatus>(), Ok(GiftCardStatus::Active));
        assert_eq!(" spent ".parse::<GiftCardStatus>(), Ok(GiftCardStatus::Spent));
        assert!("lost".parse::<GiftCardStatus>().is_err());
    }
}
