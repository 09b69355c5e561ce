use crate::entities::{GiftCardStatus, gift_card_entity as gift_cards};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::{BTreeMap, HashSet};

#[derive(Clone)]
pub struct GiftCardService {
    pool: DatabaseConnection,
}

impl GiftCardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_gift_cards(
        &self,
        user_id: i64,
        status: Option<&str>,
    ) -> AppResult<Vec<GiftCardResponse>> {
        let mut query = gift_cards::Entity::find().filter(gift_cards::Column::UserId.eq(user_id));
        if let Some(status) = status.filter(|s| !s.trim().is_empty()) {
            let status: GiftCardStatus = status.parse().map_err(AppError::ValidationError)?;
            query = query.filter(gift_cards::Column::Status.eq(status));
        }

        let rows = query
            .order_by_asc(gift_cards::Column::Merchant)
            .order_by_asc(gift_cards::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn create_gift_card(
        &self,
        user_id: i64,
        request: CreateGiftCardRequest,
    ) -> AppResult<GiftCardResponse> {
        validate_create_request(&request)?;
        let card = insert_gift_card(&self.pool, user_id, request).await?;
        log::info!(
            "Created gift card {} ({}) for user {user_id}",
            card.id,
            card.merchant
        );
        Ok(card.into())
    }

    pub async fn update_gift_card(
        &self,
        user_id: i64,
        gift_card_id: i64,
        request: UpdateGiftCardRequest,
    ) -> AppResult<GiftCardResponse> {
        if let Some(merchant) = &request.merchant
            && merchant.trim().is_empty()
        {
            return Err(AppError::ValidationError("merchant is required".to_string()));
        }
        if let Some(balance) = request.balance_cents
            && balance < 0
        {
            return Err(AppError::ValidationError(
                "balance_cents must not be negative".to_string(),
            ));
        }

        let card = self.find_owned(&self.pool, user_id, gift_card_id).await?;
        let initial = card.initial_balance_cents;
        let mut am = card.into_active_model();
        if let Some(merchant) = request.merchant {
            am.merchant = Set(merchant.trim().to_string());
        }
        if request.card_number.is_some() {
            am.card_number = Set(normalize_card_number(request.card_number));
        }
        if let Some(balance) = request.balance_cents {
            am.balance_cents = Set(balance);
            am.status = Set(GiftCardStatus::for_balance(balance));
            // 充值后余额超过面值时同步面值
            if balance > initial {
                am.initial_balance_cents = Set(balance);
            }
        }
        if let Some(expires_on) = request.expires_on {
            am.expires_on = Set(Some(expires_on));
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(&self.pool).await?;
        Ok(updated.into())
    }

    pub async fn delete_gift_card(&self, user_id: i64, gift_card_id: i64) -> AppResult<()> {
        let result = gift_cards::Entity::delete_many()
            .filter(gift_cards::Column::Id.eq(gift_card_id))
            .filter(gift_cards::Column::UserId.eq(user_id))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Gift card not found".to_string()));
        }
        log::info!("Deleted gift card {gift_card_id} for user {user_id}");
        Ok(())
    }

    /// 扣减余额; 扣到 0 时状态变为 spent
    pub async fn spend(
        &self,
        user_id: i64,
        gift_card_id: i64,
        request: SpendGiftCardRequest,
    ) -> AppResult<GiftCardResponse> {
        if request.amount_cents <= 0 {
            return Err(AppError::ValidationError(
                "amount_cents must be positive".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        let card = self.find_owned(&txn, user_id, gift_card_id).await?;
        if request.amount_cents > card.balance_cents {
            return Err(AppError::ValidationError(format!(
                "Insufficient gift card balance: {} cents available",
                card.balance_cents
            )));
        }

        let balance = card.balance_cents - request.amount_cents;
        let mut am = card.into_active_model();
        am.balance_cents = Set(balance);
        am.status = Set(GiftCardStatus::for_balance(balance));
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        if updated.status == GiftCardStatus::Spent {
            log::info!("Gift card {gift_card_id} of user {user_id} is now spent");
        }
        Ok(updated.into())
    }

    /// 按商家汇总可用余额, 余额高的商家在前
    pub async fn summary(&self, user_id: i64) -> AppResult<GiftCardSummaryResponse> {
        let rows = self.active_cards(user_id).await?;
        let merchants = summarize_by_merchant(&rows);
        let total_balance_cents = merchants.iter().map(|m| m.balance_cents).sum();
        Ok(GiftCardSummaryResponse {
            merchants,
            total_balance_cents,
        })
    }

    /// 商家名 (忽略大小写) 命中给定商家列表的可用礼品卡
    pub async fn active_cards_for_merchants(
        &self,
        user_id: i64,
        merchants: &[String],
    ) -> AppResult<Vec<GiftCardResponse>> {
        let wanted: HashSet<String> = merchants
            .iter()
            .map(|m| m.trim().to_lowercase())
            .collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.active_cards(user_id).await?;
        Ok(rows
            .into_iter()
            .filter(|c| wanted.contains(&c.merchant.trim().to_lowercase()))
            .map(Into::into)
            .collect())
    }

    async fn active_cards(&self, user_id: i64) -> AppResult<Vec<gift_cards::Model>> {
        Ok(gift_cards::Entity::find()
            .filter(gift_cards::Column::UserId.eq(user_id))
            .filter(gift_cards::Column::Status.eq(GiftCardStatus::Active))
            .order_by_asc(gift_cards::Column::Id)
            .all(&self.pool)
            .await?)
    }

    async fn find_owned<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: i64,
        gift_card_id: i64,
    ) -> AppResult<gift_cards::Model> {
        gift_cards::Entity::find_by_id(gift_card_id)
            .filter(gift_cards::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Gift card not found".to_string()))
    }
}

pub(crate) fn validate_create_request(request: &CreateGiftCardRequest) -> AppResult<()> {
    if request.merchant.trim().is_empty() {
        return Err(AppError::ValidationError("merchant is required".to_string()));
    }
    if request.balance_cents < 0 {
        return Err(AppError::ValidationError(
            "balance_cents must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// 卡号去空白, 空串视为没有卡号
fn normalize_card_number(card_number: Option<String>) -> Option<String> {
    card_number
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

pub(crate) async fn insert_gift_card<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    request: CreateGiftCardRequest,
) -> AppResult<gift_cards::Model> {
    let now = Utc::now();
    let card = gift_cards::ActiveModel {
        user_id: Set(user_id),
        merchant: Set(request.merchant.trim().to_string()),
        card_number: Set(normalize_card_number(request.card_number)),
        initial_balance_cents: Set(request.balance_cents),
        balance_cents: Set(request.balance_cents),
        status: Set(GiftCardStatus::for_balance(request.balance_cents)),
        expires_on: Set(request.expires_on),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(card)
}

/// 同一用户下同商家同卡号视为重复
pub(crate) async fn gift_card_exists<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    merchant: &str,
    card_number: &str,
) -> AppResult<bool> {
    Ok(gift_cards::Entity::find()
        .filter(gift_cards::Column::UserId.eq(user_id))
        .filter(gift_cards::Column::Merchant.eq(merchant.trim()))
        .filter(gift_cards::Column::CardNumber.eq(card_number.trim()))
        .one(db)
        .await?
        .is_some())
}

/// 商家名忽略大小写合并, 展示首次出现的写法
fn summarize_by_merchant(rows: &[gift_cards::Model]) -> Vec<MerchantBalance> {
    let mut grouped: BTreeMap<String, MerchantBalance> = BTreeMap::new();
    for card in rows {
        let entry = grouped
            .entry(card.merchant.trim().to_lowercase())
            .or_insert_with(|| MerchantBalance {
                merchant: card.merchant.clone(),
                card_count: 0,
                balance_cents: 0,
            });
        entry.card_count += 1;
        entry.balance_cents += card.balance_cents;
    }

    let mut merchants: Vec<MerchantBalance> = grouped.into_values().collect();
    merchants.sort_by(|a, b| b.balance_cents.cmp(&a.balance_cents));
    merchants
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(id: i64, merchant: &str, balance: i64) -> gift_cards::Model {
        gift_cards::Model {
            id,
            user_id: 1,
            merchant: merchant.to_string(),
            card_number: None,
            initial_balance_cents: balance,
            balance_cents: balance,
            status: GiftCardStatus::for_balance(balance),
            expires_on: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_by_merchant() {
        let rows = vec![
            card(1, "Target", 2500),
            card(2, "Amazon", 1000),
            card(3, "target", 5000),
        ];
        let summary = summarize_by_merchant(&rows);
        assert_eq!(
            summary,
            vec![
                MerchantBalance {
                    merchant: "Target".to_string(),
                    card_count: 2,
                    balance_cents: 7500,
                },
                MerchantBalance {
                    merchant: "Amazon".to_string(),
                    card_count: 1,
                    balance_cents: 1000,
                },
            ]
        );
    }

    #[test]
    fn test_validate_create_request() {
        let mut request = CreateGiftCardRequest {
            merchant: "Target".to_string(),
            card_number: None,
            balance_cents: 0,
            expires_on: None,
        };
        assert!(validate_create_request(&request).is_ok());

        request.balance_cents = -1;
        assert!(validate_create_request(&request).is_err());
    }

    #[test]
    fn test_normalize_card_number() {
        assert_eq!(normalize_card_number(Some(" 6006-1 ".into())), Some("6006-1".into()));
        assert_eq!(normalize_card_number(Some("   ".into())), None);
        assert_eq!(normalize_card_number(None), None);
    }
}
