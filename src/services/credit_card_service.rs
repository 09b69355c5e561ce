use crate::entities::{
    card_bonus_category_entity as bonus, card_credit_entity as credits,
    credit_card_entity as cards,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::credit_period::{period_bounds, rollover_start};
use crate::utils::{
    CardRates, CategoryRecommendation, normalize_category, rewards, validate_last_four,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::{HashMap, HashSet};

const MAX_REWARD_BP: i32 = 10_000;

#[derive(Clone)]
pub struct CreditCardService {
    pool: DatabaseConnection,
}

impl CreditCardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_cards(&self, user_id: i64) -> AppResult<Vec<CreditCardResponse>> {
        let card_rows = cards::Entity::find()
            .filter(cards::Column::UserId.eq(user_id))
            .order_by_asc(cards::Column::Id)
            .all(&self.pool)
            .await?;
        self.assemble(card_rows).await
    }

    pub async fn get_card(&self, user_id: i64, card_id: i64) -> AppResult<CreditCardResponse> {
        let card = self.find_owned_card(user_id, card_id).await?;
        self.assemble(vec![card])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Credit card not found".to_string()))
    }

    pub async fn create_card(
        &self,
        user_id: i64,
        request: CreateCreditCardRequest,
    ) -> AppResult<CreditCardResponse> {
        validate_create_request(&request)?;

        let txn = self.pool.begin().await?;
        let card = insert_card(&txn, user_id, request).await?;
        txn.commit().await?;

        log::info!(
            "Created credit card {} ({} {}) for user {user_id}",
            card.id,
            card.issuer,
            card.name
        );
        self.get_card(user_id, card.id).await
    }

    pub async fn update_card(
        &self,
        user_id: i64,
        card_id: i64,
        request: UpdateCreditCardRequest,
    ) -> AppResult<CreditCardResponse> {
        let card = self.find_owned_card(user_id, card_id).await?;

        if let Some(issuer) = &request.issuer {
            require_text("issuer", issuer)?;
        }
        if let Some(name) = &request.name {
            require_text("name", name)?;
        }
        if let Some(last_four) = &request.last_four {
            validate_last_four(last_four)?;
        }
        if let Some(fee) = request.annual_fee_cents {
            validate_fee(fee)?;
        }
        if let Some(bp) = request.base_reward_bp {
            validate_rate("base_reward_bp", bp)?;
        }
        let bonus_rows = request
            .bonus_categories
            .as_deref()
            .map(normalize_bonus)
            .transpose()?;

        let txn = self.pool.begin().await?;
        let mut am = card.into_active_model();
        if let Some(issuer) = request.issuer {
            am.issuer = Set(issuer.trim().to_string());
        }
        if let Some(name) = request.name {
            am.name = Set(name.trim().to_string());
        }
        if let Some(last_four) = request.last_four {
            am.last_four = Set(Some(last_four));
        }
        if let Some(network) = request.network {
            am.network = Set(Some(network.trim().to_lowercase()));
        }
        if let Some(fee) = request.annual_fee_cents {
            am.annual_fee_cents = Set(fee);
        }
        if let Some(bp) = request.base_reward_bp {
            am.base_reward_bp = Set(bp);
        }
        if let Some(opened_on) = request.opened_on {
            am.opened_on = Set(Some(opened_on));
        }
        am.updated_at = Set(Utc::now());
        am.update(&txn).await?;

        if let Some(rows) = bonus_rows {
            bonus::Entity::delete_many()
                .filter(bonus::Column::CardId.eq(card_id))
                .exec(&txn)
                .await?;
            insert_bonus(&txn, card_id, rows).await?;
        }
        txn.commit().await?;

        self.get_card(user_id, card_id).await
    }

    pub async fn delete_card(&self, user_id: i64, card_id: i64) -> AppResult<()> {
        let card = self.find_owned_card(user_id, card_id).await?;

        let txn = self.pool.begin().await?;
        bonus::Entity::delete_many()
            .filter(bonus::Column::CardId.eq(card.id))
            .exec(&txn)
            .await?;
        credits::Entity::delete_many()
            .filter(credits::Column::CardId.eq(card.id))
            .exec(&txn)
            .await?;
        cards::Entity::delete_by_id(card.id).exec(&txn).await?;
        txn.commit().await?;

        log::info!("Deleted credit card {card_id} for user {user_id}");
        Ok(())
    }

    /// 用户所有卡片的返现比例, 供推荐和购买计划比较使用
    pub async fn card_rates(&self, user_id: i64) -> AppResult<Vec<CardRates>> {
        let card_rows = cards::Entity::find()
            .filter(cards::Column::UserId.eq(user_id))
            .order_by_asc(cards::Column::Id)
            .all(&self.pool)
            .await?;
        let ids: Vec<i64> = card_rows.iter().map(|c| c.id).collect();
        let mut bonus_by_card = self.bonus_by_card(&ids).await?;

        Ok(card_rows
            .into_iter()
            .map(|card| CardRates {
                bonus: bonus_by_card
                    .remove(&card.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|b| (b.category, b.reward_bp))
                    .collect(),
                card_id: card.id,
                name: card.name,
                annual_fee_cents: card.annual_fee_cents,
                base_reward_bp: card.base_reward_bp,
            })
            .collect())
    }

    pub async fn recommendations(
        &self,
        user_id: i64,
        category: Option<&str>,
    ) -> AppResult<Vec<CategoryRecommendation>> {
        let rates = self.card_rates(user_id).await?;

        let result = match category {
            Some(category) => {
                let category = normalize_category(category);
                rewards::best_card_for(&rates, &category)
                    .map(|card| CategoryRecommendation {
                        reward_bp: card.reward_rate_for(&category),
                        card_id: card.card_id,
                        card_name: card.name.clone(),
                        category,
                    })
                    .into_iter()
                    .collect()
            }
            None => rewards::recommendations(&rates),
        };
        Ok(result)
    }

    pub async fn add_credit(
        &self,
        user_id: i64,
        card_id: i64,
        request: CreateCardCreditRequest,
    ) -> AppResult<CardCreditResponse> {
        let card = self.find_owned_card(user_id, card_id).await?;
        require_text("name", &request.name)?;
        if request.amount_cents <= 0 {
            return Err(AppError::ValidationError(
                "amount_cents must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let (period_start, _) = period_bounds(request.frequency, now.date_naive());
        let credit = credits::ActiveModel {
            card_id: Set(card.id),
            user_id: Set(user_id),
            name: Set(request.name.trim().to_string()),
            amount_cents: Set(request.amount_cents),
            frequency: Set(request.frequency),
            used_cents: Set(0),
            period_start: Set(period_start),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Added {} credit {} to card {card_id} for user {user_id}",
            credit.frequency,
            credit.id
        );
        Ok(credit.into())
    }

    /// 记录一次报销使用; 先把过期周期滚动到当前周期
    pub async fn use_credit(
        &self,
        user_id: i64,
        credit_id: i64,
        request: UseCreditRequest,
    ) -> AppResult<CardCreditResponse> {
        if request.amount_cents <= 0 {
            return Err(AppError::ValidationError(
                "amount_cents must be positive".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        let credit = credits::Entity::find_by_id(credit_id)
            .filter(credits::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Credit not found".to_string()))?;

        let today = Utc::now().date_naive();
        let (period_start, used) = match rollover_start(credit.frequency, credit.period_start, today)
        {
            Some(start) => (start, 0),
            None => (credit.period_start, credit.used_cents),
        };

        if used + request.amount_cents > credit.amount_cents {
            return Err(AppError::ValidationError(format!(
                "Credit has only {} cents remaining this period",
                (credit.amount_cents - used).max(0)
            )));
        }

        let mut am = credit.into_active_model();
        am.period_start = Set(period_start);
        am.used_cents = Set(used + request.amount_cents);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        Ok(updated.into())
    }

    pub async fn delete_credit(&self, user_id: i64, credit_id: i64) -> AppResult<()> {
        let result = credits::Entity::delete_many()
            .filter(credits::Column::Id.eq(credit_id))
            .filter(credits::Column::UserId.eq(user_id))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Credit not found".to_string()));
        }
        log::info!("Deleted credit {credit_id} for user {user_id}");
        Ok(())
    }

    /// 把所有跨入新周期的报销额度重置; 返回被重置的条数
    pub async fn roll_over_credits(&self, today: NaiveDate) -> AppResult<u64> {
        let rows = credits::Entity::find().all(&self.pool).await?;
        let mut rolled = 0u64;

        for credit in rows {
            let Some(start) = rollover_start(credit.frequency, credit.period_start, today) else {
                continue;
            };
            let mut am = credit.into_active_model();
            am.period_start = Set(start);
            am.used_cents = Set(0);
            am.updated_at = Set(Utc::now());
            am.update(&self.pool).await?;
            rolled += 1;
        }

        if rolled > 0 {
            log::info!("Rolled over {rolled} card credits into the period containing {today}");
        }
        Ok(rolled)
    }

    /// 按 id 查找属于该用户的卡片, 其他用户的卡片视为不存在
    pub async fn find_owned_card(&self, user_id: i64, card_id: i64) -> AppResult<cards::Model> {
        cards::Entity::find_by_id(card_id)
            .filter(cards::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Credit card not found".to_string()))
    }

    async fn assemble(&self, card_rows: Vec<cards::Model>) -> AppResult<Vec<CreditCardResponse>> {
        let ids: Vec<i64> = card_rows.iter().map(|c| c.id).collect();
        let mut bonus_by_card = self.bonus_by_card(&ids).await?;

        let mut credits_by_card: HashMap<i64, Vec<credits::Model>> = HashMap::new();
        if !ids.is_empty() {
            let credit_rows = credits::Entity::find()
                .filter(credits::Column::CardId.is_in(ids))
                .order_by_asc(credits::Column::Id)
                .all(&self.pool)
                .await?;
            for credit in credit_rows {
                credits_by_card.entry(credit.card_id).or_default().push(credit);
            }
        }

        Ok(card_rows
            .into_iter()
            .map(|card| {
                let bonus = bonus_by_card.remove(&card.id).unwrap_or_default();
                let credits = credits_by_card.remove(&card.id).unwrap_or_default();
                CreditCardResponse::from_parts(card, bonus, credits)
            })
            .collect())
    }

    async fn bonus_by_card(&self, ids: &[i64]) -> AppResult<HashMap<i64, Vec<bonus::Model>>> {
        let mut grouped: HashMap<i64, Vec<bonus::Model>> = HashMap::new();
        if ids.is_empty() {
            return Ok(grouped);
        }
        let rows = bonus::Entity::find()
            .filter(bonus::Column::CardId.is_in(ids.to_vec()))
            .order_by_asc(bonus::Column::Category)
            .all(&self.pool)
            .await?;
        for row in rows {
            grouped.entry(row.card_id).or_default().push(row);
        }
        Ok(grouped)
    }
}

/// 同一用户下 issuer + name + last_four 相同视为同一张卡
pub(crate) async fn card_exists<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    issuer: &str,
    name: &str,
    last_four: Option<&str>,
) -> AppResult<bool> {
    let mut query = cards::Entity::find()
        .filter(cards::Column::UserId.eq(user_id))
        .filter(cards::Column::Issuer.eq(issuer.trim()))
        .filter(cards::Column::Name.eq(name.trim()));
    query = match last_four {
        Some(l4) => query.filter(cards::Column::LastFour.eq(l4)),
        None => query.filter(cards::Column::LastFour.is_null()),
    };
    Ok(query.one(db).await?.is_some())
}

/// 在给定连接 (或事务) 上写入卡片及其加成类别, 调用方负责先校验
pub(crate) async fn insert_card<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    request: CreateCreditCardRequest,
) -> AppResult<cards::Model> {
    let bonus_rows = normalize_bonus(&request.bonus_categories)?;
    let now = Utc::now();
    let card = cards::ActiveModel {
        user_id: Set(user_id),
        issuer: Set(request.issuer.trim().to_string()),
        name: Set(request.name.trim().to_string()),
        last_four: Set(request.last_four),
        network: Set(request.network.map(|n| n.trim().to_lowercase())),
        annual_fee_cents: Set(request.annual_fee_cents),
        base_reward_bp: Set(request.base_reward_bp),
        opened_on: Set(request.opened_on),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    insert_bonus(db, card.id, bonus_rows).await?;
    Ok(card)
}

async fn insert_bonus<C: ConnectionTrait>(
    db: &C,
    card_id: i64,
    rows: Vec<(String, i32)>,
) -> AppResult<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let models = rows.into_iter().map(|(category, reward_bp)| bonus::ActiveModel {
        card_id: Set(card_id),
        category: Set(category),
        reward_bp: Set(reward_bp),
        ..Default::default()
    });
    bonus::Entity::insert_many(models).exec(db).await?;
    Ok(())
}

pub(crate) fn validate_create_request(request: &CreateCreditCardRequest) -> AppResult<()> {
    require_text("issuer", &request.issuer)?;
    require_text("name", &request.name)?;
    if let Some(last_four) = &request.last_four {
        validate_last_four(last_four)?;
    }
    validate_fee(request.annual_fee_cents)?;
    validate_rate("base_reward_bp", request.base_reward_bp)?;
    normalize_bonus(&request.bonus_categories)?;
    Ok(())
}

/// 规范化类别名并拒绝重复类别
fn normalize_bonus(input: &[BonusCategoryInput]) -> AppResult<Vec<(String, i32)>> {
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(input.len());
    for item in input {
        let category = normalize_category(&item.category);
        validate_rate("reward_bp", item.reward_bp)?;
        if !seen.insert(category.clone()) {
            return Err(AppError::ValidationError(format!(
                "Duplicate bonus category: {category}"
            )));
        }
        rows.push((category, item.reward_bp));
    }
    Ok(rows)
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

fn validate_fee(fee: i64) -> AppResult<()> {
    if fee < 0 {
        return Err(AppError::ValidationError(
            "annual_fee_cents must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_rate(field: &str, bp: i32) -> AppResult<()> {
    if !(0..=MAX_REWARD_BP).contains(&bp) {
        return Err(AppError::ValidationError(format!(
            "{field} must be between 0 and {MAX_REWARD_BP}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bonus_input(category: &str, reward_bp: i32) -> BonusCategoryInput {
        BonusCategoryInput {
            category: category.to_string(),
            reward_bp,
        }
    }

    #[test]
    fn test_normalize_bonus_rejects_duplicates() {
        let rows = normalize_bonus(&[bonus_input(" Dining ", 300), bonus_input("travel", 200)])
            .unwrap();
        assert_eq!(rows, vec![("dining".to_string(), 300), ("travel".to_string(), 200)]);

        let err = normalize_bonus(&[bonus_input("dining", 300), bonus_input("DINING", 400)]);
        assert!(matches!(err, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_validate_create_request() {
        let mut request = CreateCreditCardRequest {
            issuer: "Chase".to_string(),
            name: "Freedom".to_string(),
            last_four: Some("1234".to_string()),
            network: None,
            annual_fee_cents: 0,
            base_reward_bp: 100,
            opened_on: None,
            bonus_categories: vec![bonus_input("groceries", 500)],
        };
        assert!(validate_create_request(&request).is_ok());

        request.base_reward_bp = 20_000;
        assert!(validate_create_request(&request).is_err());

        request.base_reward_bp = 100;
        request.last_four = Some("12a4".to_string());
        assert!(validate_create_request(&request).is_err());

        request.last_four = None;
        request.issuer = "  ".to_string();
        assert!(validate_create_request(&request).is_err());
    }
}
