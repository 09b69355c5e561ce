use crate::entities::{
    PlanPriority, PlanStatus, merchant_option_entity as merchants,
    product_option_entity as products, purchase_plan_entity as plans,
    stack_component_entity as stacks,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{CreditCardService, GiftCardService};
use crate::utils::rewards::{self, CATCH_ALL_CATEGORY};
use crate::utils::savings::{self, MerchantQuote, ProductQuote};
use crate::utils::normalize_category;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

/// 一个候选商品及其商家报价 (每个报价附带叠加优惠)
struct ProductTree {
    product: products::Model,
    merchants: Vec<(merchants::Model, Vec<stacks::Model>)>,
}

impl ProductTree {
    fn quote(&self) -> ProductQuote {
        ProductQuote {
            product_option_id: self.product.id,
            name: self.product.name.clone(),
            list_price_cents: self.product.list_price_cents,
            merchants: self
                .merchants
                .iter()
                .map(|(m, stack)| MerchantQuote {
                    merchant_option_id: m.id,
                    merchant: m.merchant.clone(),
                    price_cents: m.price_cents,
                    stack_values: stack.iter().map(|c| c.value_cents).collect(),
                })
                .collect(),
        }
    }

    fn into_response(self) -> AppResult<ProductOptionResponse> {
        let merchants = self
            .merchants
            .into_iter()
            .map(|(m, stack)| MerchantOptionResponse::from_parts(m, stack))
            .collect();
        Ok(ProductOptionResponse::from_parts(self.product, merchants)?)
    }
}

#[derive(Clone)]
pub struct PurchasePlanService {
    pool: DatabaseConnection,
    credit_card_service: CreditCardService,
    gift_card_service: GiftCardService,
}

impl PurchasePlanService {
    pub fn new(
        pool: DatabaseConnection,
        credit_card_service: CreditCardService,
        gift_card_service: GiftCardService,
    ) -> Self {
        Self {
            pool,
            credit_card_service,
            gift_card_service,
        }
    }

    /// 分页列出计划, 高优先级在前, 同优先级新建的在前
    pub async fn list_plans(
        &self,
        user_id: i64,
        query: PurchasePlanQuery,
        default_page_size: u32,
    ) -> AppResult<PaginatedResponse<PurchasePlanResponse>> {
        let params =
            PaginationParams::new(query.page, query.per_page).with_default_size(default_page_size);

        let mut select = plans::Entity::find().filter(plans::Column::UserId.eq(user_id));
        if let Some(status) = query.status.as_deref().filter(|s| !s.trim().is_empty()) {
            select = select.filter(plans::Column::Status.eq(parse_status(status)?));
        }

        let total = select.clone().count(&self.pool).await? as i64;
        let rows = select
            .order_by_desc(plans::Column::Priority)
            .order_by_desc(plans::Column::CreatedAt)
            .order_by_desc(plans::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Into::into).collect(),
            params.get_page(),
            params.get_limit(),
            total,
        ))
    }

    pub async fn create_plan(
        &self,
        user_id: i64,
        request: CreatePurchasePlanRequest,
    ) -> AppResult<PurchasePlanResponse> {
        require_text("name", &request.name)?;
        validate_budget(request.budget_cents)?;

        let now = Utc::now();
        let plan = plans::ActiveModel {
            user_id: Set(user_id),
            name: Set(request.name.trim().to_string()),
            priority: Set(request.priority.unwrap_or(PlanPriority::Medium)),
            budget_cents: Set(request.budget_cents),
            category: Set(optional_category(request.category)),
            status: Set(PlanStatus::Planning),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Created purchase plan {} for user {user_id}", plan.id);
        let mut response: PurchasePlanResponse = plan.into();
        response.products = Some(Vec::new());
        Ok(response)
    }

    /// 计划详情, 展开候选商品、商家报价与叠加优惠
    pub async fn get_plan(&self, user_id: i64, plan_id: i64) -> AppResult<PurchasePlanResponse> {
        let plan = self.find_owned_plan(user_id, plan_id).await?;
        let products = self
            .load_products(plan.id)
            .await?
            .into_iter()
            .map(ProductTree::into_response)
            .collect::<AppResult<Vec<_>>>()?;

        let mut response: PurchasePlanResponse = plan.into();
        response.products = Some(products);
        Ok(response)
    }

    pub async fn update_plan(
        &self,
        user_id: i64,
        plan_id: i64,
        request: UpdatePurchasePlanRequest,
    ) -> AppResult<PurchasePlanResponse> {
        if let Some(name) = &request.name {
            require_text("name", name)?;
        }
        validate_budget(request.budget_cents)?;

        let plan = self.find_owned_plan(user_id, plan_id).await?;
        let mut am = plan.into_active_model();
        if let Some(name) = request.name {
            am.name = Set(name.trim().to_string());
        }
        if let Some(priority) = request.priority {
            am.priority = Set(priority);
        }
        if let Some(budget) = request.budget_cents {
            am.budget_cents = Set(Some(budget));
        }
        if request.category.is_some() {
            am.category = Set(optional_category(request.category));
        }
        if let Some(status) = request.status {
            am.status = Set(status);
        }
        if let Some(notes) = request.notes {
            am.notes = Set(Some(notes));
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.pool).await?;

        self.get_plan(user_id, plan_id).await
    }

    pub async fn delete_plan(&self, user_id: i64, plan_id: i64) -> AppResult<()> {
        let plan = self.find_owned_plan(user_id, plan_id).await?;
        let product_ids: Vec<i64> = products::Entity::find()
            .filter(products::Column::PlanId.eq(plan.id))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let txn = self.pool.begin().await?;
        delete_products(&txn, product_ids).await?;
        plans::Entity::delete_by_id(plan.id).exec(&txn).await?;
        txn.commit().await?;

        log::info!("Deleted purchase plan {plan_id} for user {user_id}");
        Ok(())
    }

    pub async fn add_product(
        &self,
        user_id: i64,
        plan_id: i64,
        request: CreateProductOptionRequest,
    ) -> AppResult<ProductOptionResponse> {
        let plan = self.find_owned_plan(user_id, plan_id).await?;
        require_text("name", &request.name)?;
        if request.list_price_cents < 0 {
            return Err(AppError::ValidationError(
                "list_price_cents must not be negative".to_string(),
            ));
        }
        let specs = match request.specs {
            None | Some(serde_json::Value::Null) => "{}".to_string(),
            Some(value @ serde_json::Value::Object(_)) => serde_json::to_string(&value)?,
            Some(_) => {
                return Err(AppError::ValidationError(
                    "specs must be a JSON object".to_string(),
                ));
            }
        };

        let product = products::ActiveModel {
            plan_id: Set(plan.id),
            name: Set(request.name.trim().to_string()),
            list_price_cents: Set(request.list_price_cents),
            specs: Set(specs),
            url: Set(request.url),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Added product option {} to plan {plan_id}", product.id);
        Ok(ProductOptionResponse::from_parts(product, Vec::new())?)
    }

    pub async fn delete_product(&self, user_id: i64, product_id: i64) -> AppResult<()> {
        let product = self.find_owned_product(user_id, product_id).await?;

        let txn = self.pool.begin().await?;
        delete_products(&txn, vec![product.id]).await?;
        txn.commit().await?;

        log::info!("Deleted product option {product_id} for user {user_id}");
        Ok(())
    }

    /// 新增商家报价, 报价与叠加优惠在同一事务内写入
    pub async fn add_merchant(
        &self,
        user_id: i64,
        product_id: i64,
        request: CreateMerchantOptionRequest,
    ) -> AppResult<MerchantOptionResponse> {
        let product = self.find_owned_product(user_id, product_id).await?;
        require_text("merchant", &request.merchant)?;
        validate_price(request.price_cents)?;
        validate_stack(&request.stack)?;

        let now = Utc::now();
        let net = savings::net_price(
            request.price_cents,
            request.stack.iter().map(|c| c.value_cents),
        );

        let txn = self.pool.begin().await?;
        let merchant = merchants::ActiveModel {
            product_option_id: Set(product.id),
            merchant: Set(request.merchant.trim().to_string()),
            price_cents: Set(request.price_cents),
            net_price_cents: Set(net),
            url: Set(request.url),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let stack = insert_stack(&txn, merchant.id, request.stack).await?;
        txn.commit().await?;

        log::info!(
            "Added merchant option {} ({}) to product {product_id}",
            merchant.id,
            merchant.merchant
        );
        Ok(MerchantOptionResponse::from_parts(merchant, stack))
    }

    /// 更新报价; stack 提供时整体替换, 到手价随之重算
    pub async fn update_merchant(
        &self,
        user_id: i64,
        merchant_id: i64,
        request: UpdateMerchantOptionRequest,
    ) -> AppResult<MerchantOptionResponse> {
        let merchant = self.find_owned_merchant(user_id, merchant_id).await?;
        if let Some(price) = request.price_cents {
            validate_price(price)?;
        }
        if let Some(stack) = &request.stack {
            validate_stack(stack)?;
        }

        let txn = self.pool.begin().await?;
        let stack = match request.stack {
            Some(new_stack) => {
                stacks::Entity::delete_many()
                    .filter(stacks::Column::MerchantOptionId.eq(merchant.id))
                    .exec(&txn)
                    .await?;
                insert_stack(&txn, merchant.id, new_stack).await?
            }
            None => {
                stacks::Entity::find()
                    .filter(stacks::Column::MerchantOptionId.eq(merchant.id))
                    .order_by_asc(stacks::Column::Id)
                    .all(&txn)
                    .await?
            }
        };

        let price = request.price_cents.unwrap_or(merchant.price_cents);
        let mut am = merchant.into_active_model();
        am.price_cents = Set(price);
        am.net_price_cents = Set(savings::net_price(
            price,
            stack.iter().map(|c| c.value_cents),
        ));
        if let Some(url) = request.url {
            am.url = Set(Some(url));
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        txn.commit().await?;

        Ok(MerchantOptionResponse::from_parts(updated, stack))
    }

    pub async fn delete_merchant(&self, user_id: i64, merchant_id: i64) -> AppResult<()> {
        let merchant = self.find_owned_merchant(user_id, merchant_id).await?;

        let txn = self.pool.begin().await?;
        stacks::Entity::delete_many()
            .filter(stacks::Column::MerchantOptionId.eq(merchant.id))
            .exec(&txn)
            .await?;
        merchants::Entity::delete_by_id(merchant.id).exec(&txn).await?;
        txn.commit().await?;

        log::info!("Deleted merchant option {merchant_id} for user {user_id}");
        Ok(())
    }

    /// 计划比价: 最优商品与商家、按计划类别推荐的卡、可用礼品卡
    pub async fn comparison(&self, user_id: i64, plan_id: i64) -> AppResult<PlanComparisonResponse> {
        let plan = self.find_owned_plan(user_id, plan_id).await?;
        let trees = self.load_products(plan.id).await?;

        let quotes: Vec<ProductQuote> = trees.iter().map(ProductTree::quote).collect();
        let comparison = savings::compare_options(&quotes, plan.budget_cents);

        let category = plan
            .category
            .as_deref()
            .map(normalize_category)
            .unwrap_or_else(|| CATCH_ALL_CATEGORY.to_string());
        let rates = self.credit_card_service.card_rates(user_id).await?;
        let recommended_card = rewards::best_card_for(&rates, &category).map(|card| {
            let reward_bp = card.reward_rate_for(&category);
            CardSuggestion {
                card_id: card.card_id,
                card_name: card.name.clone(),
                reward_value_cents: comparison
                    .best_price_cents
                    .map(|price| savings::card_reward_value(price, reward_bp))
                    .unwrap_or(0),
                reward_bp,
                category: category.clone(),
            }
        });

        let merchant_names: Vec<String> = trees
            .iter()
            .flat_map(|t| t.merchants.iter().map(|(m, _)| m.merchant.clone()))
            .collect();
        let applicable_gift_cards = self
            .gift_card_service
            .active_cards_for_merchants(user_id, &merchant_names)
            .await?;

        Ok(PlanComparisonResponse {
            plan_id: plan.id,
            comparison,
            recommended_card,
            applicable_gift_cards,
        })
    }

    async fn find_owned_plan(&self, user_id: i64, plan_id: i64) -> AppResult<plans::Model> {
        plans::Entity::find_by_id(plan_id)
            .filter(plans::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Purchase plan not found".to_string()))
    }

    async fn find_owned_product(&self, user_id: i64, product_id: i64) -> AppResult<products::Model> {
        let product = products::Entity::find_by_id(product_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product option not found".to_string()))?;
        if !self.plan_belongs_to(user_id, product.plan_id).await? {
            return Err(AppError::NotFound("Product option not found".to_string()));
        }
        Ok(product)
    }

    async fn find_owned_merchant(
        &self,
        user_id: i64,
        merchant_id: i64,
    ) -> AppResult<merchants::Model> {
        let merchant = merchants::Entity::find_by_id(merchant_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Merchant option not found".to_string()))?;
        let product = products::Entity::find_by_id(merchant.product_option_id)
            .one(&self.pool)
            .await?;
        match product {
            Some(product) if self.plan_belongs_to(user_id, product.plan_id).await? => Ok(merchant),
            _ => Err(AppError::NotFound("Merchant option not found".to_string())),
        }
    }

    async fn plan_belongs_to(&self, user_id: i64, plan_id: i64) -> AppResult<bool> {
        let count = plans::Entity::find_by_id(plan_id)
            .filter(plans::Column::UserId.eq(user_id))
            .count(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn load_products(&self, plan_id: i64) -> AppResult<Vec<ProductTree>> {
        let product_rows = products::Entity::find()
            .filter(products::Column::PlanId.eq(plan_id))
            .order_by_asc(products::Column::Id)
            .all(&self.pool)
            .await?;
        let product_ids: Vec<i64> = product_rows.iter().map(|p| p.id).collect();
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let merchant_rows = merchants::Entity::find()
            .filter(merchants::Column::ProductOptionId.is_in(product_ids))
            .order_by_asc(merchants::Column::Id)
            .all(&self.pool)
            .await?;
        let merchant_ids: Vec<i64> = merchant_rows.iter().map(|m| m.id).collect();

        let mut stack_by_merchant: HashMap<i64, Vec<stacks::Model>> = HashMap::new();
        if !merchant_ids.is_empty() {
            let stack_rows = stacks::Entity::find()
                .filter(stacks::Column::MerchantOptionId.is_in(merchant_ids))
                .order_by_asc(stacks::Column::Id)
                .all(&self.pool)
                .await?;
            for row in stack_rows {
                stack_by_merchant
                    .entry(row.merchant_option_id)
                    .or_default()
                    .push(row);
            }
        }

        let mut merchants_by_product: HashMap<i64, Vec<(merchants::Model, Vec<stacks::Model>)>> =
            HashMap::new();
        for merchant in merchant_rows {
            let stack = stack_by_merchant.remove(&merchant.id).unwrap_or_default();
            merchants_by_product
                .entry(merchant.product_option_id)
                .or_default()
                .push((merchant, stack));
        }

        Ok(product_rows
            .into_iter()
            .map(|product| ProductTree {
                merchants: merchants_by_product.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }
}

async fn insert_stack<C: ConnectionTrait>(
    db: &C,
    merchant_id: i64,
    stack: Vec<StackComponentInput>,
) -> AppResult<Vec<stacks::Model>> {
    let mut rows = Vec::with_capacity(stack.len());
    for component in stack {
        let row = stacks::ActiveModel {
            merchant_option_id: Set(merchant_id),
            kind: Set(component.kind),
            label: Set(component.label.trim().to_string()),
            value_cents: Set(component.value_cents),
            ..Default::default()
        }
        .insert(db)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

/// 删除商品及其下所有报价和叠加优惠
async fn delete_products<C: ConnectionTrait>(db: &C, product_ids: Vec<i64>) -> AppResult<()> {
    if product_ids.is_empty() {
        return Ok(());
    }
    let merchant_ids: Vec<i64> = merchants::Entity::find()
        .filter(merchants::Column::ProductOptionId.is_in(product_ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();

    if !merchant_ids.is_empty() {
        stacks::Entity::delete_many()
            .filter(stacks::Column::MerchantOptionId.is_in(merchant_ids.clone()))
            .exec(db)
            .await?;
        merchants::Entity::delete_many()
            .filter(merchants::Column::Id.is_in(merchant_ids))
            .exec(db)
            .await?;
    }
    products::Entity::delete_many()
        .filter(products::Column::Id.is_in(product_ids))
        .exec(db)
        .await?;
    Ok(())
}

fn parse_status(status: &str) -> AppResult<PlanStatus> {
    match status.trim().to_ascii_lowercase().as_str() {
        "planning" => Ok(PlanStatus::Planning),
        "purchased" => Ok(PlanStatus::Purchased),
        "abandoned" => Ok(PlanStatus::Abandoned),
        other => Err(AppError::ValidationError(format!(
            "Unknown plan status: {other}"
        ))),
    }
}

fn optional_category(category: Option<String>) -> Option<String> {
    category
        .filter(|c| !c.trim().is_empty())
        .map(|c| normalize_category(&c))
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

fn validate_budget(budget_cents: Option<i64>) -> AppResult<()> {
    if budget_cents.is_some_and(|b| b < 0) {
        return Err(AppError::ValidationError(
            "budget_cents must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price_cents: i64) -> AppResult<()> {
    if price_cents < 0 {
        return Err(AppError::ValidationError(
            "price_cents must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_stack(stack: &[StackComponentInput]) -> AppResult<()> {
    for component in stack {
        require_text("label", &component.label)?;
        if component.value_cents < 0 {
            return Err(AppError::ValidationError(
                "stack value_cents must not be negative".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StackComponentKind;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Purchased").unwrap(), PlanStatus::Purchased);
        assert!(matches!(
            parse_status("bought"),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_optional_category() {
        assert_eq!(
            optional_category(Some(" Electronics ".to_string())),
            Some("electronics".to_string())
        );
        assert_eq!(optional_category(Some("  ".to_string())), None);
        assert_eq!(optional_category(None), None);
    }

    #[test]
    fn test_validate_stack() {
        let ok = vec![StackComponentInput {
            kind: StackComponentKind::Coupon,
            label: "SAVE10".to_string(),
            value_cents: 1000,
        }];
        assert!(validate_stack(&ok).is_ok());

        let negative = vec![StackComponentInput {
            kind: StackComponentKind::Cashback,
            label: "Rakuten".to_string(),
            value_cents: -5,
        }];
        assert!(validate_stack(&negative).is_err());
    }
}
