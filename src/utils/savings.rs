//! 叠加优惠计算
//!
//! 全部为纯函数, 输入是已经从数据库取出的小列表:
//! - 叠加优惠合计 / 到手价 / 节省百分比
//! - 商家比价 (到手价最低者胜出)
//! - 计划内多个候选商品的比价与预算判断

use serde::Serialize;
use utoipa::ToSchema;

/// 单个商家报价
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantQuote {
    pub merchant_option_id: i64,
    pub merchant: String,
    pub price_cents: i64,
    /// 叠加优惠各项金额
    pub stack_values: Vec<i64>,
}

impl MerchantQuote {
    pub fn stack_savings(&self) -> i64 {
        stack_savings(self.stack_values.iter().copied())
    }

    pub fn net_price(&self) -> i64 {
        net_price(self.price_cents, self.stack_values.iter().copied())
    }

    /// 实际生效的优惠额 (不会超过标价)
    pub fn applied_savings(&self) -> i64 {
        self.price_cents.max(0) - self.net_price()
    }
}

/// 候选商品及其各商家报价
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuote {
    pub product_option_id: i64,
    pub name: String,
    pub list_price_cents: i64,
    pub merchants: Vec<MerchantQuote>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct ProductSavings {
    pub product_option_id: i64,
    pub name: String,
    pub best_merchant_option_id: Option<i64>,
    pub best_merchant: Option<String>,
    /// 比较基准: 最优商家标价, 无商家时为商品标价
    pub reference_price_cents: i64,
    /// 到手价: 最优商家的 net price, 无商家时回退为商品标价
    pub effective_price_cents: i64,
    pub savings_cents: i64,
    pub percent_saved: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct PlanComparison {
    pub products: Vec<ProductSavings>,
    pub best_product_option_id: Option<i64>,
    pub best_price_cents: Option<i64>,
    /// 仅当计划设置了预算时有值
    pub within_budget: Option<bool>,
    pub budget_remaining_cents: Option<i64>,
}

/// 叠加优惠合计
pub fn stack_savings<I>(values: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    values.into_iter().fold(0i64, |acc, v| acc.saturating_add(v))
}

/// 到手价 = max(标价 - 叠加优惠, 0)
pub fn net_price<I>(price_cents: i64, values: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    price_cents.saturating_sub(stack_savings(values)).max(0)
}

/// 节省百分比, 保留两位小数, 区间 [0, 100]; 原价 <= 0 时返回 0
pub fn percent_saved(original_cents: i64, savings_cents: i64) -> f64 {
    if original_cents <= 0 {
        return 0.0;
    }
    let pct = savings_cents as f64 / original_cents as f64 * 100.0;
    ((pct * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

/// 到手价最低的商家; 同价取标价更低者, 仍相同则保持输入顺序
pub fn best_merchant(options: &[MerchantQuote]) -> Option<&MerchantQuote> {
    options.iter().reduce(|best, candidate| {
        let key = |q: &MerchantQuote| (q.net_price(), q.price_cents);
        if key(candidate) < key(best) {
            candidate
        } else {
            best
        }
    })
}

/// 商品到手价: 有商家报价取最优商家, 否则回退到商品标价
pub fn effective_price(list_price_cents: i64, options: &[MerchantQuote]) -> i64 {
    best_merchant(options)
        .map(MerchantQuote::net_price)
        .unwrap_or(list_price_cents.max(0))
}

/// 按卡片返现比例折算返现金额, 四舍五入到美分
pub fn card_reward_value(price_cents: i64, rate_bp: i32) -> i64 {
    if price_cents <= 0 || rate_bp <= 0 {
        return 0;
    }
    (price_cents as i128 * rate_bp as i128 + 5_000).div_euclid(10_000) as i64
}

pub fn product_savings(product: &ProductQuote) -> ProductSavings {
    match best_merchant(&product.merchants) {
        Some(best) => {
            let savings = best.applied_savings();
            ProductSavings {
                product_option_id: product.product_option_id,
                name: product.name.clone(),
                best_merchant_option_id: Some(best.merchant_option_id),
                best_merchant: Some(best.merchant.clone()),
                reference_price_cents: best.price_cents,
                effective_price_cents: best.net_price(),
                savings_cents: savings,
                percent_saved: percent_saved(best.price_cents, savings),
            }
        }
        None => ProductSavings {
            product_option_id: product.product_option_id,
            name: product.name.clone(),
            best_merchant_option_id: None,
            best_merchant: None,
            reference_price_cents: product.list_price_cents.max(0),
            effective_price_cents: product.list_price_cents.max(0),
            savings_cents: 0,
            percent_saved: 0.0,
        },
    }
}

/// 计划比价: 每个商品的最优商家与节省, 以及整体最优商品和预算判断
pub fn compare_options(products: &[ProductQuote], budget_cents: Option<i64>) -> PlanComparison {
    let rows: Vec<ProductSavings> = products.iter().map(product_savings).collect();

    let best = rows.iter().reduce(|best, candidate| {
        if candidate.effective_price_cents < best.effective_price_cents {
            candidate
        } else {
            best
        }
    });

    let best_product_option_id = best.map(|b| b.product_option_id);
    let best_price_cents = best.map(|b| b.effective_price_cents);

    let (within_budget, budget_remaining_cents) = match (budget_cents, best_price_cents) {
        (Some(budget), Some(price)) => (Some(price <= budget), Some(budget - price)),
        (Some(budget), None) => (None, Some(budget)),
        (None, _) => (None, None),
    };

    PlanComparison {
        products: rows,
        best_product_option_id,
        best_price_cents,
        within_budget,
        budget_remaining_cents,
    }
}
