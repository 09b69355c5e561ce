//! 信用卡返现选择: 按消费类别挑出返现比例最高的卡

use crate::entities::CreditFrequency;
use crate::utils::credit_period::periods_per_year;
use serde::Serialize;
use std::collections::BTreeSet;
use utoipa::ToSchema;

/// 没有匹配任何加成类别时使用的兜底类别
pub const CATCH_ALL_CATEGORY: &str = "other";

#[derive(Debug, Clone, PartialEq)]
pub struct CardRates {
    pub card_id: i64,
    pub name: String,
    pub annual_fee_cents: i64,
    pub base_reward_bp: i32,
    /// (category, reward_bp), category 已规范化
    pub bonus: Vec<(String, i32)>,
}

impl CardRates {
    pub fn reward_rate_for(&self, category: &str) -> i32 {
        let category = normalize_category(category);
        self.bonus
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, bp)| *bp)
            .unwrap_or(self.base_reward_bp)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct CategoryRecommendation {
    pub category: String,
    pub card_id: i64,
    pub card_name: String,
    pub reward_bp: i32,
}

/// 类别统一为去空白小写, 空串归为 "other"
pub fn normalize_category(category: &str) -> String {
    let c = category.trim().to_lowercase();
    if c.is_empty() {
        CATCH_ALL_CATEGORY.to_string()
    } else {
        c
    }
}

/// 指定类别下返现最高的卡; 同比例取年费低者, 再相同取 id 小者
pub fn best_card_for<'a>(cards: &'a [CardRates], category: &str) -> Option<&'a CardRates> {
    cards.iter().min_by_key(|card| {
        (
            std::cmp::Reverse(card.reward_rate_for(category)),
            card.annual_fee_cents,
            card.card_id,
        )
    })
}

/// 所有卡片涉及的类别 (加上 "other") 各自的最优卡, 按类别名排序
pub fn recommendations(cards: &[CardRates]) -> Vec<CategoryRecommendation> {
    let mut categories: BTreeSet<String> = cards
        .iter()
        .flat_map(|card| card.bonus.iter().map(|(c, _)| c.clone()))
        .collect();
    categories.insert(CATCH_ALL_CATEGORY.to_string());

    categories
        .into_iter()
        .filter_map(|category| {
            best_card_for(cards, &category).map(|card| CategoryRecommendation {
                reward_bp: card.reward_rate_for(&category),
                card_id: card.card_id,
                card_name: card.name.clone(),
                category,
            })
        })
        .collect()
}

/// 报销额度折算成每年总价值
pub fn annual_credit_value<I>(credits: I) -> i64
where
    I: IntoIterator<Item = (i64, CreditFrequency)>,
{
    credits
        .into_iter()
        .map(|(amount, freq)| amount * periods_per_year(freq))
        .sum()
}

/// 扣除每年报销额度后的实际年费, 可以为负
pub fn effective_annual_fee(annual_fee_cents: i64, annual_credit_value_cents: i64) -> i64 {
    annual_fee_cents - annual_credit_value_cents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: i64, fee: i64, base: i32, bonus: &[(&str, i32)]) -> CardRates {
        CardRates {
            card_id: id,
            name: format!("card-{id}"),
            annual_fee_cents: fee,
            base_reward_bp: base,
            bonus: bonus.iter().map(|(c, bp)| (c.to_string(), *bp)).collect(),
        }
    }

    #[test]
    fn test_reward_rate_falls_back_to_base() {
        let c = card(1, 0, 150, &[("dining", 300)]);
        assert_eq!(c.reward_rate_for("Dining "), 300);
        assert_eq!(c.reward_rate_for("travel"), 150);
    }

    #[test]
    fn test_best_card_for_category() {
        let cards = vec![
            card(1, 0, 150, &[("dining", 300)]),
            card(2, 9_500, 100, &[("dining", 400), ("groceries", 400)]),
            card(3, 0, 200, &[]),
        ];
        assert_eq!(best_card_for(&cards, "dining").unwrap().card_id, 2);
        assert_eq!(best_card_for(&cards, "gas").unwrap().card_id, 3);
        assert!(best_card_for(&[], "gas").is_none());
    }

    #[test]
    fn test_best_card_tie_prefers_lower_fee_then_id() {
        let cards = vec![card(5, 9_500, 200, &[]), card(4, 0, 200, &[]), card(3, 0, 200, &[])];
        assert_eq!(best_card_for(&cards, "other").unwrap().card_id, 3);
    }

    #[test]
    fn test_recommendations_cover_all_categories() {
        let cards = vec![
            card(1, 0, 150, &[("dining", 300)]),
            card(2, 9_500, 100, &[("groceries", 400)]),
        ];
        let recs = recommendations(&cards);
        let summary: Vec<(&str, i64, i32)> = recs
            .iter()
            .map(|r| (r.category.as_str(), r.card_id, r.reward_bp))
            .collect();
        assert_eq!(
            summary,
            vec![("dining", 1, 300), ("groceries", 2, 400), ("other", 1, 150)]
        );
        assert!(recommendations(&[]).is_empty());
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("  Groceries "), "groceries");
        assert_eq!(normalize_category(""), "other");
    }

    #[test]
    fn test_effective_annual_fee() {
        let credits = [
            (1_000, CreditFrequency::Monthly),
            (5_000, CreditFrequency::Semiannual),
        ];
        let value = annual_credit_value(credits);
        assert_eq!(value, 22_000);
        assert_eq!(effective_annual_fee(25_000, value), 3_000);
        assert_eq!(effective_annual_fee(9_500, 12_000), -2_500);
    }
}
