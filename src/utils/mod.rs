pub mod calendar;
pub mod credit_period;
pub mod money;
pub mod rewards;
pub mod savings;

pub use money::{format_cents, parse_money_to_cents, parse_percent_to_bp, validate_last_four};
pub use rewards::{CardRates, CategoryRecommendation, normalize_category};
pub use savings::{MerchantQuote, PlanComparison, ProductQuote, ProductSavings};
