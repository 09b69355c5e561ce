pub mod card_bonus_categories;
pub mod card_credits;
pub mod credit_cards;
pub mod gift_cards;
pub mod merchant_options;
pub mod offers;
pub mod product_options;
pub mod purchase_plans;
pub mod stack_components;
pub mod subscriptions;
pub mod users;

pub use card_bonus_categories as card_bonus_category_entity;
pub use card_credits as card_credit_entity;
pub use credit_cards as credit_card_entity;
pub use gift_cards as gift_card_entity;
pub use merchant_options as merchant_option_entity;
pub use offers as offer_entity;
pub use product_options as product_option_entity;
pub use purchase_plans as purchase_plan_entity;
pub use stack_components as stack_component_entity;
pub use subscriptions as subscription_entity;
pub use users as user_entity;

pub use card_credits::CreditFrequency;
pub use gift_cards::GiftCardStatus;
pub use purchase_plans::{PlanPriority, PlanStatus};
pub use stack_components::StackComponentKind;
pub use subscriptions::BillingCycle;
