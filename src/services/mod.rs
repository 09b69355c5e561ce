pub mod calendar_service;
pub mod credit_card_service;
pub mod gift_card_service;
pub mod import_service;
pub mod purchase_plan_service;
pub mod user_service;

pub use calendar_service::*;
pub use credit_card_service::CreditCardService;
pub use gift_card_service::GiftCardService;
pub use import_service::*;
pub use purchase_plan_service::*;
pub use user_service::*;
