pub mod calendar;
pub mod common;
pub mod credit_card;
pub mod gift_card;
pub mod import;
pub mod pagination;
pub mod purchase_plan;
pub mod user;

pub use calendar::*;
pub use common::*;
pub use credit_card::*;
pub use gift_card::*;
pub use import::*;
pub use pagination::*;
pub use purchase_plan::*;
pub use user::*;
