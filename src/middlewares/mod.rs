pub mod cors;
pub mod user_scope;

pub use cors::create_cors;
pub use user_scope::{CurrentUser, UserScopeMiddleware};
