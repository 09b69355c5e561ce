pub mod calendar;
pub mod credit_card;
pub mod gift_card;
pub mod health;
pub mod import;
pub mod purchase_plan;
pub mod user;

pub use calendar::calendar_config;
pub use credit_card::credit_card_config;
pub use gift_card::gift_card_config;
pub use health::health_config;
pub use import::import_config;
pub use purchase_plan::purchase_plan_config;
pub use user::user_config;

use crate::error::AppError;
use crate::middlewares::CurrentUser;
use crate::services::UserService;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

/// 当前请求所属用户的内部 id
///
/// 由 `UserScopeMiddleware` 放入的 subject 解析而来, 首次出现的 subject 会自动建档.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub i64);

impl FromRequest for UserId {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let subject = req.extensions().get::<CurrentUser>().cloned();
        let user_service = req.app_data::<web::Data<UserService>>().cloned();

        Box::pin(async move {
            let CurrentUser(subject) =
                subject.ok_or_else(|| AppError::ValidationError("userId is required".to_string()))?;
            let user_service = user_service
                .ok_or_else(|| AppError::InternalError("UserService is not registered".to_string()))?;
            let user = user_service.ensure_user(&subject).await?;
            Ok(UserId(user.id))
        })
    }
}

/// 全部 `/api` 路由
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(user_config)
            .configure(credit_card_config)
            .configure(gift_card_config)
            .configure(purchase_plan_config)
            .configure(calendar_config)
            .configure(import_config),
    );
}
