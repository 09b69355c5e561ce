use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::UserId;
use crate::models::*;
use crate::services::UserService;

#[utoipa::path(
    get,
    path = "/api/user/profile",
    tag = "user",
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "获取用户资料成功", body = UserResponse),
        (status = 400, description = "缺少 userId")
    )
)]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    user: UserId,
) -> Result<HttpResponse> {
    match user_service.get_profile(user.0).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/user/profile",
    tag = "user",
    request_body = UpdateUserRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "更新用户资料成功", body = UserResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn update_profile(
    user_service: web::Data<UserService>,
    user: UserId,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    match user_service
        .update_profile(user.0, request.into_inner())
        .await
    {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile)),
    );
}
