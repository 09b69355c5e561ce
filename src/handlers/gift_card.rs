use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::UserId;
use crate::models::*;
use crate::services::GiftCardService;

#[utoipa::path(
    get,
    path = "/api/giftcards",
    tag = "gift_card",
    params(
        ("status" = Option<String>, Query, description = "active / spent")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "获取礼品卡列表成功", body = [GiftCardResponse]),
        (status = 400, description = "status 无效")
    )
)]
pub async fn list_gift_cards(
    gift_card_service: web::Data<GiftCardService>,
    user: UserId,
    query: web::Query<GiftCardQuery>,
) -> Result<HttpResponse> {
    match gift_card_service
        .list_gift_cards(user.0, query.status.as_deref())
        .await
    {
        Ok(cards) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cards
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/giftcards",
    tag = "gift_card",
    request_body = CreateGiftCardRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 201, description = "创建礼品卡成功", body = GiftCardResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_gift_card(
    gift_card_service: web::Data<GiftCardService>,
    user: UserId,
    request: web::Json<CreateGiftCardRequest>,
) -> Result<HttpResponse> {
    match gift_card_service
        .create_gift_card(user.0, request.into_inner())
        .await
    {
        Ok(card) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/giftcards/{id}",
    tag = "gift_card",
    params(
        ("id" = i64, Path, description = "礼品卡 ID")
    ),
    request_body = UpdateGiftCardRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "更新礼品卡成功", body = GiftCardResponse),
        (status = 404, description = "礼品卡不存在")
    )
)]
pub async fn update_gift_card(
    gift_card_service: web::Data<GiftCardService>,
    user: UserId,
    path: web::Path<i64>,
    request: web::Json<UpdateGiftCardRequest>,
) -> Result<HttpResponse> {
    match gift_card_service
        .update_gift_card(user.0, path.into_inner(), request.into_inner())
        .await
    {
        Ok(card) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/giftcards/{id}",
    tag = "gift_card",
    params(
        ("id" = i64, Path, description = "礼品卡 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "删除礼品卡成功"),
        (status = 404, description = "礼品卡不存在")
    )
)]
pub async fn delete_gift_card(
    gift_card_service: web::Data<GiftCardService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let gift_card_id = path.into_inner();
    match gift_card_service.delete_gift_card(user.0, gift_card_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "id": gift_card_id }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/giftcards/{id}/spend",
    tag = "gift_card",
    params(
        ("id" = i64, Path, description = "礼品卡 ID")
    ),
    request_body = SpendGiftCardRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "扣减余额成功", body = GiftCardResponse),
        (status = 400, description = "余额不足"),
        (status = 404, description = "礼品卡不存在")
    )
)]
pub async fn spend_gift_card(
    gift_card_service: web::Data<GiftCardService>,
    user: UserId,
    path: web::Path<i64>,
    request: web::Json<SpendGiftCardRequest>,
) -> Result<HttpResponse> {
    match gift_card_service
        .spend(user.0, path.into_inner(), request.into_inner())
        .await
    {
        Ok(card) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/giftcards/summary",
    tag = "gift_card",
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "按商家汇总可用余额", body = GiftCardSummaryResponse)
    )
)]
pub async fn get_summary(
    gift_card_service: web::Data<GiftCardService>,
    user: UserId,
) -> Result<HttpResponse> {
    match gift_card_service.summary(user.0).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn gift_card_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/giftcards")
            .route("", web::get().to(list_gift_cards))
            .route("", web::post().to(create_gift_card))
            .route("/summary", web::get().to(get_summary))
            .route("/{id}", web::put().to(update_gift_card))
            .route("/{id}", web::delete().to(delete_gift_card))
            .route("/{id}/spend", web::post().to(spend_gift_card)),
    );
}
