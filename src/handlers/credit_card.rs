use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::UserId;
use crate::models::*;
use crate::services::CreditCardService;

#[utoipa::path(
    get,
    path = "/api/creditcards",
    tag = "credit_card",
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "获取信用卡列表成功", body = [CreditCardResponse]),
        (status = 400, description = "缺少 userId")
    )
)]
pub async fn list_credit_cards(
    credit_card_service: web::Data<CreditCardService>,
    user: UserId,
) -> Result<HttpResponse> {
    match credit_card_service.list_cards(user.0).await {
        Ok(cards) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cards
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/creditcards/{id}",
    tag = "credit_card",
    params(
        ("id" = i64, Path, description = "信用卡 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "获取信用卡成功", body = CreditCardResponse),
        (status = 404, description = "信用卡不存在")
    )
)]
pub async fn get_credit_card(
    credit_card_service: web::Data<CreditCardService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match credit_card_service.get_card(user.0, path.into_inner()).await {
        Ok(card) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/creditcards",
    tag = "credit_card",
    request_body = CreateCreditCardRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 201, description = "创建信用卡成功", body = CreditCardResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_credit_card(
    credit_card_service: web::Data<CreditCardService>,
    user: UserId,
    request: web::Json<CreateCreditCardRequest>,
) -> Result<HttpResponse> {
    match credit_card_service
        .create_card(user.0, request.into_inner())
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
    path = "/api/creditcards/{id}",
    tag = "credit_card",
    params(
        ("id" = i64, Path, description = "信用卡 ID")
    ),
    request_body = UpdateCreditCardRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "更新信用卡成功", body = CreditCardResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "信用卡不存在")
    )
)]
pub async fn update_credit_card(
    credit_card_service: web::Data<CreditCardService>,
    user: UserId,
    path: web::Path<i64>,
    request: web::Json<UpdateCreditCardRequest>,
) -> Result<HttpResponse> {
    match credit_card_service
        .update_card(user.0, path.into_inner(), request.into_inner())
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
    path = "/api/creditcards/{id}",
    tag = "credit_card",
    params(
        ("id" = i64, Path, description = "信用卡 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "删除信用卡成功"),
        (status = 404, description = "信用卡不存在")
    )
)]
pub async fn delete_credit_card(
    credit_card_service: web::Data<CreditCardService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let card_id = path.into_inner();
    match credit_card_service.delete_card(user.0, card_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "id": card_id }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/creditcards/recommendations",
    tag = "credit_card",
    params(
        ("category" = Option<String>, Query, description = "只看某个消费类别")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "各类别返现最高的卡", body = [CategoryRecommendation])
    )
)]
pub async fn get_recommendations(
    credit_card_service: web::Data<CreditCardService>,
    user: UserId,
    query: web::Query<RecommendationQuery>,
) -> Result<HttpResponse> {
    match credit_card_service
        .recommendations(user.0, query.category.as_deref())
        .await
    {
        Ok(recommendations) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": recommendations
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/creditcards/{id}/credits",
    tag = "credit_card",
    params(
        ("id" = i64, Path, description = "信用卡 ID")
    ),
    request_body = CreateCardCreditRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 201, description = "添加报销额度成功", body = CardCreditResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "信用卡不存在")
    )
)]
pub async fn add_credit(
    credit_card_service: web::Data<CreditCardService>,
    user: UserId,
    path: web::Path<i64>,
    request: web::Json<CreateCardCreditRequest>,
) -> Result<HttpResponse> {
    match credit_card_service
        .add_credit(user.0, path.into_inner(), request.into_inner())
        .await
    {
        Ok(credit) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": credit
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/credits/{id}/use",
    tag = "credit_card",
    params(
        ("id" = i64, Path, description = "报销额度 ID")
    ),
    request_body = UseCreditRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "记录使用成功", body = CardCreditResponse),
        (status = 400, description = "超出本周期剩余额度"),
        (status = 404, description = "报销额度不存在")
    )
)]
pub async fn use_credit(
    credit_card_service: web::Data<CreditCardService>,
    user: UserId,
    path: web::Path<i64>,
    request: web::Json<UseCreditRequest>,
) -> Result<HttpResponse> {
    match credit_card_service
        .use_credit(user.0, path.into_inner(), request.into_inner())
        .await
    {
        Ok(credit) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": credit
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/credits/{id}",
    tag = "credit_card",
    params(
        ("id" = i64, Path, description = "报销额度 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "删除报销额度成功"),
        (status = 404, description = "报销额度不存在")
    )
)]
pub async fn delete_credit(
    credit_card_service: web::Data<CreditCardService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let credit_id = path.into_inner();
    match credit_card_service.delete_credit(user.0, credit_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "id": credit_id }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn credit_card_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/creditcards")
            .route("", web::get().to(list_credit_cards))
            .route("", web::post().to(create_credit_card))
            .route("/recommendations", web::get().to(get_recommendations))
            .route("/{id}", web::get().to(get_credit_card))
            .route("/{id}", web::put().to(update_credit_card))
            .route("/{id}", web::delete().to(delete_credit_card))
            .route("/{id}/credits", web::post().to(add_credit)),
    )
    .service(
        web::scope("/credits")
            .route("/{id}/use", web::post().to(use_credit))
            .route("/{id}", web::delete().to(delete_credit)),
    );
}
