use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::UserId;
use crate::models::*;
use crate::services::CalendarService;
use crate::utils::calendar::MonthView;

#[utoipa::path(
    get,
    path = "/api/offers",
    tag = "calendar",
    params(
        ("from" = Option<String>, Query, description = "起始日期 YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "结束日期 YYYY-MM-DD")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "与区间相交的优惠, 按到期日排序", body = [OfferResponse]),
        (status = 400, description = "日期区间无效")
    )
)]
pub async fn list_offers(
    calendar_service: web::Data<CalendarService>,
    user: UserId,
    query: web::Query<OfferQuery>,
) -> Result<HttpResponse> {
    match calendar_service
        .list_offers(user.0, query.into_inner())
        .await
    {
        Ok(offers) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": offers
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/offers",
    tag = "calendar",
    request_body = CreateOfferRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 201, description = "创建优惠成功", body = OfferResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "关联的信用卡不存在")
    )
)]
pub async fn create_offer(
    calendar_service: web::Data<CalendarService>,
    user: UserId,
    request: web::Json<CreateOfferRequest>,
) -> Result<HttpResponse> {
    match calendar_service
        .create_offer(user.0, request.into_inner())
        .await
    {
        Ok(offer) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": offer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/offers/{id}",
    tag = "calendar",
    params(
        ("id" = i64, Path, description = "优惠 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "删除优惠成功"),
        (status = 404, description = "优惠不存在")
    )
)]
pub async fn delete_offer(
    calendar_service: web::Data<CalendarService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let offer_id = path.into_inner();
    match calendar_service.delete_offer(user.0, offer_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "id": offer_id }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/subscriptions",
    tag = "calendar",
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "订阅列表, 按下次扣费日排序", body = [SubscriptionResponse])
    )
)]
pub async fn list_subscriptions(
    calendar_service: web::Data<CalendarService>,
    user: UserId,
) -> Result<HttpResponse> {
    match calendar_service.list_subscriptions(user.0).await {
        Ok(subscriptions) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": subscriptions
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/subscriptions",
    tag = "calendar",
    request_body = CreateSubscriptionRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 201, description = "创建订阅成功", body = SubscriptionResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_subscription(
    calendar_service: web::Data<CalendarService>,
    user: UserId,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    match calendar_service
        .create_subscription(user.0, request.into_inner())
        .await
    {
        Ok(subscription) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": subscription
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/subscriptions/{id}",
    tag = "calendar",
    params(
        ("id" = i64, Path, description = "订阅 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "删除订阅成功"),
        (status = 404, description = "订阅不存在")
    )
)]
pub async fn delete_subscription(
    calendar_service: web::Data<CalendarService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let subscription_id = path.into_inner();
    match calendar_service
        .delete_subscription(user.0, subscription_id)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "id": subscription_id }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/calendar",
    tag = "calendar",
    params(
        ("year" = i32, Query, description = "年份"),
        ("month" = u32, Query, description = "月份 1-12")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "月视图: 每日优惠起止与订阅扣费", body = MonthView),
        (status = 400, description = "月份无效")
    )
)]
pub async fn get_month(
    calendar_service: web::Data<CalendarService>,
    user: UserId,
    query: web::Query<CalendarQuery>,
) -> Result<HttpResponse> {
    match calendar_service
        .month_view(user.0, query.year, query.month)
        .await
    {
        Ok(view) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": view
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn calendar_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/offers")
            .route("", web::get().to(list_offers))
            .route("", web::post().to(create_offer))
            .route("/{id}", web::delete().to(delete_offer)),
    )
    .service(
        web::scope("/subscriptions")
            .route("", web::get().to(list_subscriptions))
            .route("", web::post().to(create_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    )
    .route("/calendar", web::get().to(get_month));
}
