use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::config::PlannerConfig;
use crate::handlers::UserId;
use crate::models::*;
use crate::services::PurchasePlanService;

#[utoipa::path(
    get,
    path = "/api/purchase-plans",
    tag = "purchase_plan",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量"),
        ("status" = Option<String>, Query, description = "planning / purchased / abandoned")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "获取购买计划列表成功, 高优先级在前"),
        (status = 400, description = "status 无效")
    )
)]
pub async fn list_plans(
    purchase_plan_service: web::Data<PurchasePlanService>,
    planner: web::Data<PlannerConfig>,
    user: UserId,
    query: web::Query<PurchasePlanQuery>,
) -> Result<HttpResponse> {
    match purchase_plan_service
        .list_plans(user.0, query.into_inner(), planner.default_page_size)
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/purchase-plans",
    tag = "purchase_plan",
    request_body = CreatePurchasePlanRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 201, description = "创建购买计划成功", body = PurchasePlanResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_plan(
    purchase_plan_service: web::Data<PurchasePlanService>,
    user: UserId,
    request: web::Json<CreatePurchasePlanRequest>,
) -> Result<HttpResponse> {
    match purchase_plan_service
        .create_plan(user.0, request.into_inner())
        .await
    {
        Ok(plan) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": plan
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/purchase-plans/{id}",
    tag = "purchase_plan",
    params(
        ("id" = i64, Path, description = "购买计划 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "计划详情, 含候选商品与商家报价", body = PurchasePlanResponse),
        (status = 404, description = "购买计划不存在")
    )
)]
pub async fn get_plan(
    purchase_plan_service: web::Data<PurchasePlanService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match purchase_plan_service.get_plan(user.0, path.into_inner()).await {
        Ok(plan) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plan
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/purchase-plans/{id}",
    tag = "purchase_plan",
    params(
        ("id" = i64, Path, description = "购买计划 ID")
    ),
    request_body = UpdatePurchasePlanRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "更新购买计划成功", body = PurchasePlanResponse),
        (status = 404, description = "购买计划不存在")
    )
)]
pub async fn update_plan(
    purchase_plan_service: web::Data<PurchasePlanService>,
    user: UserId,
    path: web::Path<i64>,
    request: web::Json<UpdatePurchasePlanRequest>,
) -> Result<HttpResponse> {
    match purchase_plan_service
        .update_plan(user.0, path.into_inner(), request.into_inner())
        .await
    {
        Ok(plan) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": plan
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/purchase-plans/{id}",
    tag = "purchase_plan",
    params(
        ("id" = i64, Path, description = "购买计划 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "删除购买计划成功"),
        (status = 404, description = "购买计划不存在")
    )
)]
pub async fn delete_plan(
    purchase_plan_service: web::Data<PurchasePlanService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let plan_id = path.into_inner();
    match purchase_plan_service.delete_plan(user.0, plan_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "id": plan_id }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/purchase-plans/{id}/comparison",
    tag = "purchase_plan",
    params(
        ("id" = i64, Path, description = "购买计划 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "比价结果、推荐用卡与可用礼品卡", body = PlanComparisonResponse),
        (status = 404, description = "购买计划不存在")
    )
)]
pub async fn get_comparison(
    purchase_plan_service: web::Data<PurchasePlanService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match purchase_plan_service
        .comparison(user.0, path.into_inner())
        .await
    {
        Ok(comparison) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": comparison
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/purchase-plans/{id}/products",
    tag = "purchase_plan",
    params(
        ("id" = i64, Path, description = "购买计划 ID")
    ),
    request_body = CreateProductOptionRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 201, description = "添加候选商品成功", body = ProductOptionResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "购买计划不存在")
    )
)]
pub async fn add_product(
    purchase_plan_service: web::Data<PurchasePlanService>,
    user: UserId,
    path: web::Path<i64>,
    request: web::Json<CreateProductOptionRequest>,
) -> Result<HttpResponse> {
    match purchase_plan_service
        .add_product(user.0, path.into_inner(), request.into_inner())
        .await
    {
        Ok(product) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": product
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "purchase_plan",
    params(
        ("id" = i64, Path, description = "候选商品 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "删除候选商品成功"),
        (status = 404, description = "候选商品不存在")
    )
)]
pub async fn delete_product(
    purchase_plan_service: web::Data<PurchasePlanService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let product_id = path.into_inner();
    match purchase_plan_service.delete_product(user.0, product_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "id": product_id }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/merchants",
    tag = "purchase_plan",
    params(
        ("id" = i64, Path, description = "候选商品 ID")
    ),
    request_body = CreateMerchantOptionRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 201, description = "添加商家报价成功", body = MerchantOptionResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "候选商品不存在")
    )
)]
pub async fn add_merchant(
    purchase_plan_service: web::Data<PurchasePlanService>,
    user: UserId,
    path: web::Path<i64>,
    request: web::Json<CreateMerchantOptionRequest>,
) -> Result<HttpResponse> {
    match purchase_plan_service
        .add_merchant(user.0, path.into_inner(), request.into_inner())
        .await
    {
        Ok(merchant) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": merchant
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/merchants/{id}",
    tag = "purchase_plan",
    params(
        ("id" = i64, Path, description = "商家报价 ID")
    ),
    request_body = UpdateMerchantOptionRequest,
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "更新商家报价成功", body = MerchantOptionResponse),
        (status = 400, description = "请求参数错误"),
        (status = 404, description = "商家报价不存在")
    )
)]
pub async fn update_merchant(
    purchase_plan_service: web::Data<PurchasePlanService>,
    user: UserId,
    path: web::Path<i64>,
    request: web::Json<UpdateMerchantOptionRequest>,
) -> Result<HttpResponse> {
    match purchase_plan_service
        .update_merchant(user.0, path.into_inner(), request.into_inner())
        .await
    {
        Ok(merchant) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": merchant
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/merchants/{id}",
    tag = "purchase_plan",
    params(
        ("id" = i64, Path, description = "商家报价 ID")
    ),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "删除商家报价成功"),
        (status = 404, description = "商家报价不存在")
    )
)]
pub async fn delete_merchant(
    purchase_plan_service: web::Data<PurchasePlanService>,
    user: UserId,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let merchant_id = path.into_inner();
    match purchase_plan_service
        .delete_merchant(user.0, merchant_id)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "id": merchant_id }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn purchase_plan_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/purchase-plans")
            .route("", web::get().to(list_plans))
            .route("", web::post().to(create_plan))
            .route("/{id}", web::get().to(get_plan))
            .route("/{id}", web::put().to(update_plan))
            .route("/{id}", web::delete().to(delete_plan))
            .route("/{id}/comparison", web::get().to(get_comparison))
            .route("/{id}/products", web::post().to(add_product)),
    )
    .service(
        web::scope("/products")
            .route("/{id}", web::delete().to(delete_product))
            .route("/{id}/merchants", web::post().to(add_merchant)),
    )
    .service(
        web::scope("/merchants")
            .route("/{id}", web::put().to(update_merchant))
            .route("/{id}", web::delete().to(delete_merchant)),
    );
}
