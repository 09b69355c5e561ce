use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::UserId;
use crate::models::*;
use crate::services::{ImportService, parse_credit_cards_csv, parse_gift_cards_csv};

#[utoipa::path(
    post,
    path = "/api/import/creditcards",
    tag = "import",
    request_body(content = String, content_type = "text/csv",
        description = "issuer,name,last_four,annual_fee,base_rate,bonus_categories"),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "导入完成", body = ImportSummary),
        (status = 400, description = "CSV 某一行无效, 整批不写入")
    )
)]
pub async fn import_credit_cards(
    import_service: web::Data<ImportService>,
    user: UserId,
    body: String,
) -> Result<HttpResponse> {
    let rows = match parse_credit_cards_csv(body.as_bytes()) {
        Ok(rows) => rows,
        Err(e) => return Ok(e.error_response()),
    };
    match import_service.import_credit_cards(user.0, rows).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/import/giftcards",
    tag = "import",
    request_body(content = String, content_type = "text/csv",
        description = "merchant,card_number,balance,expires_on"),
    security(
        ("user_id" = [])
    ),
    responses(
        (status = 200, description = "导入完成", body = ImportSummary),
        (status = 400, description = "CSV 某一行无效, 整批不写入")
    )
)]
pub async fn import_gift_cards(
    import_service: web::Data<ImportService>,
    user: UserId,
    body: String,
) -> Result<HttpResponse> {
    let rows = match parse_gift_cards_csv(body.as_bytes()) {
        Ok(rows) => rows,
        Err(e) => return Ok(e.error_response()),
    };
    match import_service.import_gift_cards(user.0, rows).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn import_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/import")
            .route("/creditcards", web::post().to(import_credit_cards))
            .route("/giftcards", web::post().to(import_gift_cards)),
    );
}
