mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{Value, json};

use common::{Services, setup_pool};

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri)
}

fn post(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_json(body)
}

#[actix_web::test]
async fn health_is_public() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let resp = test::call_service(&app, get("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"success": true, "data": {"status": "ok"}}));
}

#[actix_web::test]
async fn missing_user_id_is_rejected() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let err = test::try_call_service(&app, get("/api/giftcards").to_request())
        .await
        .err()
        .expect("request without userId must fail");
    let resp = err.error_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn user_header_is_accepted() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let req = get("/api/user/profile")
        .insert_header(("X-User-Id", "auth0|alice"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["external_id"], "auth0|alice");
}

#[actix_web::test]
async fn gift_card_spend_flow() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let created: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/giftcards?userId=alice",
            json!({"merchant": "Target", "balance_cents": 5000}),
        )
        .to_request(),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["status"], "active");

    // 超额扣款
    let resp = test::call_service(
        &app,
        post(
            &format!("/api/giftcards/{id}/spend?userId=alice"),
            json!({"amount_cents": 6000}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let spent: Value = test::call_and_read_body_json(
        &app,
        post(
            &format!("/api/giftcards/{id}/spend?userId=alice"),
            json!({"amount_cents": 5000}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(spent["data"]["balance_cents"], 0);
    assert_eq!(spent["data"]["status"], "spent");

    let active: Value = test::call_and_read_body_json(
        &app,
        get("/api/giftcards?userId=alice&status=active").to_request(),
    )
    .await;
    assert_eq!(active["data"].as_array().unwrap().len(), 0);

    let resp = test::call_service(
        &app,
        get("/api/giftcards?userId=alice&status=lost").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn gift_card_summary_groups_by_merchant() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    for (merchant, balance) in [("Target", 2500), ("Amazon", 1000), ("target", 5000)] {
        let resp = test::call_service(
            &app,
            post(
                "/api/giftcards?userId=alice",
                json!({"merchant": merchant, "balance_cents": balance}),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let summary: Value = test::call_and_read_body_json(
        &app,
        get("/api/giftcards/summary?userId=alice").to_request(),
    )
    .await;
    assert_eq!(summary["data"]["total_balance_cents"], 8500);
    let merchants = summary["data"]["merchants"].as_array().unwrap();
    assert_eq!(merchants.len(), 2);
    assert_eq!(merchants[0]["merchant"], "Target");
    assert_eq!(merchants[0]["card_count"], 2);
}

#[actix_web::test]
async fn rows_are_scoped_to_their_user() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let card: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/creditcards?userId=alice",
            json!({"issuer": "Chase", "name": "Freedom Flex", "last_four": "1111"}),
        )
        .to_request(),
    )
    .await;
    let card_id = card["data"]["id"].as_i64().unwrap();
    test::call_service(
        &app,
        post(
            "/api/giftcards?userId=alice",
            json!({"merchant": "Costco", "balance_cents": 10000}),
        )
        .to_request(),
    )
    .await;

    let bob_cards: Value =
        test::call_and_read_body_json(&app, get("/api/creditcards?userId=bob").to_request()).await;
    assert_eq!(bob_cards["data"], json!([]));
    let bob_gift_cards: Value =
        test::call_and_read_body_json(&app, get("/api/giftcards?userId=bob").to_request()).await;
    assert_eq!(bob_gift_cards["data"], json!([]));

    let resp = test::call_service(
        &app,
        get(&format!("/api/creditcards/{card_id}?userId=bob")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/creditcards/{card_id}?userId=bob"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let alice_cards: Value =
        test::call_and_read_body_json(&app, get("/api/creditcards?userId=alice").to_request())
            .await;
    assert_eq!(alice_cards["data"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn credit_cards_with_credits_and_recommendations() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let sapphire: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/creditcards?userId=alice",
            json!({
                "issuer": "Chase",
                "name": "Sapphire Preferred",
                "annual_fee_cents": 9500,
                "base_reward_bp": 100,
                "bonus_categories": [
                    {"category": "Dining", "reward_bp": 300},
                    {"category": "travel", "reward_bp": 200}
                ]
            }),
        )
        .to_request(),
    )
    .await;
    let sapphire_id = sapphire["data"]["id"].as_i64().unwrap();
    assert_eq!(sapphire["data"]["bonus_categories"][0]["category"], "dining");

    let double_cash: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/creditcards?userId=alice",
            json!({"issuer": "Citi", "name": "Double Cash", "base_reward_bp": 200}),
        )
        .to_request(),
    )
    .await;
    let double_cash_id = double_cash["data"]["id"].as_i64().unwrap();

    // travel 两张卡都是 2%, 年费低的胜出
    let recs: Value = test::call_and_read_body_json(
        &app,
        get("/api/creditcards/recommendations?userId=alice").to_request(),
    )
    .await;
    let recs = recs["data"].as_array().unwrap();
    let by_category = |c: &str| {
        recs.iter()
            .find(|r| r["category"] == c)
            .cloned()
            .unwrap_or(Value::Null)
    };
    assert_eq!(by_category("dining")["card_id"], sapphire_id);
    assert_eq!(by_category("dining")["reward_bp"], 300);
    assert_eq!(by_category("travel")["card_id"], double_cash_id);
    assert_eq!(by_category("other")["card_id"], double_cash_id);

    let single: Value = test::call_and_read_body_json(
        &app,
        get("/api/creditcards/recommendations?userId=alice&category=DINING").to_request(),
    )
    .await;
    assert_eq!(single["data"].as_array().unwrap().len(), 1);

    // 每月 $10 报销, 年度价值 $120
    let credit: Value = test::call_and_read_body_json(
        &app,
        post(
            &format!("/api/creditcards/{sapphire_id}/credits?userId=alice"),
            json!({"name": "Dining credit", "amount_cents": 1000, "frequency": "monthly"}),
        )
        .to_request(),
    )
    .await;
    let credit_id = credit["data"]["id"].as_i64().unwrap();
    assert_eq!(credit["data"]["remaining_cents"], 1000);

    let used: Value = test::call_and_read_body_json(
        &app,
        post(
            &format!("/api/credits/{credit_id}/use?userId=alice"),
            json!({"amount_cents": 600}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(used["data"]["remaining_cents"], 400);

    let resp = test::call_service(
        &app,
        post(
            &format!("/api/credits/{credit_id}/use?userId=alice"),
            json!({"amount_cents": 500}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let card: Value = test::call_and_read_body_json(
        &app,
        get(&format!("/api/creditcards/{sapphire_id}?userId=alice")).to_request(),
    )
    .await;
    assert_eq!(card["data"]["annual_credit_value_cents"], 12000);
    assert_eq!(card["data"]["effective_annual_fee_cents"], -2500);
}

#[actix_web::test]
async fn credit_card_validation_errors() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let resp = test::call_service(
        &app,
        post(
            "/api/creditcards?userId=alice",
            json!({"issuer": "Amex", "name": "Gold", "last_four": "12"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        post(
            "/api/creditcards?userId=alice",
            json!({
                "issuer": "Amex",
                "name": "Gold",
                "bonus_categories": [
                    {"category": "dining", "reward_bp": 400},
                    {"category": "Dining", "reward_bp": 300}
                ]
            }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn purchase_plan_comparison_picks_lowest_net_price() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    test::call_service(
        &app,
        post(
            "/api/creditcards?userId=alice",
            json!({
                "issuer": "Amazon",
                "name": "Prime Visa",
                "bonus_categories": [{"category": "electronics", "reward_bp": 500}]
            }),
        )
        .to_request(),
    )
    .await;
    test::call_service(
        &app,
        post(
            "/api/giftcards?userId=alice",
            json!({"merchant": "best buy", "balance_cents": 2500}),
        )
        .to_request(),
    )
    .await;

    let plan: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/purchase-plans?userId=alice",
            json!({"name": "Headphones", "budget_cents": 800, "category": "Electronics", "priority": "high"}),
        )
        .to_request(),
    )
    .await;
    let plan_id = plan["data"]["id"].as_i64().unwrap();

    let product: Value = test::call_and_read_body_json(
        &app,
        post(
            &format!("/api/purchase-plans/{plan_id}/products?userId=alice"),
            json!({"name": "WH-1000XM5", "list_price_cents": 2500, "specs": {"color": "black"}}),
        )
        .to_request(),
    )
    .await;
    let product_id = product["data"]["id"].as_i64().unwrap();
    assert_eq!(product["data"]["specs"]["color"], "black");

    let mut merchant_ids = Vec::new();
    for (merchant, price, stack) in [
        ("Amazon", 1500, json!([{"kind": "coupon", "label": "CLIP5", "value_cents": 500}])),
        ("Walmart", 2000, json!([])),
        (
            "Best Buy",
            1000,
            json!([
                {"kind": "store_promo", "label": "Open box", "value_cents": 300},
                {"kind": "cashback", "label": "Rakuten", "value_cents": 200}
            ]),
        ),
    ] {
        let created: Value = test::call_and_read_body_json(
            &app,
            post(
                &format!("/api/products/{product_id}/merchants?userId=alice"),
                json!({"merchant": merchant, "price_cents": price, "stack": stack}),
            )
            .to_request(),
        )
        .await;
        merchant_ids.push(created["data"]["id"].as_i64().unwrap());
    }

    // 到手价 [1000, 2000, 500]
    let comparison: Value = test::call_and_read_body_json(
        &app,
        get(&format!("/api/purchase-plans/{plan_id}/comparison?userId=alice")).to_request(),
    )
    .await;
    let data = &comparison["data"];
    let product_row = &data["comparison"]["products"][0];
    assert_eq!(product_row["best_merchant_option_id"], merchant_ids[2]);
    assert_eq!(product_row["effective_price_cents"], 500);
    assert_eq!(product_row["savings_cents"], 500);
    assert_eq!(product_row["percent_saved"], 50.0);
    assert_eq!(data["comparison"]["best_price_cents"], 500);
    assert_eq!(data["comparison"]["within_budget"], true);
    assert_eq!(data["comparison"]["budget_remaining_cents"], 300);
    assert_eq!(data["recommended_card"]["reward_bp"], 500);
    assert_eq!(data["recommended_card"]["reward_value_cents"], 25);
    assert_eq!(data["applicable_gift_cards"].as_array().unwrap().len(), 1);

    // 替换叠加优惠后重算到手价
    let updated: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/merchants/{}?userId=alice", merchant_ids[2]))
            .set_json(json!({"stack": [{"kind": "coupon", "label": "Too big", "value_cents": 5000}]}))
            .to_request(),
    )
    .await;
    assert_eq!(updated["data"]["net_price_cents"], 0);
    assert_eq!(updated["data"]["percent_saved"], 100.0);

    let detail: Value = test::call_and_read_body_json(
        &app,
        get(&format!("/api/purchase-plans/{plan_id}?userId=alice")).to_request(),
    )
    .await;
    assert_eq!(
        detail["data"]["products"][0]["merchants"].as_array().unwrap().len(),
        3
    );

    let resp = test::call_service(
        &app,
        get(&format!("/api/purchase-plans/{plan_id}/comparison?userId=bob")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn comparison_without_merchants_falls_back_to_list_price() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let plan: Value = test::call_and_read_body_json(
        &app,
        post("/api/purchase-plans?userId=alice", json!({"name": "Desk"})).to_request(),
    )
    .await;
    let plan_id = plan["data"]["id"].as_i64().unwrap();
    test::call_service(
        &app,
        post(
            &format!("/api/purchase-plans/{plan_id}/products?userId=alice"),
            json!({"name": "Standing desk", "list_price_cents": 0}),
        )
        .to_request(),
    )
    .await;

    let comparison: Value = test::call_and_read_body_json(
        &app,
        get(&format!("/api/purchase-plans/{plan_id}/comparison?userId=alice")).to_request(),
    )
    .await;
    let row = &comparison["data"]["comparison"]["products"][0];
    assert_eq!(row["effective_price_cents"], 0);
    assert_eq!(row["percent_saved"], 0.0);
    assert_eq!(comparison["data"]["recommended_card"], Value::Null);
}

#[actix_web::test]
async fn purchase_plans_list_high_priority_first() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    for (name, priority) in [("Socks", "low"), ("Laptop", "high"), ("Chair", "medium")] {
        test::call_service(
            &app,
            post(
                "/api/purchase-plans?userId=alice",
                json!({"name": name, "priority": priority}),
            )
            .to_request(),
        )
        .await;
    }

    let page: Value = test::call_and_read_body_json(
        &app,
        get("/api/purchase-plans?userId=alice&per_page=2").to_request(),
    )
    .await;
    let data = &page["data"];
    assert_eq!(data["total"], 3);
    assert_eq!(data["total_pages"], 2);
    assert_eq!(data["data"][0]["name"], "Laptop");
    assert_eq!(data["data"][1]["name"], "Chair");

    let purchased: Value = test::call_and_read_body_json(
        &app,
        get("/api/purchase-plans?userId=alice&status=purchased").to_request(),
    )
    .await;
    assert_eq!(purchased["data"]["total"], 0);
}

#[actix_web::test]
async fn calendar_month_view() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let resp = test::call_service(
        &app,
        post(
            "/api/offers?userId=alice",
            json!({
                "merchant": "Whole Foods",
                "title": "Spend $60 get $10",
                "value_cents": 1000,
                "starts_on": "2025-02-20",
                "ends_on": "2025-03-10"
            }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(
        &app,
        post(
            "/api/offers?userId=alice",
            json!({
                "merchant": "Lyft",
                "title": "Backwards",
                "starts_on": "2025-03-10",
                "ends_on": "2025-03-01"
            }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    test::call_service(
        &app,
        post(
            "/api/subscriptions?userId=alice",
            json!({
                "name": "Streaming",
                "amount_cents": 1599,
                "billing_cycle": "monthly",
                "next_billing_on": "2025-01-31"
            }),
        )
        .to_request(),
    )
    .await;

    let view: Value = test::call_and_read_body_json(
        &app,
        get("/api/calendar?userId=alice&year=2025&month=3").to_request(),
    )
    .await;
    let data = &view["data"];
    assert_eq!(data["days"].as_array().unwrap().len(), 31);
    assert_eq!(data["subscription_total_cents"], 1599);
    assert_eq!(data["active_offer_ids"].as_array().unwrap().len(), 1);
    // 3 月 10 日优惠到期, 3 月 31 日扣费
    assert_eq!(data["days"][9]["events"][0]["type"], "offer_expires");
    assert_eq!(data["days"][30]["events"][0]["type"], "subscription_charge");

    let offers: Value = test::call_and_read_body_json(
        &app,
        get("/api/offers?userId=alice&from=2025-03-11&to=2025-03-31").to_request(),
    )
    .await;
    assert_eq!(offers["data"], json!([]));

    let resp = test::call_service(
        &app,
        get("/api/calendar?userId=alice&year=2025&month=13").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn csv_import_skips_existing_cards() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let csv = "issuer,name,last_four,annual_fee,base_rate,bonus_categories\n\
               Chase,Sapphire Preferred,4242,$95,1%,dining=3%;travel=2%\n\
               Citi,Double Cash,,,2%,\n";
    let import = || {
        test::TestRequest::post()
            .uri("/api/import/creditcards?userId=alice")
            .insert_header(("Content-Type", "text/csv"))
            .set_payload(csv)
            .to_request()
    };

    let first: Value = test::call_and_read_body_json(&app, import()).await;
    assert_eq!(first["data"], json!({"imported": 2, "skipped": 0}));
    let second: Value = test::call_and_read_body_json(&app, import()).await;
    assert_eq!(second["data"], json!({"imported": 0, "skipped": 2}));

    let cards: Value =
        test::call_and_read_body_json(&app, get("/api/creditcards?userId=alice").to_request())
            .await;
    assert_eq!(cards["data"].as_array().unwrap().len(), 2);
    assert_eq!(cards["data"][0]["annual_fee_cents"], 9500);

    let bad = "merchant,card_number,balance,expires_on\nTarget,1,not-money,\n";
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/import/giftcards?userId=alice")
            .set_payload(bad)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "IMPORT_ERROR");
}

fn import_gift_cards(csv: &'static str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/import/giftcards?userId=alice")
        .insert_header(("Content-Type", "text/csv"))
        .set_payload(csv)
}

#[actix_web::test]
async fn csv_import_with_bad_row_writes_nothing() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let csv = "merchant,card_number,balance,expires_on\n\
               Target,6006-1,$50.00,2030-01-31\n\
               Amazon,,twenty,\n";
    let resp = test::call_service(&app, import_gift_cards(csv).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "IMPORT_ERROR");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("row 3")
    );

    let cards: Value =
        test::call_and_read_body_json(&app, get("/api/giftcards?userId=alice").to_request())
            .await;
    assert_eq!(cards["data"], json!([]));
}

#[actix_web::test]
async fn gift_card_import_skips_known_card_numbers() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let csv = "merchant,card_number,balance,expires_on\n\
               Target,6006-1,$50.00,\n\
               Amazon,,$25,\n";
    let first: Value = test::call_and_read_body_json(&app, import_gift_cards(csv).to_request()).await;
    assert_eq!(first["data"], json!({"imported": 2, "skipped": 0}));

    // 有卡号的跳过, 没有卡号的照常导入
    let second: Value = test::call_and_read_body_json(&app, import_gift_cards(csv).to_request()).await;
    assert_eq!(second["data"], json!({"imported": 1, "skipped": 1}));

    let cards: Value =
        test::call_and_read_body_json(&app, get("/api/giftcards?userId=alice").to_request())
            .await;
    let cards = cards["data"].as_array().unwrap();
    assert_eq!(cards.len(), 3);
    assert_eq!(
        cards
            .iter()
            .filter(|c| c["merchant"] == "Amazon" && c["card_number"].is_null())
            .count(),
        2
    );

    // 同一商家、不同卡号仍然导入
    let other: Value = test::call_and_read_body_json(
        &app,
        import_gift_cards("merchant,card_number,balance,expires_on\nTarget,6006-2,$10,\n").to_request(),
    )
    .await;
    assert_eq!(other["data"], json!({"imported": 1, "skipped": 0}));
}

#[actix_web::test]
async fn blank_card_number_update_clears_it() {
    let pool = setup_pool().await;
    let app = test_app!(Services::new(&pool));

    let created: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/giftcards?userId=alice",
            json!({"merchant": "Target", "card_number": "6006-1", "balance_cents": 5000}),
        )
        .to_request(),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let updated: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/giftcards/{id}?userId=alice"))
            .set_json(json!({"card_number": "   "}))
            .to_request(),
    )
    .await;
    assert_eq!(updated["data"]["card_number"], Value::Null);

    // 无卡号的卡不参与去重
    let imported: Value = test::call_and_read_body_json(
        &app,
        import_gift_cards("merchant,card_number,balance,expires_on\nTarget,,$5,\n").to_request(),
    )
    .await;
    assert_eq!(imported["data"], json!({"imported": 1, "skipped": 0}));
}
