use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    BillingCycle, CreditFrequency, GiftCardStatus, PlanPriority, PlanStatus, StackComponentKind,
};
use crate::handlers;
use crate::models::*;
use crate::utils::calendar::{CalendarDay, CalendarEvent, MonthView};
use crate::utils::{CategoryRecommendation, PlanComparison, ProductSavings};

struct UserScopeAddon;

impl Modify for UserScopeAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-User-Id"))),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::user::get_profile,
        handlers::user::update_profile,
        handlers::credit_card::list_credit_cards,
        handlers::credit_card::get_credit_card,
        handlers::credit_card::create_credit_card,
        handlers::credit_card::update_credit_card,
        handlers::credit_card::delete_credit_card,
        handlers::credit_card::get_recommendations,
        handlers::credit_card::add_credit,
        handlers::credit_card::use_credit,
        handlers::credit_card::delete_credit,
        handlers::gift_card::list_gift_cards,
        handlers::gift_card::create_gift_card,
        handlers::gift_card::update_gift_card,
        handlers::gift_card::delete_gift_card,
        handlers::gift_card::spend_gift_card,
        handlers::gift_card::get_summary,
        handlers::purchase_plan::list_plans,
        handlers::purchase_plan::create_plan,
        handlers::purchase_plan::get_plan,
        handlers::purchase_plan::update_plan,
        handlers::purchase_plan::delete_plan,
        handlers::purchase_plan::get_comparison,
        handlers::purchase_plan::add_product,
        handlers::purchase_plan::delete_product,
        handlers::purchase_plan::add_merchant,
        handlers::purchase_plan::update_merchant,
        handlers::purchase_plan::delete_merchant,
        handlers::calendar::list_offers,
        handlers::calendar::create_offer,
        handlers::calendar::delete_offer,
        handlers::calendar::list_subscriptions,
        handlers::calendar::create_subscription,
        handlers::calendar::delete_subscription,
        handlers::calendar::get_month,
        handlers::import::import_credit_cards,
        handlers::import::import_gift_cards,
    ),
    components(
        schemas(
            ApiError,
            UserResponse,
            UpdateUserRequest,
            CreditFrequency,
            BonusCategoryInput,
            BonusCategoryResponse,
            CreateCreditCardRequest,
            UpdateCreditCardRequest,
            CreditCardResponse,
            CreateCardCreditRequest,
            UseCreditRequest,
            CardCreditResponse,
            RecommendationQuery,
            CategoryRecommendation,
            GiftCardStatus,
            CreateGiftCardRequest,
            UpdateGiftCardRequest,
            SpendGiftCardRequest,
            GiftCardQuery,
            GiftCardResponse,
            MerchantBalance,
            GiftCardSummaryResponse,
            PlanPriority,
            PlanStatus,
            StackComponentKind,
            CreatePurchasePlanRequest,
            UpdatePurchasePlanRequest,
            PurchasePlanQuery,
            StackComponentInput,
            StackComponentResponse,
            CreateProductOptionRequest,
            ProductOptionResponse,
            CreateMerchantOptionRequest,
            UpdateMerchantOptionRequest,
            MerchantOptionResponse,
            PurchasePlanResponse,
            CardSuggestion,
            ProductSavings,
            PlanComparison,
            PlanComparisonResponse,
            BillingCycle,
            CreateOfferRequest,
            OfferQuery,
            OfferResponse,
            CreateSubscriptionRequest,
            SubscriptionResponse,
            CalendarQuery,
            CalendarEvent,
            CalendarDay,
            MonthView,
            ImportSummary,
        )
    ),
    modifiers(&UserScopeAddon),
    tags(
        (name = "health", description = "Health check"),
        (name = "user", description = "User profile API"),
        (name = "credit_card", description = "Credit cards, bonus categories and recurring credits"),
        (name = "gift_card", description = "Gift card balances"),
        (name = "purchase_plan", description = "Purchase plans and stacked savings comparison"),
        (name = "calendar", description = "Offers, subscriptions and the month calendar"),
        (name = "import", description = "CSV import"),
    ),
    info(
        title = "Card Planner API",
        version = "1.0.0",
        description = "Credit card, gift card and purchase planning REST API. \
            Every /api route is scoped to the user named by the `userId` query parameter \
            or the `X-User-Id` header."
    ),
    servers(
        (url = "/", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
