#![allow(dead_code)]

use card_planner::config::{DatabaseConfig, PlannerConfig};
use card_planner::database::{DbPool, create_pool, run_migrations};
use card_planner::services::*;

/// 单连接的内存 SQLite, 已跑完全部迁移
pub async fn setup_pool() -> DbPool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    let pool = create_pool(&config).await.expect("connect sqlite");
    run_migrations(&pool).await.expect("run migrations");
    pool
}

#[derive(Clone)]
pub struct Services {
    pub user: UserService,
    pub credit_card: CreditCardService,
    pub gift_card: GiftCardService,
    pub purchase_plan: PurchasePlanService,
    pub calendar: CalendarService,
    pub import: ImportService,
    pub planner: PlannerConfig,
}

impl Services {
    pub fn new(pool: &DbPool) -> Self {
        let credit_card = CreditCardService::new(pool.clone());
        let gift_card = GiftCardService::new(pool.clone());
        Self {
            user: UserService::new(pool.clone()),
            purchase_plan: PurchasePlanService::new(
                pool.clone(),
                credit_card.clone(),
                gift_card.clone(),
            ),
            calendar: CalendarService::new(pool.clone(), credit_card.clone()),
            import: ImportService::new(pool.clone()),
            planner: PlannerConfig::default(),
            credit_card,
            gift_card,
        }
    }
}

/// 与 main.rs 相同的 App 组装, 便于 actix_web::test 驱动
#[macro_export]
macro_rules! test_app {
    ($services:expr) => {{
        let s = $services.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(card_planner::middlewares::UserScopeMiddleware)
                .app_data(actix_web::web::Data::new(s.planner.clone()))
                .app_data(actix_web::web::Data::new(s.user.clone()))
                .app_data(actix_web::web::Data::new(s.credit_card.clone()))
                .app_data(actix_web::web::Data::new(s.gift_card.clone()))
                .app_data(actix_web::web::Data::new(s.purchase_plan.clone()))
                .app_data(actix_web::web::Data::new(s.calendar.clone()))
                .app_data(actix_web::web::Data::new(s.import.clone()))
                .configure(card_planner::handlers::health_config)
                .configure(card_planner::handlers::api_config),
        )
        .await
    }};
}
