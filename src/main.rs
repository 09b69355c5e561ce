use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use card_planner::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{UserScopeMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建服务
    let user_service = UserService::new(pool.clone());
    let credit_card_service = CreditCardService::new(pool.clone());
    let gift_card_service = GiftCardService::new(pool.clone());
    let purchase_plan_service = PurchasePlanService::new(
        pool.clone(),
        credit_card_service.clone(),
        gift_card_service.clone(),
    );
    let calendar_service = CalendarService::new(pool.clone(), credit_card_service.clone());
    let import_service = ImportService::new(pool.clone());

    // 启动后台定时任务
    tasks::spawn_all(
        &config.planner,
        credit_card_service.clone(),
        calendar_service.clone(),
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let planner = web::Data::new(config.planner.clone());
    HttpServer::new(move || {
        App::new()
            .wrap(UserScopeMiddleware)
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(planner.clone())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(credit_card_service.clone()))
            .app_data(web::Data::new(gift_card_service.clone()))
            .app_data(web::Data::new(purchase_plan_service.clone()))
            .app_data(web::Data::new(calendar_service.clone()))
            .app_data(web::Data::new(import_service.clone()))
            .configure(swagger_config)
            .configure(handlers::health_config)
            .configure(handlers::api_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
