//! Fortuna Rewards Backend Server
//!
//! Daily spin rewards with a shared point budget, a point ledger, and a
//! point shop. All state lives in the in-process store; concurrency
//! control comes from its keyed row locks.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use fortuna_api::{
    configure_admin, configure_auth, configure_orders, configure_points, configure_products,
    configure_spin,
};
use fortuna_core::config::AppConfig;
use fortuna_services::{
    AdminService, AuthService, OrderService, PointLedger, ProductService, SpinService,
};
use fortuna_store::{
    MemBudgetRepository, MemOrderRepository, MemParticipationRepository, MemPointRepository,
    MemProductRepository, MemStore, MemUserRepository, StoreSettings,
};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "fortuna-rewards",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fortuna_rewards={},fortuna_api={},fortuna_services={},fortuna_store={},actix_web=info",
            log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!("Starting Fortuna Rewards v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("configuration error: {e}"),
        )
    })?;

    info!(
        "Daily budget: {} points, lock wait: {}ms",
        config.engine.daily_budget, config.engine.lock_wait_ms
    );

    // Build the store and the repositories over it
    let store = Arc::new(MemStore::with_settings(StoreSettings {
        lock_wait: Duration::from_millis(config.engine.lock_wait_ms),
        daily_budget_total: config.engine.daily_budget,
    }));

    let budgets = Arc::new(MemBudgetRepository::new(store.clone()));
    let participations = Arc::new(MemParticipationRepository::new(store.clone()));
    let points = Arc::new(MemPointRepository::new(store.clone()));
    let products = Arc::new(MemProductRepository::new(store.clone()));
    let orders = Arc::new(MemOrderRepository::new(store.clone()));
    let users = Arc::new(MemUserRepository::new(store.clone()));

    // Wire the services
    let auth_service = AuthService::new(users.clone());
    let spin_service = SpinService::new(
        budgets.clone(),
        participations.clone(),
        points.clone(),
        users.clone(),
    );
    let ledger = PointLedger::new(points.clone());
    let order_service = OrderService::new(
        orders.clone(),
        products.clone(),
        users.clone(),
        ledger.clone(),
    );
    let product_service = ProductService::new(products.clone());
    let admin_service = AdminService::new(budgets, participations, orders, products, users);

    let cors_origins = config.server.cors_origins.clone();
    let bind_addr = config.server_addr();
    let workers = config.server.workers;

    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        // Configure CORS - clone cors_origins for each worker
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origins: Vec<&str> = cors_origins_inner.split(',').collect();
                if let Ok(origin_str) = origin.to_str() {
                    origins.iter().any(|o| o.trim() == origin_str)
                } else {
                    false
                }
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .allowed_header("X-User-Id")
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(spin_service.clone()))
            .app_data(web::Data::new(ledger.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(product_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            // Middleware
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            // Routes
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api/v1")
                    .route("/health", web::get().to(health_check))
                    .configure(configure_auth)
                    .configure(configure_spin)
                    .configure(configure_points)
                    .configure(configure_products)
                    .configure(configure_orders)
                    .configure(configure_admin),
            )
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
