// /commerce/services/commerce-service/src/main.rs

mod models;
mod config;
mod api;
mod core;
mod repository;
mod middleware;
mod utils;

use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::Json,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    trace::TraceLayer,
    timeout::TimeoutLayer,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use crate::{
    api::routes,
    config::AppConfig,
    core::services::*,
    repository::{PgStore, Store},
    middleware::{
        auth::auth_middleware,
        security::security_headers_middleware,
    },
    utils::scheduler::{start_background_jobs, SweepMetrics},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub catalog_service: Arc<CatalogService>,
    pub cart_service: Arc<CartService>,
    pub order_service: Arc<OrderService>,
    pub payment_service: Arc<PaymentService>,
    pub settings_service: Arc<SettingsService>,
    pub shipping_service: Arc<ShippingService>,
    pub sweep_metrics: Arc<SweepMetrics>,
    pub sweep_max_age_minutes: i64,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, gateway: Arc<dyn PaymentGateway>, config: &AppConfig) -> Self {
        let payment_window = config.gateway.payment_window();
        let sweep = &config.sweep;
        Self {
            catalog_service: Arc::new(CatalogService::new(store.clone())),
            cart_service: Arc::new(CartService::new(store.clone())),
            order_service: Arc::new(OrderService::new(store.clone()).with_payment_window(payment_window)),
            payment_service: Arc::new(
                PaymentService::new(store.clone(), gateway).with_payment_window(payment_window),
            ),
            settings_service: Arc::new(SettingsService::new(store.clone())),
            shipping_service: Arc::new(ShippingService::new(store.clone())),
            sweep_metrics: SweepMetrics::new(sweep.enabled),
            sweep_max_age_minutes: sweep.max_age_minutes,
            store,
        }
    }
}

/// Router lengkap dengan middleware stack
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let cors = utils::cors::create_cors_layer(config);

    Router::new()
        // Mount API routes
        .merge(routes::create_routes())
        // Health check endpoint
        .route("/health", axum::routing::get(health_check))
        // Apply state first
        .with_state(state)
        // Layer yang ditambah terakhir jalan paling dulu.
        // Identity dari upstream gateway (paling dalam)
        .layer(axum_middleware::from_fn(auth_middleware))
        // Security headers middleware
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(
            ServiceBuilder::new()
                // Request tracing (paling luar)
                .layer(TraceLayer::new_for_http())
                // Timeout protection
                .layer(TimeoutLayer::new(config.request_timeout))
                // CORS: preflight dijawab sebelum auth
                .layer(cors)
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    utils::logger::init_logger();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    // Setup database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.database_acquire_timeout)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("✅ Database berhasil terkoneksi, migrations applied");

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let gateway: Arc<dyn PaymentGateway> = Arc::new(GatewayClient::new(config.gateway.clone())?);

    let state = AppState::new(store, gateway, &config);

    // Hanya satu instance yang boleh jalanin sweep terjadwal
    let _scheduler = if config.sweep.enabled {
        Some(
            start_background_jobs(
                state.order_service.clone(),
                state.sweep_metrics.clone(),
                &config.sweep,
            )
            .await?,
        )
    } else {
        info!("Order sweep scheduler disabled di instance ini");
        None
    };

    let app = app(state, &config);

    let bind_address = config.bind_address();
    utils::banner::print_startup_banner(&bind_address, config.sweep.enabled);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("🚀 Commerce Service berjalan di {}", bind_address);

    axum::serve(listener, app)
        .await
        .map_err(|e| e.into())
}

// Health check endpoint
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let (status, database) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            tracing::error!("Health check database gagal: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };

    (
        status,
        Json(serde_json::json!({
            "service": "commerce-service",
            "status": if status == StatusCode::OK { "healthy" } else { "degraded" },
            "database": database,
            "timestamp": chrono::Utc::now(),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
