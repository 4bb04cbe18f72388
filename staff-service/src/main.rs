use sqlx::postgres::PgPoolOptions;
use staff_service::{
    api::{self, ApiDoc, state::StaffAppState},
    config::ServiceConfig,
    domain::service::StaffService,
    infrastructure::{
        export::{ExcelReport, PdfReport},
        staff::PgStaffRepository,
    },
};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() {
    let _guard = shared::telemetry::init_telemetry("staff-service");

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let port = env::var("SERVER_PORT").unwrap_or_else(|_| "8080".to_string());
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(5);
    let config_path =
        env::var("STAFF_CONFIG_PATH").unwrap_or_else(|_| "staff-service.toml".to_string());
    let config = ServiceConfig::load(&config_path).expect("Failed to load staff-service config");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .expect("Failed to establish connection into Postgres");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(config.rate_limit.per_second)
        .burst_size(config.rate_limit.burst_size)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
        .expect("Failed to build governor config");

    let staff_service = Arc::new(StaffService::new(
        Arc::new(PgStaffRepository::new(pool.clone())),
        Arc::new(PdfReport),
        Arc::new(ExcelReport),
        config,
    ));

    let state = Arc::new(StaffAppState { staff_service });

    let app = api::router(state)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Rate limiting (per-IP)
        .layer(GovernorLayer::new(governor_conf))
        // The form/list UI is served from another origin
        .layer(CorsLayer::very_permissive())
        // tracing log (turn request into info level)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Millis),
                ),
        );

    tracing::info!("staff-service listening on 0.0.0.0:{port}");

    let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("Failed to bind");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shared::shutdown::shutdown_signal())
    .await
    .expect("Oppsie! Server crashed!");

    if tokio::time::timeout(shared::shutdown::DEFAULT_SHUTDOWN_TIMEOUT, pool.close())
        .await
        .is_err()
    {
        tracing::warn!("Shutdown timeout reached while closing the database pool");
    }
    tracing::info!("staff-service shut down");
}
