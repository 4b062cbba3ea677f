// Climbing Conditions API v0.1
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod routes;
mod services;

use config::{AppConfig, ScorerKind};
use routes::conditions::AppState;
use services::owm::OwmClient;
use services::scoring::{ConditionsScorer, FormulaScorer, ModelScorer};

/// Climbing Conditions API OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Climbing Conditions API",
        version = "0.1.0",
        description = "Rates outdoor rock climbing conditions for a fixed set of US \
            destinations. Merges OpenWeatherMap hourly, 3-hour and daily forecasts into \
            one timeline, scores each point with the Climbing Conditions Score (CCS) and \
            summarizes an 8-day outlook.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Destinations", description = "Supported climbing destinations"),
        (name = "Conditions", description = "Current and forecast climbing conditions"),
    ),
    paths(
        routes::health::health_check,
        routes::destinations::list_destinations,
        routes::conditions::get_conditions,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::destinations::DestinationItem,
            services::conditions::ConditionsReport,
            services::conditions::Conditions,
            services::conditions::CurrentWeather,
            services::forecast::DailySummary,
            services::forecast::ForecastSource,
            services::series::Graphs,
            services::series::SeriesPoint,
            services::series::TierBoundaries,
            services::adapter::SourceTier,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

fn build_scorer(config: &AppConfig) -> Arc<dyn ConditionsScorer> {
    match config.scorer {
        ScorerKind::Model => {
            let model = services::model::load_model(Path::new(&config.model_path))
                .expect("Failed to load climbing conditions model");
            Arc::new(ModelScorer::new(model))
        }
        ScorerKind::Formula => Arc::new(FormulaScorer),
    }
}

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "climbing_conditions_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let scorer = build_scorer(&config);
    tracing::info!("Using '{}' scorer", scorer.name());

    let owm_client = OwmClient::new(
        &config.owm_base_url,
        &config.owm_api_key,
        Duration::from_secs(config.fetch_timeout_secs),
    );

    let app_state = AppState {
        owm_client,
        scorer: scorer.clone(),
    };

    // CORS: read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    let conditions_routes = Router::new()
        .route(
            "/api/v1/conditions",
            get(routes::conditions::get_conditions),
        )
        .with_state(app_state);

    let destination_routes = Router::new().route(
        "/api/v1/destinations",
        get(routes::destinations::list_destinations),
    );

    // Health only needs the scorer name
    let health_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .with_state(scorer);

    let app = Router::new()
        .merge(health_routes)
        .merge(destination_routes)
        .merge(conditions_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
