mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod config;
mod error;

use std::net::SocketAddr;
use axum::{Router, routing::get, response::Html};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::routes::dashboard_routes::api_routes;
use crate::api_docs::ApiDoc;
use crate::shared_state::AppState;
use crate::config::Config;
use crate::services::prediction_gateway::PredictionGateway;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    // 1. Load configuration
    let config_path = std::env::var("PV_SIM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;
    info!(
        path = %config_path,
        production = config.prediction_service.production,
        base_url = config.prediction_service.base_url(),
        "configuration loaded"
    );

    // 2. Resolve the prediction gateway once and probe the remote service
    let gateway = PredictionGateway::new(config.prediction_service.gateway_config());
    gateway.health_check().await;

    // 3. Initialize shared state from the configured starting parameters
    for issue in config.initial_parameters.out_of_range() {
        tracing::warn!("initial parameters: {}", issue);
    }
    let state = AppState::new(config.initial_parameters, gateway);
    let snapshot = state.snapshot();
    info!(
        efficiency = snapshot.estimate.efficiency,
        quality = ?snapshot.estimate.quality_label,
        mode = ?state.gateway.mode(),
        "initial snapshot derived"
    );

    // 4. Start Axum HTTP server
    let app = Router::new()
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("API Server listening on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
