use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::efficiency::{
    DashboardSnapshot, EfficiencyResult, FeatureImportance, GatewayStatus, HealthStatus,
    MaintenanceScenarioPoint, ModelInfo, ParameterUpdateResponse, ParameterVector,
    PredictionResponse, YearlyRecord,
};
use crate::services::{efficiency_estimator, evolution, model_catalog};
use crate::shared_state::AppState;

/// Longest horizon accepted by `/api/evolution`.
pub const MAX_EVOLUTION_YEARS: u32 = 100;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EvolutionQuery {
    /// Last simulated year (inclusive), default 35
    pub max_years: Option<u32>,
}

/// GET /api/parameters
/// Current parameter snapshot
#[utoipa::path(
    get,
    path = "/api/parameters",
    responses((status = 200, description = "Current parameters", body = ParameterVector))
)]
pub async fn get_parameters(State(state): State<AppState>) -> Json<ParameterVector> {
    Json(state.snapshot().parameters)
}

/// PUT /api/parameters
/// Replace the parameter snapshot
///
/// Re-derives evolution and maintenance comparison in full. Values outside
/// their declared domain are accepted and reported back as warnings.
#[utoipa::path(
    put,
    path = "/api/parameters",
    request_body = ParameterVector,
    responses((status = 200, description = "Snapshot replaced", body = ParameterUpdateResponse))
)]
pub async fn put_parameters(
    State(state): State<AppState>,
    Json(parameters): Json<ParameterVector>,
) -> Json<ParameterUpdateResponse> {
    let warnings = parameters.out_of_range();
    for w in &warnings {
        tracing::warn!("accepting out-of-range parameter: {}", w);
    }
    let snapshot = state.set_parameters(parameters);
    Json(ParameterUpdateResponse {
        generation: snapshot.generation,
        warnings,
    })
}

/// GET /api/dashboard
/// Everything derived from the current snapshot
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses((status = 200, description = "Current dashboard snapshot", body = DashboardSnapshot))
)]
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.snapshot().as_ref().clone())
}

/// GET /api/evolution
/// Yearly efficiency evolution for the current parameters
#[utoipa::path(
    get,
    path = "/api/evolution",
    params(EvolutionQuery),
    responses(
        (status = 200, description = "One record per year, year 0 first", body = Vec<YearlyRecord>),
        (status = 400, description = "Horizon too long", body = crate::error::ApiError)
    )
)]
pub async fn get_evolution(
    State(state): State<AppState>,
    Query(query): Query<EvolutionQuery>,
) -> Result<Json<Vec<YearlyRecord>>, AppError> {
    let snapshot = state.snapshot();
    match query.max_years {
        None => Ok(Json(snapshot.evolution.clone())),
        Some(years) if years > MAX_EVOLUTION_YEARS => Err(AppError::BadRequest {
            message: "max_years too large".to_string(),
            details: format!("max_years must be at most {MAX_EVOLUTION_YEARS}, got {years}"),
        }),
        Some(years) => Ok(Json(evolution::generate_evolution(&snapshot.parameters, years))),
    }
}

/// GET /api/maintenance
/// Maintenance scenario comparison for the current parameters
#[utoipa::path(
    get,
    path = "/api/maintenance",
    responses((status = 200, description = "Points at years 0, 5, ..., 30", body = Vec<MaintenanceScenarioPoint>))
)]
pub async fn get_maintenance(State(state): State<AppState>) -> Json<Vec<MaintenanceScenarioPoint>> {
    Json(state.snapshot().maintenance.clone())
}

/// POST /api/estimate
/// Local estimate for an arbitrary parameter vector
#[utoipa::path(
    post,
    path = "/api/estimate",
    request_body = ParameterVector,
    responses((status = 200, description = "Local model result", body = EfficiencyResult))
)]
pub async fn post_estimate(Json(parameters): Json<ParameterVector>) -> Json<EfficiencyResult> {
    Json(efficiency_estimator::estimate(&parameters))
}

/// POST /api/predict
/// Predict efficiency for the current snapshot
///
/// Uses the remote model when available and falls back to the local model
/// otherwise. A result whose snapshot was replaced while in flight is returned
/// with `stale = true` and not stored as the latest prediction.
#[utoipa::path(
    post,
    path = "/api/predict",
    responses((status = 200, description = "Prediction, possibly with a fallback warning", body = PredictionResponse))
)]
pub async fn post_predict(State(state): State<AppState>) -> Json<PredictionResponse> {
    let snapshot = state.snapshot();
    let mut response = predict(&state, snapshot.generation, snapshot.parameters).await;
    response.stale = !state.commit_prediction(&response);
    Json(response)
}

/// POST /api/predict/custom
/// Predict efficiency for a posted vector without touching the snapshot
#[utoipa::path(
    post,
    path = "/api/predict/custom",
    request_body = ParameterVector,
    responses((status = 200, description = "Prediction, possibly with a fallback warning", body = PredictionResponse))
)]
pub async fn post_predict_custom(
    State(state): State<AppState>,
    Json(parameters): Json<ParameterVector>,
) -> Json<PredictionResponse> {
    Json(predict(&state, state.generation(), parameters).await)
}

async fn predict(state: &AppState, generation: u64, parameters: ParameterVector) -> PredictionResponse {
    let outcome = state.gateway.predict(&parameters, state.gateway.mode()).await;
    PredictionResponse {
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        generation,
        stale: false,
        parameters,
        result: outcome.result,
        source: outcome.source,
        warning: outcome.warning,
    }
}

/// GET /api/predictions/latest
/// Latest prediction that matched the then-current snapshot
#[utoipa::path(
    get,
    path = "/api/predictions/latest",
    responses(
        (status = 200, description = "Latest prediction", body = PredictionResponse),
        (status = 404, description = "No prediction yet", body = crate::error::ApiError)
    )
)]
pub async fn get_latest_prediction(State(state): State<AppState>) -> Result<Json<PredictionResponse>, AppError> {
    state
        .latest_prediction()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No prediction has been made yet".to_string()))
}

/// GET /api/gateway
/// Prediction gateway mode
#[utoipa::path(
    get,
    path = "/api/gateway",
    responses((status = 200, description = "Gateway status", body = GatewayStatus))
)]
pub async fn get_gateway_status(State(state): State<AppState>) -> Json<GatewayStatus> {
    Json(gateway_status(&state))
}

/// POST /api/gateway/health-check
/// Re-probe the remote prediction service
#[utoipa::path(
    post,
    path = "/api/gateway/health-check",
    responses((status = 200, description = "Gateway status after the check", body = GatewayStatus))
)]
pub async fn post_health_check(State(state): State<AppState>) -> Json<GatewayStatus> {
    state.gateway.health_check().await;
    Json(gateway_status(&state))
}

fn gateway_status(state: &AppState) -> GatewayStatus {
    GatewayStatus {
        mode: state.gateway.mode(),
        base_url: state.gateway.base_url().to_string(),
        last_health_check: state.gateway.last_health_check(),
    }
}

/// GET /api/feature-importance
#[utoipa::path(
    get,
    path = "/api/feature-importance",
    responses((status = 200, description = "Six factors summing to 1.0", body = Vec<FeatureImportance>))
)]
pub async fn get_feature_importance() -> Json<Vec<FeatureImportance>> {
    Json(model_catalog::feature_importance())
}

/// GET /api/model-info
#[utoipa::path(
    get,
    path = "/api/model-info",
    responses((status = 200, description = "Local model descriptor", body = ModelInfo))
)]
pub async fn get_model_info() -> Json<ModelInfo> {
    Json(model_catalog::model_info())
}

/// GET /api/health
/// Liveness of this service
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service health", body = HealthStatus))
)]
pub async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        gateway_mode: state.gateway.mode(),
        generation: state.generation(),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::models::efficiency::ParameterVector;
    use crate::routes::dashboard_routes::api_routes;
    use crate::services::prediction_gateway::{GatewayConfig, PredictionGateway};
    use crate::shared_state::AppState;

    fn offline_state() -> AppState {
        let gateway = PredictionGateway::new(GatewayConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            request_timeout: Duration::from_millis(200),
            health_timeout: Duration::from_millis(200),
            local_latency: Duration::ZERO,
        });
        AppState::new(ParameterVector::default(), gateway)
    }

    async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
        let resp = axum::Router::new()
            .nest("/api", api_routes(state.clone()))
            .oneshot(req)
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn example_body() -> Value {
        serde_json::json!({
            "irradiance": 500, "soiling_ratio": 0.7, "panel_age": 10,
            "temperature": 25, "humidity": 50, "cloud_coverage": 30,
            "module_temperature": 30, "wind_speed": 2
        })
    }

    #[tokio::test]
    async fn test_put_parameters_rederives_dashboard() {
        let state = offline_state();
        let (status, body) = send(&state, json("PUT", "/api/parameters", example_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generation"], 2);
        assert_eq!(body["warnings"].as_array().unwrap().len(), 0);

        let (_, dash) = send(&state, get("/api/dashboard")).await;
        assert_eq!(dash["generation"], 2);
        assert_eq!(dash["parameters"]["irradiance"], 500.0);
        assert_eq!(dash["estimate"]["quality_label"], "Good");
        assert_eq!(dash["evolution"].as_array().unwrap().len(), 36);
        assert_eq!(dash["evolution"][0]["degradation_percent"], 0.0);
        assert_eq!(dash["maintenance"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_out_of_range_parameters_are_accepted_with_warnings() {
        let state = offline_state();
        let mut body = example_body();
        body["irradiance"] = serde_json::json!(2000);
        let (status, resp) = send(&state, json("PUT", "/api/parameters", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["warnings"][0]["field"], "irradiance");
        assert_eq!(state.snapshot().parameters.irradiance, 2000.0);
    }

    #[tokio::test]
    async fn test_estimate_worked_example() {
        let state = offline_state();
        let (status, body) = send(&state, json("POST", "/api/estimate", example_body())).await;
        assert_eq!(status, StatusCode::OK);
        let eff = body["efficiency"].as_f64().unwrap();
        assert!((eff - 0.5411).abs() < 1e-4);
        assert_eq!(body["quality_label"], "Good");
        assert_eq!(body["confidence"], "simulated");
    }

    #[tokio::test]
    async fn test_evolution_query() {
        let state = offline_state();
        let (status, body) = send(&state, get("/api/evolution?max_years=10")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 11);

        let (status, body) = send(&state, get("/api/evolution?max_years=1000")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_maintenance_keys_are_scenario_names() {
        let state = offline_state();
        let (_, body) = send(&state, get("/api/maintenance")).await;
        let first = &body[0]["values"];
        let reference = first["No Maintenance"].as_f64().unwrap();
        for name in ["Minimal Maintenance", "Regular Maintenance", "Optimal Maintenance"] {
            assert_eq!(first[name].as_f64(), Some(reference));
        }
    }

    #[tokio::test]
    async fn test_predict_offline_falls_back_and_is_stored() {
        let state = offline_state();
        let (status, _) = send(&state, get("/api/predictions/latest")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &state,
            Request::post("/api/predict").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "local");
        assert_eq!(body["result"]["confidence"], "simulated");
        assert_eq!(body["stale"], false);

        let (status, latest) = send(&state, get("/api/predictions/latest")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(latest["id"], body["id"]);
    }

    #[tokio::test]
    async fn test_predict_custom_does_not_touch_snapshot() {
        let state = offline_state();
        let (status, body) = send(&state, json("POST", "/api/predict/custom", example_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["parameters"]["irradiance"], 500.0);
        assert_eq!(state.snapshot().parameters, ParameterVector::default());
        assert!(state.latest_prediction().is_none());
    }

    #[tokio::test]
    async fn test_gateway_health_check_reports_local_mode() {
        let state = offline_state();
        let (status, body) = send(
            &state,
            Request::post("/api/gateway/health-check").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "local");
        assert!(body["last_health_check"].is_string());
    }

    #[tokio::test]
    async fn test_static_model_endpoints() {
        let state = offline_state();
        let (_, importance) = send(&state, get("/api/feature-importance")).await;
        let total: f64 = importance
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["importance"].as_f64().unwrap())
            .sum();
        assert!((total - 1.0).abs() < 1e-9);

        let (status, info) = send(&state, get("/api/model-info")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(info["features"].as_array().unwrap().len(), 6);

        let (_, health) = send(&state, get("/api/health")).await;
        assert_eq!(health["status"], "ok");
        assert_eq!(health["gateway_mode"], "local");
    }
}
