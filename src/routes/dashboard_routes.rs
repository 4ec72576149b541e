use axum::{Router, routing::{get, post}};
use crate::controllers::dashboard_controller::{
    // Parameter snapshot & derived views
    get_parameters, put_parameters, get_dashboard, get_evolution, get_maintenance,
    // Estimation & prediction
    post_estimate, post_predict, post_predict_custom, get_latest_prediction,
    // Gateway
    get_gateway_status, post_health_check,
    // Model exposition & liveness
    get_feature_importance, get_model_info, get_health,
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/parameters",             get(get_parameters).put(put_parameters))
        .route("/dashboard",              get(get_dashboard))
        .route("/evolution",              get(get_evolution))
        .route("/maintenance",            get(get_maintenance))
        .route("/estimate",               post(post_estimate))
        .route("/predict",                post(post_predict))
        .route("/predict/custom",         post(post_predict_custom))
        .route("/predictions/latest",     get(get_latest_prediction))
        .route("/gateway",                get(get_gateway_status))
        .route("/gateway/health-check",   post(post_health_check))
        .route("/feature-importance",     get(get_feature_importance))
        .route("/model-info",             get(get_model_info))
        .route("/health",                 get(get_health))
        .with_state(state)
}
