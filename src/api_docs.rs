use utoipa::OpenApi;
use crate::controllers::dashboard_controller;
use crate::models::efficiency;
use crate::error;

#[derive(OpenApi)]
#[openapi(
    paths(
        dashboard_controller::get_parameters,
        dashboard_controller::put_parameters,
        dashboard_controller::get_dashboard,
        dashboard_controller::get_evolution,
        dashboard_controller::get_maintenance,
        dashboard_controller::post_estimate,
        dashboard_controller::post_predict,
        dashboard_controller::post_predict_custom,
        dashboard_controller::get_latest_prediction,
        dashboard_controller::get_gateway_status,
        dashboard_controller::post_health_check,
        dashboard_controller::get_feature_importance,
        dashboard_controller::get_model_info,
        dashboard_controller::get_health
    ),
    components(
        schemas(
            efficiency::ParameterVector,
            efficiency::OutOfRange,
            efficiency::EfficiencyResult,
            efficiency::QualityLabel,
            efficiency::Confidence,
            efficiency::YearlyRecord,
            efficiency::PanelStatus,
            efficiency::EvolutionSummary,
            efficiency::MaintenanceScenario,
            efficiency::MaintenanceScenarioPoint,
            efficiency::GatewayMode,
            efficiency::PredictionSource,
            efficiency::PredictionOutcome,
            efficiency::FeatureImportance,
            efficiency::ModelInfo,
            efficiency::DashboardSnapshot,
            efficiency::ParameterUpdateResponse,
            efficiency::PredictionResponse,
            efficiency::GatewayStatus,
            efficiency::HealthStatus,
            error::ApiError
        )
    ),
    tags(
        (name = "pv-efficiency-sim", description = "PV Panel Efficiency & Degradation API")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/api/parameters", "/api/predict", "/api/maintenance", "/api/evolution"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
