pub mod efficiency_estimator;
pub mod evolution;
pub mod maintenance;
pub mod model_catalog;
pub mod prediction_gateway;
