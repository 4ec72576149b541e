use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::models::efficiency::ParameterVector;
use crate::services::prediction_gateway::GatewayConfig;

fn default_port() -> u16 { 3000 }
fn default_production_url() -> String { "https://predictor.example.com".to_string() }
fn default_development_url() -> String { "http://localhost:8000".to_string() }
fn default_request_timeout_s() -> u64 { 30 }
fn default_health_timeout_s() -> u64 { 5 }
fn default_local_latency_ms() -> u64 { 500 }

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{0}': {1}")]
    Io(String, #[source] std::io::Error),
    #[error("failed to parse config file '{0}': {1}")]
    Parse(String, #[source] serde_json::Error),
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub prediction_service: PredictionServiceConfig,
    /// Parameters the dashboard starts from.
    #[serde(default)]
    pub initial_parameters: ParameterVector,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictionServiceConfig {
    /// Deployment flag: selects `production_url` over `development_url`.
    #[serde(default)]
    pub production: bool,
    #[serde(default = "default_production_url")]
    pub production_url: String,
    #[serde(default = "default_development_url")]
    pub development_url: String,
    #[serde(default = "default_request_timeout_s")]
    pub request_timeout_s: u64,
    #[serde(default = "default_health_timeout_s")]
    pub health_timeout_s: u64,
    #[serde(default = "default_local_latency_ms")]
    pub local_latency_ms: u64,
}

impl Default for PredictionServiceConfig {
    fn default() -> Self {
        Self {
            production: false,
            production_url: default_production_url(),
            development_url: default_development_url(),
            request_timeout_s: default_request_timeout_s(),
            health_timeout_s: default_health_timeout_s(),
            local_latency_ms: default_local_latency_ms(),
        }
    }
}

impl PredictionServiceConfig {
    pub fn base_url(&self) -> &str {
        if self.production { &self.production_url } else { &self.development_url }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url().to_string(),
            request_timeout: Duration::from_secs(self.request_timeout_s),
            health_timeout: Duration::from_secs(self.health_timeout_s),
            local_latency: Duration::from_millis(self.local_latency_ms),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_string(), e))?;
        Self::from_json(path, &content)
    }

    fn from_json(path: &str, content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(path.to_string(), e))
    }
}
