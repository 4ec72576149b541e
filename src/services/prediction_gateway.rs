//! Remote/local prediction gateway.
//!
//! Prefers the remote model when its health check passes; any remote failure
//! degrades that single call to the local estimator and is reported back as a
//! warning. The caller always receives an estimate.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::efficiency::{
    Confidence, EfficiencyResult, GatewayMode, ParameterVector, PredictionOutcome,
    PredictionSource, QualityLabel, RemotePredictionResponse,
};
use crate::services::efficiency_estimator;

/// Resolved once at startup from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Generous enough to survive a cold-started remote service.
    pub request_timeout: Duration,
    pub health_timeout: Duration,
    /// Minimum duration of a local prediction; zero disables it.
    pub local_latency: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(30),
            health_timeout: Duration::from_secs(5),
            local_latency: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("remote service timed out")]
    Timeout,
    #[error("remote service unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("remote service returned HTTP {0}")]
    Status(StatusCode),
    #[error("malformed remote response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else if e.is_decode() {
            GatewayError::MalformedResponse(e.to_string())
        } else {
            GatewayError::Transport(e)
        }
    }
}

#[derive(Debug)]
pub struct PredictionGateway {
    client: Client,
    config: GatewayConfig,
    /// Set by the last health check; starts in local mode.
    remote_available: AtomicBool,
    last_health_check: RwLock<Option<DateTime<Utc>>>,
}

impl PredictionGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            remote_available: AtomicBool::new(false),
            last_health_check: RwLock::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn mode(&self) -> GatewayMode {
        if self.remote_available.load(Ordering::Relaxed) {
            GatewayMode::Remote
        } else {
            GatewayMode::Local
        }
    }

    pub fn last_health_check(&self) -> Option<DateTime<Utc>> {
        self.last_health_check.read().ok().and_then(|t| *t)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Probe `GET /health`. Success switches the gateway to remote mode, any
    /// failure to local mode.
    pub async fn health_check(&self) -> bool {
        let url = self.endpoint("health");
        let outcome = self
            .client
            .get(&url)
            .timeout(self.config.health_timeout)
            .send()
            .await
            .map_err(GatewayError::from)
            .and_then(|resp| {
                if resp.status().is_success() {
                    Ok(())
                } else {
                    Err(GatewayError::Status(resp.status()))
                }
            });

        let available = match outcome {
            Ok(()) => {
                info!(url = %url, "remote prediction service available, using remote mode");
                true
            }
            Err(e) => {
                warn!(url = %url, error = %e, "remote prediction service unavailable, using local mode");
                false
            }
        };

        self.remote_available.store(available, Ordering::Relaxed);
        if let Ok(mut t) = self.last_health_check.write() {
            *t = Some(Utc::now());
        }
        available
    }

    /// Predict efficiency for `params`. Never fails: a remote failure falls
    /// back to the local estimator for this call only and leaves the mode
    /// untouched.
    pub async fn predict(&self, params: &ParameterVector, mode: GatewayMode) -> PredictionOutcome {
        match mode {
            GatewayMode::Remote => match self.predict_remote(params).await {
                Ok(result) => PredictionOutcome {
                    result,
                    source: PredictionSource::Remote,
                    warning: None,
                },
                Err(e) => {
                    warn!(error = %e, "remote prediction failed, falling back to local estimate");
                    PredictionOutcome {
                        result: efficiency_estimator::estimate(params),
                        source: PredictionSource::Local,
                        warning: Some(format!("Remote prediction failed ({e}); showing local simulation")),
                    }
                }
            },
            GatewayMode::Local => {
                if !self.config.local_latency.is_zero() {
                    tokio::time::sleep(self.config.local_latency).await;
                }
                PredictionOutcome {
                    result: efficiency_estimator::estimate(params),
                    source: PredictionSource::Local,
                    warning: None,
                }
            }
        }
    }

    async fn predict_remote(&self, params: &ParameterVector) -> Result<EfficiencyResult, GatewayError> {
        let response = self
            .client
            .post(self.endpoint("predict"))
            .timeout(self.config.request_timeout)
            .json(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status()));
        }

        let body = response.json::<RemotePredictionResponse>().await?;
        let result = validate_remote_response(body)?;
        debug!(efficiency = result.efficiency, "remote prediction received");
        Ok(result)
    }
}

/// Convert a remote body into a result, rejecting any shape mismatch.
pub fn validate_remote_response(body: RemotePredictionResponse) -> Result<EfficiencyResult, GatewayError> {
    let efficiency = body
        .efficiency
        .ok_or_else(|| GatewayError::MalformedResponse("missing `efficiency`".to_string()))?;
    if !efficiency.is_finite() || !(0.0..=1.0).contains(&efficiency) {
        return Err(GatewayError::MalformedResponse(format!(
            "`efficiency` {efficiency} outside [0, 1]"
        )));
    }
    let tag = body
        .confidence
        .ok_or_else(|| GatewayError::MalformedResponse("missing `confidence`".to_string()))?;
    let confidence = if tag.eq_ignore_ascii_case("simulated") {
        Confidence::Simulated
    } else {
        Confidence::Model
    };

    Ok(EfficiencyResult {
        efficiency,
        quality_label: QualityLabel::from_efficiency(efficiency),
        confidence,
    })
}
