use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::Utc;

use crate::models::efficiency::{DashboardSnapshot, ParameterVector, PredictionResponse};
use crate::services::efficiency_estimator;
use crate::services::evolution::{self, DEFAULT_MAX_YEARS};
use crate::services::maintenance;
use crate::services::prediction_gateway::PredictionGateway;

/// Derive the full dashboard from one parameter snapshot.
pub fn derive_snapshot(generation: u64, parameters: ParameterVector) -> DashboardSnapshot {
    let evolution = evolution::generate_evolution(&parameters, DEFAULT_MAX_YEARS);
    let summary = evolution::summarize_evolution(&evolution);
    DashboardSnapshot {
        generation,
        computed_at: Utc::now(),
        parameters,
        estimate: efficiency_estimator::estimate(&parameters),
        evolution,
        summary,
        maintenance: maintenance::generate_comparison(&parameters),
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    /// Current snapshot; replaced wholesale, never mutated in place.
    snapshot: Arc<RwLock<Arc<DashboardSnapshot>>>,
    /// Latest prediction whose generation was still current when it resolved.
    latest_prediction: Arc<RwLock<Option<PredictionResponse>>>,
    pub gateway: Arc<PredictionGateway>,
    started_at: Instant,
}

impl AppState {
    pub fn new(initial: ParameterVector, gateway: PredictionGateway) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Arc::new(derive_snapshot(1, initial)))),
            latest_prediction: Arc::new(RwLock::new(None)),
            gateway: Arc::new(gateway),
            started_at: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Single writer of the current snapshot. The write lock is held while the
    /// new snapshot is derived so generations are strictly increasing.
    pub fn set_parameters(&self, parameters: ParameterVector) -> Arc<DashboardSnapshot> {
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        let next = Arc::new(derive_snapshot(guard.generation + 1, parameters));
        *guard = Arc::clone(&next);
        tracing::debug!(generation = next.generation, "parameter snapshot replaced");
        next
    }

    /// Store `prediction` as the latest one if its generation is still current.
    /// Returns false for a stale prediction, which is left unstored.
    pub fn commit_prediction(&self, prediction: &PredictionResponse) -> bool {
        let current = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        if current.generation != prediction.generation {
            tracing::info!(
                prediction_generation = prediction.generation,
                current_generation = current.generation,
                "discarding stale prediction"
            );
            return false;
        }
        if let Ok(mut latest) = self.latest_prediction.write() {
            *latest = Some(prediction.clone());
        }
        true
    }

    pub fn latest_prediction(&self) -> Option<PredictionResponse> {
        self.latest_prediction.read().ok().and_then(|p| p.clone())
    }
}
