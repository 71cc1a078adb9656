//! Backend connectivity probe.
//!
//! Sends one fixed question and reports whether a non-empty answer came
//! back. Used by operators to verify credentials before enabling analysis.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use folio_core::defaults::PROBE_PROMPT;
use folio_core::{Error, GenerationBackend, Result};

/// Outcome of a successful probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub success: bool,
    pub message: String,
    /// The model's answer to the probe question.
    pub response: String,
}

/// Probe a backend with a fixed question.
///
/// Transport failures and empty answers are errors; the report only exists
/// for a backend that actually answered.
#[instrument(skip(backend), fields(subsystem = "inference", component = "probe", op = "probe", model = backend.model_name()))]
pub async fn probe(backend: &dyn GenerationBackend) -> Result<ProbeReport> {
    let start = Instant::now();

    let response = match backend.generate(PROBE_PROMPT).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Backend probe failed");
            return Err(Error::Inference(format!("API probe failed: {}", e)));
        }
    };

    if response.trim().is_empty() {
        warn!("Backend probe returned an empty answer");
        return Err(Error::Inference("Empty response from API".to_string()));
    }

    info!(
        response_len = response.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Backend probe succeeded"
    );

    Ok(ProbeReport {
        success: true,
        message: format!("{} is reachable", backend.model_name()),
        response,
    })
}

/// Reachability of a backend's model endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub model: String,
    pub healthy: bool,
}

/// Check that the backend's model endpoint answers, without generating.
#[instrument(skip(backend), fields(subsystem = "inference", component = "probe", op = "health", model = backend.model_name()))]
pub async fn check_health(backend: &dyn GenerationBackend) -> Result<HealthReport> {
    let healthy = backend.health_check().await?;
    if healthy {
        info!("Backend is healthy");
    } else {
        warn!("Backend health check failed");
    }
    Ok(HealthReport {
        model: backend.model_name().to_string(),
        healthy,
    })
}
