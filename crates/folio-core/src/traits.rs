//! Core traits for folio abstractions.
//!
//! These traits define the collaborators the ingestion pipeline and the
//! dashboard are built against. Concrete implementations are injected at
//! construction, so tests can substitute fakes without process-wide state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// METADATA LOOKUP TRAITS
// =============================================================================

/// Raw response of a metadata lookup service.
///
/// Every field is optional; the service is treated as untrusted and a
/// missing field never faults the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Error indicator. Services report this as a string, a status number,
    /// or a boolean.
    #[serde(default)]
    pub error: Option<JsonValue>,
}

impl LookupResponse {
    /// The error the service reported, if any.
    ///
    /// Falsy indicators (`null`, `false`, `0`, `""`) count as no error. When
    /// the indicator is not itself a message, the description is used.
    pub fn reported_error(&self) -> Option<String> {
        let message = match self.error.as_ref()? {
            JsonValue::Null | JsonValue::Bool(false) => return None,
            JsonValue::String(s) if s.trim().is_empty() => return None,
            JsonValue::Number(n) if n.as_f64() == Some(0.0) => return None,
            JsonValue::String(s) => s.clone(),
            other => self
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| other.to_string()),
        };
        Some(message)
    }
}

/// External service that resolves a URL to page metadata.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Look up metadata for an absolute URL.
    async fn lookup(&self, url: &str) -> Result<LookupResponse>;

    /// Human-readable name of this lookup.
    fn name(&self) -> &str;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Check if the backend is available and responding.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

// =============================================================================
// PERSISTENCE TRAITS
// =============================================================================

/// Persistence collaborator for works and their analyses.
#[async_trait]
pub trait WorkRepository: Send + Sync {
    /// Insert a new work, assigning its id and creation time.
    async fn insert_work(&self, work: NewWork) -> Result<Work>;

    /// Attach an analysis to an existing work.
    async fn insert_analysis(&self, work_id: Uuid, analysis: AnalysisResult)
        -> Result<WorkAnalysis>;

    /// List a user's works, newest first.
    async fn list_works(&self, user_id: Uuid) -> Result<Vec<Work>>;

    /// Fetch the analysis linked to a work, if one exists.
    async fn fetch_analysis(&self, work_id: Uuid) -> Result<Option<WorkAnalysis>>;
}
