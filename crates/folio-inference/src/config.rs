//! Backend selection.
//!
//! The generation backend is chosen once at startup from
//! `FOLIO_INFERENCE_BACKEND` (`gemini` or `openai`, default `gemini`) and
//! handed to the pipeline as an `Arc<dyn GenerationBackend>`.
//!
//! # Example
//!
//! ```rust,no_run
//! use folio_inference::config::InferenceConfig;
//!
//! let backend = InferenceConfig::from_env()
//!     .expect("invalid inference config")
//!     .build_backend()
//!     .expect("failed to build backend");
//! println!("using {}", backend.model_name());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use folio_core::GenerationBackend;

#[cfg(feature = "gemini")]
use crate::gemini::{GeminiBackend, GeminiConfig};
#[cfg(feature = "openai")]
use crate::openai::{OpenAIBackend, OpenAIConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid backend: {0}")]
    InvalidBackend(String),

    #[error("Backend not compiled in: {0} (enable the `{0}` feature)")]
    BackendDisabled(BackendKind),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Backend construction failed: {0}")]
    Backend(#[from] folio_core::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Generation backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Gemini,
    OpenAI,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAI => write!(f, "openai"),
        }
    }
}

/// Inference configuration: the selected backend plus the settings of
/// every compiled-in backend.
#[derive(Debug, Clone, Default)]
pub struct InferenceConfig {
    pub backend: BackendKind,
    #[cfg(feature = "gemini")]
    pub gemini: GeminiConfig,
    #[cfg(feature = "openai")]
    pub openai: OpenAIConfig,
}

impl InferenceConfig {
    /// Load from environment variables.
    ///
    /// An unset `FOLIO_INFERENCE_BACKEND` selects Gemini; an unknown value
    /// is an error rather than a silent default.
    pub fn from_env() -> ConfigResult<Self> {
        let backend = match std::env::var("FOLIO_INFERENCE_BACKEND") {
            Ok(v) if !v.trim().is_empty() => v.parse()?,
            _ => BackendKind::default(),
        };

        Ok(Self {
            backend,
            #[cfg(feature = "gemini")]
            gemini: GeminiConfig::from_env(),
            #[cfg(feature = "openai")]
            openai: OpenAIConfig::from_env(),
        })
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Validate the selected backend's settings.
    pub fn validate(&self) -> ConfigResult<()> {
        match self.backend {
            BackendKind::Gemini => self.validate_gemini(),
            BackendKind::OpenAI => self.validate_openai(),
        }
    }

    /// Construct the selected backend.
    pub fn build_backend(&self) -> ConfigResult<Arc<dyn GenerationBackend>> {
        self.validate()?;
        let backend = match self.backend {
            BackendKind::Gemini => self.build_gemini()?,
            BackendKind::OpenAI => self.build_openai()?,
        };
        info!(
            subsystem = "inference",
            backend = %self.backend,
            model = backend.model_name(),
            "Generation backend ready"
        );
        Ok(backend)
    }

    #[cfg(feature = "gemini")]
    fn validate_gemini(&self) -> ConfigResult<()> {
        validate_url("GEMINI_BASE_URL", &self.gemini.base_url)?;
        if self.gemini.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "GEMINI_MODEL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    #[cfg(not(feature = "gemini"))]
    fn validate_gemini(&self) -> ConfigResult<()> {
        Err(ConfigError::BackendDisabled(BackendKind::Gemini))
    }

    #[cfg(feature = "gemini")]
    fn build_gemini(&self) -> ConfigResult<Arc<dyn GenerationBackend>> {
        Ok(Arc::new(GeminiBackend::new(self.gemini.clone())?))
    }

    #[cfg(not(feature = "gemini"))]
    fn build_gemini(&self) -> ConfigResult<Arc<dyn GenerationBackend>> {
        Err(ConfigError::BackendDisabled(BackendKind::Gemini))
    }

    #[cfg(feature = "openai")]
    fn validate_openai(&self) -> ConfigResult<()> {
        validate_url("OPENAI_BASE_URL", &self.openai.base_url)?;
        if self.openai.gen_model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "OPENAI_GEN_MODEL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    #[cfg(not(feature = "openai"))]
    fn validate_openai(&self) -> ConfigResult<()> {
        Err(ConfigError::BackendDisabled(BackendKind::OpenAI))
    }

    #[cfg(feature = "openai")]
    fn build_openai(&self) -> ConfigResult<Arc<dyn GenerationBackend>> {
        Ok(Arc::new(OpenAIBackend::new(self.openai.clone())?))
    }

    #[cfg(not(feature = "openai"))]
    fn build_openai(&self) -> ConfigResult<Arc<dyn GenerationBackend>> {
        Err(ConfigError::BackendDisabled(BackendKind::OpenAI))
    }
}

fn validate_url(name: &str, url: &str) -> ConfigResult<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{} must start with http:// or https://, got: {}",
            name, url
        )));
    }
    Ok(())
}
