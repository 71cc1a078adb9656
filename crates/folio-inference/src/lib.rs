//! # folio-inference
//!
//! Generative model backend abstraction for folio.
//!
//! This crate provides:
//! - Google Gemini implementation (default, feature `gemini`)
//! - OpenAI-compatible chat implementation (optional, feature `openai`)
//! - Environment-driven backend selection
//! - A connectivity probe for operators
//! - A scripted mock backend for tests (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use folio_inference::GeminiBackend;
//! use folio_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = GeminiBackend::from_env().unwrap();
//!     let text = backend.generate("Say hello").await.unwrap();
//!     println!("{}", text);
//! }
//! ```

pub mod config;
pub mod probe;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use folio_core::*;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiBackend, GeminiConfig};

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};

pub use config::{BackendKind, ConfigError, InferenceConfig};
pub use probe::{check_health, probe, HealthReport, ProbeReport};
