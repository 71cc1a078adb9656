//! OpenAI-compatible generation backend.
//!
//! Works with any endpoint that speaks the chat completions protocol:
//! the OpenAI cloud API, OpenRouter, vLLM, LM Studio, or Ollama in
//! compatibility mode. Selected with `FOLIO_INFERENCE_BACKEND=openai`.
//!
//! # Example
//!
//! ```rust,no_run
//! use folio_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use folio_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         gen_model: "llama3".to_string(),
//!         ..Default::default()
//!     };
//!     let backend = OpenAIBackend::new(config).unwrap();
//!     let text = backend.generate("Say hello").await.unwrap();
//!     println!("{}", text);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL};
pub use error::{to_folio_error, OpenAIErrorCode};
pub use types::*;
