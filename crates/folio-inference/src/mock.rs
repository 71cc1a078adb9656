//! Scripted generation backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_inference::mock::MockGenerationBackend;
//! use folio_core::GenerationBackend;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let backend = MockGenerationBackend::new()
//!     .with_fixed_response("{}")
//!     .with_latency_ms(0);
//!
//! assert_eq!(backend.generate("anything").await.unwrap(), "{}");
//! assert_eq!(backend.generate_call_count(), 1);
//! # }
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;

use folio_core::{Error, GenerationBackend, Result};

/// Mock generation backend.
///
/// Resolution order per call: the scripted queue, then exact prompt
/// mappings, then the default response. A configured failure overrides
/// all of them.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    script: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model: String,
    fixed_responses: HashMap<String, String>,
    default_response: String,
    latency_ms: u64,
    failure: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model: "mock-model".to_string(),
            fixed_responses: HashMap::new(),
            default_response: "Mock response".to_string(),
            latency_ms: 0,
            failure: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub timestamp: Instant,
}

impl MockGenerationBackend {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response returned when nothing more specific applies.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Map an exact prompt to a response.
    pub fn with_response_mapping(
        mut self,
        prompt: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_responses
            .insert(prompt.into(), output.into());
        self
    }

    /// Delay every call. Uses tokio's clock, so paused-time tests can
    /// advance past it.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Fail every call with the given message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(message.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model = model.into();
        self
    }

    /// Queue a one-shot reply for the next unscripted call.
    pub fn push_response(&self, response: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(response.into()));
    }

    /// Queue a one-shot failure for the next unscripted call.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.script.lock().unwrap().push_back(Err(message.into()));
    }

    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    pub fn generate_call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    fn log_call(&self, prompt: &str) {
        self.call_log.lock().unwrap().push(MockCall {
            prompt: prompt.to_string(),
            timestamp: Instant::now(),
        });
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }

    async fn respond(&self, prompt: &str) -> Result<String> {
        self.log_call(prompt);
        self.simulate_latency().await;

        if let Some(ref message) = self.config.failure {
            return Err(Error::Inference(message.clone()));
        }

        let scripted = self.script.lock().unwrap().pop_front();
        if let Some(reply) = scripted {
            return reply.map_err(Error::Inference);
        }

        if let Some(response) = self.config.fixed_responses.get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.config.default_response.clone())
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.respond(prompt).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.config.failure.is_none())
    }
}
