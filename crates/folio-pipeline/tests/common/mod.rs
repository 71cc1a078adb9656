//! Shared fixtures for folio-pipeline integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use folio_inference::mock::MockGenerationBackend;
use folio_pipeline::{
    AnalysisPipeline, ContentAnalyzer, Error, LookupResponse, MetadataExtractor, MetadataLookup,
    PipelineConfig, PipelineEvent, Result, RunOutcome, RunToken,
};
use tokio::sync::broadcast;

/// A model reply that passes validation.
pub const VALID_ANALYSIS: &str = r#"{
    "expertise": {"categories": [{"name": "AI", "score": 90}], "summary": "Knows AI"},
    "content_style": {"features": [{"name": "Clarity", "score": 85}], "summary": "Clear"},
    "interests": {"tags": ["AI"], "summary": "Machine learning"}
}"#;

#[derive(Clone)]
struct Scripted {
    reply: std::result::Result<LookupResponse, String>,
    delay: Duration,
}

/// Metadata lookup answering from a per-URL script.
///
/// Unscripted URLs fail with a transport-style error.
#[derive(Default)]
pub struct ScriptedLookup {
    script: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
    count: AtomicUsize,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, title: &str, description: &str) -> Self {
        self.respond_after(url, title, description, Duration::ZERO)
    }

    pub fn respond_after(self, url: &str, title: &str, description: &str, delay: Duration) -> Self {
        let reply = LookupResponse {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            image: Some(format!("{}/cover.png", url.trim_end_matches('/'))),
            error: None,
        };
        self.script.lock().unwrap().insert(
            url.to_string(),
            Scripted {
                reply: Ok(reply),
                delay,
            },
        );
        self
    }

    pub fn fail(self, url: &str, message: &str) -> Self {
        self.script.lock().unwrap().insert(
            url.to_string(),
            Scripted {
                reply: Err(message.to_string()),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataLookup for ScriptedLookup {
    async fn lookup(&self, url: &str) -> Result<LookupResponse> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(url.to_string());

        let scripted = self.script.lock().unwrap().get(url).cloned();
        let Some(scripted) = scripted else {
            return Err(Error::Metadata(format!("connection refused: {}", url)));
        };

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.reply.map_err(Error::Metadata)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Pipeline wired to a scripted lookup and a mock backend.
pub struct Harness {
    pub pipeline: AnalysisPipeline,
    pub lookup: Arc<ScriptedLookup>,
    pub backend: Arc<MockGenerationBackend>,
}

pub fn harness(lookup: ScriptedLookup, backend: MockGenerationBackend) -> Harness {
    harness_with_config(lookup, backend, PipelineConfig::default())
}

pub fn harness_with_config(
    lookup: ScriptedLookup,
    backend: MockGenerationBackend,
    config: PipelineConfig,
) -> Harness {
    let lookup = Arc::new(lookup);
    let backend = Arc::new(backend);
    let pipeline = AnalysisPipeline::new(
        MetadataExtractor::new(lookup.clone()),
        ContentAnalyzer::new(backend.clone()),
        config,
    );
    Harness {
        pipeline,
        lookup,
        backend,
    }
}

/// Wait for the next `RunFinished` event.
pub async fn next_finished(
    events: &mut broadcast::Receiver<PipelineEvent>,
) -> (Option<RunToken>, RunOutcome) {
    loop {
        match events.recv().await {
            Ok(PipelineEvent::RunFinished { token, outcome }) => return (token, outcome),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => panic!("event bus closed"),
        }
    }
}
