//! Analysis pipeline orchestrator.
//!
//! One [`AnalysisPipeline`] owns the editing state of one draft: the draft
//! itself, the extracted metadata, the latest analysis and the current
//! [`PipelinePhase`].
//!
//! ```text
//! Idle ──url──▶ Extracting ──metadata ok──▶ Analyzing ──▶ Complete
//!                   │
//!                   └──metadata error──▶ Idle (last_error set)
//! ```
//!
//! URL edits go through [`AnalysisPipeline::on_url_changed`], which debounces
//! them. Every run that gets past URL validation takes a fresh [`RunToken`];
//! before applying a stage result the run re-checks that its token is still
//! the latest, and drops the result otherwise. In-flight calls are never
//! cancelled.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, instrument, Span};
use uuid::Uuid;

use folio_core::defaults::{DEBOUNCE_MS, EVENT_BUS_CAPACITY};
use folio_core::{
    AnalysisOutcome, AnalysisResult, AnalysisSource, Metadata, Result, WorkRepository, WorkType,
};

use crate::analyzer::ContentAnalyzer;
use crate::commit::{commit_work, CommittedWork};
use crate::debounce::{Debouncer, RunToken, TokenIssuer};
use crate::draft::WorkDraft;
use crate::metadata::MetadataExtractor;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Quiet period after the last URL change before a run starts.
    pub debounce_ms: u64,
    /// Whether debounced URL changes also trigger runs for design works.
    pub auto_extract_design: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            auto_extract_design: false,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `FOLIO_DEBOUNCE_MS` | `1000` | Quiet period before a run |
    /// | `FOLIO_AUTO_EXTRACT_DESIGN` | `false` | Auto-run for design works |
    pub fn from_env() -> Self {
        let debounce_ms = std::env::var("FOLIO_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEBOUNCE_MS);

        let auto_extract_design = std::env::var("FOLIO_AUTO_EXTRACT_DESIGN")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            debounce_ms,
            auto_extract_design,
        }
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_auto_extract_design(mut self, enabled: bool) -> Self {
        self.auto_extract_design = enabled;
        self
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    #[default]
    Idle,
    Extracting,
    Analyzing,
    Complete,
}

impl PipelinePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Analyzing => "analyzing",
            Self::Complete => "complete",
        }
    }

    /// Whether a run is between trigger and completion.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Extracting | Self::Analyzing)
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of the pipeline's editing state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineSnapshot {
    pub phase: PipelinePhase,
    pub draft: WorkDraft,
    /// Metadata extracted by the current run. Cleared when a run starts.
    pub metadata: Option<Metadata>,
    /// Analysis of the current run. Cleared when a run starts.
    pub analysis: Option<AnalysisResult>,
    pub analysis_source: Option<AnalysisSource>,
    /// User-facing message of the last failed run; cleared when a run starts.
    pub last_error: Option<String>,
    /// Token of the run that last changed this state.
    pub last_applied: Option<RunToken>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Extraction and analysis both applied.
    Completed(AnalysisOutcome),
    /// Metadata extraction failed; analysis was skipped.
    Failed(String),
    /// The trigger did not qualify for a run (malformed URL, design work).
    Ignored,
    /// A newer run took over; this run's results were discarded.
    Superseded,
}

/// Progress notifications, broadcast to every subscriber.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    RunStarted { token: RunToken, url: String },
    PhaseChanged { token: RunToken, phase: PipelinePhase },
    MetadataFailed { token: RunToken, message: String },
    AnalysisReady { token: RunToken, used_fallback: bool },
    /// Terminal event of every trigger. `token` is `None` for triggers that
    /// never started a run.
    RunFinished {
        token: Option<RunToken>,
        outcome: RunOutcome,
    },
    Reset,
}

// =============================================================================
// PIPELINE
// =============================================================================

struct PipelineInner {
    extractor: MetadataExtractor,
    analyzer: ContentAnalyzer,
    config: PipelineConfig,
    state: RwLock<PipelineSnapshot>,
    tokens: TokenIssuer,
    debouncer: Debouncer,
    events: broadcast::Sender<PipelineEvent>,
}

/// Debounced extract-then-analyze orchestrator for one draft.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct AnalysisPipeline {
    inner: Arc<PipelineInner>,
}

pub(crate) fn is_absolute_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && Url::parse(url).is_ok()
}

impl AnalysisPipeline {
    pub fn new(
        extractor: MetadataExtractor,
        analyzer: ContentAnalyzer,
        config: PipelineConfig,
    ) -> Self {
        Self::with_draft(extractor, analyzer, config, WorkDraft::default())
    }

    /// Create a pipeline editing an existing draft.
    pub fn with_draft(
        extractor: MetadataExtractor,
        analyzer: ContentAnalyzer,
        config: PipelineConfig,
        draft: WorkDraft,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        let debouncer = Debouncer::new(Duration::from_millis(config.debounce_ms));
        info!(
            subsystem = "pipeline",
            lookup = extractor.lookup_name(),
            model = analyzer.model_name(),
            debounce_ms = config.debounce_ms,
            auto_extract_design = config.auto_extract_design,
            "Analysis pipeline created"
        );
        Self {
            inner: Arc::new(PipelineInner {
                extractor,
                analyzer,
                config,
                state: RwLock::new(PipelineSnapshot {
                    draft,
                    ..Default::default()
                }),
                tokens: TokenIssuer::new(),
                debouncer,
                events,
            }),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.inner.events.subscribe()
    }

    pub async fn snapshot(&self) -> PipelineSnapshot {
        self.inner.state.read().await.clone()
    }

    /// Whether a debounced run is waiting for its quiet period to end.
    pub fn is_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    /// Edit the draft in place (title, work type, tools, ...).
    pub async fn update_draft<F>(&self, edit: F)
    where
        F: FnOnce(&mut WorkDraft),
    {
        let mut state = self.inner.state.write().await;
        edit(&mut state.draft);
    }

    /// Record a URL edit and (re)start the debounce timer.
    ///
    /// When the timer fires, the URL is validated and, for writing works
    /// (or any work with `auto_extract_design`), a run starts. The outcome
    /// arrives as a [`PipelineEvent::RunFinished`].
    pub async fn on_url_changed(&self, url: impl Into<String>) {
        let url = url.into();
        {
            let mut state = self.inner.state.write().await;
            state.draft.source_url = url.clone();
        }
        debug!(subsystem = "pipeline", url = %url, "Source URL changed");

        let pipeline = self.clone();
        self.inner.debouncer.schedule(async move {
            pipeline.run_debounced(url).await;
        });
    }

    async fn run_debounced(&self, url: String) -> RunOutcome {
        let work_type = self.inner.state.read().await.draft.work_type;
        if work_type == WorkType::Design && !self.inner.config.auto_extract_design {
            debug!(subsystem = "pipeline", "Skipping auto-extraction for design work");
            return self.finish(None, RunOutcome::Ignored);
        }
        self.run(&url).await
    }

    /// Run immediately, bypassing (and clearing) the debounce timer.
    pub async fn run_now(&self, url: &str) -> RunOutcome {
        self.inner.debouncer.cancel();
        self.run(url).await
    }

    /// Discard all editing state and supersede any in-flight run.
    pub async fn reset(&self) {
        self.inner.debouncer.cancel();
        let token = self.inner.tokens.issue();
        {
            let mut state = self.inner.state.write().await;
            *state = PipelineSnapshot::default();
        }
        debug!(subsystem = "pipeline", run_token = token.value(), "Pipeline reset");
        self.emit(PipelineEvent::Reset);
    }

    /// Persist the current draft and analysis.
    pub async fn commit(
        &self,
        repo: &dyn WorkRepository,
        user_id: Uuid,
    ) -> Result<CommittedWork> {
        let snapshot = self.snapshot().await;
        commit_work(repo, user_id, &snapshot.draft, snapshot.analysis.as_ref()).await
    }

    #[instrument(skip(self), fields(subsystem = "pipeline", component = "orchestrator", op = "run", run_token = tracing::field::Empty))]
    async fn run(&self, url: &str) -> RunOutcome {
        if !is_absolute_url(url) {
            debug!("Ignoring malformed URL");
            return self.finish(None, RunOutcome::Ignored);
        }
        let url = url.trim();
        let start = Instant::now();
        let token = self.inner.tokens.issue();
        Span::current().record("run_token", token.value());

        {
            let mut state = self.inner.state.write().await;
            if !self.inner.tokens.is_current(token) {
                return self.superseded(token, "start");
            }
            // Results of earlier runs describe another URL.
            state.phase = PipelinePhase::Extracting;
            state.metadata = None;
            state.analysis = None;
            state.analysis_source = None;
            state.last_error = None;
            state.last_applied = Some(token);
            state.draft.source_url = url.to_string();
        }
        self.emit(PipelineEvent::RunStarted {
            token,
            url: url.to_string(),
        });
        self.emit_phase(token, PipelinePhase::Extracting);

        let metadata = self.inner.extractor.extract(url).await;

        let descriptor = {
            let mut state = self.inner.state.write().await;
            if !self.inner.tokens.is_current(token) {
                return self.superseded(token, "extract");
            }
            state.last_applied = Some(token);

            if let Some(message) = metadata.error.clone() {
                state.phase = PipelinePhase::Idle;
                state.last_error = Some(message.clone());
                drop(state);

                self.emit(PipelineEvent::MetadataFailed {
                    token,
                    message: message.clone(),
                });
                self.emit_phase(token, PipelinePhase::Idle);
                info!(
                    success = false,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Pipeline run failed at extraction"
                );
                return self.finish(Some(token), RunOutcome::Failed(message));
            }

            state.draft.merge_metadata(&metadata);
            state.metadata = Some(metadata);
            state.phase = PipelinePhase::Analyzing;
            state.draft.descriptor()
        };
        self.emit_phase(token, PipelinePhase::Analyzing);

        let outcome = self.inner.analyzer.analyze_detailed(&descriptor).await;

        {
            let mut state = self.inner.state.write().await;
            if !self.inner.tokens.is_current(token) {
                return self.superseded(token, "analyze");
            }
            state.analysis = Some(outcome.result.clone());
            state.analysis_source = Some(outcome.source);
            state.phase = PipelinePhase::Complete;
            state.last_applied = Some(token);
        }
        self.emit(PipelineEvent::AnalysisReady {
            token,
            used_fallback: outcome.used_fallback(),
        });
        self.emit_phase(token, PipelinePhase::Complete);

        info!(
            success = true,
            used_fallback = outcome.used_fallback(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Pipeline run complete"
        );
        self.finish(Some(token), RunOutcome::Completed(outcome))
    }

    fn superseded(&self, token: RunToken, stage: &str) -> RunOutcome {
        debug!(
            run_token = token.value(),
            stage,
            "Discarding result of superseded run"
        );
        self.finish(Some(token), RunOutcome::Superseded)
    }

    fn finish(&self, token: Option<RunToken>, outcome: RunOutcome) -> RunOutcome {
        self.emit(PipelineEvent::RunFinished {
            token,
            outcome: outcome.clone(),
        });
        outcome
    }

    fn emit_phase(&self, token: RunToken, phase: PipelinePhase) {
        debug!(run_token = token.value(), phase = %phase, "Phase changed");
        self.emit(PipelineEvent::PhaseChanged { token, phase });
    }

    fn emit(&self, event: PipelineEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}
