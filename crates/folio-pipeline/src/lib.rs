//! # folio-pipeline
//!
//! Work ingestion for folio: a source URL goes through metadata extraction
//! and generative content analysis, producing an analysis record that is
//! committed alongside the work.
//!
//! ## Components
//!
//! - [`MetadataExtractor`]: URL to page metadata, never fails
//! - [`ContentAnalyzer`]: descriptor to validated analysis, always resolves
//! - [`AnalysisPipeline`]: debounced orchestrator with run tokens
//! - [`commit_work`]: persists a finished draft through a [`WorkRepository`]
//! - [`load_dashboard`]: works listing, activity stats and filtering
//!
//! [`WorkRepository`]: folio_core::WorkRepository

pub mod analyzer;
pub mod commit;
pub mod dashboard;
pub mod debounce;
pub mod draft;
pub mod metadata;
pub mod pipeline;
pub mod store;

pub use analyzer::{
    build_prompt, fallback_analysis, parse_analysis, AnalysisVerdict, AnalyzerConfig,
    ContentAnalyzer,
};
pub use commit::{commit_work, CommittedWork};
pub use dashboard::{load_dashboard, DashboardView};
pub use debounce::{Debouncer, RunToken, TokenIssuer};
pub use draft::WorkDraft;
pub use metadata::{
    HtmlMetadataLookup, LinkPreviewLookup, MetadataConfig, MetadataExtractor, MetadataProvider,
};
pub use pipeline::{
    AnalysisPipeline, PipelineConfig, PipelineEvent, PipelinePhase, PipelineSnapshot, RunOutcome,
};
pub use store::InMemoryWorkRepository;

// Re-export core types
pub use folio_core::*;
