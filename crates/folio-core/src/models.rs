//! Core data models for folio.
//!
//! These types are shared across all folio crates and represent the core
//! domain entities: works, the metadata derived for them, and the structured
//! analysis produced by the generative model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

// =============================================================================
// WORK TYPES
// =============================================================================

/// Kind of creative artifact a work represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    /// Article, blog post, or other prose.
    #[default]
    Writing,
    /// Logo, banner, illustration, UI, and similar visual work.
    Design,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Writing => "writing",
            Self::Design => "design",
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "writing" => Ok(Self::Writing),
            "design" => Ok(Self::Design),
            _ => Err(Error::InvalidInput(format!("Unknown work type: {}", s))),
        }
    }
}

/// A single user-submitted creative artifact.
///
/// `id` and `user_id` are fixed at creation; content fields may be edited
/// later by the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub source_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub work_type: WorkType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tools_used: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Work {
    /// Character count of the description (0 when absent).
    pub fn description_chars(&self) -> usize {
        self.description
            .as_deref()
            .map(|d| d.chars().count())
            .unwrap_or(0)
    }
}

/// Request for creating a new work through the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewWork {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub source_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub work_type: WorkType,
    pub design_type: Option<String>,
    pub tools_used: BTreeSet<String>,
}

// =============================================================================
// INGESTION TYPES
// =============================================================================

/// Content handed to the analyzer for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    pub title: String,
    pub description: Option<String>,
    pub source_url: Option<String>,
}

impl ContentDescriptor {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// Page metadata derived from a source URL.
///
/// On failure `error` carries a user-facing message and every content
/// field is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Metadata {
    /// Failed extraction carrying only the message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// =============================================================================
// ANALYSIS TYPES
// =============================================================================

/// A named dimension with a 0–100 score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub name: String,
    pub score: u8,
}

impl ScoredItem {
    pub fn new(name: impl Into<String>, score: u8) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Areas of professional knowledge evidenced by the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expertise {
    pub categories: Vec<ScoredItem>,
    #[serde(default)]
    pub summary: String,
}

/// Characteristics of the writing or design style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentStyle {
    pub features: Vec<ScoredItem>,
    #[serde(default)]
    pub summary: String,
}

/// Topics the creator is interested in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interests {
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// Structured talent analysis for a single work.
///
/// All three sections are always present. Responses that cannot supply
/// them are replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub expertise: Expertise,
    #[serde(alias = "contentStyle")]
    pub content_style: ContentStyle,
    pub interests: Interests,
}

impl AnalysisResult {
    /// Highest score across expertise categories, if any.
    pub fn top_category(&self) -> Option<&ScoredItem> {
        self.expertise.categories.iter().max_by_key(|c| c.score)
    }
}

/// Where an analysis result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    /// Parsed and validated from the model response.
    Model,
    /// The fixed fallback replaced a failed or invalid response.
    Fallback,
}

/// Analysis result plus the side-channel needed to tell genuine output
/// from the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub source: AnalysisSource,
    /// Why the fallback was used, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AnalysisOutcome {
    pub fn used_fallback(&self) -> bool {
        self.source == AnalysisSource::Fallback
    }
}

/// Analysis persisted alongside a work (1:0..1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkAnalysis {
    pub work_id: Uuid,
    pub analysis: AnalysisResult,
    pub created_at: DateTime<Utc>,
}
