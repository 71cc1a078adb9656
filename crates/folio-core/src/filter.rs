//! Multi-predicate work filtering for the dashboard.
//!
//! A [`FilterPredicateSet`] composes every filtering dimension the dashboard
//! exposes:
//!
//! - **Search**: case-insensitive substring over title or description
//! - **Work type**: writing / design
//! - **Design type**: sub-type of design works (ロゴ, バナー, ...)
//! - **Tools**: works must list every required tool
//! - **Date range**: fixed-day recency windows
//!
//! All dimensions are AND-combined. A dimension left at its default value
//! matches everything, so the default predicate set is the identity filter.
//!
//! # Example
//!
//! ```
//! use folio_core::{FilterPredicateSet, WorkFilterEngine, WorkType};
//! use folio_core::DateRange;
//!
//! let predicates = FilterPredicateSet::new()
//!     .with_work_type(WorkType::Design)
//!     .with_design_type("ロゴ")
//!     .with_date_range(DateRange::Month);
//!
//! assert!(!predicates.is_empty());
//! let visible = WorkFilterEngine::filter(&[], &predicates);
//! assert!(visible.is_empty());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

use crate::models::{Work, WorkType};
use crate::temporal::DateRange;

// =============================================================================
// WORK TYPE FILTER
// =============================================================================

/// Work-type dimension with an explicit `all` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkTypeFilter {
    #[default]
    All,
    Writing,
    Design,
}

impl WorkTypeFilter {
    pub fn matches(&self, work_type: WorkType) -> bool {
        match self {
            Self::All => true,
            Self::Writing => work_type == WorkType::Writing,
            Self::Design => work_type == WorkType::Design,
        }
    }
}

impl From<WorkType> for WorkTypeFilter {
    fn from(work_type: WorkType) -> Self {
        match work_type {
            WorkType::Writing => Self::Writing,
            WorkType::Design => Self::Design,
        }
    }
}

// =============================================================================
// PREDICATE SET
// =============================================================================

/// The active filter criteria of a dashboard view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicateSet {
    /// Substring searched in title or description. Empty matches all.
    #[serde(default)]
    pub search_query: String,

    #[serde(default)]
    pub work_type: WorkTypeFilter,

    /// Exact design sub-type. `None` matches all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_type: Option<String>,

    /// Tools a work must list, all of them.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tools: BTreeSet<String>,

    #[serde(default)]
    pub date_range: DateRange,
}

impl FilterPredicateSet {
    /// Create an empty predicate set (matches every work).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    pub fn with_work_type(mut self, work_type: impl Into<WorkTypeFilter>) -> Self {
        self.work_type = work_type.into();
        self
    }

    pub fn with_design_type(mut self, design_type: impl Into<String>) -> Self {
        self.design_type = Some(design_type.into());
        self
    }

    /// Require a tool (AND with previously required tools).
    pub fn require_tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.insert(tool.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    /// Check if no dimension constrains the result.
    pub fn is_empty(&self) -> bool {
        self.search_query.is_empty()
            && self.work_type == WorkTypeFilter::All
            && self.active_design_type().is_none()
            && self.tools.is_empty()
            && self.date_range.is_all()
    }

    fn active_design_type(&self) -> Option<&str> {
        self.design_type.as_deref().filter(|d| !d.is_empty())
    }

    /// Evaluate every dimension against one work.
    pub fn matches(&self, work: &Work, now: DateTime<Utc>) -> bool {
        self.matches_search(work)
            && self.work_type.matches(work.work_type)
            && self.matches_design_type(work)
            && self.matches_tools(work)
            && self.date_range.contains(work.created_at, now)
    }

    fn matches_search(&self, work: &Work) -> bool {
        if self.search_query.is_empty() {
            return true;
        }
        let query = self.search_query.to_lowercase();
        work.title.to_lowercase().contains(&query)
            || work
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&query))
                .unwrap_or(false)
    }

    fn matches_design_type(&self, work: &Work) -> bool {
        match self.active_design_type() {
            None => true,
            Some(wanted) => work.design_type.as_deref() == Some(wanted),
        }
    }

    fn matches_tools(&self, work: &Work) -> bool {
        self.tools.is_subset(&work.tools_used)
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Applies a predicate set to a work collection.
pub struct WorkFilterEngine;

impl WorkFilterEngine {
    /// Filter against the current time.
    pub fn filter(works: &[Work], predicates: &FilterPredicateSet) -> Vec<Work> {
        Self::filter_at(works, predicates, Utc::now())
    }

    /// Filter with an explicit "now", preserving the input order.
    pub fn filter_at(
        works: &[Work],
        predicates: &FilterPredicateSet,
        now: DateTime<Utc>,
    ) -> Vec<Work> {
        if predicates.is_empty() {
            return works.to_vec();
        }
        let matched: Vec<Work> = works
            .iter()
            .filter(|w| predicates.matches(w, now))
            .cloned()
            .collect();
        trace!(
            input_count = works.len(),
            result_count = matched.len(),
            "Filtered works"
        );
        matched
    }
}

/// Sorted distinct tools across works, for filter pickers.
pub fn available_tools(works: &[Work]) -> Vec<String> {
    works
        .iter()
        .flat_map(|w| w.tools_used.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct design sub-types across design works.
pub fn available_design_types(works: &[Work]) -> Vec<String> {
    works
        .iter()
        .filter(|w| w.work_type == WorkType::Design)
        .filter_map(|w| w.design_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
