//! # folio-core
//!
//! Core types, traits, and abstractions for the folio creator-portfolio
//! service.
//!
//! This crate provides the domain model (works, metadata, analysis results),
//! the collaborator traits the ingestion pipeline is built against, and the
//! pure dashboard logic: activity aggregation and multi-predicate filtering.

pub mod defaults;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod stats;
pub mod temporal;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use filter::{
    available_design_types, available_tools, FilterPredicateSet, WorkFilterEngine, WorkTypeFilter,
};
pub use models::*;
pub use stats::{ActivityStats, WorkAggregator};
pub use temporal::DateRange;
pub use traits::*;
