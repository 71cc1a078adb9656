//! Dashboard loading: a user's works, their stats, and the filtered view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use folio_core::{
    available_design_types, available_tools, ActivityStats, FilterPredicateSet, Result, Work,
    WorkAggregator, WorkFilterEngine, WorkRepository,
};

/// Everything the dashboard renders for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// All works, newest first.
    pub works: Vec<Work>,
    /// Stats over all works, independent of the active filters.
    pub stats: ActivityStats,
    /// Works passing the predicate set, in listing order.
    pub filtered: Vec<Work>,
    pub available_tools: Vec<String>,
    pub available_design_types: Vec<String>,
}

/// Load and derive the dashboard view for `user_id`.
#[instrument(skip(repo, predicates), fields(subsystem = "dashboard", component = "loader", op = "load_dashboard", user_id = %user_id))]
pub async fn load_dashboard(
    repo: &dyn WorkRepository,
    user_id: Uuid,
    predicates: &FilterPredicateSet,
    now: DateTime<Utc>,
) -> Result<DashboardView> {
    let works = repo.list_works(user_id).await?;
    let stats = WorkAggregator::aggregate(&works);
    let filtered = WorkFilterEngine::filter_at(&works, predicates, now);

    debug!(
        total_works = works.len(),
        result_count = filtered.len(),
        "Dashboard loaded"
    );

    Ok(DashboardView {
        available_tools: available_tools(&works),
        available_design_types: available_design_types(&works),
        stats,
        filtered,
        works,
    })
}
