//! Activity rollups for the dashboard.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::defaults::MONTHS_PER_YEAR;
use crate::models::Work;

/// Summary statistics over a user's works.
///
/// Derived on every load from the current works snapshot; never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityStats {
    pub total_works: usize,
    /// Sum of description lengths in characters.
    pub total_characters: usize,
    /// `total_characters / total_works`, rounded; 0 with no works.
    pub average_characters: usize,
    /// Works per month-of-year of `created_at` (UTC), index 0 = January.
    pub monthly_works: [u32; MONTHS_PER_YEAR],
}

pub struct WorkAggregator;

impl WorkAggregator {
    /// Compute stats for a works snapshot. Pure and order-independent.
    pub fn aggregate(works: &[Work]) -> ActivityStats {
        let total_works = works.len();
        let total_characters: usize = works.iter().map(Work::description_chars).sum();

        let mut monthly_works = [0u32; MONTHS_PER_YEAR];
        for work in works {
            monthly_works[work.created_at.month0() as usize] += 1;
        }

        ActivityStats {
            total_works,
            total_characters,
            average_characters: rounded_average(total_characters, total_works),
            monthly_works,
        }
    }
}

// Half rounds up, matching Math.round on positive values.
fn rounded_average(total: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (total * 2 + count) / (count * 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkType;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn work_with(description: Option<String>, month: u32) -> Work {
        Work {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: "t".into(),
            description,
            source_url: None,
            thumbnail_url: None,
            work_type: WorkType::Writing,
            design_type: None,
            tools_used: BTreeSet::new(),
            created_at: Utc.with_ymd_and_hms(2026, month, 15, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = WorkAggregator::aggregate(&[]);
        assert_eq!(stats.total_works, 0);
        assert_eq!(stats.total_characters, 0);
        assert_eq!(stats.average_characters, 0);
        assert_eq!(stats.monthly_works, [0; 12]);
    }

    #[test]
    fn test_character_totals_with_missing_description() {
        let works = vec![
            work_with(Some("a".repeat(100)), 1),
            work_with(None, 2),
            work_with(Some("b".repeat(50)), 3),
        ];
        let stats = WorkAggregator::aggregate(&works);
        assert_eq!(stats.total_works, 3);
        assert_eq!(stats.total_characters, 150);
        assert_eq!(stats.average_characters, 50);
    }

    #[test]
    fn test_average_rounds_half_up() {
        assert_eq!(rounded_average(5, 2), 3);
        assert_eq!(rounded_average(4, 3), 1);
        assert_eq!(rounded_average(5, 3), 2);
    }

    #[test]
    fn test_monthly_buckets_by_created_month() {
        let works = vec![work_with(None, 1), work_with(None, 1), work_with(None, 12)];
        let stats = WorkAggregator::aggregate(&works);
        assert_eq!(stats.monthly_works[0], 2);
        assert_eq!(stats.monthly_works[11], 1);
        assert_eq!(stats.monthly_works.iter().sum::<u32>(), 3);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let works = vec![work_with(Some("hello".into()), 4), work_with(None, 6)];
        assert_eq!(
            WorkAggregator::aggregate(&works),
            WorkAggregator::aggregate(&works)
        );
    }
}
