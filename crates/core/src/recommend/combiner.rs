//! Merge ranked lists from several strategies

use std::collections::HashSet;

use tracing::debug;

use super::normalize::rank;
use crate::domain::recommendation::Recommendation;

/// Merges recommendation lists passed in priority order.
///
/// A product keeps the entry from the first list (and first position) that
/// mentions it, even when a later duplicate carries a higher score.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationCombiner;

impl RecommendationCombiner {
    pub fn new() -> Self {
        Self
    }

    pub fn combine<L>(&self, lists: &[L], limit: usize) -> Vec<Recommendation>
    where
        L: AsRef<[Recommendation]>,
    {
        let mut seen = HashSet::new();
        let mut combined = Vec::new();
        let mut duplicates = 0usize;

        for recommendation in lists.iter().flat_map(|list| list.as_ref()) {
            if seen.insert(&recommendation.product_id) {
                combined.push(recommendation.clone());
            } else {
                duplicates += 1;
            }
        }

        let ranked = rank(combined, limit);
        debug!(
            event_name = "recommend.combine.completed",
            lists = lists.len(),
            duplicates,
            returned = ranked.len(),
            "recommendation lists combined"
        );
        ranked
    }
}
