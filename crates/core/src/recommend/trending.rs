//! Popularity ranking from view signals

use std::collections::HashSet;

use tracing::debug;

use super::normalize::{available_ids, batch_max, normalize_by_max, rank};
use crate::domain::product::Product;
use crate::domain::recommendation::{Reason, Recommendation, RecommendationType};
use crate::domain::signal::TrendingSignal;

/// Ranks available products by a popularity signal, independent of any user.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendingScorer;

impl TrendingScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(
        &self,
        signals: &[TrendingSignal],
        pool: &[Product],
        limit: usize,
    ) -> Vec<Recommendation> {
        let available = available_ids(pool);
        let max_views = batch_max(signals.iter().map(|signal| signal.view_count));
        let mut emitted = HashSet::new();

        let recommendations = signals
            .iter()
            .filter(|signal| available.contains(&signal.product_id))
            .filter(|signal| emitted.insert(&signal.product_id))
            .map(|signal| {
                Recommendation::new(
                    signal.product_id.clone(),
                    normalize_by_max(signal.view_count, max_views),
                    Reason::TrendingNow,
                    RecommendationType::Trending,
                )
            })
            .collect();

        let ranked = rank(recommendations, limit);
        debug!(
            event_name = "recommend.trending.completed",
            signals = signals.len(),
            returned = ranked.len(),
            "trending products scored"
        );
        ranked
    }
}
