//! "Customers also bought" from co-purchase counts

use std::collections::HashSet;

use tracing::debug;

use super::normalize::{available_ids, batch_max, normalize_by_max, rank};
use crate::domain::product::{Product, ProductId};
use crate::domain::recommendation::{Reason, Recommendation, RecommendationType};
use crate::domain::signal::PurchaseCoOccurrence;

#[derive(Debug, Clone, Copy, Default)]
pub struct CollaborativeScorer;

impl CollaborativeScorer {
    pub fn new() -> Self {
        Self
    }

    /// Counts are normalized against the largest count in the whole input,
    /// including entries later dropped as unavailable.
    pub fn score(
        &self,
        source_id: &ProductId,
        co_occurrences: &[PurchaseCoOccurrence],
        pool: &[Product],
        limit: usize,
    ) -> Vec<Recommendation> {
        let available = available_ids(pool);
        let max_count = batch_max(co_occurrences.iter().map(|entry| entry.count));
        let mut emitted = HashSet::new();

        let recommendations = co_occurrences
            .iter()
            .filter(|entry| &entry.product_id != source_id)
            .filter(|entry| available.contains(&entry.product_id))
            .filter(|entry| emitted.insert(&entry.product_id))
            .map(|entry| {
                Recommendation::new(
                    entry.product_id.clone(),
                    normalize_by_max(entry.count, max_count),
                    Reason::CustomersAlsoBought,
                    RecommendationType::AlsoBought,
                )
            })
            .collect();

        let ranked = rank(recommendations, limit);
        debug!(
            event_name = "recommend.also_bought.completed",
            source_product_id = %source_id,
            co_occurrences = co_occurrences.len(),
            returned = ranked.len(),
            "also-bought products scored"
        );
        ranked
    }
}
