//! Content-based similarity against a source product

use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::debug;

use super::normalize::{clamp_score, rank};
use crate::domain::product::{Product, ProductId};
use crate::domain::recommendation::{Reason, Recommendation, RecommendationType};

const SAME_CATEGORY_WEIGHT: f64 = 0.5;
const SAME_BRAND_WEIGHT: f64 = 0.3;
const PRICE_RANGE_WEIGHT: f64 = 0.2;

/// Relative price distance (exclusive) that still counts as the same range: 30%
const PRICE_RANGE_TOLERANCE: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer;

impl SimilarityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(
        &self,
        source_id: &ProductId,
        source: &Product,
        pool: &[Product],
        limit: usize,
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();
        let mut emitted = HashSet::new();

        for candidate in pool {
            if &candidate.id == source_id || !candidate.in_stock() {
                continue;
            }

            let Some((score, reason)) = self.score_candidate(source, candidate) else {
                continue;
            };
            if !emitted.insert(&candidate.id) {
                continue;
            }

            recommendations.push(Recommendation::new(
                candidate.id.clone(),
                clamp_score(score),
                reason,
                RecommendationType::Similar,
            ));
        }

        let ranked = rank(recommendations, limit);
        debug!(
            event_name = "recommend.similar.completed",
            source_product_id = %source_id,
            candidates = pool.len(),
            returned = ranked.len(),
            "similar products scored"
        );
        ranked
    }

    /// `None` when no attribute matched; such candidates are not emitted.
    fn score_candidate(&self, source: &Product, candidate: &Product) -> Option<(f64, Reason)> {
        let mut score = 0.0;
        let mut reason = None;

        if source.category_id.is_some() && candidate.category_id == source.category_id {
            score += SAME_CATEGORY_WEIGHT;
            reason.get_or_insert(Reason::SameCategory);
        }

        if source.brand_id.is_some() && candidate.brand_id == source.brand_id {
            score += SAME_BRAND_WEIGHT;
            reason.get_or_insert(Reason::SameBrand);
        }

        if within_price_range(source.price, candidate.price) {
            score += PRICE_RANGE_WEIGHT;
            reason.get_or_insert(Reason::SimilarPriceRange);
        }

        reason.map(|reason| (score, reason))
    }
}

fn within_price_range(source_price: Decimal, candidate_price: Decimal) -> bool {
    if source_price <= Decimal::ZERO || candidate_price <= Decimal::ZERO {
        return false;
    }
    // Tolerance is below 1, so the product never overflows.
    (candidate_price - source_price).abs() < source_price * PRICE_RANGE_TOLERANCE
}
