//! Score normalization shared by every strategy

use std::collections::HashSet;

use crate::domain::product::{Product, ProductId};
use crate::domain::recommendation::Recommendation;

/// Clamp a raw score into [0, 1].
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

/// Scale `value` by the batch maximum. The denominator never drops below 1.
pub fn normalize_by_max(value: u64, max: u64) -> f64 {
    clamp_score(value as f64 / max.max(1) as f64)
}

/// Largest value in the batch, 0 for an empty batch.
pub fn batch_max(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().max().unwrap_or(0)
}

/// Ids of products that can be recommended right now (stock > 0).
pub fn available_ids(pool: &[Product]) -> HashSet<&ProductId> {
    pool.iter().filter(|product| product.in_stock()).map(|product| &product.id).collect()
}

/// Stable sort by score descending, then truncate.
///
/// `sort_by` is stable, so equal scores keep their input order.
pub fn rank(mut recommendations: Vec<Recommendation>, limit: usize) -> Vec<Recommendation> {
    recommendations.sort_by(|a, b| b.score.total_cmp(&a.score));
    recommendations.truncate(limit);
    recommendations
}
