//! Personalization from a user's activity history

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::normalize::{clamp_score, rank};
use crate::domain::activity::{ActivityType, UserActivity};
use crate::domain::product::{BrandId, CategoryId, Product, ProductId};
use crate::domain::recommendation::{Reason, Recommendation, RecommendationType};

/// Per-occurrence weight for category and brand affinity
const AFFINITY_STEP: f64 = 0.1;
const CATEGORY_AFFINITY_CAP: f64 = 0.4;
const BRAND_AFFINITY_CAP: f64 = 0.3;
const DISCOVERY_BONUS: f64 = 0.1;
/// Granted to every in-stock, not yet purchased candidate
const AVAILABILITY_BONUS: f64 = 0.2;
/// Candidates must score strictly above this. The availability bonus alone
/// equals it exactly and must not qualify.
const MIN_PERSONALIZED_SCORE: f64 = 0.2;

/// Preference signals aggregated from an activity log.
#[derive(Debug, Default)]
pub(crate) struct UserPreferences<'a> {
    viewed: HashSet<&'a ProductId>,
    purchased: HashSet<&'a ProductId>,
    categories: HashMap<&'a CategoryId, u32>,
    brands: HashMap<&'a BrandId, u32>,
}

impl<'a> UserPreferences<'a> {
    pub(crate) fn from_activities(activities: &'a [UserActivity]) -> Self {
        let mut preferences = Self::default();

        for activity in activities {
            if let Some(product_id) = &activity.product_id {
                match activity.activity_type {
                    ActivityType::View => {
                        preferences.viewed.insert(product_id);
                    }
                    ActivityType::Purchase => {
                        preferences.purchased.insert(product_id);
                    }
                    ActivityType::AddToCart | ActivityType::Search | ActivityType::Other => {}
                }
            }

            if let Some(category_id) = &activity.category_id {
                *preferences.categories.entry(category_id).or_insert(0) += 1;
            }
            if let Some(brand_id) = &activity.brand_id {
                *preferences.brands.entry(brand_id).or_insert(0) += 1;
            }
        }

        preferences
    }

    fn category_count(&self, category_id: Option<&CategoryId>) -> Option<u32> {
        category_id.and_then(|id| self.categories.get(id).copied())
    }

    fn brand_count(&self, brand_id: Option<&BrandId>) -> Option<u32> {
        brand_id.and_then(|id| self.brands.get(id).copied())
    }
}

/// Scores catalog products against a user's category and brand affinities.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalizedScorer;

impl PersonalizedScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(
        &self,
        activities: &[UserActivity],
        candidates: &[Product],
        limit: usize,
    ) -> Vec<Recommendation> {
        let preferences = UserPreferences::from_activities(activities);
        let mut recommendations = Vec::new();
        let mut emitted = HashSet::new();

        for candidate in candidates {
            if preferences.purchased.contains(&candidate.id) || !candidate.in_stock() {
                continue;
            }

            let Some((score, reason)) = self.score_candidate(&preferences, candidate) else {
                continue;
            };
            if !emitted.insert(&candidate.id) {
                continue;
            }

            recommendations.push(Recommendation::new(
                candidate.id.clone(),
                clamp_score(score),
                reason,
                RecommendationType::Personalized,
            ));
        }

        let ranked = rank(recommendations, limit);
        debug!(
            event_name = "recommend.personalized.completed",
            activities = activities.len(),
            candidates = candidates.len(),
            returned = ranked.len(),
            "personalized recommendations scored"
        );
        ranked
    }

    /// Total score and the first reason set, or `None` when the candidate
    /// does not clear the inclusion threshold.
    fn score_candidate(
        &self,
        preferences: &UserPreferences<'_>,
        candidate: &Product,
    ) -> Option<(f64, Reason)> {
        let mut score = 0.0;
        let mut reason = None;

        if let Some(count) = preferences.category_count(candidate.category_id.as_ref()) {
            score += (f64::from(count) * AFFINITY_STEP).min(CATEGORY_AFFINITY_CAP);
            reason.get_or_insert(Reason::CategoryInterest);
        }

        if let Some(count) = preferences.brand_count(candidate.brand_id.as_ref()) {
            score += (f64::from(count) * AFFINITY_STEP).min(BRAND_AFFINITY_CAP);
            reason.get_or_insert(Reason::PreferredBrand);
        }

        if !preferences.viewed.contains(&candidate.id) {
            score += DISCOVERY_BONUS;
            reason.get_or_insert(Reason::NewForYou);
        }

        score += AVAILABILITY_BONUS;

        if score > MIN_PERSONALIZED_SCORE {
            reason.map(|reason| (score, reason))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn in_stock(id: &str) -> Product {
        Product::new(id).with_stock(5)
    }

    #[test]
    fn empty_history_scores_discovery_plus_base() {
        let result = PersonalizedScorer::new().score(&[], &[in_stock("A")], 10);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].product_id, ProductId::new("A"));
        assert!(approx(result[0].score, 0.3));
        assert_eq!(result[0].reason, "New for you");
        assert_eq!(result[0].recommendation_type, RecommendationType::Personalized);
    }

    #[test]
    fn purchased_products_are_excluded_even_with_strong_preference() {
        let activities = vec![
            UserActivity::purchase("A").in_category("brakes").of_brand("bosch"),
            UserActivity::view("B").in_category("brakes").of_brand("bosch"),
            UserActivity::view("C").in_category("brakes").of_brand("bosch"),
        ];
        let candidates =
            vec![in_stock("A").with_category("brakes").with_brand("bosch"), in_stock("D")];

        let result = PersonalizedScorer::new().score(&activities, &candidates, 10);

        assert!(result.iter().all(|rec| rec.product_id != ProductId::new("A")));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn viewed_product_without_affinity_scores_exactly_base_and_is_dropped() {
        let activities = vec![UserActivity::view("A")];
        let result = PersonalizedScorer::new().score(&activities, &[in_stock("A")], 10);
        assert!(result.is_empty());
    }

    #[test]
    fn affinities_are_capped_and_category_reason_wins() {
        let activities: Vec<_> = (0..6)
            .map(|i| UserActivity::view(format!("seen-{i}")).in_category("filters").of_brand("mann"))
            .collect();
        let candidates = vec![in_stock("X").with_category("filters").with_brand("mann")];

        let result = PersonalizedScorer::new().score(&activities, &candidates, 10);

        // 0.4 (category cap) + 0.3 (brand cap) + 0.1 (discovery) + 0.2 (base)
        assert!(approx(result[0].score, 1.0));
        assert_eq!(result[0].reason, "Based on your category interests");
    }

    #[test]
    fn brand_reason_applies_when_category_has_no_signal() {
        let activities = vec![UserActivity::view("seen").of_brand("mann")];
        let candidates = vec![in_stock("X").with_brand("mann").with_category("other")];

        let result = PersonalizedScorer::new().score(&activities, &candidates, 10);

        assert_eq!(result[0].reason, "From a brand you like");
        assert!(approx(result[0].score, 0.4));
    }

    #[test]
    fn category_counts_include_every_activity_type() {
        let activities = vec![
            UserActivity::new(ActivityType::Search).in_category("oil"),
            UserActivity::new(ActivityType::Other).in_category("oil"),
            UserActivity::new(ActivityType::AddToCart).on_product("Y").in_category("oil"),
        ];
        let result =
            PersonalizedScorer::new().score(&activities, &[in_stock("Y").with_category("oil")], 10);

        // add-to-cart is neither a view nor a purchase, so discovery still applies
        assert!(approx(result[0].score, 0.3 + 0.3));
    }

    #[test]
    fn out_of_stock_candidates_are_skipped_and_limit_applies() {
        let candidates = vec![
            Product::new("none"),
            in_stock("A"),
            in_stock("B"),
            in_stock("C"),
        ];
        let result = PersonalizedScorer::new().score(&[], &candidates, 2);

        let ids: Vec<_> = result.iter().map(|rec| rec.product_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn duplicate_candidates_are_emitted_once() {
        let result = PersonalizedScorer::new().score(&[], &[in_stock("A"), in_stock("A")], 10);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn empty_pool_yields_empty_result() {
        let activities = vec![UserActivity::view("A").in_category("c")];
        assert!(PersonalizedScorer::new().score(&activities, &[], 10).is_empty());
    }
}
