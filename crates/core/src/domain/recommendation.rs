//! Recommendation records returned by every strategy

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// Score at or above which a recommendation is considered a strong match
pub const HIGH_SCORE_THRESHOLD: f64 = 0.7;

/// Strategy that produced a recommendation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    /// Scored against the user's activity history
    Personalized,
    /// Content-based match against a source product
    Similar,
    /// Co-purchased with a source product
    AlsoBought,
    /// Popular across all users
    Trending,
}

impl RecommendationType {
    /// Lower-case label used in response messages and log fields
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationType::Personalized => "personalized",
            RecommendationType::Similar => "similar",
            RecommendationType::AlsoBought => "also-bought",
            RecommendationType::Trending => "trending",
        }
    }
}

/// Fixed explanation texts shown next to a recommendation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    CategoryInterest,
    PreferredBrand,
    NewForYou,
    SameCategory,
    SameBrand,
    SimilarPriceRange,
    CustomersAlsoBought,
    TrendingNow,
}

impl Reason {
    /// Get the human-readable text
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::CategoryInterest => "Based on your category interests",
            Reason::PreferredBrand => "From a brand you like",
            Reason::NewForYou => "New for you",
            Reason::SameCategory => "Same category",
            Reason::SameBrand => "Same brand",
            Reason::SimilarPriceRange => "Similar price range",
            Reason::CustomersAlsoBought => "Customers also bought",
            Reason::TrendingNow => "Trending now",
        }
    }
}

/// A single ranked target
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Recommended product
    pub product_id: ProductId,
    /// Relevance score (0.0 - 1.0)
    pub score: f64,
    /// Human-readable reasoning
    pub reason: String,
    /// Producing strategy
    pub recommendation_type: RecommendationType,
}

impl Recommendation {
    pub fn new(
        product_id: ProductId,
        score: f64,
        reason: Reason,
        recommendation_type: RecommendationType,
    ) -> Self {
        Self { product_id, score, reason: reason.as_str().to_owned(), recommendation_type }
    }

    pub fn is_high_score(&self) -> bool {
        self.score >= HIGH_SCORE_THRESHOLD
    }
}
