//! Multi-strategy product recommendations
//!
//! Four independent scorers (personalized, similar, also-bought, trending)
//! plus a combiner that merges their ranked outputs. Every call is a pure
//! function of its inputs.

mod collaborative;
mod combiner;
mod engine;
pub mod normalize;
mod personalized;
pub mod request;
mod similarity;
mod trending;

pub use collaborative::CollaborativeScorer;
pub use combiner::RecommendationCombiner;
pub use engine::{EngineHealth, RecommendationEngine};
pub use personalized::PersonalizedScorer;
pub use request::{
    AlsoBoughtRequest, CombineRequest, PersonalizedRequest, RecommendationResponse,
    SimilarRequest, TrendingRequest,
};
pub use similarity::SimilarityScorer;
pub use trending::TrendingScorer;

use crate::errors::DomainError;

/// Result type for recommendation operations
pub type RecommendationResult<T> = Result<T, DomainError>;

/// Default result size for personalized recommendations
pub const DEFAULT_PERSONALIZED_LIMIT: usize = 10;

/// Default result size for similar products
pub const DEFAULT_SIMILAR_LIMIT: usize = 6;

/// Default result size for also-bought products
pub const DEFAULT_ALSO_BOUGHT_LIMIT: usize = 6;

/// Default result size for trending products
pub const DEFAULT_TRENDING_LIMIT: usize = 10;

/// Default result size for combined lists
pub const DEFAULT_COMBINED_LIMIT: usize = 10;

/// Upper bound accepted for any configured default limit
pub const MAX_DEFAULT_LIMIT: usize = 100;
