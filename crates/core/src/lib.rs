pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;

pub use config::{AppConfig, ConfigError, LimitsConfig, LoadOptions};
pub use domain::activity::{ActivityType, UserActivity};
pub use domain::product::{BrandId, CategoryId, Product, ProductId};
pub use domain::recommendation::{Reason, Recommendation, RecommendationType};
pub use domain::signal::{PurchaseCoOccurrence, TrendingSignal};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommend::request::Operation;
pub use recommend::{
    EngineHealth, RecommendationCombiner, RecommendationEngine, RecommendationResponse,
};
