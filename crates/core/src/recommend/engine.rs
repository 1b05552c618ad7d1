//! Recommendation engine facade

use serde::{Deserialize, Serialize};
use tracing::info;

use super::collaborative::CollaborativeScorer;
use super::combiner::RecommendationCombiner;
use super::personalized::PersonalizedScorer;
use super::request::{
    AlsoBoughtRequest, CombineRequest, Operation, PersonalizedRequest, RecommendationResponse,
    SimilarRequest, TrendingRequest,
};
use super::similarity::SimilarityScorer;
use super::trending::TrendingScorer;
use super::RecommendationResult;
use crate::config::{AppConfig, LimitsConfig};
use crate::domain::activity::UserActivity;
use crate::domain::product::{Product, ProductId};
use crate::domain::recommendation::Recommendation;
use crate::domain::signal::{PurchaseCoOccurrence, TrendingSignal};
use crate::errors::ApplicationError;

/// Service name reported by [`RecommendationEngine::health`]
pub const SERVICE_NAME: &str = "recommendation-engine";

/// Health snapshot for operator tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineHealth {
    pub status: String,
    pub service: String,
    pub backend_url: String,
}

/// Entry point for every strategy.
///
/// Holds configuration only; every call is a pure function of its
/// arguments, so one engine can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    backend_url: String,
    limits: LimitsConfig,
    personalized: PersonalizedScorer,
    similarity: SimilarityScorer,
    collaborative: CollaborativeScorer,
    trending: TrendingScorer,
    combiner: RecommendationCombiner,
}

impl RecommendationEngine {
    /// Create an engine with default limits
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self::with_limits(backend_url, LimitsConfig::default())
    }

    /// Create with custom default limits
    pub fn with_limits(backend_url: impl Into<String>, limits: LimitsConfig) -> Self {
        let engine = Self {
            backend_url: backend_url.into(),
            limits,
            personalized: PersonalizedScorer::new(),
            similarity: SimilarityScorer::new(),
            collaborative: CollaborativeScorer::new(),
            trending: TrendingScorer::new(),
            combiner: RecommendationCombiner::new(),
        };
        info!(
            event_name = "recommend.engine.initialized",
            backend_url = %engine.backend_url,
            "recommendation engine initialized"
        );
        engine
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_limits(config.engine.backend_url.clone(), config.limits)
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    pub fn health(&self) -> EngineHealth {
        EngineHealth {
            status: "healthy".to_owned(),
            service: SERVICE_NAME.to_owned(),
            backend_url: self.backend_url.clone(),
        }
    }

    pub fn personalized(
        &self,
        activities: &[UserActivity],
        candidates: &[Product],
        limit: usize,
    ) -> Vec<Recommendation> {
        self.personalized.score(activities, candidates, limit)
    }

    pub fn similar(
        &self,
        source_id: &ProductId,
        source: &Product,
        pool: &[Product],
        limit: usize,
    ) -> Vec<Recommendation> {
        self.similarity.score(source_id, source, pool, limit)
    }

    pub fn also_bought(
        &self,
        source_id: &ProductId,
        co_occurrences: &[PurchaseCoOccurrence],
        pool: &[Product],
        limit: usize,
    ) -> Vec<Recommendation> {
        self.collaborative.score(source_id, co_occurrences, pool, limit)
    }

    pub fn trending(
        &self,
        signals: &[TrendingSignal],
        pool: &[Product],
        limit: usize,
    ) -> Vec<Recommendation> {
        self.trending.score(signals, pool, limit)
    }

    /// Merge lists given in priority order.
    pub fn combine<L>(&self, lists: &[L], limit: usize) -> Vec<Recommendation>
    where
        L: AsRef<[Recommendation]>,
    {
        self.combiner.combine(lists, limit)
    }

    fn resolve_limit(&self, operation: Operation, requested: Option<usize>) -> usize {
        requested.unwrap_or_else(|| operation.default_limit(&self.limits))
    }

    pub fn handle_personalized(
        &self,
        request: PersonalizedRequest,
    ) -> RecommendationResult<RecommendationResponse> {
        let input = request.into_input()?;
        let limit = self.resolve_limit(Operation::Personalized, input.limit);
        let recommendations = self.personalized(&input.activities, &input.candidates, limit);
        info!(
            event_name = "recommend.request.completed",
            operation = Operation::Personalized.as_str(),
            user_id = input.user_id.as_deref().unwrap_or("anonymous"),
            returned = recommendations.len(),
            "recommendation request completed"
        );
        Ok(RecommendationResponse::new(Operation::Personalized, recommendations))
    }

    pub fn handle_similar(
        &self,
        request: SimilarRequest,
    ) -> RecommendationResult<RecommendationResponse> {
        let input = request.into_input()?;
        let limit = self.resolve_limit(Operation::Similar, input.limit);
        let recommendations = self.similar(&input.source_id, &input.source, &input.pool, limit);
        Ok(self.respond(Operation::Similar, recommendations))
    }

    pub fn handle_also_bought(
        &self,
        request: AlsoBoughtRequest,
    ) -> RecommendationResult<RecommendationResponse> {
        let input = request.into_input()?;
        let limit = self.resolve_limit(Operation::AlsoBought, input.limit);
        let recommendations =
            self.also_bought(&input.source_id, &input.co_occurrences, &input.pool, limit);
        Ok(self.respond(Operation::AlsoBought, recommendations))
    }

    pub fn handle_trending(
        &self,
        request: TrendingRequest,
    ) -> RecommendationResult<RecommendationResponse> {
        let input = request.into_input()?;
        let limit = self.resolve_limit(Operation::Trending, input.limit);
        let recommendations = self.trending(&input.signals, &input.pool, limit);
        Ok(self.respond(Operation::Trending, recommendations))
    }

    pub fn handle_combine(
        &self,
        request: CombineRequest,
    ) -> RecommendationResult<RecommendationResponse> {
        let input = request.into_input()?;
        let limit = self.resolve_limit(Operation::Combine, input.limit);
        let recommendations = self.combine(&input.lists, limit);
        Ok(self.respond(Operation::Combine, recommendations))
    }

    /// Decode a JSON request body for `operation` and run it.
    pub fn handle_json(
        &self,
        operation: Operation,
        payload: &str,
    ) -> Result<RecommendationResponse, ApplicationError> {
        let response = match operation {
            Operation::Personalized => self.handle_personalized(decode(payload)?)?,
            Operation::Similar => self.handle_similar(decode(payload)?)?,
            Operation::AlsoBought => self.handle_also_bought(decode(payload)?)?,
            Operation::Trending => self.handle_trending(decode(payload)?)?,
            Operation::Combine => self.handle_combine(decode(payload)?)?,
        };
        Ok(response)
    }

    fn respond(
        &self,
        operation: Operation,
        recommendations: Vec<Recommendation>,
    ) -> RecommendationResponse {
        info!(
            event_name = "recommend.request.completed",
            operation = operation.as_str(),
            returned = recommendations.len(),
            "recommendation request completed"
        );
        RecommendationResponse::new(operation, recommendations)
    }
}

fn decode<T: serde::de::DeserializeOwned>(payload: &str) -> Result<T, ApplicationError> {
    serde_json::from_str(payload).map_err(|error| ApplicationError::Payload(error.to_string()))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::domain::recommendation::RecommendationType;
    use crate::errors::DomainError;

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new("http://localhost:8080")
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_shareable_across_threads() {
        assert_send_sync::<RecommendationEngine>();
    }

    #[test]
    fn health_reports_backend_identity() {
        let health = engine().health();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, "recommendation-engine");
        assert_eq!(health.backend_url, "http://localhost:8080");
    }

    #[test]
    fn absent_limit_uses_configured_default() {
        let limits = LimitsConfig { trending: 2, ..LimitsConfig::default() };
        let engine = RecommendationEngine::with_limits("http://localhost:8080", limits);

        let payload = json!({
            "trendingData": [
                {"productId": "a", "viewCount": 5},
                {"productId": "b", "viewCount": 4},
                {"productId": "c", "viewCount": 3}
            ],
            "allProducts": [
                {"id": "a", "stock": 1}, {"id": "b", "stock": 1}, {"id": "c", "stock": 1}
            ]
        });

        let response =
            engine.handle_json(Operation::Trending, &payload.to_string()).expect("trending");
        assert_eq!(response.count, 2);
        assert_eq!(response.message, "Found 2 trending products");
    }

    #[test]
    fn explicit_limit_wins_over_default() {
        let payload = json!({
            "products": [{"id": "a", "stock": 1}, {"id": "b", "stock": 1}],
            "limit": 1
        });

        let response =
            engine().handle_json(Operation::Personalized, &payload.to_string()).expect("ok");
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].recommendation_type, RecommendationType::Personalized);
    }

    #[test]
    fn zero_limit_yields_empty_list() {
        let pool = vec![Product::new("a").with_stock(1)];
        assert!(engine().personalized(&[], &pool, 0).is_empty());
    }

    #[test]
    fn malformed_json_is_a_payload_error() {
        let error = engine().handle_json(Operation::Similar, "{not json").expect_err("bad json");
        assert!(matches!(error, ApplicationError::Payload(_)));
    }

    #[test]
    fn missing_mandatory_list_is_a_domain_error() {
        let error = engine()
            .handle_json(Operation::AlsoBought, r#"{"productId": "src", "allProducts": []}"#)
            .expect_err("purchaseData is required");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::MissingField {
                operation: "also-bought",
                field: "purchaseData",
            })
        );
    }

    #[test]
    fn similar_request_end_to_end() {
        let payload = json!({
            "productId": "src",
            "product": {"id": "src", "categoryId": 1, "brandId": 2, "price": 100},
            "allProducts": [
                {"id": "src", "categoryId": 1, "brandId": 2, "price": 100, "stock": 4},
                {"id": "twin", "categoryId": 1, "brandId": 2, "price": 95, "stock": 4},
                {"id": "cousin", "categoryId": 1, "price": 500, "stock": 4},
                {"id": "stranger", "categoryId": 9, "price": 900, "stock": 4}
            ]
        });

        let response = engine().handle_json(Operation::Similar, &payload.to_string()).expect("ok");
        let ids: Vec<_> =
            response.recommendations.iter().map(|rec| rec.product_id.as_str()).collect();

        assert_eq!(ids, vec!["twin", "cousin"]);
        assert_eq!(response.recommendations[0].score, 1.0);
        assert_eq!(response.recommendations[1].reason, "Same category");
    }

    #[test]
    fn tiny_source_price_against_huge_candidate_price_is_scored() {
        let payload = json!({
            "productId": "src",
            "product": {"price": "0.0001"},
            "allProducts": [
                {"id": "a", "price": "79228162514264337593543950", "stock": 1},
                {"id": "b", "price": "0.00011", "stock": 1}
            ]
        });

        let response = engine().handle_json(Operation::Similar, &payload.to_string()).expect("ok");
        let ids: Vec<_> =
            response.recommendations.iter().map(|rec| rec.product_id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn direct_calls_are_idempotent() {
        let pool = vec![
            Product::new("a").with_category("c").with_price(Decimal::new(10, 0)).with_stock(1),
            Product::new("b").with_category("c").with_price(Decimal::new(11, 0)).with_stock(1),
        ];
        let engine = engine();
        let source = pool[0].clone();

        let first = engine.similar(&source.id, &source, &pool, 6);
        let second = engine.similar(&source.id, &source, &pool, 6);
        assert_eq!(first, second);
    }
}
