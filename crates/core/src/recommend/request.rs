//! Request and response payloads exchanged with the catalog backend
//!
//! Wire records keep every field optional so that a single malformed record
//! is skipped instead of failing the whole request. Only structurally
//! missing inputs (a required list or identifier absent entirely) are
//! reported as errors.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize::clamp_score;
use super::RecommendationResult;
use crate::config::LimitsConfig;
use crate::domain::activity::{ActivityType, UserActivity};
use crate::domain::product::{BrandId, CategoryId, Product, ProductId};
use crate::domain::recommendation::{Recommendation, RecommendationType};
use crate::domain::signal::{PurchaseCoOccurrence, TrendingSignal};
use crate::errors::DomainError;

/// Identifier as sent by the backend: UUID strings for products, numeric
/// keys for categories and brands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Text(String),
    Number(i64),
}

impl Identifier {
    fn into_string(self) -> String {
        match self {
            Identifier::Text(value) => value,
            Identifier::Number(value) => value.to_string(),
        }
    }

    /// Blank strings count as absent.
    fn into_non_empty(self) -> Option<String> {
        Some(self.into_string()).filter(|value| !value.trim().is_empty())
    }
}

/// Conversion from a wire record into its domain value.
trait WireRecord {
    type Output;
    const KIND: &'static str;

    fn into_domain(self) -> Option<Self::Output>;
}

fn convert_records<R: WireRecord>(records: Vec<R>, operation: Operation) -> Vec<R::Output> {
    let total = records.len();
    let converted: Vec<_> = records.into_iter().filter_map(R::into_domain).collect();
    let skipped = total - converted.len();
    if skipped > 0 {
        debug!(
            event_name = "recommend.payload.record_skipped",
            operation = operation.as_str(),
            record_kind = R::KIND,
            skipped,
            "skipped records without a usable identifier"
        );
    }
    converted
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: Option<Identifier>,
    pub category_id: Option<Identifier>,
    pub brand_id: Option<Identifier>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
}

impl ProductRecord {
    fn into_product_with_id(self, id: ProductId) -> Product {
        Product {
            id,
            category_id: self.category_id.and_then(Identifier::into_non_empty).map(CategoryId),
            brand_id: self.brand_id.and_then(Identifier::into_non_empty).map(BrandId),
            price: self.price.unwrap_or(Decimal::ZERO),
            stock: self.stock.unwrap_or(0),
        }
    }
}

impl WireRecord for ProductRecord {
    type Output = Product;
    const KIND: &'static str = "product";

    fn into_domain(mut self) -> Option<Product> {
        let id = self.id.take()?.into_non_empty()?;
        Some(self.into_product_with_id(ProductId(id)))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub product_id: Option<Identifier>,
    pub activity_type: Option<ActivityType>,
    pub category_id: Option<Identifier>,
    pub brand_id: Option<Identifier>,
}

impl WireRecord for ActivityRecord {
    type Output = UserActivity;
    const KIND: &'static str = "activity";

    /// Activities never need a product (searches have none), so every
    /// record converts.
    fn into_domain(self) -> Option<UserActivity> {
        Some(UserActivity {
            product_id: self.product_id.and_then(Identifier::into_non_empty).map(ProductId),
            activity_type: self.activity_type.unwrap_or(ActivityType::Other),
            category_id: self.category_id.and_then(Identifier::into_non_empty).map(CategoryId),
            brand_id: self.brand_id.and_then(Identifier::into_non_empty).map(BrandId),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoOccurrenceRecord {
    pub product_id: Option<Identifier>,
    /// Defaults to a single co-purchase when absent.
    pub count: Option<u64>,
}

impl WireRecord for CoOccurrenceRecord {
    type Output = PurchaseCoOccurrence;
    const KIND: &'static str = "co_occurrence";

    fn into_domain(self) -> Option<PurchaseCoOccurrence> {
        let product_id = self.product_id?.into_non_empty()?;
        Some(PurchaseCoOccurrence { product_id: ProductId(product_id), count: self.count.unwrap_or(1) })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingRecord {
    pub product_id: Option<Identifier>,
    /// Defaults to a single view when absent.
    pub view_count: Option<u64>,
}

impl WireRecord for TrendingRecord {
    type Output = TrendingSignal;
    const KIND: &'static str = "trending_signal";

    fn into_domain(self) -> Option<TrendingSignal> {
        let product_id = self.product_id?.into_non_empty()?;
        Some(TrendingSignal {
            product_id: ProductId(product_id),
            view_count: self.view_count.unwrap_or(1),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRecord {
    pub product_id: Option<Identifier>,
    pub score: Option<f64>,
    pub reason: Option<String>,
    pub recommendation_type: Option<RecommendationType>,
}

impl WireRecord for RecommendationRecord {
    type Output = Recommendation;
    const KIND: &'static str = "recommendation";

    fn into_domain(self) -> Option<Recommendation> {
        let product_id = self.product_id?.into_non_empty()?;
        Some(Recommendation {
            product_id: ProductId(product_id),
            score: clamp_score(self.score.unwrap_or(0.0)),
            reason: self.reason.unwrap_or_default(),
            recommendation_type: self.recommendation_type?,
        })
    }
}

/// Operations exposed to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Personalized,
    Similar,
    AlsoBought,
    Trending,
    Combine,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Personalized,
        Operation::Similar,
        Operation::AlsoBought,
        Operation::Trending,
        Operation::Combine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Personalized => "personalized",
            Operation::Similar => "similar",
            Operation::AlsoBought => "also-bought",
            Operation::Trending => "trending",
            Operation::Combine => "combine",
        }
    }

    pub fn default_limit(&self, limits: &LimitsConfig) -> usize {
        match self {
            Operation::Personalized => limits.personalized,
            Operation::Similar => limits.similar,
            Operation::AlsoBought => limits.also_bought,
            Operation::Trending => limits.trending,
            Operation::Combine => limits.combined,
        }
    }

    /// Noun used in the response message, e.g. "Found 3 trending products".
    fn subject(&self) -> &'static str {
        match self {
            Operation::Personalized => "personalized recommendations",
            Operation::Similar => "similar products",
            Operation::AlsoBought => "also-bought products",
            Operation::Trending => "trending products",
            Operation::Combine => "combined recommendations",
        }
    }

    fn missing(&self, field: &'static str) -> DomainError {
        DomainError::MissingField { operation: self.as_str(), field }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "personalized" => Ok(Self::Personalized),
            "similar" => Ok(Self::Similar),
            "also-bought" => Ok(Self::AlsoBought),
            "trending" => Ok(Self::Trending),
            "combine" => Ok(Self::Combine),
            other => Err(DomainError::InvalidRequest(format!(
                "unsupported operation `{other}` (expected personalized|similar|also-bought|trending|combine)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedRequest {
    /// Only used to correlate log events.
    pub user_id: Option<Identifier>,
    pub user_activities: Option<Vec<ActivityRecord>>,
    pub products: Option<Vec<ProductRecord>>,
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarRequest {
    pub product_id: Option<Identifier>,
    pub product: Option<ProductRecord>,
    pub all_products: Option<Vec<ProductRecord>>,
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlsoBoughtRequest {
    pub product_id: Option<Identifier>,
    pub purchase_data: Option<Vec<CoOccurrenceRecord>>,
    pub all_products: Option<Vec<ProductRecord>>,
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingRequest {
    pub trending_data: Option<Vec<TrendingRecord>>,
    pub all_products: Option<Vec<ProductRecord>>,
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombineRequest {
    /// Lists in priority order; earlier lists win duplicate products.
    pub lists: Option<Vec<Vec<RecommendationRecord>>>,
    pub limit: Option<usize>,
}

pub(crate) struct PersonalizedInput {
    pub user_id: Option<String>,
    pub activities: Vec<UserActivity>,
    pub candidates: Vec<Product>,
    pub limit: Option<usize>,
}

pub(crate) struct SimilarInput {
    pub source_id: ProductId,
    pub source: Product,
    pub pool: Vec<Product>,
    pub limit: Option<usize>,
}

pub(crate) struct AlsoBoughtInput {
    pub source_id: ProductId,
    pub co_occurrences: Vec<PurchaseCoOccurrence>,
    pub pool: Vec<Product>,
    pub limit: Option<usize>,
}

pub(crate) struct TrendingInput {
    pub signals: Vec<TrendingSignal>,
    pub pool: Vec<Product>,
    pub limit: Option<usize>,
}

pub(crate) struct CombineInput {
    pub lists: Vec<Vec<Recommendation>>,
    pub limit: Option<usize>,
}

fn required_id(
    value: Option<Identifier>,
    operation: Operation,
    field: &'static str,
) -> RecommendationResult<ProductId> {
    value.and_then(Identifier::into_non_empty).map(ProductId).ok_or_else(|| operation.missing(field))
}

impl PersonalizedRequest {
    pub(crate) fn into_input(self) -> RecommendationResult<PersonalizedInput> {
        let operation = Operation::Personalized;
        let products = self.products.ok_or_else(|| operation.missing("products"))?;

        Ok(PersonalizedInput {
            user_id: self.user_id.map(Identifier::into_string),
            activities: convert_records(self.user_activities.unwrap_or_default(), operation),
            candidates: convert_records(products, operation),
            limit: self.limit,
        })
    }
}

impl SimilarRequest {
    pub(crate) fn into_input(self) -> RecommendationResult<SimilarInput> {
        let operation = Operation::Similar;
        let source_id = required_id(self.product_id, operation, "productId")?;
        let source = self.product.ok_or_else(|| operation.missing("product"))?;
        let pool = self.all_products.ok_or_else(|| operation.missing("allProducts"))?;

        Ok(SimilarInput {
            source: source.into_product_with_id(source_id.clone()),
            source_id,
            pool: convert_records(pool, operation),
            limit: self.limit,
        })
    }
}

impl AlsoBoughtRequest {
    pub(crate) fn into_input(self) -> RecommendationResult<AlsoBoughtInput> {
        let operation = Operation::AlsoBought;
        let source_id = required_id(self.product_id, operation, "productId")?;
        let purchase_data = self.purchase_data.ok_or_else(|| operation.missing("purchaseData"))?;
        let pool = self.all_products.ok_or_else(|| operation.missing("allProducts"))?;

        Ok(AlsoBoughtInput {
            source_id,
            co_occurrences: convert_records(purchase_data, operation),
            pool: convert_records(pool, operation),
            limit: self.limit,
        })
    }
}

impl TrendingRequest {
    pub(crate) fn into_input(self) -> RecommendationResult<TrendingInput> {
        let operation = Operation::Trending;
        let trending_data = self.trending_data.ok_or_else(|| operation.missing("trendingData"))?;
        let pool = self.all_products.ok_or_else(|| operation.missing("allProducts"))?;

        Ok(TrendingInput {
            signals: convert_records(trending_data, operation),
            pool: convert_records(pool, operation),
            limit: self.limit,
        })
    }
}

impl CombineRequest {
    pub(crate) fn into_input(self) -> RecommendationResult<CombineInput> {
        let operation = Operation::Combine;
        let lists = self.lists.ok_or_else(|| operation.missing("lists"))?;
        if lists.len() < 2 {
            return Err(DomainError::InvalidRequest(format!(
                "combine needs at least two recommendation lists, got {}",
                lists.len()
            )));
        }

        Ok(CombineInput {
            lists: lists.into_iter().map(|list| convert_records(list, operation)).collect(),
            limit: self.limit,
        })
    }
}

/// Envelope returned for every operation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub recommendations: Vec<Recommendation>,
    pub count: usize,
    pub message: String,
}

impl RecommendationResponse {
    pub fn new(operation: Operation, recommendations: Vec<Recommendation>) -> Self {
        let count = recommendations.len();
        Self {
            success: true,
            recommendations,
            count,
            message: format!("Found {count} {}", operation.subject()),
        }
    }
}
