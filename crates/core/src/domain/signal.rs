use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// "Bought together with the source product `count` times."
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseCoOccurrence {
    pub product_id: ProductId,
    pub count: u64,
}

impl PurchaseCoOccurrence {
    pub fn new(product_id: impl Into<String>, count: u64) -> Self {
        Self { product_id: ProductId(product_id.into()), count }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingSignal {
    pub product_id: ProductId,
    pub view_count: u64,
}

impl TrendingSignal {
    pub fn new(product_id: impl Into<String>, view_count: u64) -> Self {
        Self { product_id: ProductId(product_id.into()), view_count }
    }
}
