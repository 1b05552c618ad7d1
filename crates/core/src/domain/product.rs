use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandId(pub String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<&str> for BrandId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Catalog entry as seen by the scorers.
///
/// Absent catalog fields are already resolved here: a missing price is zero
/// and a missing stock level is zero, which reads as out of stock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub price: Decimal,
    pub stock: i64,
}

impl Product {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ProductId(id.into()),
            category_id: None,
            brand_id: None,
            price: Decimal::ZERO,
            stock: 0,
        }
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(CategoryId(category_id.into()));
        self
    }

    pub fn with_brand(mut self, brand_id: impl Into<String>) -> Self {
        self.brand_id = Some(BrandId(brand_id.into()));
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Product, ProductId};

    #[test]
    fn missing_stock_reads_as_out_of_stock() {
        let product = Product::new("p-1").with_price(Decimal::new(1999, 2));
        assert!(!product.in_stock());
        assert!(product.with_stock(1).in_stock());
    }

    #[test]
    fn product_id_serializes_as_plain_string() {
        let encoded = serde_json::to_string(&ProductId::new("brake-pad-01")).expect("serialize");
        assert_eq!(encoded, "\"brake-pad-01\"");
    }
}
