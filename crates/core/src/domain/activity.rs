use serde::{Deserialize, Serialize};

use crate::domain::product::{BrandId, CategoryId, ProductId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    View,
    AddToCart,
    Purchase,
    Search,
    /// Any activity kind the engine does not interpret.
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    pub product_id: Option<ProductId>,
    pub activity_type: ActivityType,
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
}

impl UserActivity {
    pub fn new(activity_type: ActivityType) -> Self {
        Self { product_id: None, activity_type, category_id: None, brand_id: None }
    }

    pub fn view(product_id: impl Into<String>) -> Self {
        Self::new(ActivityType::View).on_product(product_id)
    }

    pub fn purchase(product_id: impl Into<String>) -> Self {
        Self::new(ActivityType::Purchase).on_product(product_id)
    }

    pub fn on_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(ProductId(product_id.into()));
        self
    }

    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(CategoryId(category_id.into()));
        self
    }

    pub fn of_brand(mut self, brand_id: impl Into<String>) -> Self {
        self.brand_id = Some(BrandId(brand_id.into()));
        self
    }
}
