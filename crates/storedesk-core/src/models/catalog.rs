//! The shared product catalog and its categories.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::{require_positive, require_text, ValidationError};
use super::Pagination;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body for creating (`id` unset) or updating a category on `/category/`.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// URL of an already uploaded image
    pub image: String,
}

impl CategoryInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "name")?;
        require_text(&self.image, "image")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub actual_price: Option<f64>,
    /// Category id or embedded category record
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `data` of `GET /admin/products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

/// One element of the array body sent to `POST /admin/createProducts`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub unit: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub origin: String,
    pub shelf_life: String,
    pub is_available: bool,
    pub image: String,
    pub actual_price: f64,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "name")?;
        require_positive(self.price, "price")?;
        require_text(&self.category, "category")
    }
}
