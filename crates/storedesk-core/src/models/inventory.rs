//! Per-store stock records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::{require_text, ValidationError};
use super::Pagination;

/// Stock levels for a product in one store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StockLevel {
    pub quantity: Option<f64>,
    pub availability: Option<bool>,
    /// Quantity at or below which the item counts as low stock
    pub threshold: Option<f64>,
    pub inventory_status: Option<String>,
}

/// A catalog product as stocked by a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default, alias = "_id")]
    pub product_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub inventory: StockLevel,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        match (self.inventory.quantity, self.inventory.threshold) {
            (Some(quantity), Some(threshold)) => quantity <= threshold,
            _ => false,
        }
    }
}

/// `data` of `GET /inventory/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryPage {
    pub products: Vec<InventoryItem>,
    pub pagination: Pagination,
}

/// Partial stock update for `PUT /inventory/update`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    pub store_id: String,
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl InventoryUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.store_id, "storeId")?;
        require_text(&self.product_id, "productId")?;
        if self.quantity.is_none() && self.availability.is_none() && self.threshold.is_none() {
            return Err(ValidationError::EmptyUpdate);
        }
        for (value, field) in [(self.quantity, "quantity"), (self.threshold, "threshold")] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ValidationError::invalid(field, "a non-negative number"));
                }
            }
        }
        Ok(())
    }
}

/// One product added to a store by `POST /inventory/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryEntry {
    pub product_id: String,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inventory_page() {
        let json = r#"{
            "products": [
                {"productId": "P1", "name": "Tomato", "category": "Vegetables",
                 "inventory": {"quantity": 4, "threshold": 5, "availability": true}},
                {"_id": "P2", "name": "Onion", "inventory": {"quantity": 40, "threshold": 5}}
            ],
            "pagination": {"currentPage": 1, "totalPages": 3, "totalProducts": 25}
        }"#;

        let page: InventoryPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.products.len(), 2);
        assert!(page.products[0].is_low_stock());
        assert!(!page.products[1].is_low_stock());
        assert_eq!(page.products[1].product_id.as_deref(), Some("P2"));
        assert!(page.pagination.has_more());
    }

    #[test]
    fn test_update_sends_only_set_fields() {
        let update = InventoryUpdate {
            store_id: "S1".into(),
            product_id: "P1".into(),
            quantity: Some(12.0),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"storeId": "S1", "productId": "P1", "quantity": 12.0})
        );
    }

    #[test]
    fn test_update_needs_a_change() {
        let update = InventoryUpdate {
            store_id: "S1".into(),
            product_id: "P1".into(),
            ..Default::default()
        };
        assert_eq!(update.validate(), Err(ValidationError::EmptyUpdate));
    }
}
