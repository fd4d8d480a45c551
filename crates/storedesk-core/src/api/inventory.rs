//! Per-store inventory endpoints.

use serde_json::{json, Value};
use tracing::debug;

use super::client::{ApiClient, ApiRequest, ApiResponse, FilePart};
use super::ApiError;
use crate::models::{InventoryPage, InventoryUpdate, NewInventoryEntry, PageRequest};

impl ApiClient {
    /// Products stocked by `store_id`, one page at a time.
    pub async fn list_inventory(
        &self,
        store_id: &str,
        page: PageRequest,
    ) -> Result<InventoryPage, ApiError> {
        let request = ApiRequest::get("/inventory/")
            .query("page", page.page)
            .query("limit", page.limit)
            .query("skip", page.skip())
            .query("storeId", store_id);
        let inventory: InventoryPage = self.send_data(request).await?;
        debug!(
            store_id = %store_id,
            count = inventory.products.len(),
            total = ?inventory.pagination.total,
            "Fetched inventory page"
        );
        Ok(inventory)
    }

    /// Catalog products as offered to `store_id`, including ones it does
    /// not stock yet.
    pub async fn list_store_catalog(
        &self,
        store_id: &str,
        page: PageRequest,
    ) -> Result<Value, ApiError> {
        let request = ApiRequest::get("/inventory/product/")
            .query("page", page.page)
            .query("limit", page.limit)
            .query("storeId", store_id);
        self.send_data(request).await
    }

    pub async fn add_inventory(
        &self,
        store_id: &str,
        products: &[NewInventoryEntry],
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::post("/inventory/add")
            .json(&json!({ "storeId": store_id, "products": products }));
        self.send(request).await
    }

    /// Only the fields set on `update` are sent.
    pub async fn update_inventory(&self, update: &InventoryUpdate) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::put("/inventory/update").json(update))
            .await
    }

    /// Bulk stock upload as an opaque CSV file.
    pub async fn upload_inventory_csv(
        &self,
        store_id: &str,
        file: FilePart,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::post("/inventory/upload")
            .query("storeId", store_id)
            .file(file);
        self.send(request).await
    }
}
