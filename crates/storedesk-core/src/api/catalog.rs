//! Categories and the shared product catalog.

use serde_json::{json, Value};
use tracing::{info, warn};

use super::client::{ApiClient, ApiRequest, ApiResponse, FilePart};
use super::ApiError;
use crate::models::{Category, CategoryInput, NewProduct, PageRequest, ProductPage};

/// Header carrying the image service key
pub const ACCESS_TOKEN_HEADER: &str = "access_token";

impl ApiClient {
    /// Upload a category or product image. The response carries the hosted
    /// image location used in later create calls.
    pub async fn upload_image(&self, image: FilePart) -> Result<ApiResponse, ApiError> {
        let mut request = ApiRequest::post("/cloud/upload-image").file(image);
        match self.access_token() {
            Some(token) => request = request.header(ACCESS_TOKEN_HEADER, token),
            None => warn!("No image service access token configured"),
        }
        self.send(request).await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.send(ApiRequest::get("/category/"))
            .await?
            .field("categories")
    }

    pub async fn create_category(&self, category: &CategoryInput) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::post("/category/").json(category))
            .await
    }

    /// `category.id` selects the record to update.
    pub async fn update_category(&self, category: &CategoryInput) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::put("/category/").json(category))
            .await
    }

    pub async fn delete_category(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::delete("/category/").json(&json!({ "id": id })))
            .await
    }

    pub async fn list_products(&self, page: PageRequest) -> Result<ProductPage, ApiError> {
        let request = ApiRequest::get("/admin/products")
            .query("page", page.page)
            .query("limit", page.limit);
        self.send_data(request).await
    }

    /// The endpoint takes an array, so several products go in one call.
    pub async fn create_products(&self, products: &[NewProduct]) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::post("/admin/createProducts").json(products))
            .await
    }

    /// Delete products by id. A call that deletes nothing is reported as
    /// [`ApiError::NotFound`].
    pub async fn delete_products(&self, ids: &[String]) -> Result<u64, ApiError> {
        let response = self
            .send(ApiRequest::delete("/admin/deleteProducts").json(ids))
            .await?;
        let deleted = response
            .data::<Value>()
            .ok()
            .and_then(|data| data.get("deletedCount").and_then(Value::as_u64))
            .unwrap_or(0);
        if deleted == 0 {
            return Err(ApiError::NotFound(
                "No products were deleted, possibly invalid or non-existent ID".to_string(),
            ));
        }
        info!(deleted, "Deleted products");
        Ok(deleted)
    }
}
