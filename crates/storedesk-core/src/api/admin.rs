//! Superadmin endpoints for stores, staff accounts and customers.

use serde_json::{json, Value};

use super::client::{ApiClient, ApiRequest, ApiResponse};
use super::ApiError;
use crate::models::{
    NewAdmin, NewStore, NewUser, PageRequest, Pagination, StorePage, StoreUpdate, User, UserPage,
    UserUpdate,
};

impl ApiClient {
    pub async fn create_admin(&self, admin: &NewAdmin) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::post("/admin/create-admin").json(&admin.payload()))
            .await
    }

    pub async fn list_stores(&self, page: PageRequest) -> Result<StorePage, ApiError> {
        let request = ApiRequest::get("/admin/stores")
            .query("page", page.page)
            .query("limit", page.limit);
        self.send_data(request).await
    }

    pub async fn create_store(&self, store: &NewStore) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::post("/admin/create-store").json(store))
            .await
    }

    pub async fn update_store(
        &self,
        store_id: &str,
        update: &StoreUpdate,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::put("/admin/update-store")
            .json(&json!({ "storeId": store_id, "data": update }));
        self.send(request).await
    }

    pub async fn assign_store_manager(
        &self,
        admin_id: &str,
        store_id: &str,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::post("/admin/assign-store-manager")
            .json(&json!({ "adminId": admin_id, "storeId": store_id }));
        self.send(request).await
    }

    /// Customer accounts, optionally filtered by role.
    pub async fn list_users(
        &self,
        role: Option<&str>,
        page: PageRequest,
    ) -> Result<UserPage, ApiError> {
        let request = ApiRequest::get("/admin/users")
            .query("role", role.unwrap_or_default())
            .query("page", page.page)
            .query("limit", page.limit);
        let response = self.send(request).await?;

        let users: Vec<User> = response.data()?;
        let pagination: Pagination = serde_json::from_value(response.body.clone())
            .map_err(|e| ApiError::Unknown(format!("Failed to parse pagination: {}", e)))?;
        Ok(UserPage { users, pagination })
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::post("/admin/user/create").json(user))
            .await
    }

    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::put(format!("/admin/user/update/{}", id)).json(update))
            .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<ApiResponse, ApiError> {
        let body: Value = json!({ "id": id });
        self.send(ApiRequest::delete("/admin/user/delete").json(&body))
            .await
    }
}
