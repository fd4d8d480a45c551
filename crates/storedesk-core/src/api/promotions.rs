//! Coupons, cashback, push notifications and sales analysis.

use serde_json::{json, Value};

use super::client::{ApiClient, ApiRequest, ApiResponse};
use super::ApiError;
use crate::models::{
    AnalysisRange, Cashback, Coupon, CouponUpdate, NewCashback, NewCoupon, Notification,
};

impl ApiClient {
    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, ApiError> {
        self.send(ApiRequest::get("/admin/coupon"))
            .await?
            .field("coupons")
    }

    pub async fn create_coupon(&self, coupon: &NewCoupon) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::post("/admin/coupon/create").json(coupon))
            .await
    }

    pub async fn set_coupon_active(&self, id: &str, active: bool) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::put("/admin/coupon/status")
            .query("id", id)
            .json(&json!({ "isActive": active }));
        self.send(request).await
    }

    pub async fn update_coupon(
        &self,
        id: &str,
        update: &CouponUpdate,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::put("/admin/coupon/update")
            .query("id", id)
            .json(update);
        self.send(request).await
    }

    pub async fn list_cashbacks(&self) -> Result<Vec<Cashback>, ApiError> {
        self.send(ApiRequest::get("/admin/cashback"))
            .await?
            .field("cashback")
    }

    pub async fn create_cashback(&self, cashback: &NewCashback) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::post("/admin/cashback/create").json(cashback))
            .await
    }

    pub async fn set_cashback_active(
        &self,
        id: &str,
        active: bool,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::put("/admin/cashback/status")
            .json(&json!({ "id": id, "isActive": active }));
        self.send(request).await
    }

    pub async fn send_notification(
        &self,
        notification: &Notification,
    ) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::post("/admin/send-notification").json(notification))
            .await
    }

    /// Sales analysis over an inclusive date range.
    pub async fn analysis(&self, range: &AnalysisRange) -> Result<Value, ApiError> {
        let [start, end] = range.query();
        let request = ApiRequest::get("/admin/analysis")
            .query(start.0, start.1)
            .query(end.0, end.1);
        self.send_data(request).await
    }
}
