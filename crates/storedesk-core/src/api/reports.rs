//! Daily store reports.

use chrono::NaiveDate;
use serde_json::Value;

use super::client::{ApiClient, ApiRequest, ApiResponse, FilePart};
use super::ApiError;

/// Date format of the report endpoints.
const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

impl ApiClient {
    pub async fn upload_purchase_report(
        &self,
        store_id: &str,
        date: NaiveDate,
        file: FilePart,
    ) -> Result<ApiResponse, ApiError> {
        let request = ApiRequest::post("/report/upload-purchase-report")
            .query("storeId", store_id)
            .query("date", date.format(REPORT_DATE_FORMAT))
            .file(file);
        self.send(request).await
    }

    /// The report for one store and day, as returned under `report`.
    pub async fn store_report(&self, store_id: &str, date: NaiveDate) -> Result<Value, ApiError> {
        let request = ApiRequest::get("/report/store-report")
            .query("storeId", store_id)
            .query("date", date.format(REPORT_DATE_FORMAT));
        self.send(request).await?.field("report")
    }
}
