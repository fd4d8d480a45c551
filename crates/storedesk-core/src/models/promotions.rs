//! Coupons, cashback offers and push notifications.

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts")]
use ts_rs::TS;

use super::validation::{require_positive, require_text, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(alias = "code")]
    pub coupon_code: String,
    /// ISO date the coupon stops applying
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_usage: Option<u32>,
    #[serde(default)]
    pub off_value: Option<f64>,
    #[serde(default)]
    pub is_active: bool,
}

/// Payload for `POST /admin/coupon/create`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    pub code: String,
    pub expiry: String,
    pub min_value: f64,
    pub max_usage: u32,
    pub off_value: f64,
}

impl NewCoupon {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.code, "code")?;
        require_text(&self.expiry, "expiry")?;
        require_positive(self.off_value, "offValue")?;
        if self.max_usage == 0 {
            return Err(ValidationError::invalid("maxUsage", "at least 1"));
        }
        Ok(())
    }
}

/// Payload for `PUT /admin/coupon/update?id=`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CouponUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_usage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub off_value: Option<f64>,
}

impl CouponUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.is_none()
            && self.expiry.is_none()
            && self.min_value.is_none()
            && self.max_usage.is_none()
            && self.off_value.is_none()
        {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(off) = self.off_value {
            require_positive(off, "offValue")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct Cashback {
    #[serde(rename = "_id")]
    pub id: String,
    pub min_purchase_amount: f64,
    pub cashback_amount: f64,
    #[serde(default, rename = "isActive")]
    pub is_active: bool,
    #[serde(default)]
    pub description: String,
}

/// Payload for `POST /admin/cashback/create`. The backend uses snake_case
/// amounts alongside a camelCase flag.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct NewCashback {
    pub min_purchase_amount: f64,
    pub cashback_amount: f64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub description: String,
}

impl NewCashback {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_positive(self.min_purchase_amount, "min_purchase_amount")?;
        require_positive(self.cashback_amount, "cashback_amount")?;
        require_text(&self.description, "description")
    }
}

/// Push notification broadcast by `POST /admin/send-notification`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.title, "title")?;
        require_text(&self.body, "body")
    }
}
