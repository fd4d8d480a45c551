//! Data models for the grocery platform's admin resources.
//!
//! This module contains the request payloads and response records used by
//! the typed endpoints in [`crate::api`]:
//!
//! - `Store`, `NewStore`, `StoreUpdate`, `NewAdmin`: store provisioning
//! - `User`, `NewUser`, `UserUpdate`: customer accounts
//! - `InventoryItem`, `InventoryUpdate`: per-store stock
//! - `Category`, `Product`, `NewProduct`: the shared catalog
//! - `Coupon`, `Cashback`, `Notification`: promotions
//! - `AnalysisRange`: reporting windows
//!
//! Payloads validate themselves before dispatch; see [`validation`].

pub mod catalog;
pub mod inventory;
pub mod promotions;
pub mod report;
pub mod store;
pub mod validation;

use serde::{Deserialize, Serialize};

pub use catalog::{Category, CategoryInput, NewProduct, Product, ProductPage};
pub use inventory::{
    InventoryItem, InventoryPage, InventoryUpdate, NewInventoryEntry, StockLevel,
};
pub use promotions::{Cashback, Coupon, CouponUpdate, NewCashback, NewCoupon, Notification};
pub use report::AnalysisRange;
pub use store::{
    Address, NewAdmin, NewStore, NewUser, Store, StorePage, StoreUpdate, User, UserPage,
    UserUpdate,
};
pub use validation::ValidationError;

/// Paging block returned alongside list responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default, alias = "page")]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default, alias = "totalProducts", alias = "totalStores", alias = "totalUsers")]
    pub total: Option<u64>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub has_prev_page: Option<bool>,
}

impl Pagination {
    /// Whether another page follows this one
    pub fn has_more(&self) -> bool {
        match (self.has_next_page, self.current_page, self.total_pages) {
            (Some(next), _, _) => next,
            (None, Some(current), Some(total)) => current < total,
            _ => false,
        }
    }
}

/// Page and size for list endpoints. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Records skipped before this page
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}
