//! REST API client module for the grocery platform backend.
//!
//! This module provides the `ApiClient` facade, which attaches the stored
//! bearer token and active store to every call, plus typed wrappers for
//! each backend resource (inventory, reports, stores and users, catalog,
//! promotions).
//!
//! Failures are normalized into [`ApiError`]; nothing is retried.

pub mod admin;
pub mod catalog;
pub mod client;
pub mod envelope;
pub mod error;
pub mod inventory;
pub mod promotions;
pub mod reports;

pub use client::{ApiClient, ApiRequest, ApiResponse, FilePart, REQUEST_TIMEOUT_SECS, STORE_HEADER};
pub use envelope::Envelope;
pub use error::ApiError;
