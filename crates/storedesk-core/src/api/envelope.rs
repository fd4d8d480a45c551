//! The backend's standard response wrapper.

use serde::{Deserialize, Serialize};

/// `{success, message, data}` as returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// An envelope that does not say `success: false`.
    pub fn is_success(&self) -> bool {
        self.success != Some(false)
    }
}
