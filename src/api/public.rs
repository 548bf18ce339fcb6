//! Wire types of the authentication exchange

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Error body the backend sends, e.g. `{"detail": "Incorrect username or password"}`.
/// Validation failures carry a list instead of a string.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub detail: Value,
}

impl ErrorDetail {
    pub fn message(&self) -> Option<&str> {
        self.detail.as_str().filter(|s| !s.trim().is_empty())
    }
}
