use serde::{Deserialize, Serialize};

/// A structured detail attached to an API error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorDetail {
    /// Machine-readable reason, e.g. `API_KEY_INVALID`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The `error` object of an API error response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorObject {
    /// HTTP-like status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,

    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Canonical status, e.g. `INVALID_ARGUMENT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Structured details.
    #[serde(default)]
    pub details: Vec<ApiErrorDetail>,
}

/// Body of an API error response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorResponse {
    /// The error object.
    pub error: ApiErrorObject,
}

impl ApiErrorResponse {
    /// Iterates over every detail reason present.
    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.error
            .details
            .iter()
            .filter_map(|detail| detail.reason.as_deref())
    }
}
