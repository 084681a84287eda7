use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ApiError;

/// Response envelope used by every backend endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Missing `success` counts as failure.
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// The server message, or `fallback` when it is absent or empty.
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl ApiEnvelope<serde_json::Value> {
    /// Type the payload of a loosely read envelope.
    ///
    /// `data` is only interpreted when `success` is true; a rejection keeps
    /// its message whatever the payload looks like.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<ApiEnvelope<T>, ApiError> {
        let data = match self.data {
            Some(value) if self.success && !value.is_null() => Some(
                serde_json::from_value(value)
                    .map_err(|e| ApiError::ParseError(format!("unexpected data: {}", e)))?,
            ),
            _ => None,
        };

        Ok(ApiEnvelope {
            success: self.success,
            message: self.message,
            data,
        })
    }
}
