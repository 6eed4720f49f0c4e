//! HTTP-level error handling for the ticket backend.
//!
//! Converts non-success responses into [`DeskError`] values, preserving the
//! HTTP status so callers can tell transient server failures from requests
//! that will never succeed, and pulling per-field validation messages out of
//! the body when the server provides them.

use std::fmt;

use serde_json::Value;

use crate::error::DeskError;

use super::field_errors_from_value;

/// Error from a single backend request.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if available
    pub status: Option<reqwest::StatusCode>,
    /// Human-readable error message
    pub message: String,
    /// Raw response body, when it was JSON
    pub body: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            body: None,
        }
    }

    /// Build from a failed response's status and body text.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let json: Option<Value> = serde_json::from_str(body).ok();
        let message = json
            .as_ref()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                let reason = status.canonical_reason().unwrap_or("Unknown");
                if body.trim().is_empty() {
                    reason.to_string()
                } else {
                    format!("{reason}: {}", body.trim())
                }
            });

        Self {
            status: Some(status),
            message,
            body: json,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.status
            .map(|s| s.is_server_error() || s.as_u16() == 429)
            .unwrap_or(false)
    }

    pub fn is_not_found(&self) -> bool {
        self.status.map(|s| s.as_u16() == 404).unwrap_or(false)
    }

    /// Convert to a `DeskError`.
    ///
    /// 1. Field-addressable validation errors in the body → `Validation`
    /// 2. 5xx / 429 → `Transient`
    /// 3. Anything else → `Api` with the status in the message
    pub fn to_desk_error(&self) -> DeskError {
        if let Some(fields) = self
            .body
            .as_ref()
            .and_then(|b| b.get("errors"))
            .and_then(field_errors_from_value)
            && !fields.is_empty()
        {
            return DeskError::Validation(fields);
        }

        if self.is_transient() {
            return DeskError::Transient(self.to_string());
        }

        DeskError::Api(self.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status.as_u16()),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<ApiError> for DeskError {
    fn from(error: ApiError) -> Self {
        error.to_desk_error()
    }
}
