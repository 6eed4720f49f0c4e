//! Backend API access.
//!
//! The ticket backend is consumed as an opaque HTTP/JSON contract. This
//! module defines the payload types, the `{ success, data }` envelope, and
//! the [`TicketBackend`] trait the controller is written against, so the
//! reqwest implementation in [`http`] can be swapped for an in-memory one
//! in tests.

pub mod error;
pub mod http;

use std::future::Future;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DeskError, Result};
use crate::types::{
    Agent, CallDirection, Campaign, Customer, Ticket, TicketId, TicketPriority, TicketStatus, Yard,
};
use crate::validation::FieldErrors;

pub use error::ApiError;
pub use http::HttpBackend;

/// Raw field map returned by a mutation.
///
/// Kept untyped so the cache can tell fields the server sent apart from
/// fields it left out; see [`crate::cache::merge_fields`].
pub type TicketFields = Map<String, Value>;

/// Standard response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Field → message map for server-side validation failures.
    #[serde(default)]
    pub errors: Option<Value>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, converting a failed envelope into an error.
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(self.failure());
        }
        self.data
            .ok_or_else(|| DeskError::Api("response envelope has no data".to_string()))
    }

    fn failure(self) -> DeskError {
        let message = self
            .message
            .or(self.error)
            .unwrap_or_else(|| "request failed".to_string());

        match self.errors.as_ref().and_then(field_errors_from_value) {
            Some(fields) if !fields.is_empty() => DeskError::Validation(fields),
            _ => DeskError::Api(message),
        }
    }
}

/// Option-list endpoints are not consistently enveloped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Envelope(Envelope<Vec<T>>),
}

impl<T> ListResponse<T> {
    pub fn into_data(self) -> Result<Vec<T>> {
        match self {
            ListResponse::Bare(items) => Ok(items),
            ListResponse::Envelope(envelope) => envelope.into_data(),
        }
    }
}

/// Decode a validation `errors` value.
///
/// Accepts an object (`{"phone": "required"}` or `{"phone": ["required"]}`)
/// or an array of `{ field, message }` entries. Anything else is not
/// field-addressable and yields `None`.
pub fn field_errors_from_value(value: &Value) -> Option<FieldErrors> {
    let mut errors = FieldErrors::new();
    match value {
        Value::Object(map) => {
            for (field, message) in map {
                let text = match message {
                    Value::String(s) => s.clone(),
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(", "),
                    other => other.to_string(),
                };
                errors.insert(field.clone(), text);
            }
        }
        Value::Array(items) => {
            for item in items {
                let field = item
                    .get("field")
                    .or_else(|| item.get("path"))
                    .and_then(Value::as_str);
                let message = item.get("message").and_then(Value::as_str);
                if let (Some(field), Some(message)) = (field, message) {
                    errors.insert(field, message);
                }
            }
        }
        _ => return None,
    }
    Some(errors)
}

/// Decode an enveloped body.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    envelope.into_data()
}

/// Fields changed by an edit. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
    /// `Some(None)` clears the assignee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<Option<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yard_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_date: Option<String>,
}

impl TicketPatch {
    pub fn is_empty(&self) -> bool {
        *self == TicketPatch::default()
    }
}

/// Create form payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub direction: CallDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yard_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_date: Option<String>,
}

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Read an attachment from disk.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| DeskError::Other(format!("not a file: {}", path.display())))?;
        Ok(Self {
            content_type: guess_content_type(&file_name).map(str::to_string),
            file_name,
            bytes,
        })
    }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        _ => return None,
    })
}

/// Operations the ticket list needs from the backend.
pub trait TicketBackend: Send + Sync {
    /// `GET /api/tickets`
    fn list_tickets(&self) -> impl Future<Output = Result<Vec<Ticket>>> + Send;

    /// `GET /api/tickets/:id`, including call history.
    fn get_ticket(&self, id: TicketId) -> impl Future<Output = Result<Ticket>> + Send;

    /// `PATCH /api/tickets/:id`, returning the fields the server sent back.
    fn update_ticket(
        &self,
        id: TicketId,
        patch: &TicketPatch,
    ) -> impl Future<Output = Result<TicketFields>> + Send;

    /// `POST /api/tickets`
    fn create_ticket(&self, form: &NewTicket) -> impl Future<Output = Result<Ticket>> + Send;

    /// `POST /api/tickets/:id/attachments` (multipart `files[]`).
    fn upload_attachments(
        &self,
        id: TicketId,
        files: &[Attachment],
    ) -> impl Future<Output = Result<TicketFields>> + Send;

    /// `GET /api/agents`
    fn list_agents(&self) -> impl Future<Output = Result<Vec<Agent>>> + Send;

    /// `GET /api/users`
    fn list_users(&self) -> impl Future<Output = Result<Vec<Agent>>> + Send;

    /// `GET /api/customers`
    fn list_customers(&self) -> impl Future<Output = Result<Vec<Customer>>> + Send;

    /// `GET /campaign`
    fn list_campaigns(&self) -> impl Future<Output = Result<Vec<Campaign>>> + Send;

    /// `GET /yards`
    fn list_yards(&self) -> impl Future<Output = Result<Vec<Yard>>> + Send;
}
