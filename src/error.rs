use thiserror::Error;

use crate::validation::FieldErrors;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("ticket '{0}' not found")]
    TicketNotFound(u64),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("invalid direction '{0}'")]
    InvalidDirection(String),

    #[error("invalid view '{0}'")]
    InvalidView(String),

    #[error("invalid query string: {0}")]
    InvalidUrl(String),

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("server error (transient): {0}")]
    Transient(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}

impl DeskError {
    /// Whether the error came from the network or the backend rather than
    /// from local input, so a retry could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DeskError::Http(_) | DeskError::Timeout(_) | DeskError::Transient(_)
        )
    }

    /// Per-field messages when the error is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            DeskError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
