//! User-facing notices raised by the controller.

use serde::Serialize;

/// A notice for the user
#[derive(Debug, Clone)]
pub struct Notice {
    /// The message to display
    pub message: String,
    /// The severity level of the notice
    pub level: NoticeLevel,
}

/// Severity level for notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl NoticeLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
            NoticeLevel::Success => "success",
        }
    }
}

impl Notice {
    pub fn new(message: String, level: NoticeLevel) -> Self {
        Self {
            message,
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Error)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Success)
    }
}

/// "1 new ticket" / "3 new tickets"
pub fn new_tickets_message(count: usize) -> String {
    if count == 1 {
        "1 new ticket".to_string()
    } else {
        format!("{count} new tickets")
    }
}
