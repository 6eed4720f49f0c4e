//! Client-side required-field checks for the create and edit flows.
//!
//! These are a fast path only. The backend remains the authority and may
//! still reject a payload that passes here; its per-field messages are
//! decoded into the same [`FieldErrors`] type so callers surface both the
//! same way.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::{NewTicket, TicketPatch};
use crate::types::{SetupState, Ticket};

/// Field name → message, keyed by the wire (camelCase) field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<BTreeMap<String, String>> for FieldErrors {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Validate a create form.
///
/// A ticket needs an issue description and a customer: either an existing
/// customer id, or a name plus a phone number for a new one.
pub fn validate_new_ticket(form: &NewTicket) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(form.issue_detail.as_deref()) {
        errors.insert("issueDetail", "Issue detail is required");
    }

    if form.customer_id.is_none() {
        if is_blank(form.customer_name.as_deref()) {
            errors.insert("customerName", "Customer name is required");
        }
        if is_blank(form.phone.as_deref()) {
            errors.insert("phone", "Phone number is required");
        }
    }

    if let Some(phone) = form.phone.as_deref()
        && !phone.trim().is_empty()
        && phone.chars().filter(char::is_ascii_digit).count() < 7
    {
        errors.insert("phone", "Phone number must contain at least 7 digits");
    }

    if let Some(email) = form.email.as_deref()
        && !email.trim().is_empty()
        && !email.contains('@')
    {
        errors.insert("email", "Email address is invalid");
    }

    errors
}

/// Validate an edit against the ticket it applies to.
///
/// Campaign assignment is the onboarding step: a ticket that still needs
/// setup cannot be saved without one.
pub fn validate_patch(ticket: &Ticket, patch: &TicketPatch) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if ticket.setup_state() == SetupState::NeedsSetup && patch.campaign_id.is_none() {
        errors.insert("campaignId", "Campaign is required");
    }

    if let Some(detail) = patch.issue_detail.as_deref()
        && detail.trim().is_empty()
    {
        errors.insert("issueDetail", "Issue detail cannot be empty");
    }

    errors
}
