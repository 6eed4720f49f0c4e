//! Query-string state for the ticket list.
//!
//! Only four parameters survive a reload: `search`, `id` (the open ticket),
//! `customerId` and `view`. Everything else in [`FilterState`] is
//! ephemeral and resets when a URL is applied.

use serde::Serialize;
use url::form_urlencoded;

use crate::filter::FilterState;
use crate::types::{TicketId, ViewBucket};

/// Parsed `?search=..&id=..&customerId=..&view=..`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlState {
    pub search: Option<String>,
    pub id: Option<TicketId>,
    pub customer_id: Option<u64>,
    pub view: ViewBucket,
}

fn parse_id(key: &str, value: &str) -> Option<u64> {
    match value.trim().parse() {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!(param = key, %value, "ignoring non-numeric query parameter");
            None
        }
    }
}

impl UrlState {
    /// Parse a query string. A leading `?` is accepted; unknown keys are
    /// ignored and malformed values are dropped with a warning.
    pub fn parse(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut state = UrlState::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "search" => {
                    let trimmed = value.trim();
                    state.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
                }
                "id" => state.id = parse_id("id", &value),
                "customerId" => state.customer_id = parse_id("customerId", &value),
                "view" => match value.parse() {
                    Ok(view) => state.view = view,
                    Err(e) => tracing::warn!(error = %e, "ignoring view parameter"),
                },
                other => tracing::debug!(param = other, "ignoring unknown query parameter"),
            }
        }

        state
    }

    /// Capture the URL-backed part of a filter state.
    pub fn from_filter(filter: &FilterState, open_ticket: Option<TicketId>) -> Self {
        let search = filter.search.trim();
        Self {
            search: (!search.is_empty()).then(|| search.to_string()),
            id: open_ticket,
            customer_id: filter.customer_id,
            view: filter.view,
        }
    }

    /// Build a fresh filter state from this URL. Column filters reset;
    /// the current agent is carried over.
    pub fn to_filter(&self, current_agent: Option<u64>) -> FilterState {
        FilterState {
            search: self.search.clone().unwrap_or_default(),
            view: self.view,
            customer_id: self.customer_id,
            current_agent,
            ..Default::default()
        }
    }

    /// Serialize in a fixed parameter order, omitting empty values and the
    /// default view.
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(search) = &self.search {
            serializer.append_pair("search", search);
        }
        if let Some(id) = self.id {
            serializer.append_pair("id", &id.to_string());
        }
        if let Some(customer_id) = self.customer_id {
            serializer.append_pair("customerId", &customer_id.to_string());
        }
        if self.view != ViewBucket::All {
            serializer.append_pair("view", self.view.label());
        }
        serializer.finish()
    }
}
