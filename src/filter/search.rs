//! Free-text search over the ticket list.
//!
//! Matches case-insensitively against client name, yard name, ticket id and
//! phone number. Phone numbers are compared twice: as a literal substring of
//! the stored (formatted) value, and, whenever the query contains digits,
//! as a digits-only substring so punctuation differences such as
//! `+1 555-123-4567` vs `5551234567` do not block a match.

use crate::types::Ticket;

use super::TicketFilter;

/// Keep only ASCII digits.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Digits of a query, or `None` when it has none.
pub fn phone_digits(query: &str) -> Option<String> {
    let digits = digits_only(query);
    (!digits.is_empty()).then_some(digits)
}

/// Case-insensitive text filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    needle: String,
    digits: Option<String>,
}

impl SearchFilter {
    /// Build a filter, or `None` for a blank query (which matches everything).
    pub fn new(query: &str) -> Option<Self> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        Some(Self {
            digits: phone_digits(&needle),
            needle,
        })
    }

    fn contains(&self, haystack: Option<&str>) -> bool {
        haystack
            .map(|h| h.to_lowercase().contains(&self.needle))
            .unwrap_or(false)
    }

    fn phone_matches(&self, phone: Option<&str>) -> bool {
        let Some(phone) = phone else {
            return false;
        };
        if phone.to_lowercase().contains(&self.needle) {
            return true;
        }
        match &self.digits {
            Some(digits) => digits_only(phone).contains(digits.as_str()),
            None => false,
        }
    }
}

impl TicketFilter for SearchFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        self.contains(ticket.client_name())
            || self.contains(ticket.yard_name())
            || ticket.id.to_string().contains(&self.needle)
            || self.phone_matches(ticket.phone())
    }
}
