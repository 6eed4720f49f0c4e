//! In-memory ticket collection.
//!
//! Tickets keep the order the backend listed them in, with an id index on
//! the side. Mutations never insert or remove entries; new tickets only
//! arrive through a full refresh.

use std::collections::HashMap;

use serde_json::Value;

use crate::api::TicketFields;
use crate::error::{DeskError, Result};
use crate::types::{Ticket, TicketId};

/// Flat foreign key → nested reference that must agree with it.
const LINKED_REFS: &[(&str, &str)] = &[
    ("customerId", "customer"),
    ("campaignId", "campaign"),
    ("yardId", "yard"),
    ("assignedToId", "assignedTo"),
];

/// Overlay server-returned fields on a local ticket.
///
/// Fields the server sent replace the local value (including explicit
/// `null`); fields it left out keep their prior value. The id is never
/// taken from the response. When the server changes a flat foreign key
/// without sending the nested reference, a stale nested reference is
/// dropped so the two cannot disagree.
pub fn merge_fields(local: &Ticket, fields: &TicketFields) -> Result<Ticket> {
    let Value::Object(mut merged) = serde_json::to_value(local)? else {
        return Err(DeskError::Other(format!(
            "ticket {} did not serialize to an object",
            local.id
        )));
    };

    for (key, value) in fields {
        if key == "id" {
            continue;
        }
        merged.insert(key.clone(), value.clone());
    }

    for (flat, nested) in LINKED_REFS {
        if fields.contains_key(*nested) {
            continue;
        }
        let Some(new_id) = fields.get(*flat) else {
            continue;
        };
        let stale = merged
            .get(*nested)
            .and_then(|n| n.get("id"))
            .is_some_and(|old| old != new_id);
        if stale {
            merged.remove(*nested);
        }
    }

    let mut ticket: Ticket = serde_json::from_value(Value::Object(merged))?;
    ticket.id = local.id;
    Ok(ticket)
}

/// Ordered ticket collection with an id index.
#[derive(Debug, Clone, Default)]
pub struct TicketCache {
    tickets: Vec<Ticket>,
    index: HashMap<TicketId, usize>,
}

impl TicketCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection, returning the previous length.
    ///
    /// Duplicate ids keep their first position and last value.
    pub fn replace_all(&mut self, tickets: Vec<Ticket>) -> usize {
        let previous = self.tickets.len();
        self.tickets.clear();
        self.index.clear();
        for ticket in tickets {
            self.upsert(ticket);
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn as_slice(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter()
    }

    pub fn get(&self, id: TicketId) -> Option<&Ticket> {
        self.index.get(&id).map(|&i| &self.tickets[i])
    }

    pub fn contains(&self, id: TicketId) -> bool {
        self.index.contains_key(&id)
    }

    /// Replace an existing entry in place, or append a new one.
    pub fn upsert(&mut self, ticket: Ticket) {
        match self.index.get(&ticket.id) {
            Some(&i) => self.tickets[i] = ticket,
            None => {
                self.index.insert(ticket.id, self.tickets.len());
                self.tickets.push(ticket);
            }
        }
    }

    /// Merge server fields into the entry for `id`.
    ///
    /// Returns the merged ticket, or `None` if the id is not cached (the
    /// collection is left untouched in that case).
    pub fn apply_fields(&mut self, id: TicketId, fields: &TicketFields) -> Result<Option<Ticket>> {
        let Some(&i) = self.index.get(&id) else {
            return Ok(None);
        };
        let merged = merge_fields(&self.tickets[i], fields)?;
        self.tickets[i] = merged.clone();
        Ok(Some(merged))
    }
}
