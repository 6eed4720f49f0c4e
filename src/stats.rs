//! Aggregate counters for the dashboard.

use serde::Serialize;

use crate::filter::{FilterState, apply_filters};
use crate::types::{CallDirection, Ticket, TicketPriority, TicketStatus, ViewBucket};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketStats {
    pub total: usize,
    pub by_status: Vec<(TicketStatus, usize)>,
    pub by_priority: Vec<(TicketPriority, usize)>,
    pub by_direction: Vec<(CallDirection, usize)>,
    /// Size of each view bucket with no other filter applied
    pub by_view: Vec<(ViewBucket, usize)>,
}

fn count_by<K: Copy + PartialEq>(
    keys: &[K],
    tickets: &[Ticket],
    key: impl Fn(&Ticket) -> K,
) -> Vec<(K, usize)> {
    keys.iter()
        .map(|k| (*k, tickets.iter().filter(|t| key(t) == *k).count()))
        .collect()
}

impl TicketStats {
    /// Compute counters over the full collection. `me` is the current agent
    /// for the "assigned to me" bucket.
    pub fn compute(tickets: &[Ticket], me: Option<u64>) -> Self {
        let by_view = ViewBucket::ALL
            .iter()
            .map(|view| {
                let state = FilterState {
                    view: *view,
                    current_agent: me,
                    ..Default::default()
                };
                (*view, apply_filters(tickets, &state).len())
            })
            .collect();

        Self {
            total: tickets.len(),
            by_status: count_by(TicketStatus::ALL, tickets, |t| t.status),
            by_priority: count_by(TicketPriority::ALL, tickets, |t| t.priority),
            by_direction: count_by(CallDirection::ALL, tickets, |t| t.direction),
            by_view,
        }
    }

    pub fn status(&self, status: TicketStatus) -> usize {
        lookup(&self.by_status, status)
    }

    pub fn view(&self, view: ViewBucket) -> usize {
        lookup(&self.by_view, view)
    }
}

fn lookup<K: PartialEq>(counts: &[(K, usize)], key: K) -> usize {
    counts
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, n)| *n)
        .unwrap_or(0)
}
