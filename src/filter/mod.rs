//! Ticket list filtering.
//!
//! The visible list is derived from the fetched collection by a pipeline of
//! independent predicates, all ANDed:
//!
//! 1. the customer scope from the URL (applied first, excludes everything
//!    else outright),
//! 2. free-text search ([`search`]),
//! 3. equality filters for status, priority, direction, campaign and yard,
//! 4. the view bucket.
//!
//! Missed calls are an orthogonal axis: every bucket except
//! [`ViewBucket::Missed`] hides them unless the direction filter itself asks
//! for missed calls.

pub mod search;

use crate::types::{CallDirection, Ticket, TicketPriority, TicketStatus, ViewBucket};

pub use search::{SearchFilter, digits_only, phone_digits};

/// Trait for ticket predicates
pub trait TicketFilter: Send + Sync {
    fn matches(&self, ticket: &Ticket) -> bool;
}

/// The full set of filter dimensions for the ticket list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub direction: Option<CallDirection>,
    pub campaign_id: Option<u64>,
    pub yard_id: Option<u64>,
    pub view: ViewBucket,
    /// Customer scope, sourced from the `customerId` URL parameter.
    pub customer_id: Option<u64>,
    /// The agent viewing the list, for [`ViewBucket::Mine`].
    pub current_agent: Option<u64>,
}

impl FilterState {
    /// Build the predicate pipeline for this state.
    pub fn to_query(&self) -> TicketQuery {
        let mut query = TicketQuery::new(self.view, self.current_agent, self.direction);

        if let Some(id) = self.customer_id {
            query = query.with_customer(id);
        }
        if let Some(search) = SearchFilter::new(&self.search) {
            query = query.with_filter(search);
        }
        if let Some(status) = self.status {
            query = query.with_filter(StatusFilter::new(status));
        }
        if let Some(priority) = self.priority {
            query = query.with_filter(PriorityFilter::new(priority));
        }
        if let Some(direction) = self.direction {
            query = query.with_filter(DirectionFilter::new(direction));
        }
        if let Some(id) = self.campaign_id {
            query = query.with_filter(CampaignFilter::new(id));
        }
        if let Some(id) = self.yard_id {
            query = query.with_filter(YardFilter::new(id));
        }

        query
    }
}

/// Restrict to a single customer (nested `customer.id` or flat `customerId`)
pub struct CustomerFilter {
    customer_id: u64,
}

impl CustomerFilter {
    pub fn new(customer_id: u64) -> Self {
        Self { customer_id }
    }
}

impl TicketFilter for CustomerFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        ticket.customer_key() == Some(self.customer_id)
    }
}

/// Filter tickets by status
pub struct StatusFilter {
    target_status: TicketStatus,
}

impl StatusFilter {
    pub fn new(status: TicketStatus) -> Self {
        Self {
            target_status: status,
        }
    }
}

impl TicketFilter for StatusFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        ticket.status == self.target_status
    }
}

/// Filter tickets by priority
pub struct PriorityFilter {
    target_priority: TicketPriority,
}

impl PriorityFilter {
    pub fn new(priority: TicketPriority) -> Self {
        Self {
            target_priority: priority,
        }
    }
}

impl TicketFilter for PriorityFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        ticket.priority == self.target_priority
    }
}

/// Filter tickets by call direction
pub struct DirectionFilter {
    target_direction: CallDirection,
}

impl DirectionFilter {
    pub fn new(direction: CallDirection) -> Self {
        Self {
            target_direction: direction,
        }
    }
}

impl TicketFilter for DirectionFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        ticket.direction == self.target_direction
    }
}

/// Filter tickets by campaign id
pub struct CampaignFilter {
    campaign_id: u64,
}

impl CampaignFilter {
    pub fn new(campaign_id: u64) -> Self {
        Self { campaign_id }
    }
}

impl TicketFilter for CampaignFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        ticket.campaign_key() == Some(self.campaign_id)
    }
}

/// Filter tickets by yard id
pub struct YardFilter {
    yard_id: u64,
}

impl YardFilter {
    pub fn new(yard_id: u64) -> Self {
        Self { yard_id }
    }
}

impl TicketFilter for YardFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        ticket.yard_key() == Some(self.yard_id)
    }
}

/// View bucket predicate.
pub struct ViewFilter {
    view: ViewBucket,
    current_agent: Option<u64>,
    missed_requested: bool,
}

impl ViewFilter {
    pub fn new(
        view: ViewBucket,
        current_agent: Option<u64>,
        direction: Option<CallDirection>,
    ) -> Self {
        Self {
            view,
            current_agent,
            missed_requested: direction == Some(CallDirection::Missed),
        }
    }
}

impl TicketFilter for ViewFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        if self.view == ViewBucket::Missed {
            return ticket.is_missed();
        }
        if ticket.is_missed() && !self.missed_requested {
            return false;
        }

        match self.view {
            ViewBucket::All => true,
            ViewBucket::Active => !ticket.is_closed(),
            ViewBucket::Assigned => ticket.assignee_key().is_some(),
            ViewBucket::Mine => {
                self.current_agent.is_some() && ticket.assignee_key() == self.current_agent
            }
            ViewBucket::Unassigned => ticket.assignee_key().is_none(),
            ViewBucket::HighPriority => ticket.priority.is_high(),
            ViewBucket::Missed => ticket.is_missed(),
        }
    }
}

/// Composed predicate pipeline.
pub struct TicketQuery {
    customer: Option<CustomerFilter>,
    filters: Vec<Box<dyn TicketFilter>>,
    view: ViewFilter,
    sink_closed: bool,
}

impl TicketQuery {
    pub fn new(
        view: ViewBucket,
        current_agent: Option<u64>,
        direction: Option<CallDirection>,
    ) -> Self {
        Self {
            customer: None,
            filters: Vec::new(),
            view: ViewFilter::new(view, current_agent, direction),
            sink_closed: view == ViewBucket::HighPriority,
        }
    }

    pub fn with_customer(mut self, customer_id: u64) -> Self {
        self.customer = Some(CustomerFilter::new(customer_id));
        self
    }

    pub fn with_filter(mut self, filter: impl TicketFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(customer) = &self.customer
            && !customer.matches(ticket)
        {
            return false;
        }
        self.filters.iter().all(|f| f.matches(ticket)) && self.view.matches(ticket)
    }

    /// Run the pipeline over a collection, preserving input order except
    /// for the closed-last ordering of the high-priority view.
    pub fn apply(&self, tickets: &[Ticket]) -> Vec<Ticket> {
        let mut result: Vec<Ticket> = tickets
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        if self.sink_closed {
            sink_closed(&mut result);
        }
        result
    }
}

/// Stable-sort closed tickets after all others.
pub fn sink_closed(tickets: &mut [Ticket]) {
    tickets.sort_by_key(Ticket::is_closed);
}

/// Produce the visible subset of `tickets` for `state`.
///
/// Pure: the same inputs always produce the same output.
pub fn apply_filters(tickets: &[Ticket], state: &FilterState) -> Vec<Ticket> {
    state.to_query().apply(tickets)
}
