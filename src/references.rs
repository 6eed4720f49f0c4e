//! Reference option lists: agents, customers, campaigns and yards.
//!
//! These back the selectors in the create/edit flows and resolve display
//! names for tickets that only carry foreign keys. Lists are loaded
//! concurrently; a list that fails to load degrades to empty so the ticket
//! list still renders, with placeholders where names are missing.

use std::collections::HashSet;

use serde::Serialize;

use crate::api::TicketBackend;
use crate::error::Result;
use crate::types::{
    Agent, Campaign, Customer, NO_CAMPAIGN_LABEL, PENDING_YARD_LABEL, Ticket, UNASSIGNED_LABEL,
    Yard,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceData {
    pub agents: Vec<Agent>,
    pub customers: Vec<Customer>,
    pub campaigns: Vec<Campaign>,
    pub yards: Vec<Yard>,
}

fn or_empty<T>(kind: &str, result: Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(list = kind, error = %e, "failed to load reference list");
            Vec::new()
        }
    }
}

/// Merge agent lists by id; the first occurrence wins, later ones only
/// fill in missing name/email.
pub fn merge_agents(lists: impl IntoIterator<Item = Vec<Agent>>) -> Vec<Agent> {
    let mut merged: Vec<Agent> = Vec::new();
    let mut seen: HashSet<u64> = HashSet::new();

    for agent in lists.into_iter().flatten() {
        if seen.insert(agent.id) {
            merged.push(agent);
        } else if let Some(existing) = merged.iter_mut().find(|a| a.id == agent.id) {
            if existing.name.is_none() {
                existing.name = agent.name;
            }
            if existing.email.is_none() {
                existing.email = agent.email;
            }
        }
    }

    merged
}

impl ReferenceData {
    /// Fetch every option list concurrently.
    pub async fn load<B: TicketBackend>(backend: &B) -> Self {
        let (agents, users, customers, campaigns, yards) = futures::join!(
            backend.list_agents(),
            backend.list_users(),
            backend.list_customers(),
            backend.list_campaigns(),
            backend.list_yards()
        );

        let data = Self {
            agents: merge_agents([or_empty("agents", agents), or_empty("users", users)]),
            customers: or_empty("customers", customers),
            campaigns: or_empty("campaigns", campaigns),
            yards: or_empty("yards", yards),
        };
        tracing::debug!(
            agents = data.agents.len(),
            customers = data.customers.len(),
            campaigns = data.campaigns.len(),
            yards = data.yards.len(),
            "reference data loaded"
        );
        data
    }

    pub fn agent(&self, id: u64) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn customer(&self, id: u64) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn campaign(&self, id: u64) -> Option<&Campaign> {
        self.campaigns.iter().find(|c| c.id == id)
    }

    pub fn yard(&self, id: u64) -> Option<&Yard> {
        self.yards.iter().find(|y| y.id == id)
    }

    pub fn assignee_label(&self, ticket: &Ticket) -> String {
        ticket
            .assignee_name()
            .map(str::to_string)
            .or_else(|| {
                let id = ticket.assignee_key()?;
                let agent = self.agent(id)?;
                agent.name.clone().or_else(|| agent.email.clone())
            })
            .unwrap_or_else(|| UNASSIGNED_LABEL.to_string())
    }

    pub fn campaign_label(&self, ticket: &Ticket) -> String {
        ticket
            .campaign_name()
            .map(str::to_string)
            .or_else(|| self.campaign(ticket.campaign_key()?)?.name.clone())
            .unwrap_or_else(|| NO_CAMPAIGN_LABEL.to_string())
    }

    pub fn yard_label(&self, ticket: &Ticket) -> String {
        ticket
            .yard_name()
            .map(str::to_string)
            .or_else(|| self.yard(ticket.yard_key()?)?.name.clone())
            .unwrap_or_else(|| PENDING_YARD_LABEL.to_string())
    }

    /// Customer name, or the ticket's flat client name, or empty.
    pub fn customer_label(&self, ticket: &Ticket) -> String {
        ticket
            .client_name()
            .map(str::to_string)
            .or_else(|| self.customer(ticket.customer_key()?)?.name.clone())
            .unwrap_or_default()
    }
}
