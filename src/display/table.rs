use jiff::Timestamp;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::references::ReferenceData;
use crate::types::Ticket;

use super::{format_direction, format_relative};

/// A row in the ticket list table
#[derive(Debug, Tabled)]
pub struct TicketRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Priority")]
    pub priority: String,
    #[tabled(rename = "Direction")]
    pub direction: String,
    #[tabled(rename = "Client")]
    pub client: String,
    #[tabled(rename = "Yard")]
    pub yard: String,
    #[tabled(rename = "Campaign")]
    pub campaign: String,
    #[tabled(rename = "Assignee")]
    pub assignee: String,
    #[tabled(rename = "Created")]
    pub created: String,
}

impl TicketRow {
    pub fn new(ticket: &Ticket, refs: &ReferenceData, now: Timestamp) -> Self {
        let client = refs.customer_label(ticket);
        Self {
            id: ticket.id.to_string(),
            status: ticket.status.to_string(),
            priority: ticket.priority.to_string(),
            direction: format_direction(ticket),
            client: if client.is_empty() {
                "-".to_string()
            } else {
                client
            },
            yard: refs.yard_label(ticket),
            campaign: refs.campaign_label(ticket),
            assignee: refs.assignee_label(ticket),
            created: ticket
                .created_at
                .as_deref()
                .map(|c| format_relative(c, now))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn render_ticket_table(tickets: &[Ticket], refs: &ReferenceData, now: Timestamp) -> String {
    let rows: Vec<TicketRow> = tickets
        .iter()
        .map(|t| TicketRow::new(t, refs, now))
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallDirection, Customer};

    #[test]
    fn test_row_labels() {
        let mut ticket = Ticket::new(3);
        ticket.direction = CallDirection::Missed;
        ticket.assigned_to_id = Some(5);
        ticket.customer = Some(Customer {
            id: 1,
            name: Some("Ada".to_string()),
            phone: None,
            email: None,
        });
        let row = TicketRow::new(&ticket, &ReferenceData::default(), Timestamp::UNIX_EPOCH);
        assert_eq!(row.id, "3");
        assert_eq!(row.direction, "missed (outbound?)");
        assert_eq!(row.client, "Ada");
        assert_eq!(row.yard, "Pending");
        assert_eq!(row.created, "-");
    }

    #[test]
    fn test_table_has_header_and_rows() {
        let table = render_ticket_table(
            &[Ticket::new(1), Ticket::new(22)],
            &ReferenceData::default(),
            Timestamp::UNIX_EPOCH,
        );
        assert!(table.contains("Assignee"));
        assert!(table.contains("22"));
        assert!(table.contains("Unassigned"));
    }
}
