use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::DeskError;
use crate::filter::FilterState;
use crate::types::{CallDirection, TicketPriority, TicketStatus, ViewBucket};
use crate::url_state::UrlState;

#[derive(Parser)]
#[command(name = "ticketdesk")]
#[command(about = "Support ticket desk client")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tickets through the filter pipeline
    #[command(visible_alias = "l")]
    Ls {
        #[command(flatten)]
        filters: FilterArgs,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (default: from config)
        #[arg(long)]
        page_size: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open a ticket (view, or edit when it still needs a campaign)
    #[command(visible_alias = "s")]
    Show {
        /// Ticket ID
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update ticket fields and optionally attach files
    #[command(visible_alias = "u")]
    Update {
        /// Ticket ID
        id: u64,

        #[command(flatten)]
        fields: UpdateArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new ticket
    #[command(visible_alias = "c")]
    Create {
        #[command(flatten)]
        fields: CreateArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Poll for changes and print notices until interrupted
    Watch {
        #[command(flatten)]
        filters: FilterArgs,

        /// Seconds between refreshes (default: from config)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,

        /// Output notices as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show dashboard counters
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List agents, customers, campaigns and yards
    Refs {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Display current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (e.g. api_url, agent_id)
        key: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to set
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Query string to start from, e.g. '?customerId=42&view=missed'
    #[arg(long)]
    pub url: Option<String>,

    /// Free-text search (client, yard, ticket id, phone)
    #[arg(long)]
    pub search: Option<String>,

    /// Status: Open, In Progress, Closed
    #[arg(long, value_parser = parse_status)]
    pub status: Option<TicketStatus>,

    /// Priority: Low, Medium, High, Emergency
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<TicketPriority>,

    /// Direction: inbound, outbound, missed
    #[arg(long, value_parser = parse_direction)]
    pub direction: Option<CallDirection>,

    /// Campaign ID
    #[arg(long)]
    pub campaign: Option<u64>,

    /// Yard ID
    #[arg(long)]
    pub yard: Option<u64>,

    /// View: all, active, assigned, assigned-to-me, unassigned, missed, high-priority
    #[arg(long, value_parser = parse_view)]
    pub view: Option<ViewBucket>,

    /// Only tickets for this customer ID
    #[arg(long)]
    pub customer: Option<u64>,
}

impl FilterArgs {
    /// Build a filter state: the `--url` query first, then explicit flags.
    pub fn to_filter_state(&self, current_agent: Option<u64>) -> FilterState {
        let mut state = match &self.url {
            Some(url) => UrlState::parse(url).to_filter(current_agent),
            None => FilterState {
                current_agent,
                ..Default::default()
            },
        };

        if let Some(search) = &self.search {
            state.search = search.clone();
        }
        if let Some(view) = self.view {
            state.view = view;
        }
        if let Some(customer) = self.customer {
            state.customer_id = Some(customer);
        }
        state.status = self.status;
        state.priority = self.priority;
        state.direction = self.direction;
        state.campaign_id = self.campaign;
        state.yard_id = self.yard;
        state
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    #[arg(long, value_parser = parse_status)]
    pub status: Option<TicketStatus>,

    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<TicketPriority>,

    /// Assign to this agent ID
    #[arg(long, conflicts_with = "unassign")]
    pub assignee: Option<u64>,

    /// Clear the assignee
    #[arg(long)]
    pub unassign: bool,

    /// Campaign ID (required for tickets that still need setup)
    #[arg(long)]
    pub campaign: Option<u64>,

    /// Yard ID
    #[arg(long)]
    pub yard: Option<u64>,

    /// Customer ID
    #[arg(long)]
    pub customer: Option<u64>,

    #[arg(long)]
    pub disposition: Option<String>,

    /// Issue detail text
    #[arg(long)]
    pub detail: Option<String>,

    /// Call date (e.g. 2024-06-01)
    #[arg(long)]
    pub call_date: Option<String>,

    /// File to attach (repeatable)
    #[arg(long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// Issue detail text
    #[arg(short, long)]
    pub detail: Option<String>,

    /// Existing customer ID
    #[arg(long, conflicts_with = "customer_name")]
    pub customer_id: Option<u64>,

    /// Name for a new customer
    #[arg(long)]
    pub customer_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long, default_value = "Open", value_parser = parse_status)]
    pub status: TicketStatus,

    #[arg(short, long, default_value = "Medium", value_parser = parse_priority)]
    pub priority: TicketPriority,

    #[arg(long, default_value = "inbound", value_parser = parse_direction)]
    pub direction: CallDirection,

    /// Campaign ID
    #[arg(long)]
    pub campaign: Option<u64>,

    /// Yard ID
    #[arg(long)]
    pub yard: Option<u64>,

    /// Assign to this agent ID
    #[arg(long)]
    pub assignee: Option<u64>,

    #[arg(long)]
    pub disposition: Option<String>,

    #[arg(long)]
    pub call_date: Option<String>,

    /// File to attach (repeatable)
    #[arg(long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,
}

fn parse_with_validation<T, F>(
    s: &str,
    parser: F,
    field_name: &str,
    valid_values: &[&str],
) -> Result<T, String>
where
    F: FnOnce(&str) -> Result<T, DeskError>,
{
    parser(s).map_err(|_| {
        format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        )
    })
}

fn labels<T: Copy>(all: &[T], label: fn(&T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(label).collect()
}

fn parse_status(s: &str) -> Result<TicketStatus, String> {
    parse_with_validation(
        s,
        |v| v.parse(),
        "status",
        &labels(TicketStatus::ALL, TicketStatus::label),
    )
}

fn parse_priority(s: &str) -> Result<TicketPriority, String> {
    parse_with_validation(
        s,
        |v| v.parse(),
        "priority",
        &labels(TicketPriority::ALL, TicketPriority::label),
    )
}

fn parse_direction(s: &str) -> Result<CallDirection, String> {
    parse_with_validation(
        s,
        |v| v.parse(),
        "direction",
        &labels(CallDirection::ALL, CallDirection::label),
    )
}

fn parse_view(s: &str) -> Result<ViewBucket, String> {
    parse_with_validation(
        s,
        |v| v.parse(),
        "view",
        &labels(ViewBucket::ALL, ViewBucket::label),
    )
}
