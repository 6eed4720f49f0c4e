#[macro_use]
pub mod macros;

pub mod api;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod filter;
pub mod logging;
pub mod paginate;
pub mod poll;
pub mod references;
pub mod stats;
pub mod types;
pub mod url_state;
pub mod validation;

pub use api::{HttpBackend, TicketBackend};
pub use controller::{ControllerOptions, Modal, TicketListController};
pub use error::{DeskError, Result};
pub use filter::FilterState;
pub use types::{CallDirection, Ticket, TicketId, TicketPriority, TicketStatus, ViewBucket};
