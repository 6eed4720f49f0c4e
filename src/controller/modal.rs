//! Modal lifecycle for the ticket list.
//!
//! ```text
//! Closed ──open_create──▶ Create ──submit──▶ Submitting ──ok──▶ Closed
//!                           ▲                    │
//!                           └──────error─────────┘
//! Closed ──open_ticket──▶ LoadingDetail ──▶ View | Edit
//! View ──begin_edit──▶ Edit ──save/cancel──▶ Closed
//! ```
//!
//! Only one modal exists at a time; entering any state replaces the
//! previous one.

use crate::api::NewTicket;
use crate::types::{Ticket, TicketId};
use crate::validation::FieldErrors;

/// What a `Submitting` modal returns to if the request fails.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitFlow {
    Create(NewTicket),
    Edit(Ticket),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Modal {
    #[default]
    Closed,
    LoadingDetail {
        id: TicketId,
    },
    View {
        ticket: Ticket,
    },
    Edit {
        ticket: Ticket,
        errors: FieldErrors,
    },
    Create {
        form: NewTicket,
        errors: FieldErrors,
    },
    Submitting(SubmitFlow),
}

impl Modal {
    pub fn is_open(&self) -> bool {
        !matches!(self, Modal::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Modal::Submitting(_))
    }

    /// Ticket id the modal is about, if any.
    pub fn ticket_id(&self) -> Option<TicketId> {
        match self {
            Modal::LoadingDetail { id } => Some(*id),
            Modal::View { ticket }
            | Modal::Edit { ticket, .. }
            | Modal::Submitting(SubmitFlow::Edit(ticket)) => Some(ticket.id),
            Modal::Closed | Modal::Create { .. } | Modal::Submitting(SubmitFlow::Create(_)) => {
                None
            }
        }
    }

    /// The ticket copy being displayed, if any.
    pub fn ticket(&self) -> Option<&Ticket> {
        match self {
            Modal::View { ticket }
            | Modal::Edit { ticket, .. }
            | Modal::Submitting(SubmitFlow::Edit(ticket)) => Some(ticket),
            _ => None,
        }
    }

    pub(crate) fn ticket_mut(&mut self) -> Option<&mut Ticket> {
        match self {
            Modal::View { ticket }
            | Modal::Edit { ticket, .. }
            | Modal::Submitting(SubmitFlow::Edit(ticket)) => Some(ticket),
            _ => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Modal::Edit { errors, .. } | Modal::Create { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Short state name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Modal::Closed => "closed",
            Modal::LoadingDetail { .. } => "loading",
            Modal::View { .. } => "view",
            Modal::Edit { .. } => "edit",
            Modal::Create { .. } => "create",
            Modal::Submitting(_) => "submitting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_id_by_state() {
        assert_eq!(Modal::Closed.ticket_id(), None);
        assert_eq!(Modal::LoadingDetail { id: 4 }.ticket_id(), Some(4));
        let edit = Modal::Edit {
            ticket: Ticket::new(9),
            errors: FieldErrors::new(),
        };
        assert_eq!(edit.ticket_id(), Some(9));
        assert_eq!(
            Modal::Submitting(SubmitFlow::Create(NewTicket::default())).ticket_id(),
            None
        );
    }

    #[test]
    fn test_flags() {
        assert!(!Modal::Closed.is_open());
        assert!(Modal::Submitting(SubmitFlow::Edit(Ticket::new(1))).is_submitting());
        assert_eq!(Modal::View { ticket: Ticket::new(1) }.name(), "view");
    }
}
