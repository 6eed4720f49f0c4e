use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DeskError;

pub const DESK_DIR: &str = ".ticketdesk";

/// Label shown for tickets with no assignee.
pub const UNASSIGNED_LABEL: &str = "Unassigned";
/// Label shown for tickets with no campaign.
pub const NO_CAMPAIGN_LABEL: &str = "No campaign";
/// Label shown for tickets with no yard yet.
pub const PENDING_YARD_LABEL: &str = "Pending";

pub type TicketId = u64;

/// Resolve the workspace directory, honoring `TICKETDESK_ROOT`.
pub fn desk_root() -> std::path::PathBuf {
    match std::env::var_os("TICKETDESK_ROOT") {
        Some(root) if !root.is_empty() => std::path::PathBuf::from(root),
        _ => std::path::PathBuf::from(DESK_DIR),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

crate::wire_enum!(
    TicketStatus,
    DeskError::InvalidStatus,
    {
        Open => "Open" | "new",
        InProgress => "In Progress" | "inprogress",
        Closed => "Closed" | "resolved",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Emergency,
}

crate::wire_enum!(
    TicketPriority,
    DeskError::InvalidPriority,
    {
        Low => "Low",
        Medium => "Medium" | "normal",
        High => "High",
        Emergency => "Emergency" | "urgent",
    }
);

impl TicketPriority {
    /// High and Emergency both count as "high priority" for the view bucket.
    pub fn is_high(&self) -> bool {
        matches!(self, TicketPriority::High | TicketPriority::Emergency)
    }
}

/// Call direction. `Missed` is recorded in the same field as the real
/// direction, so "missed" is an axis layered over inbound/outbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CallDirection {
    #[default]
    Inbound,
    Outbound,
    Missed,
}

crate::wire_enum!(
    CallDirection,
    DeskError::InvalidDirection,
    {
        Inbound => "inbound" | "incoming",
        Outbound => "outbound" | "outgoing",
        Missed => "missed",
    }
);

/// Named preset filter shown as a sidebar shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ViewBucket {
    #[default]
    All,
    Active,
    Assigned,
    Mine,
    Unassigned,
    Missed,
    HighPriority,
}

crate::wire_enum!(
    ViewBucket,
    DeskError::InvalidView,
    {
        All => "all",
        Active => "active",
        Assigned => "assigned",
        Mine => "assigned-to-me" | "mine" | "my tickets",
        Unassigned => "unassigned",
        Missed => "missed" | "missed calls",
        HighPriority => "high-priority" | "high",
    }
);

/// Whether a ticket has been through onboarding.
///
/// Campaign assignment is the onboarding step, so a ticket without one
/// opens straight into the edit flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    NeedsSetup,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Yard {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One call logged against a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<CallDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Best-effort original direction of a missed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferredOrigin {
    pub direction: CallDirection,
    /// True when no call record carried a direction and the value was
    /// guessed from whether an agent is assigned.
    pub guessed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,

    #[serde(default)]
    pub status: TicketStatus,

    #[serde(default)]
    pub priority: TicketPriority,

    #[serde(default)]
    pub direction: CallDirection,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Agent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<Campaign>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yard_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yard: Option<Yard>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_detail: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,

    /// `None` when the payload omitted call history (list responses may),
    /// as opposed to `Some(vec![])` for a ticket with no calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_history: Option<Vec<CallRecord>>,

    /// Fields this client does not model, kept so merges never drop them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Ticket {
    pub fn new(id: TicketId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn customer_key(&self) -> Option<u64> {
        self.customer.as_ref().map(|c| c.id).or(self.customer_id)
    }

    pub fn campaign_key(&self) -> Option<u64> {
        self.campaign.as_ref().map(|c| c.id).or(self.campaign_id)
    }

    pub fn yard_key(&self) -> Option<u64> {
        self.yard.as_ref().map(|y| y.id).or(self.yard_id)
    }

    pub fn assignee_key(&self) -> Option<u64> {
        self.assigned_to.as_ref().map(|a| a.id).or(self.assigned_to_id)
    }

    pub fn is_missed(&self) -> bool {
        self.direction == CallDirection::Missed
    }

    pub fn is_closed(&self) -> bool {
        self.status == TicketStatus::Closed
    }

    pub fn setup_state(&self) -> SetupState {
        if self.campaign_key().is_some() {
            SetupState::Ready
        } else {
            SetupState::NeedsSetup
        }
    }

    fn extra_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|k| self.extra.get(*k).and_then(Value::as_str))
    }

    /// Customer display name, from the nested reference or a flat field.
    pub fn client_name(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .or_else(|| self.extra_str(&["clientName", "customerName"]))
    }

    pub fn phone(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|c| c.phone.as_deref())
            .or_else(|| self.extra_str(&["phone", "customerPhone", "phoneNumber"]))
    }

    pub fn yard_name(&self) -> Option<&str> {
        self.yard.as_ref().and_then(|y| y.name.as_deref())
    }

    pub fn campaign_name(&self) -> Option<&str> {
        self.campaign.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.assigned_to.as_ref().and_then(|a| a.name.as_deref())
    }

    /// Whether the payload carried call history.
    pub fn has_call_history(&self) -> bool {
        self.call_history.is_some()
    }

    /// Original direction of a missed call.
    ///
    /// Uses the most recent call record that carries a real direction.
    /// Without one, the direction is guessed from whether an agent is
    /// assigned and the result is flagged as guessed.
    pub fn missed_origin(&self) -> Option<InferredOrigin> {
        if !self.is_missed() {
            return None;
        }

        let recorded = self.call_history.as_ref().and_then(|calls| {
            calls
                .iter()
                .rev()
                .filter_map(|c| c.direction)
                .find(|d| *d != CallDirection::Missed)
        });

        if let Some(direction) = recorded {
            return Some(InferredOrigin {
                direction,
                guessed: false,
            });
        }

        let direction = if self.assignee_key().is_some() {
            CallDirection::Outbound
        } else {
            CallDirection::Inbound
        };
        tracing::debug!(
            ticket = self.id,
            %direction,
            "missed call origin not recorded, guessing from assignee"
        );
        Some(InferredOrigin {
            direction,
            guessed: true,
        })
    }
}
