//! Terminal rendering for tickets, notices and stats.

pub mod table;

use jiff::Timestamp;
use owo_colors::OwoColorize;

use crate::controller::{Modal, Notice, NoticeLevel};
use crate::references::ReferenceData;
use crate::stats::TicketStats;
use crate::types::{Ticket, TicketPriority, TicketStatus};

pub use table::{TicketRow, render_ticket_table};

pub fn format_status_colored(status: TicketStatus) -> String {
    let badge = format!("[{status}]");
    match status {
        TicketStatus::Open => badge.yellow().to_string(),
        TicketStatus::InProgress => badge.cyan().to_string(),
        TicketStatus::Closed => badge.dimmed().to_string(),
    }
}

pub fn format_priority_colored(priority: TicketPriority) -> String {
    let label = priority.to_string();
    match priority {
        TicketPriority::Emergency => label.red().bold().to_string(),
        TicketPriority::High => label.red().to_string(),
        TicketPriority::Medium => label,
        TicketPriority::Low => label.dimmed().to_string(),
    }
}

/// Direction label. Missed calls show their original direction when it is
/// known, with a `?` when it was guessed.
pub fn format_direction(ticket: &Ticket) -> String {
    match ticket.missed_origin() {
        Some(origin) => {
            let marker = if origin.guessed { "?" } else { "" };
            format!("missed ({}{marker})", origin.direction)
        }
        None => ticket.direction.to_string(),
    }
}

/// Render a timestamp relative to `now`: "just now", "5m ago", "3h ago",
/// "2d ago", then the plain date after a week. Unparseable input is
/// returned unchanged.
pub fn format_relative(raw: &str, now: Timestamp) -> String {
    let Ok(ts) = raw.parse::<Timestamp>() else {
        return raw.to_string();
    };
    let secs = now.duration_since(ts).as_secs();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 7 * 86_400 => format!("{}d ago", s / 86_400),
        _ => ts.strftime("%Y-%m-%d").to_string(),
    }
}

pub fn format_notice(notice: &Notice) -> String {
    let tag = format!("[{}]", notice.level.label());
    let tag = match notice.level {
        NoticeLevel::Info => tag.cyan().to_string(),
        NoticeLevel::Warning => tag.yellow().to_string(),
        NoticeLevel::Error => tag.red().to_string(),
        NoticeLevel::Success => tag.green().to_string(),
    };
    format!("{tag} {}", notice.message)
}

/// Multi-line detail view of a single ticket.
pub fn format_ticket_detail(ticket: &Ticket, refs: &ReferenceData, now: Timestamp) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} {}\n",
        format!("#{}", ticket.id).cyan().bold(),
        format_status_colored(ticket.status),
        format_priority_colored(ticket.priority)
    ));

    let mut field = |label: &str, value: String| {
        out.push_str(&format!("{:<11} {}\n", format!("{label}:").dimmed(), value));
    };

    field("Client", refs.customer_label(ticket));
    if let Some(phone) = ticket.phone() {
        field("Phone", phone.to_string());
    }
    field("Direction", format_direction(ticket));
    field("Campaign", refs.campaign_label(ticket));
    field("Yard", refs.yard_label(ticket));
    field("Assignee", refs.assignee_label(ticket));
    if let Some(disposition) = &ticket.disposition {
        field("Disposition", disposition.clone());
    }
    if let Some(created) = &ticket.created_at {
        field("Created", format_relative(created, now));
    }
    if let Some(call_date) = &ticket.call_date {
        field("Call date", call_date.clone());
    }

    if let Some(detail) = &ticket.issue_detail {
        out.push_str(&format!("\n{detail}\n"));
    }

    if !ticket.attachments.is_empty() {
        out.push_str(&format!("\n{}\n", "Attachments".bold()));
        for attachment in &ticket.attachments {
            out.push_str(&format!("- {attachment}\n"));
        }
    }

    if let Some(calls) = &ticket.call_history
        && !calls.is_empty()
    {
        out.push_str(&format!("\n{}\n", "Call history".bold()));
        for call in calls {
            let direction = call
                .direction
                .map(|d| d.to_string())
                .unwrap_or_else(|| "?".to_string());
            let when = call
                .timestamp
                .as_deref()
                .map(|t| format_relative(t, now))
                .unwrap_or_default();
            let mut line = format!("- {direction} {when}");
            if let Some(agent) = &call.agent {
                line.push_str(&format!(" by {agent}"));
            }
            if let Some(duration) = call.duration {
                line.push_str(&format!(" ({}:{:02})", duration / 60, duration % 60));
            }
            if let Some(notes) = &call.notes {
                line.push_str(&format!(": {notes}"));
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    out.trim_end().to_string()
}

/// One-line description of where `open_ticket` routed.
pub fn format_modal_banner(modal: &Modal) -> String {
    match modal {
        Modal::View { .. } => "Opened in view mode".dimmed().to_string(),
        Modal::Edit { .. } => "Needs setup: assign a campaign to continue"
            .yellow()
            .to_string(),
        other => other.name().to_string(),
    }
}

pub fn format_stats(stats: &TicketStats) -> String {
    let mut out = format!("{} {}\n", "Total:".bold(), stats.total);

    let mut section = |title: &str, rows: Vec<(String, usize)>| {
        out.push_str(&format!("\n{}\n", title.cyan().bold()));
        for (label, count) in rows {
            out.push_str(&format!("  {label:<16} {count}\n"));
        }
    };

    section(
        "Status",
        stats
            .by_status
            .iter()
            .map(|(k, n)| (k.to_string(), *n))
            .collect(),
    );
    section(
        "Priority",
        stats
            .by_priority
            .iter()
            .map(|(k, n)| (k.to_string(), *n))
            .collect(),
    );
    section(
        "Direction",
        stats
            .by_direction
            .iter()
            .map(|(k, n)| (k.to_string(), *n))
            .collect(),
    );
    section(
        "Views",
        stats
            .by_view
            .iter()
            .map(|(k, n)| (k.to_string(), *n))
            .collect(),
    );

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallDirection, CallRecord};

    fn now() -> Timestamp {
        "2024-06-10T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_format_relative() {
        assert_eq!(format_relative("2024-06-10T11:59:30Z", now()), "just now");
        assert_eq!(format_relative("2024-06-10T11:45:00Z", now()), "15m ago");
        assert_eq!(format_relative("2024-06-10T09:00:00Z", now()), "3h ago");
        assert_eq!(format_relative("2024-06-08T12:00:00Z", now()), "2d ago");
        assert_eq!(format_relative("2024-05-01T08:00:00Z", now()), "2024-05-01");
        assert_eq!(format_relative("yesterday", now()), "yesterday");
    }

    #[test]
    fn test_format_direction_missed() {
        let mut ticket = Ticket::new(1);
        assert_eq!(format_direction(&ticket), "inbound");

        ticket.direction = CallDirection::Missed;
        assert_eq!(format_direction(&ticket), "missed (inbound?)");

        ticket.call_history = Some(vec![CallRecord {
            direction: Some(CallDirection::Outbound),
            timestamp: None,
            agent: None,
            duration: None,
            notes: None,
        }]);
        assert_eq!(format_direction(&ticket), "missed (outbound)");
    }

    #[test]
    fn test_detail_uses_placeholders() {
        let ticket = Ticket::new(12);
        let detail = format_ticket_detail(&ticket, &ReferenceData::default(), now());
        assert!(detail.contains("#12"));
        assert!(detail.contains("Unassigned"));
        assert!(detail.contains("No campaign"));
        assert!(detail.contains("Pending"));
    }

    #[test]
    fn test_notice_contains_message() {
        let rendered = format_notice(&Notice::warning("upload failed"));
        assert!(rendered.contains("warning"));
        assert!(rendered.ends_with("upload failed"));
    }
}
