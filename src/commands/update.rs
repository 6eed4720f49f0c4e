use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, open_controller, print_notices, read_attachments};
use crate::api::TicketPatch;
use crate::cli::{OutputOptions, UpdateArgs};
use crate::controller::{Modal, SubmitOutcome};
use crate::error::Result;

impl UpdateArgs {
    pub fn to_patch(&self) -> TicketPatch {
        let assigned_to_id = if self.unassign {
            Some(None)
        } else {
            self.assignee.map(Some)
        };
        TicketPatch {
            status: self.status,
            priority: self.priority,
            assigned_to_id,
            campaign_id: self.campaign,
            yard_id: self.yard,
            customer_id: self.customer,
            disposition: self.disposition.clone(),
            issue_detail: self.detail.clone(),
            call_date: self.call_date.clone(),
        }
    }
}

/// Edit a ticket: open it, switch to edit, save the patch, then upload any
/// attachments
pub async fn cmd_update(id: u64, args: &UpdateArgs, output: OutputOptions) -> Result<()> {
    let attachments = read_attachments(&args.attachments).await?;
    let (_config, mut controller) = open_controller()?;

    let in_view = matches!(controller.open_ticket(id).await?, Modal::View { .. });
    if in_view {
        controller.begin_edit()?;
    }

    let outcome = controller.save_edit(args.to_patch(), attachments).await?;
    let notices = controller.drain_notices();

    let warning = match &outcome {
        SubmitOutcome::Saved(_) => None,
        SubmitOutcome::PartialSuccess { warning, .. } => Some(warning.clone()),
    };

    let json_output = json!({
        "action": "update",
        "id": id,
        "success": true,
        "warning": warning,
        "ticket": outcome.ticket(),
    });

    if !output.json {
        print_notices(notices);
    }

    let text = match warning {
        None => format!("Updated {}", format!("#{id}").cyan()),
        Some(_) => format!(
            "Updated {} {}",
            format!("#{id}").cyan(),
            "(attachments not uploaded)".yellow()
        ),
    };

    CommandOutput::new(json_output).with_text(text).print(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unassign_clears_assignee() {
        let args = UpdateArgs {
            unassign: true,
            ..Default::default()
        };
        assert_eq!(args.to_patch().assigned_to_id, Some(None));

        let args = UpdateArgs {
            assignee: Some(4),
            ..Default::default()
        };
        assert_eq!(args.to_patch().assigned_to_id, Some(Some(4)));
        assert!(UpdateArgs::default().to_patch().is_empty());
    }
}
