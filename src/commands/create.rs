use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, open_controller, print_notices, read_attachments};
use crate::api::NewTicket;
use crate::cli::{CreateArgs, OutputOptions};
use crate::controller::SubmitOutcome;
use crate::error::Result;

impl CreateArgs {
    pub fn to_form(&self) -> NewTicket {
        NewTicket {
            customer_id: self.customer_id,
            customer_name: self.customer_name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            status: self.status,
            priority: self.priority,
            direction: self.direction,
            campaign_id: self.campaign,
            yard_id: self.yard,
            assigned_to_id: self.assignee,
            disposition: self.disposition.clone(),
            issue_detail: self.detail.clone(),
            call_date: self.call_date.clone(),
        }
    }
}

/// Create a ticket, upload attachments, and refresh the list
pub async fn cmd_create(args: &CreateArgs, output: OutputOptions) -> Result<()> {
    let attachments = read_attachments(&args.attachments).await?;
    let (_config, mut controller) = open_controller()?;

    controller.open_create();
    let outcome = controller.create(args.to_form(), attachments).await?;
    let notices = controller.drain_notices();

    let ticket = outcome.ticket();
    let warning = match &outcome {
        SubmitOutcome::Saved(_) => None,
        SubmitOutcome::PartialSuccess { warning, .. } => Some(warning.clone()),
    };

    let json_output = json!({
        "action": "create",
        "id": ticket.id,
        "success": true,
        "warning": warning,
        "total": controller.tickets().len(),
        "ticket": ticket,
    });

    if !output.json {
        print_notices(notices);
    }

    let text = format!("Created {}", format!("#{}", ticket.id).cyan());
    CommandOutput::new(json_output).with_text(text).print(output)
}
