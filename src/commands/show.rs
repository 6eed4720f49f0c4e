use jiff::Timestamp;
use serde_json::json;

use super::{CommandOutput, open_controller};
use crate::cli::OutputOptions;
use crate::display::{format_modal_banner, format_ticket_detail};
use crate::error::{DeskError, Result};
use crate::references::ReferenceData;
use crate::types::SetupState;

/// Open a ticket the way the list does: view mode, or straight into edit
/// when it still needs a campaign
pub async fn cmd_show(id: u64, output: OutputOptions) -> Result<()> {
    let (_config, mut controller) = open_controller()?;
    let modal = controller.open_ticket(id).await?.clone();

    let ticket = modal
        .ticket()
        .cloned()
        .ok_or(DeskError::TicketNotFound(id))?;

    let origin = ticket.missed_origin().map(|o| {
        json!({
            "direction": o.direction,
            "guessed": o.guessed,
        })
    });

    let json_output = json!({
        "id": id,
        "mode": modal.name(),
        "needs_setup": ticket.setup_state() == SetupState::NeedsSetup,
        "missed_origin": origin,
        "url": controller.url(),
        "ticket": ticket,
    });

    if output.json {
        return CommandOutput::new(json_output).print(output);
    }

    let refs = ReferenceData::load(controller.backend()).await;
    let text = format!(
        "{}\n\n{}",
        format_ticket_detail(&ticket, &refs, Timestamp::now()),
        format_modal_banner(&modal)
    );
    CommandOutput::new(json_output).with_text(text).print(output)
}
