use super::{CommandOutput, open_controller};
use crate::cli::OutputOptions;
use crate::display::format_stats;
use crate::error::Result;
use crate::stats::TicketStats;

/// Dashboard counters over the full collection
pub async fn cmd_stats(output: OutputOptions) -> Result<()> {
    let (config, mut controller) = open_controller()?;
    controller.refresh(true).await?;

    let stats = TicketStats::compute(controller.tickets(), config.agent_id);
    let json_output = serde_json::to_value(&stats)?;

    CommandOutput::new(json_output)
        .with_text(format_stats(&stats))
        .print(output)
}
