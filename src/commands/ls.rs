use jiff::Timestamp;
use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, open_controller, print_notices};
use crate::cli::{FilterArgs, OutputOptions};
use crate::display::{format_modal_banner, format_ticket_detail, render_ticket_table};
use crate::error::Result;
use crate::references::ReferenceData;

/// List tickets through the filter pipeline, one page at a time. A `--url`
/// carrying `id` also opens that ticket the way the list does
pub async fn cmd_ls(
    filters: &FilterArgs,
    page: usize,
    page_size: Option<usize>,
    output: OutputOptions,
) -> Result<()> {
    let (config, mut controller) = open_controller()?;
    controller.refresh(true).await?;

    // `--url` goes through the controller first so an `id` opens its modal;
    // explicit flags then overlay the URL filters.
    if let Some(url) = &filters.url {
        controller.apply_url(url).await?;
    }
    controller.set_filter(filters.to_filter_state(config.agent_id));
    if let Some(size) = page_size {
        controller.set_page_size(size);
    }
    controller.set_page(page);

    let current = controller.current_page();
    let url = controller.url();
    let modal = controller.modal().clone();

    let json_output = json!({
        "url": url,
        "page": current.page,
        "page_size": current.page_size,
        "total": current.total,
        "total_pages": current.total_pages,
        "tickets": current.items,
        "modal": modal.name(),
        "selected": modal.ticket(),
    });

    if output.json {
        return CommandOutput::new(json_output).print(output);
    }

    print_notices(controller.drain_notices());

    let refs = ReferenceData::load(controller.backend()).await;
    let detail = modal.ticket().map(|ticket| {
        format!(
            "\n\n{}\n\n{}",
            format_ticket_detail(ticket, &refs, Timestamp::now()),
            format_modal_banner(&modal)
        )
    });

    if current.total == 0 {
        return CommandOutput::new(json_output)
            .with_text(format!(
                "No tickets match the current filters.{}",
                detail.unwrap_or_default()
            ))
            .print(output);
    }
    if current.is_empty() {
        return CommandOutput::new(json_output)
            .with_text(format!(
                "Page {} is past the end ({} page(s)).{}",
                current.page,
                current.total_pages,
                detail.unwrap_or_default()
            ))
            .print(output);
    }

    let mut text = render_ticket_table(&current.items, &refs, Timestamp::now());
    text.push_str(&format!(
        "\nPage {}/{} ({} ticket(s))",
        current.page, current.total_pages, current.total
    ));
    if !url.is_empty() {
        text.push_str(&format!("  {}", format!("?{url}").dimmed()));
    }
    if let Some(detail) = detail {
        text.push_str(&detail);
    }

    CommandOutput::new(json_output).with_text(text).print(output)
}
