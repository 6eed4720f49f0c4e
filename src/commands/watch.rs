use std::time::Duration;

use owo_colors::OwoColorize;
use serde_json::json;

use super::{open_controller, print_notices};
use crate::cli::{FilterArgs, OutputOptions};
use crate::controller::{Notice, RefreshOutcome};
use crate::error::Result;
use crate::poll::{Poller, visibility_channel};

fn emit(notices: Vec<Notice>, output: OutputOptions) {
    if output.json {
        for notice in notices {
            println!(
                "{}",
                json!({"level": notice.level, "message": notice.message})
            );
        }
    } else {
        print_notices(notices);
    }
}

/// Poll the backend until Ctrl-C, printing a notice whenever tickets arrive
pub async fn cmd_watch(
    filters: &FilterArgs,
    interval: Option<u64>,
    output: OutputOptions,
) -> Result<()> {
    let (config, mut controller) = open_controller()?;
    controller.set_filter(filters.to_filter_state(config.agent_id));

    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll_interval());

    // Terminal sessions are always visible
    let (_visibility, visibility_rx) = visibility_channel();
    let mut poller = Poller::new(interval, visibility_rx);

    if let Err(e) = controller.refresh(true).await {
        tracing::warn!(error = %e, "initial load failed, will retry");
    }
    if !output.json {
        eprintln!(
            "Watching {} ticket(s), {} visible. Refreshing every {}s, Ctrl-C to stop.",
            controller.tickets().len(),
            controller.visible().len(),
            poller.interval().as_secs()
        );
    }
    emit(controller.drain_notices(), output);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            tick = poller.tick() => {
                let Some(reason) = tick else { break };
                tracing::debug!(?reason, "poll tick");
                match controller.refresh(false).await {
                    Ok(RefreshOutcome::Updated { total, .. }) if !output.json => {
                        eprintln!(
                            "{}",
                            format!("{total} ticket(s), {} visible", controller.visible().len())
                                .dimmed()
                        );
                    }
                    Ok(_) => {}
                    Err(e) => tracing::debug!(error = %e, "refresh failed"),
                }
                emit(controller.drain_notices(), output);
            }
        }
    }

    Ok(())
}
