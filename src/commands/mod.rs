mod config;
mod create;
mod ls;
mod refs;
mod show;
mod stats;
mod update;
mod watch;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use create::cmd_create;
pub use ls::cmd_ls;
pub use refs::cmd_refs;
pub use show::cmd_show;
pub use stats::cmd_stats;
pub use update::cmd_update;
pub use watch::cmd_watch;

use std::path::PathBuf;

use serde_json::Value;

use crate::api::{Attachment, HttpBackend};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::controller::{ControllerOptions, Notice, TicketListController};
use crate::display::format_notice;
use crate::error::Result;

/// Output of a command in both renderings.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print JSON when requested, otherwise the text form (falling back to
    /// JSON when no text was provided).
    pub fn print(self, output: OutputOptions) -> Result<()> {
        match (output.json, self.text) {
            (false, Some(text)) => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load config and build a controller over the HTTP backend.
pub(crate) fn open_controller() -> Result<(Config, TicketListController<HttpBackend>)> {
    let config = Config::load()?;
    let backend = HttpBackend::from_config(&config)?;
    let controller = TicketListController::new(backend, ControllerOptions::from_config(&config));
    Ok((config, controller))
}

pub(crate) async fn read_attachments(paths: &[PathBuf]) -> Result<Vec<Attachment>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(Attachment::from_path(path).await?);
    }
    Ok(files)
}

/// Notices go to stderr so stdout stays parseable.
pub(crate) fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        eprintln!("{}", format_notice(&notice));
    }
}
