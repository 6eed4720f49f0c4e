use owo_colors::OwoColorize;

use super::{CommandOutput, open_controller};
use crate::cli::OutputOptions;
use crate::error::Result;
use crate::references::ReferenceData;

fn section<'a>(
    out: &mut String,
    title: &str,
    rows: impl Iterator<Item = (u64, Option<&'a str>, Option<&'a str>)>,
) {
    out.push_str(&format!("{}\n", title.cyan().bold()));
    let mut empty = true;
    for (id, name, extra) in rows {
        empty = false;
        let name = name.unwrap_or("(unnamed)");
        match extra {
            Some(extra) => out.push_str(&format!("  {:>5}  {name} {}\n", id, extra.dimmed())),
            None => out.push_str(&format!("  {:>5}  {name}\n", id)),
        }
    }
    if empty {
        out.push_str(&format!("  {}\n", "none".dimmed()));
    }
    out.push('\n');
}

/// Print the reference option lists
pub async fn cmd_refs(output: OutputOptions) -> Result<()> {
    let (_config, controller) = open_controller()?;
    let refs = ReferenceData::load(controller.backend()).await;

    let mut text = String::new();
    section(
        &mut text,
        "Agents",
        refs.agents
            .iter()
            .map(|a| (a.id, a.name.as_deref(), a.email.as_deref())),
    );
    section(
        &mut text,
        "Customers",
        refs.customers
            .iter()
            .map(|c| (c.id, c.name.as_deref(), c.phone.as_deref())),
    );
    section(
        &mut text,
        "Campaigns",
        refs.campaigns
            .iter()
            .map(|c| (c.id, c.name.as_deref(), c.kind.as_deref())),
    );
    section(
        &mut text,
        "Yards",
        refs.yards.iter().map(|y| (y.id, y.name.as_deref(), None)),
    );

    CommandOutput::new(serde_json::to_value(&refs)?)
        .with_text(text.trim_end())
        .print(output)
}
