use clap::Parser;
use std::process::ExitCode;

use ticketdesk::cli::{Cli, Commands, ConfigAction, OutputOptions};
use ticketdesk::commands::{
    cmd_config_get, cmd_config_set, cmd_config_show, cmd_create, cmd_ls, cmd_refs, cmd_show,
    cmd_stats, cmd_update, cmd_watch,
};
use ticketdesk::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Ls {
            filters,
            page,
            page_size,
            json,
        } => cmd_ls(&filters, page, page_size, OutputOptions { json }).await,
        Commands::Show { id, json } => cmd_show(id, OutputOptions { json }).await,
        Commands::Update { id, fields, json } => {
            cmd_update(id, &fields, OutputOptions { json }).await
        }
        Commands::Create { fields, json } => cmd_create(&fields, OutputOptions { json }).await,
        Commands::Watch {
            filters,
            interval,
            json,
        } => cmd_watch(&filters, interval, OutputOptions { json }).await,
        Commands::Stats { json } => cmd_stats(OutputOptions { json }).await,
        Commands::Refs { json } => cmd_refs(OutputOptions { json }).await,

        Commands::Config { action } => match action {
            ConfigAction::Show { json } => cmd_config_show(OutputOptions { json }),
            ConfigAction::Get { key, json } => cmd_config_get(&key, OutputOptions { json }),
            ConfigAction::Set { key, value, json } => {
                cmd_config_set(&key, &value, OutputOptions { json })
            }
        },
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
