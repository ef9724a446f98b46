use clap::Parser;
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use discovery_console::cli::{Cli, Commands, ConfigAction, OutputOptions};
use discovery_console::commands::{
    Session, cmd_approve, cmd_config_path, cmd_config_set, cmd_config_show, cmd_list, cmd_reject,
    cmd_show, cmd_stats, cmd_trigger, cmd_watch,
};
use discovery_console::error::Result;
use discovery_console::gateway::{Filters, ListQuery};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format!("error: {e}").red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let api_url = cli.api_url.as_deref();

    match cli.command {
        Commands::List {
            page,
            size,
            filters,
            json,
        } => {
            let session = Session::open(api_url)?;
            let size = size.unwrap_or(session.config.page_size);
            let query = ListQuery::new(page, size, Filters::from(filters));
            cmd_list(&session, query, OutputOptions::new(json)).await
        }
        Commands::Show { id, json } => {
            cmd_show(&Session::open(api_url)?, id, OutputOptions::new(json)).await
        }
        Commands::Approve { id, by, json } => {
            let session = Session::open(api_url)?;
            cmd_approve(&session, id, by.as_deref(), OutputOptions::new(json)).await
        }
        Commands::Reject {
            id,
            by,
            reason,
            json,
        } => {
            let session = Session::open(api_url)?;
            cmd_reject(
                &session,
                id,
                by.as_deref(),
                reason.as_deref(),
                OutputOptions::new(json),
            )
            .await
        }
        Commands::Stats { json } => {
            cmd_stats(&Session::open(api_url)?, OutputOptions::new(json)).await
        }
        Commands::Trigger { json } => {
            cmd_trigger(&Session::open(api_url)?, OutputOptions::new(json)).await
        }
        Commands::Watch { size, filters } => {
            cmd_watch(Session::open(api_url)?, size, Filters::from(filters)).await
        }

        // Configuration commands
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => cmd_config_show(OutputOptions::new(json)),
            ConfigAction::Set { key, value } => cmd_config_set(&key, &value),
            ConfigAction::Path => cmd_config_path(),
        },
    }
}
