//! SmartCrop CLI - crop recommendations from the terminal
//!
//! Live-weather refreshes, manual analysis, crop search, the AI advisor and
//! account history on top of `smartcrop-core`.

mod auth;
mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::analyze::{run_analyze, AnalyzeRequest};
use crate::commands::ask::run_ask;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::AppContext;
use crate::commands::history::run_history;
use crate::commands::prefs::run_prefs;
use crate::commands::profile::run_profile;
use crate::commands::refresh::run_refresh;
use crate::commands::search::run_search;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let context = AppContext::load(cli.db_path)?;

    match cli.command {
        Commands::Refresh { soil, json } => {
            run_refresh(&context, soil.map(Into::into), json).await?;
        }
        Commands::Analyze {
            season,
            soil,
            temperature,
            rainfall,
            save,
            json,
        } => {
            let request = AnalyzeRequest {
                season: season.into(),
                soil: soil.into(),
                temperature: &temperature,
                rainfall: &rainfall,
                save,
                as_json: json,
            };
            run_analyze(&context, request).await?;
        }
        Commands::Search {
            query,
            interactive,
            json,
        } => run_search(&context, query.as_deref(), interactive, json).await?,
        Commands::Ask {
            question,
            prompt,
            list_prompts,
        } => run_ask(&context, &question, prompt, list_prompts).await?,
        Commands::History { command } => run_history(&context, command).await?,
        Commands::Profile { command } => run_profile(&context, command).await?,
        Commands::Prefs { command } => run_prefs(&context, command).await?,
        Commands::Sync => run_sync(&context).await?,
        Commands::Auth { command } => run_auth(&context, command).await?,
    }

    Ok(())
}

fn log_filter() -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match "smartcrop=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}
