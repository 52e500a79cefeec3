//! Covermap CLI - Insurance risk assessment
//!
//! Usage:
//!   covermap init                      Initialize database
//!   covermap new                       Start a questionnaire
//!   covermap answer 1 income 90000     Record an answer
//!   covermap assess 1                  Evaluate and print the report
//!   covermap evaluate --file a.json    Evaluate an answers file without storing it
//!   covermap serve --port 3000         Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::New => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_new(&db, &cli.owner).map(|_| ())
        }
        Commands::Answer { id, key, value } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_answer(&db, &cli.owner, id, &key, &value)
        }
        Commands::Show { id } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_show(&db, &cli.owner, id)
        }
        Commands::List => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_list(&db, &cli.owner)
        }
        Commands::Assess {
            id,
            json,
            no_advice,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let ai = covermap_core::AIClient::from_env();
            commands::cmd_assess(&db, ai.as_ref(), &cli.owner, id, json, no_advice)
                .await
                .map(|_| ())
        }
        Commands::Evaluate { file, json } => commands::cmd_evaluate(&file, json).map(|_| ()),
        Commands::Audit { limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_audit(&db, limit)
        }
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                static_dir.as_deref(),
                cli.no_encrypt,
            )
            .await
        }
    }
}
