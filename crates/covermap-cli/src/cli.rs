//! CLI argument definitions using clap
//!
//! The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Covermap - See where your insurance coverage falls short
#[derive(Parser)]
#[command(name = "covermap")]
#[command(about = "Self-hosted insurance risk assessment", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "covermap.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set COVERMAP_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Owner of the questionnaires (matches the server's identity for local use)
    #[arg(long, default_value = "local-dev", global = true)]
    pub owner: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start a new questionnaire
    New,

    /// Record an answer (value is read as JSON, falling back to plain text)
    Answer {
        /// Questionnaire ID
        id: i64,

        /// Question key (e.g., income, province, has_vehicle)
        key: String,

        /// Answer value (e.g., 90000, true, QC)
        value: String,
    },

    /// Show a questionnaire and its answers
    Show {
        /// Questionnaire ID
        id: i64,
    },

    /// List questionnaires
    List,

    /// Complete a questionnaire and print its risk report
    Assess {
        /// Questionnaire ID
        id: i64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Skip generated advice
        #[arg(long)]
        no_advice: bool,
    },

    /// Evaluate a JSON answers file without storing it
    Evaluate {
        /// JSON file holding an object of answers
        #[arg(short, long)]
        file: PathBuf,

        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        #[arg(long)]
        no_auth: bool,

        /// Directory with the questionnaire front end
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}
