//! CLI command definitions
//!
//! Defines the clap commands for the e2e harness.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the end-to-end scenario against a live API
    Run {
        /// Base URL of the API (overrides the config file)
        #[arg(long)]
        base_url: Option<String>,

        /// Per-request timeout in seconds (overrides the config file)
        #[arg(long)]
        timeout: Option<u64>,

        /// Config file to use instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only run steps whose name contains this text (case-insensitive).
        /// Steps that produce tokens or ids always run.
        #[arg(long)]
        only: Option<String>,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the scenario steps and their dependencies
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
