//! PipeRAG E2E - end-to-end conformance harness for the PipeRAG HTTP API
//!
//! Drives a scripted user journey (register, login, projects, pipelines,
//! uploads, chat, widget, billing) against a running API and reports which
//! calls answered with the expected status.

use clap::Parser;
use piperag_e2e::{cli, commands, common};
use commands::Commands;

#[derive(Parser)]
#[command(name = "piperag-e2e", about = "End-to-end conformance harness for the PipeRAG API")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    common::logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
