//! scriptheal CLI library.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

/// Parse args, set up tracing and dispatch to the command handlers.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    scriptheal_core::observability::init_tracing();

    match cli.command {
        Commands::Evaluate {
            script_type,
            work_dir,
            args,
            timeout,
        } => {
            let output = commands::evaluate::run_evaluate(&script_type, &work_dir, &args, timeout)?;
            println!("{}", output);
        }
        Commands::Classify { input } => {
            let output = commands::classify::run_classify(&input)?;
            println!("{}", output);
        }
    }

    Ok(())
}
