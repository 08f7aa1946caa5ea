// src/main.rs
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use regionprops_table::batch::process_batch;
use regionprops_table::cli::{error_message, exit_status, Cli, Commands};
use regionprops_table::processing::{run_job, Property};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_message(&err));
            ExitCode::from(exit_status(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Measure(args) => {
            run_job(&args.to_job())?;
        }
        Commands::Batch { config } => {
            process_batch(config)?;
        }
        Commands::Properties => {
            for property in Property::ALL {
                println!("{property}");
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
