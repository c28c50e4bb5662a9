use clap::Parser;
use colored::*;
use reportage::cli::{Cli, Commands};
use reportage::ReportageError;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Logging with REPORTAGE_LOG environment variable support; -v/-vv raise
    // the default level.
    let log_level = std::env::var("REPORTAGE_LOG").unwrap_or_else(|_| {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .to_string()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        // Use appropriate exit codes based on error type
        let exit_code = match e.downcast_ref::<ReportageError>() {
            Some(ReportageError::Config(_)) => 2,
            Some(ReportageError::Io(_)) => 3,
            Some(ReportageError::NotFound(_))
            | Some(ReportageError::UnsupportedInput(_))
            | Some(ReportageError::UnsupportedFigureType) => 4,
            Some(ReportageError::MissingDependency(_))
            | Some(ReportageError::ExternalToolMissing(_))
            | Some(ReportageError::NoEngineFound)
            | Some(ReportageError::ExternalToolFailed { .. }) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build(args) => reportage::cli::commands::build::run(args),
        Commands::Engines => reportage::cli::commands::engines::run(),
    }
}
