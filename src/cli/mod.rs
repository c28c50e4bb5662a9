pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "reportage",
    version,
    about = "Markdown report assembly and document conversion",
    long_about = "Reportage assembles Markdown reports from text, tables, and figures, \
                  and compiles them to PDF, DOCX, or HTML through Pandoc."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble a report from a TOML manifest
    Build(commands::build::BuildArgs),

    /// Show the converter and PDF engines found on PATH
    Engines,
}
