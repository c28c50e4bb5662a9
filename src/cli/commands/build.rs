use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use colored::*;

use crate::config::{load_manifest, Section};
use crate::report::{CompileOptions, ImageOptions, Report, TableOptions};
use crate::table::{DataTable, Formatter, FormatterSet};
use crate::ReportageError;

#[derive(Args)]
pub struct BuildArgs {
    /// Report manifest (TOML)
    pub manifest: PathBuf,

    /// Compile to this format after assembly (pdf, docx, html)
    #[arg(long)]
    pub to: Option<String>,

    /// Explicit output path for the compiled document
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// PDF engine to use instead of probing PATH
    #[arg(long)]
    pub pdf_engine: Option<String>,

    /// Extra argument passed through to the converter (repeatable)
    #[arg(long = "extra-arg")]
    pub extra_args: Vec<String>,

    /// Print the converter command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Open the compiled document when done
    #[arg(long)]
    pub open: bool,
}

pub fn run(args: BuildArgs) -> Result<()> {
    let manifest = load_manifest(&args.manifest)?;
    let manifest_dir = args
        .manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let mut report = Report::new(manifest.report_options())?;

    for section in &manifest.section {
        match section {
            Section::Heading { text, level } => {
                report.add_heading(text, *level);
            }
            Section::Paragraph { text } => {
                report.add_paragraph(text);
            }
            Section::Markdown { text } => {
                report.add_markdown(text);
            }
            Section::Table {
                name,
                csv,
                align_first_left,
                formatters,
            } => {
                let table = DataTable::from_csv_path(manifest_dir.join(csv))?;
                let mut set = FormatterSet::new();
                for (column, formatter) in formatters {
                    let resolved = Formatter::from_name(formatter).ok_or_else(|| {
                        ReportageError::Config(format!(
                            "unknown formatter '{}' for column '{}'",
                            formatter, column
                        ))
                    })?;
                    set = set.column(column.clone(), resolved);
                }
                report.add_table_with(
                    name,
                    &table,
                    &TableOptions {
                        align_first_left: *align_first_left,
                        formatters: set,
                    },
                );
            }
            Section::Image {
                path,
                caption,
                width,
            } => {
                report.add_image(
                    manifest_dir.join(path),
                    &ImageOptions {
                        caption: caption.clone(),
                        width: width.clone(),
                    },
                )?;
            }
        }
    }

    let md_path = report.save_markdown()?;
    println!(
        "{} {}",
        "✓".green().bold(),
        format!("wrote {}", md_path.display())
    );

    if args.to.is_some() || args.output.is_some() || args.dry_run {
        let options = CompileOptions {
            output: args.output,
            to: args.to,
            pdf_engine: args.pdf_engine,
            extra_args: args.extra_args,
            open_after: args.open,
            print_command_only: args.dry_run,
            wsl_mount: None,
        };
        let artifact = report.compile(&options)?;
        if !args.dry_run {
            println!(
                "{} {}",
                "✓".green().bold(),
                format!("compiled {}", artifact.display())
            );
        }
    }

    Ok(())
}
