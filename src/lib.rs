pub mod cli;
pub mod config;
pub mod report;
pub mod table;

pub use crate::report::{
    CompileOptions, ImageOptions, PlotOptions, Report, ReportOptions, TableOptions,
};
pub use crate::table::{ColumnType, DataTable, TableSource, Value};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image not found: {0}")]
    NotFound(PathBuf),

    #[error("unsupported table input: {0}")]
    UnsupportedInput(String),

    #[error("unsupported figure type: provide a raster figure or a declarative chart")]
    UnsupportedFigureType,

    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("{0} is not installed or not on PATH")]
    ExternalToolMissing(String),

    #[error("no PDF engine found; install one of: wkhtmltopdf, weasyprint, xelatex, pdflatex")]
    NoEngineFound,

    #[error("{tool} failed with exit status {status}")]
    ExternalToolFailed { tool: String, status: i32 },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ReportageError>;
