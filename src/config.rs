use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::report::ReportOptions;
use crate::{ReportageError, Result};

/// TOML description of a report, consumed by `reportage build`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub title: String,
    pub author: Option<String>,
    /// Base output directory; defaults to `report_out`.
    pub out_dir: Option<PathBuf>,
    /// Markdown file name; defaults to `report.md`.
    pub md_filename: Option<String>,
    /// Asset subdirectory name; defaults to `assets`.
    pub assets_dirname: Option<String>,
    #[serde(default)]
    pub section: Vec<Section>,
}

/// One report part in manifest order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Heading {
        text: String,
        #[serde(default = "default_heading_level")]
        level: usize,
    },
    Paragraph {
        text: String,
    },
    Markdown {
        text: String,
    },
    Table {
        name: String,
        /// CSV file, relative to the manifest.
        csv: PathBuf,
        #[serde(default = "default_true")]
        align_first_left: bool,
        /// Built-in formatter name per column (`percent`, `percent100`,
        /// `round`, `round_int`).
        #[serde(default)]
        formatters: HashMap<String, String>,
    },
    Image {
        /// Image file, relative to the manifest.
        path: PathBuf,
        caption: Option<String>,
        width: Option<String>,
    },
}

fn default_heading_level() -> usize {
    2
}

fn default_true() -> bool {
    true
}

impl Manifest {
    /// Report construction options described by this manifest.
    pub fn report_options(&self) -> ReportOptions {
        let defaults = ReportOptions::default();
        ReportOptions {
            title: self.title.clone(),
            author: self.author.clone(),
            created: None,
            out_dir: self.out_dir.clone().unwrap_or(defaults.out_dir),
            md_filename: self.md_filename.clone().unwrap_or(defaults.md_filename),
            assets_dirname: self
                .assets_dirname
                .clone()
                .unwrap_or(defaults.assets_dirname),
            gfm: defaults.gfm,
        }
    }
}

pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents)
        .map_err(|e| ReportageError::Config(format!("failed to parse manifest: {}", e)))
}
