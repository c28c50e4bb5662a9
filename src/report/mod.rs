use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use regex::Regex;
use tracing::{debug, info};

use crate::table::{to_markdown_table, FormatterSet, TableSource};
use crate::{ReportageError, Result};

pub mod compile;
pub mod figure;

pub use compile::{find_executable, pick_pdf_engine, CompileOptions, CONVERTER, PDF_ENGINES};
pub use figure::{ChartFigure, PngImage, RasterFigure, ReportFigure, VegaLiteChart};

/// Default pixel size for declarative chart export.
const CHART_SIZE: (u32, u32) = (800, 500);
/// Fixed supersampling factor for declarative chart export.
const CHART_SCALE: f64 = 2.0;

static NON_WORD: OnceLock<Regex> = OnceLock::new();
static HYPHEN_RUNS: OnceLock<Regex> = OnceLock::new();

/// Filesystem-safe slug: lowercased, runs of non-word characters collapsed to
/// a single hyphen, hyphens trimmed, `"item"` if nothing survives.
pub fn slugify(text: &str) -> String {
    let non_word = NON_WORD.get_or_init(|| Regex::new(r"[^\w\-]+").unwrap());
    let runs = HYPHEN_RUNS.get_or_init(|| Regex::new(r"-{2,}").unwrap());

    let lowered = text.trim().to_lowercase();
    let collapsed = non_word.replace_all(&lowered, "-");
    let collapsed = runs.replace_all(&collapsed, "-");
    let slug = collapsed.trim_matches('-');
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug.to_string()
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Construction options for [`Report`].
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Heading text and default output basename.
    pub title: String,
    /// Optional attribution shown in the metadata line.
    pub author: Option<String>,
    /// Creation timestamp override; `None` means now.
    pub created: Option<DateTime<Local>>,
    /// Base directory, created if absent.
    pub out_dir: PathBuf,
    /// Markdown file name inside `out_dir`.
    pub md_filename: String,
    /// Asset subdirectory name inside `out_dir`.
    pub assets_dirname: String,
    /// Emit GitHub-flavored Markdown (`--from gfm`) rather than plain Markdown.
    pub gfm: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Report".to_string(),
            author: None,
            created: None,
            out_dir: PathBuf::from("report_out"),
            md_filename: "report.md".to_string(),
            assets_dirname: "assets".to_string(),
            gfm: true,
        }
    }
}

/// Options for [`Report::add_table_with`].
pub struct TableOptions {
    /// Left-align the first column (`:--`); all other columns are right-aligned.
    pub align_first_left: bool,
    pub formatters: FormatterSet,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            align_first_left: true,
            formatters: FormatterSet::new(),
        }
    }
}

/// Options for [`Report::add_image`].
#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    /// Caption paragraph appended after the embed.
    pub caption: Option<String>,
    /// Width attribute, e.g. `80%` or `400px`.
    pub width: Option<String>,
}

/// Options for [`Report::add_plot`].
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub caption: Option<String>,
    pub width: Option<String>,
    /// Raster resolution in dots per inch.
    pub dpi: u32,
    /// Pixel size for declarative chart export; defaults to 800x500.
    pub size: Option<(u32, u32)>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            caption: None,
            width: None,
            dpi: 150,
            size: None,
        }
    }
}

/// An ordered Markdown document under assembly.
///
/// Construction creates the output directory layout and seeds the part list
/// with a title heading and a metadata line; parts are immutable once
/// appended. Figure numbers only ever increase.
#[derive(Debug)]
pub struct Report {
    title: String,
    author: Option<String>,
    created: DateTime<Local>,
    out_dir: PathBuf,
    assets_dir: PathBuf,
    md_filename: String,
    assets_dirname: String,
    gfm: bool,
    parts: Vec<String>,
    figure_counter: usize,
}

impl Report {
    /// Create a report, its output directory, and its assets subdirectory.
    pub fn new(options: ReportOptions) -> Result<Self> {
        let out_dir = options.out_dir;
        let assets_dir = out_dir.join(&options.assets_dirname);
        ensure_dir(&out_dir)?;
        ensure_dir(&assets_dir)?;

        let mut report = Self {
            title: options.title,
            author: options.author,
            created: options.created.unwrap_or_else(Local::now),
            out_dir,
            assets_dir,
            md_filename: options.md_filename,
            assets_dirname: options.assets_dirname,
            gfm: options.gfm,
            parts: Vec::new(),
            figure_counter: 0,
        };

        let title = report.title.clone();
        report.add_heading(&title, 1);
        let mut meta = format!("Generated: {}", report.created.format("%Y-%m-%d %H:%M"));
        if let Some(author) = &report.author {
            meta.push_str(&format!(" | Author: {}", author));
        }
        report.add_paragraph(&meta);

        Ok(report)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn created(&self) -> DateTime<Local> {
        self.created
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub(crate) fn gfm(&self) -> bool {
        self.gfm
    }

    /// The parts appended so far, in insertion order.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Path of the Markdown file this report persists to.
    pub fn md_path(&self) -> PathBuf {
        self.out_dir.join(&self.md_filename)
    }

    /// Append an ATX heading; the level is clamped to 1..=6.
    pub fn add_heading(&mut self, text: &str, level: usize) -> &mut Self {
        let level = level.clamp(1, 6);
        self.parts.push(format!("{} {}", "#".repeat(level), text));
        self
    }

    /// Append a paragraph verbatim.
    pub fn add_paragraph(&mut self, text: &str) -> &mut Self {
        self.parts.push(text.to_string());
        self
    }

    /// Append raw Markdown, right-trimmed.
    pub fn add_markdown(&mut self, md: &str) -> &mut Self {
        self.parts.push(md.trim_end().to_string());
        self
    }

    /// Append a named table: a level-3 heading followed by the rendered
    /// Markdown table with default options.
    pub fn add_table(&mut self, name: &str, table: &dyn TableSource) -> &mut Self {
        self.add_table_with(name, table, &TableOptions::default())
    }

    /// Append a named table with explicit alignment and formatter rules.
    pub fn add_table_with(
        &mut self,
        name: &str,
        table: &dyn TableSource,
        options: &TableOptions,
    ) -> &mut Self {
        let rendered = to_markdown_table(table, options.align_first_left, &options.formatters);
        self.add_heading(name, 3);
        self.add_markdown(&rendered);
        self
    }

    /// Embed an existing image file, copying it into the assets directory.
    ///
    /// The asset name is the slugified file stem plus the original extension;
    /// the copy is skipped when source and destination resolve to the same
    /// file. Fails with [`ReportageError::NotFound`] if the source is absent.
    pub fn add_image<P: AsRef<Path>>(
        &mut self,
        image_path: P,
        options: &ImageOptions,
    ) -> Result<&mut Self> {
        let image_path = image_path.as_ref();
        if !image_path.exists() {
            return Err(ReportageError::NotFound(image_path.to_path_buf()));
        }

        let stem = image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let safe_name = match image_path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", slugify(stem), ext.to_lowercase()),
            None => slugify(stem),
        };
        let dest = self.assets_dir.join(&safe_name);

        let same_file = match (fs::canonicalize(image_path), fs::canonicalize(&dest)) {
            (Ok(src), Ok(dst)) => src == dst,
            _ => false,
        };
        if !same_file {
            fs::copy(image_path, &dest)?;
            debug!(file = %dest.display(), "copied asset");
        }

        let mut part = format!(
            "![{}]({}/{}){}",
            stem,
            self.assets_dirname,
            safe_name,
            width_attr(options.width.as_deref())
        );
        if let Some(caption) = &options.caption {
            part.push_str(&format!("\n\n{}", caption));
        }
        self.parts.push(part);
        Ok(self)
    }

    /// Rasterize a figure into the assets directory and embed it.
    ///
    /// Capability dispatch happens once per call: the raster path is tried
    /// first (at `options.dpi`), then declarative chart export (at
    /// `options.size`, fixed 2x scale). A figure with neither capability
    /// fails with [`ReportageError::UnsupportedFigureType`].
    pub fn add_plot(
        &mut self,
        figure: &dyn ReportFigure,
        options: &PlotOptions,
    ) -> Result<&mut Self> {
        self.figure_counter += 1;
        let filename = format!("figure-{:03}.png", self.figure_counter);
        let out_path = self.assets_dir.join(&filename);

        if let Some(raster) = figure.as_raster() {
            raster.save_png(&out_path, options.dpi)?;
        } else if let Some(chart) = figure.as_chart() {
            let (width, height) = options.size.unwrap_or(CHART_SIZE);
            let png = chart.export_png(width, height, CHART_SCALE)?;
            fs::write(&out_path, png)?;
        } else {
            return Err(ReportageError::UnsupportedFigureType);
        }
        debug!(file = %out_path.display(), "rendered figure");

        let mut part = format!(
            "![Figure {}]({}/{}){}",
            self.figure_counter,
            self.assets_dirname,
            filename,
            width_attr(options.width.as_deref())
        );
        if let Some(caption) = &options.caption {
            part.push_str(&format!("\n\n{}", caption));
        }
        self.parts.push(part);
        Ok(self)
    }

    /// Serialize all parts, right-trimmed, with one blank line between
    /// consecutive parts.
    pub fn to_markdown(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.trim_end())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Write the serialized document (with a trailing newline) to
    /// `out_dir/md_filename` and return the path.
    pub fn save_markdown(&self) -> Result<PathBuf> {
        let path = self.md_path();
        fs::write(&path, format!("{}\n", self.to_markdown()))?;
        info!(file = %path.display(), "wrote markdown");
        Ok(path)
    }
}

fn width_attr(width: Option<&str>) -> String {
    match width {
        // Pandoc attribute syntax
        Some(w) => format!("{{ width=\"{}\" }}", w),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basics() {
        assert_eq!(slugify("My Chart (v2)"), "my-chart-v2");
        assert_eq!(slugify("  Spaced  Out  "), "spaced-out");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn slugify_is_idempotent() {
        let once = slugify("Quarterly Revenue: 2024!");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn slugify_empty_falls_back() {
        assert_eq!(slugify(""), "item");
        assert_eq!(slugify("!!!"), "item");
        assert_eq!(slugify("---"), "item");
    }

    #[test]
    fn heading_level_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = Report::new(ReportOptions {
            out_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();

        report.add_heading("Deep", 9).add_heading("Shallow", 0);
        let parts = report.parts();
        assert_eq!(parts[parts.len() - 2], "###### Deep");
        assert_eq!(parts[parts.len() - 1], "# Shallow");
    }

    #[test]
    fn width_attr_uses_pandoc_syntax() {
        assert_eq!(width_attr(Some("80%")), "{ width=\"80%\" }");
        assert_eq!(width_attr(None), "");
    }
}
