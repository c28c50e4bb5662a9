use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::{slugify, Report};
use crate::{ReportageError, Result};

/// The external document converter invoked for compilation.
pub const CONVERTER: &str = "pandoc";

/// PDF engines probed in order; engines that work without a TeX install come
/// first.
pub const PDF_ENGINES: [&str; 4] = ["wkhtmltopdf", "weasyprint", "xelatex", "pdflatex"];

/// Options for [`Report::compile`].
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Explicit destination path; its extension decides the format.
    pub output: Option<PathBuf>,
    /// Target format (`pdf`, `docx`, `html`); `pdf` when neither this nor an
    /// output extension is given.
    pub to: Option<String>,
    /// Explicit PDF engine, skipping the probe.
    pub pdf_engine: Option<String>,
    /// Passthrough arguments appended verbatim to the converter command.
    pub extra_args: Vec<String>,
    /// Open the artifact with the platform handler after compiling.
    pub open_after: bool,
    /// Print the constructed command instead of running it.
    pub print_command_only: bool,
    /// Drive-letter mount prefix for WSL-style path translation (e.g. `mnt`);
    /// implies print-command-only mode.
    pub wsl_mount: Option<String>,
}

/// Look up an executable on PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{}.exe", name));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

/// First PDF engine from [`PDF_ENGINES`] present on PATH.
pub fn pick_pdf_engine() -> Option<String> {
    PDF_ENGINES
        .iter()
        .find(|engine| find_executable(engine).is_some())
        .map(|engine| engine.to_string())
}

/// Remap a Windows drive-letter path onto a mount prefix, so a command built
/// on Windows can be pasted into WSL: `C:\work\r.md` + `mnt` ->
/// `/mnt/c/work/r.md`. Paths without a drive prefix pass through with
/// separators normalized.
pub fn translate_path(path: &Path, mount: &str) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        let drive = (bytes[0] as char).to_ascii_lowercase();
        format!("/{}/{}{}", mount, drive, &s[2..])
    } else {
        s
    }
}

fn path_arg(path: &Path, mount: Option<&str>) -> String {
    match mount {
        Some(m) => {
            let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
            translate_path(&abs, m)
        }
        None => path.display().to_string(),
    }
}

impl Report {
    /// Construct the converter argument vector and the resolved output path
    /// without saving or running anything.
    ///
    /// In dry-run mode (print-command-only or a WSL mount) a missing PDF
    /// engine is tolerated and the `--pdf-engine` flag is simply omitted;
    /// otherwise it fails with [`ReportageError::NoEngineFound`].
    pub fn compile_command(&self, options: &CompileOptions) -> Result<(Vec<String>, PathBuf)> {
        let dry_run = options.print_command_only || options.wsl_mount.is_some();
        let mount = options.wsl_mount.as_deref();

        // Output path's extension wins; otherwise `to` decides it, defaulting
        // to pdf.
        let mut output = match &options.output {
            Some(path) => path.clone(),
            None => {
                let base = slugify(self.title());
                let ext = options
                    .to
                    .as_deref()
                    .map(str::to_lowercase)
                    .unwrap_or_else(|| "pdf".to_string());
                self.out_dir().join(format!("{}.{}", base, ext))
            }
        };
        let to = match &options.to {
            None => output
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase(),
            Some(t) => {
                let t = t.to_lowercase();
                let current = output
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase);
                if current.as_deref() != Some(t.as_str()) {
                    output.set_extension(&t);
                }
                t
            }
        };

        let src_format = if self.gfm() { "gfm" } else { "markdown" };
        let mut cmd: Vec<String> = vec![
            CONVERTER.to_string(),
            "-s".to_string(),
            "--from".to_string(),
            src_format.to_string(),
            path_arg(&self.md_path(), mount),
            "-o".to_string(),
            path_arg(&output, mount),
            "--resource-path".to_string(),
            path_arg(self.assets_dir(), mount),
            "-M".to_string(),
            format!("title={}", self.title()),
            "-M".to_string(),
            format!("author={}", self.author().unwrap_or("")),
            "-M".to_string(),
            format!("date={}", self.created().format("%Y-%m-%d %H:%M")),
        ];

        if to == "pdf" {
            let engine = options.pdf_engine.clone().or_else(pick_pdf_engine);
            match engine {
                Some(engine) => {
                    cmd.push("--pdf-engine".to_string());
                    cmd.push(engine);
                }
                None if dry_run => {}
                None => return Err(ReportageError::NoEngineFound),
            }
        }

        cmd.extend(options.extra_args.iter().cloned());
        Ok((cmd, output))
    }

    /// Save the Markdown and compile it with the external converter.
    ///
    /// In dry-run mode the command is printed and the resolved output path
    /// returned without invoking the converter. In execute mode a missing
    /// converter fails with [`ReportageError::ExternalToolMissing`], a
    /// nonzero exit with [`ReportageError::ExternalToolFailed`], and
    /// `open_after` then best-effort opens the artifact.
    pub fn compile(&self, options: &CompileOptions) -> Result<PathBuf> {
        let dry_run = options.print_command_only || options.wsl_mount.is_some();
        if !dry_run && find_executable(CONVERTER).is_none() {
            return Err(ReportageError::ExternalToolMissing(CONVERTER.to_string()));
        }

        self.save_markdown()?;
        let (cmd, output) = self.compile_command(options)?;

        if dry_run {
            println!("{}", cmd.join(" "));
            return Ok(output);
        }

        info!(command = %cmd.join(" "), "running converter");
        let status = Command::new(&cmd[0]).args(&cmd[1..]).status()?;
        if !status.success() {
            return Err(ReportageError::ExternalToolFailed {
                tool: CONVERTER.to_string(),
                status: status.code().unwrap_or(-1),
            });
        }

        if options.open_after {
            open_artifact(&output);
        }
        Ok(output)
    }
}

/// Open a file with the platform's default handler; failures are logged and
/// swallowed.
fn open_artifact(path: &Path) {
    let spawned = if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(path).spawn()
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(path).spawn()
    } else {
        Command::new("xdg-open").arg(path).spawn()
    };
    if let Err(e) = spawned {
        debug!(error = %e, "could not open compiled document");
    }
}
