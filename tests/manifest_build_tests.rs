use std::fs;

use reportage::cli::commands::build::{run, BuildArgs};
use tempfile::tempdir;

#[test]
fn build_assembles_report_from_manifest() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");

    fs::write(
        dir.path().join("totals.csv"),
        "category,count,share\nalpha,1000000,0.25\nbeta,3000000,0.75\n",
    )
    .unwrap();

    let manifest_path = dir.path().join("report.toml");
    fs::write(
        &manifest_path,
        format!(
            r#"
            title = "Weekly Numbers"
            author = "Ops"
            out_dir = "{}"

            [[section]]
            kind = "heading"
            text = "Overview"

            [[section]]
            kind = "paragraph"
            text = "All systems nominal."

            [[section]]
            kind = "table"
            name = "Totals"
            csv = "totals.csv"
            formatters = {{ share = "percent100" }}
            "#,
            out_dir.display()
        ),
    )
    .unwrap();

    run(BuildArgs {
        manifest: manifest_path,
        to: None,
        output: None,
        pdf_engine: None,
        extra_args: Vec::new(),
        dry_run: false,
        open: false,
    })
    .unwrap();

    let content = fs::read_to_string(out_dir.join("report.md")).unwrap();
    assert!(content.starts_with("# Weekly Numbers\n"));
    assert!(content.contains("Generated: "));
    assert!(content.contains(" | Author: Ops"));
    assert!(content.contains("## Overview"));
    assert!(content.contains("All systems nominal."));
    assert!(content.contains("### Totals"));
    assert!(content.contains("| category | count | share |"));
    assert!(content.contains("| alpha | 1,000,000 | 25.00% |"));
    assert!(content.contains("| beta | 3,000,000 | 75.00% |"));
}

#[test]
fn build_dry_run_needs_no_converter() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");

    let manifest_path = dir.path().join("report.toml");
    fs::write(
        &manifest_path,
        format!(
            r#"
            title = "Dry Run"
            out_dir = "{}"

            [[section]]
            kind = "paragraph"
            text = "Nothing to compile yet."
            "#,
            out_dir.display()
        ),
    )
    .unwrap();

    run(BuildArgs {
        manifest: manifest_path,
        to: Some("html".to_string()),
        output: None,
        pdf_engine: None,
        extra_args: Vec::new(),
        dry_run: true,
        open: false,
    })
    .unwrap();

    assert!(out_dir.join("report.md").is_file());
    assert!(!out_dir.join("dry-run.html").exists());
}

#[test]
fn build_rejects_unknown_formatter() {
    let dir = tempdir().unwrap();

    fs::write(dir.path().join("data.csv"), "a\n1\n").unwrap();
    let manifest_path = dir.path().join("report.toml");
    fs::write(
        &manifest_path,
        format!(
            r#"
            title = "Broken"
            out_dir = "{}"

            [[section]]
            kind = "table"
            name = "Data"
            csv = "data.csv"
            formatters = {{ a = "exponential" }}
            "#,
            dir.path().join("out").display()
        ),
    )
    .unwrap();

    let err = run(BuildArgs {
        manifest: manifest_path,
        to: None,
        output: None,
        pdf_engine: None,
        extra_args: Vec::new(),
        dry_run: false,
        open: false,
    })
    .unwrap_err();

    let err = err.downcast::<reportage::ReportageError>().unwrap();
    assert!(matches!(err, reportage::ReportageError::Config(_)));
}
