use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use tagsmith_core::mutate::MutationRun;
use tagsmith_core::response::{summarize, ResponseParser};
use tagsmith_core::types::{ApplyReport, UpdateStrategy};

/// Command-line overrides for the config file.
pub struct ApplyArgs {
    pub mode: Option<UpdateStrategy>,
    pub suffix: Option<String>,
    pub allow_overwrite: bool,
}

pub fn run(root: &Path, response: &Path, args: ApplyArgs, json: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let mode = args.mode.unwrap_or(config.mode);
    let suffix = args.suffix.or_else(|| config.output_suffix.clone());
    let allow_overwrite = args.allow_overwrite || config.allow_overwrite;
    if suffix.as_deref().is_some_and(|s| s.contains(['/', '\\'])) {
        anyhow::bail!("output suffix must not contain a path separator");
    }

    let text = super::read_input(response)?;
    let scan = super::scan_root(root, &config)?;
    let instructions = ResponseParser::new(mode, &scan.inventory)
        .allow_overwrite(allow_overwrite)
        .parse(&text)
        .with_context(|| format!("failed to parse {}", response.display()))?;
    if instructions.is_empty() {
        super::hint_other_mode(&text, mode);
    }

    let report = MutationRun::new(root, mode, instructions, config.extension_filter())
        .exclude_dirs(config.exclude_dirs.clone())
        .output_suffix(suffix)
        .allow_overwrite(allow_overwrite)
        .execute()
        .context("failed to apply edits")?;

    if json {
        let value = serde_json::json!({
            "mode": mode,
            "report": report,
        });
        print_json(&value)?;
    } else {
        println!("{}", summarize(&text));
        println!();
        print_report(&report);
    }

    if !report.is_clean() {
        anyhow::bail!("{} file(s) could not be updated", report.failures.len());
    }
    Ok(())
}

fn print_report(report: &ApplyReport) {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for m in &report.modified {
        let detail = if m.written_to != m.relative_path {
            format!("-> {}", m.written_to)
        } else {
            String::new()
        };
        let what = if m.blocks.is_empty() {
            "whole file".to_string()
        } else {
            m.blocks.join(", ")
        };
        rows.push(vec![
            "updated".to_string(),
            m.relative_path.clone(),
            format!("{what} {detail}").trim_end().to_string(),
        ]);
    }
    for c in &report.created {
        rows.push(vec!["created".to_string(), c.clone(), String::new()]);
    }
    for s in &report.skipped {
        rows.push(vec!["skipped".to_string(), s.clone(), "matched nothing".to_string()]);
    }
    for f in &report.failures {
        rows.push(vec!["failed".to_string(), f.relative_path.clone(), f.error.clone()]);
    }

    if rows.is_empty() {
        println!("Nothing to change.");
    } else {
        print_table(&["STATUS", "TARGET", "DETAIL"], rows);
    }
}
