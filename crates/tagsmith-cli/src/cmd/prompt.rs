use crate::output::print_json;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tagsmith_core::{io, paths, prompt};

pub fn run(
    root: &Path,
    template: &Path,
    out: Option<&Path>,
    save: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let text = super::read_input(template)?;
    let scan = super::scan_root(root, &config)?;
    let assembled = prompt::assemble(&text, root, &scan).context("failed to assemble prompt")?;

    let saved = if save {
        let name = saved_name(template);
        let path = config.data_dir(root).join(&name);
        io::atomic_write(&path, assembled.as_bytes())
            .with_context(|| format!("failed to save {}", path.display()))?;
        tracing::info!(file = %path.display(), "saved prompt copy");
        Some(path)
    } else {
        None
    };

    if let Some(out) = out {
        io::atomic_write(out, assembled.as_bytes())
            .with_context(|| format!("failed to write {}", out.display()))?;
    }

    if json {
        let value = serde_json::json!({
            "prompt": assembled,
            "out": out.map(|p| p.display().to_string()),
            "saved": saved.as_ref().map(|p| paths::relative_path(root, p)),
        });
        return print_json(&value);
    }

    match out {
        Some(out) => println!("Wrote prompt to {}", out.display()),
        None => print!("{assembled}"),
    }
    if let Some(path) = saved {
        eprintln!("Saved copy: {}", path.display());
    }
    Ok(())
}

/// `<timestamp>--<template stem>.md`, so saved prompts sort by time.
fn saved_name(template: &Path) -> PathBuf {
    let stem = template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "prompt".to_string());
    let ts = chrono::Local::now().format("%Y-%m-%d--%H-%M-%S");
    PathBuf::from(format!("{ts}--{stem}.md"))
}
