pub mod apply;
pub mod config;
pub mod init;
pub mod parse;
pub mod prompt;
pub mod scan;

use anyhow::Context;
use std::path::Path;
use tagsmith_core::config::Config;
use tagsmith_core::response;
use tagsmith_core::scanner::{self, ScanResult};
use tagsmith_core::types::UpdateStrategy;

/// Read a text file named on the command line.
pub(crate) fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load_or_default(root).context("failed to load config")
}

pub(crate) fn scan_root(root: &Path, config: &Config) -> anyhow::Result<ScanResult> {
    scanner::scan(root, &config.walk_options())
        .with_context(|| format!("failed to scan {}", root.display()))
}

/// Point at `--mode` when a response carries another strategy's tags.
pub(crate) fn hint_other_mode(text: &str, mode: UpdateStrategy) {
    if let Some(found) = response::detect_strategy(text).filter(|s| *s != mode) {
        eprintln!("hint: the response uses {found} tags; try --mode {found}");
    }
}
