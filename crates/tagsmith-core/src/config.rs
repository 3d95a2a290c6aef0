use crate::error::{Result, TagsmithError};
use crate::paths;
use crate::tree::{self, ExtensionFilter, WalkOptions};
use crate::types::UpdateStrategy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Allow-listed file extensions, with the leading dot.
    #[serde(default = "default_scan_extensions")]
    pub scan_extensions: Vec<String>,
    /// Directory names never descended into.
    #[serde(default = "tree::default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    #[serde(default)]
    pub mode: UpdateStrategy,
    /// Where saved prompts go, relative to the root.
    #[serde(default = "default_data_folder")]
    pub data_folder: String,
    #[serde(default)]
    pub output_suffix: Option<String>,
    #[serde(default)]
    pub allow_overwrite: bool,
}

fn default_version() -> u32 {
    1
}

fn default_scan_extensions() -> Vec<String> {
    [".py", ".rs", ".js", ".ts", ".sql", ".txt", ".md"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_data_folder() -> String {
    paths::DATA_DIR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            scan_extensions: default_scan_extensions(),
            exclude_dirs: tree::default_exclude_dirs(),
            mode: UpdateStrategy::default(),
            data_folder: default_data_folder(),
            output_suffix: None,
            allow_overwrite: false,
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(TagsmithError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but an uninitialized root yields the defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(TagsmithError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn extension_filter(&self) -> ExtensionFilter {
        ExtensionFilter::new(&self.scan_extensions)
    }

    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions::new(self.extension_filter()).exclude_dirs(self.exclude_dirs.clone())
    }

    pub fn data_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.data_folder)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.scan_extensions.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "scan_extensions is empty; no file would ever be scanned".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for ext in &self.scan_extensions {
            if !ext.starts_with('.') {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("extension '{ext}' has no leading dot; treated as '.{ext}'"),
                });
            }
            let key = ext.trim_start_matches('.').to_lowercase();
            if !seen.insert(key) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("extension '{ext}' is listed more than once"),
                });
            }
        }

        if let Some(suffix) = &self.output_suffix {
            if suffix.contains('/') || suffix.contains('\\') {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("output_suffix '{suffix}' contains a path separator"),
                });
            }
        }

        if Path::new(&self.data_folder).is_absolute() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "data_folder '{}' is absolute; saved prompts will land outside the root",
                    self.data_folder
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.mode, UpdateStrategy::Blocks);
        assert_eq!(parsed.scan_extensions, cfg.scan_extensions);
        assert_eq!(parsed.exclude_dirs, vec![".git", ".tagsmith"]);
        assert_eq!(parsed.data_folder, ".tagsmith/data");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("mode: whole_file\noutput_suffix: \"-ai\"\n").unwrap();
        assert_eq!(cfg.mode, UpdateStrategy::WholeFile);
        assert_eq!(cfg.output_suffix.as_deref(), Some("-ai"));
        assert!(!cfg.allow_overwrite);
        assert!(cfg.extension_filter().matches(Path::new("x.rs")));
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(TagsmithError::NotInitialized)
        ));
        let cfg = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(cfg.version, 1);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.mode = UpdateStrategy::InjectionPoints;
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.mode, UpdateStrategy::InjectionPoints);
    }

    #[test]
    fn validate_default_is_clean() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_empty_extensions_is_error() {
        let mut cfg = Config::default();
        cfg.scan_extensions.clear();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
    }

    #[test]
    fn validate_extension_warnings() {
        let mut cfg = Config::default();
        cfg.scan_extensions = vec![".py".into(), "py".into(), ".rs".into()];
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.level == WarnLevel::Warning));
        assert!(warnings[0].message.contains("no leading dot"));
        assert!(warnings[1].message.contains("more than once"));
    }

    #[test]
    fn validate_suffix_separator_is_error() {
        let mut cfg = Config::default();
        cfg.output_suffix = Some("/out".into());
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Error);
    }
}
