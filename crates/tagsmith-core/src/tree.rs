use crate::error::{Result, TagsmithError};
use crate::paths;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// ---------------------------------------------------------------------------
// ExtensionFilter
// ---------------------------------------------------------------------------

/// Allow-list of file extensions, stored lowercase with a leading dot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    exts: BTreeSet<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exts = exts
            .into_iter()
            .map(|e| normalize_ext(e.as_ref()))
            .filter(|e| e.len() > 1)
            .collect();
        Self { exts }
    }

    /// Parse a comma separated list such as `".py, .rs,js"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.exts.is_empty()
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.exts.contains(&format!(".{}", e.to_lowercase())))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.exts.iter().map(String::as_str)
    }
}

fn normalize_ext(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub extensions: ExtensionFilter,
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,
}

impl WalkOptions {
    pub fn new(extensions: ExtensionFilter) -> Self {
        Self {
            extensions,
            exclude_dirs: default_exclude_dirs(),
        }
    }

    pub fn exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.exclude_dirs = dirs;
        self
    }
}

pub fn default_exclude_dirs() -> Vec<String> {
    vec![".git".to_string(), paths::TAGSMITH_DIR.to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    /// Relative path in inventory form (`/pkg/a.py`).
    pub rel: String,
    pub path: PathBuf,
}

/// Everything a walk visited, in visit order.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub folders: Vec<String>,
    pub files: Vec<TreeFile>,
}

/// Walk `root` depth-first with entries sorted by name.
///
/// The root is recorded as the `""` folder. Unreadable entries below the root
/// are logged and skipped; a missing root is an error.
pub fn walk(root: &Path, opts: &WalkOptions) -> Result<Tree> {
    if !root.is_dir() {
        return Err(TagsmithError::RootNotFound(root.to_path_buf()));
    }

    let mut tree = Tree::default();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !opts
                    .exclude_dirs
                    .iter()
                    .any(|d| e.file_name().to_str() == Some(d.as_str()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let rel = paths::relative_path(root, entry.path());
        if entry.file_type().is_dir() {
            tree.folders.push(rel);
        } else if entry.file_type().is_file() && opts.extensions.matches(entry.path()) {
            tree.files.push(TreeFile {
                rel,
                path: entry.into_path(),
            });
        }
    }

    Ok(tree)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x\n").unwrap();
    }

    #[test]
    fn extension_filter_normalizes() {
        let f = ExtensionFilter::parse(" .PY , rs,, ");
        assert_eq!(f.iter().collect::<Vec<_>>(), vec![".py", ".rs"]);
        assert!(f.matches(Path::new("a/b.py")));
        assert!(f.matches(Path::new("a/B.Py")));
        assert!(f.matches(Path::new("lib.rs")));
        assert!(!f.matches(Path::new("Makefile")));
        assert!(!f.matches(Path::new("a.pyc")));
    }

    #[test]
    fn walk_records_folders_and_filtered_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.py");
        touch(dir.path(), "a.txt");
        touch(dir.path(), "pkg/c.py");
        touch(dir.path(), "pkg/deep/d.py");
        touch(dir.path(), ".git/config.py");
        touch(dir.path(), ".tagsmith/data/answer.py");

        let opts = WalkOptions::new(ExtensionFilter::parse(".py"));
        let tree = walk(dir.path(), &opts).unwrap();

        assert_eq!(tree.folders, vec!["", "/pkg", "/pkg/deep"]);
        let files: Vec<_> = tree.files.iter().map(|f| f.rel.as_str()).collect();
        assert_eq!(files, vec!["/b.py", "/pkg/c.py", "/pkg/deep/d.py"]);
        assert_eq!(tree.files[0].path, dir.path().join("b.py"));
    }

    #[test]
    fn walk_exclusions_are_configurable() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "node_modules/x.js");
        touch(dir.path(), ".git/y.js");
        let opts = WalkOptions::new(ExtensionFilter::parse(".js"))
            .exclude_dirs(vec!["node_modules".to_string()]);
        let tree = walk(dir.path(), &opts).unwrap();
        let files: Vec<_> = tree.files.iter().map(|f| f.rel.as_str()).collect();
        assert_eq!(files, vec!["/.git/y.js"]);
    }

    #[test]
    fn walk_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let opts = WalkOptions::new(ExtensionFilter::parse(".py"));
        let err = walk(&dir.path().join("nope"), &opts).unwrap_err();
        assert!(matches!(err, TagsmithError::RootNotFound(_)));
    }
}
