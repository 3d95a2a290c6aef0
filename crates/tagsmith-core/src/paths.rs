use crate::error::{Result, TagsmithError};
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TAGSMITH_DIR: &str = ".tagsmith";
pub const CONFIG_FILE: &str = ".tagsmith/config.yaml";
pub const DATA_DIR: &str = ".tagsmith/data";

pub fn tagsmith_dir(root: &Path) -> PathBuf {
    root.join(TAGSMITH_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Relative paths
// ---------------------------------------------------------------------------

/// Render `path` relative to `root` in inventory form: a leading `/`, `/`
/// separators, and `""` for the root itself.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut out = String::new();
    for comp in rel.components() {
        if let Component::Normal(part) = comp {
            out.push('/');
            out.push_str(&part.to_string_lossy());
        }
    }
    out
}

/// Resolve an inventory-form path (`/pkg/x.txt`) under `root`.
///
/// Rejects paths that do not start with `/`, that name the root itself, or
/// that would leave the root through `..`.
pub fn resolve_relative(root: &Path, rel: &str) -> Result<PathBuf> {
    let Some(stripped) = rel.strip_prefix('/') else {
        return Err(TagsmithError::InvalidPath(rel.to_string()));
    };
    let mut out = root.to_path_buf();
    let mut depth = 0usize;
    for part in stripped.split('/') {
        match part {
            "" | "." => {}
            ".." => return Err(TagsmithError::InvalidPath(rel.to_string())),
            p if p.contains('\\') || Path::new(p).is_absolute() => {
                return Err(TagsmithError::InvalidPath(rel.to_string()))
            }
            p => {
                out.push(p);
                depth += 1;
            }
        }
    }
    if depth == 0 {
        return Err(TagsmithError::InvalidPath(rel.to_string()));
    }
    Ok(out)
}

/// Splice `suffix` into the file name just before its extension.
///
/// `src/a.py` + `-out` → `src/a-out.py`; a name without an extension gets the
/// suffix appended.
pub fn add_filename_suffix(path: &Path, suffix: &str) -> PathBuf {
    let Some(stem) = path.file_stem() else {
        return path.to_path_buf();
    };
    let mut name = stem.to_os_string();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_forms() {
        let root = Path::new("/tmp/proj");
        assert_eq!(relative_path(root, Path::new("/tmp/proj")), "");
        assert_eq!(relative_path(root, Path::new("/tmp/proj/a.py")), "/a.py");
        assert_eq!(
            relative_path(root, Path::new("/tmp/proj/pkg/x.txt")),
            "/pkg/x.txt"
        );
    }

    #[test]
    fn resolve_relative_accepts_rooted_paths() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            resolve_relative(root, "/pkg/x.txt").unwrap(),
            PathBuf::from("/tmp/proj/pkg/x.txt")
        );
        assert_eq!(
            resolve_relative(root, "/./a//b.rs").unwrap(),
            PathBuf::from("/tmp/proj/a/b.rs")
        );
    }

    #[test]
    fn resolve_relative_rejects_escapes() {
        let root = Path::new("/tmp/proj");
        for rel in ["pkg/x.txt", "/../etc/passwd", "/a/../../b", "/", "/a\\..\\b"] {
            assert!(resolve_relative(root, rel).is_err(), "expected invalid: {rel}");
        }
    }

    #[test]
    fn filename_suffix() {
        assert_eq!(
            add_filename_suffix(Path::new("/p/src/a.py"), "-out"),
            PathBuf::from("/p/src/a-out.py")
        );
        assert_eq!(
            add_filename_suffix(Path::new("/p/my.dir/Makefile"), "-out"),
            PathBuf::from("/p/my.dir/Makefile-out")
        );
        assert_eq!(
            add_filename_suffix(Path::new("/p/a.tar.gz"), "-out"),
            PathBuf::from("/p/a.tar-out.gz")
        );
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.tagsmith/config.yaml")
        );
    }
}
