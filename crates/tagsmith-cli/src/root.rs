use std::path::{Path, PathBuf};

/// Markers that identify a source root, in priority order.
const ROOT_MARKERS: &[&str] = &[".tagsmith", ".git"];

/// Resolve the source root.
///
/// Priority:
/// 1. `--root` flag / `TAGSMITH_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `cwd` containing `.tagsmith/`
/// 3. Nearest ancestor of `cwd` containing `.git/`
/// 4. `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_root_from(&cwd).unwrap_or(cwd)
}

fn find_root_from(start: &Path) -> Option<PathBuf> {
    ROOT_MARKERS.iter().find_map(|marker| {
        start
            .ancestors()
            .find(|dir| dir.join(marker).is_dir())
            .map(Path::to_path_buf)
    })
}
