use crate::error::{Result, TagsmithError};
use crate::paths;
use crate::scanner::ScanResult;
use crate::tags::{TAG_FILE_BEGIN, TAG_FILE_END};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

/// Substitute `${...}` placeholders in `template` from a scan of `root`.
///
/// - `${name}`: content of the block `name`.
/// - `${/pkg/x.py}`: the whole file, wrapped in `file_begin`/`file_end` tags.
/// - `${/pkg/}` and `${/}`: every scanned file under that folder, wrapped.
///
/// Placeholders that match nothing are left as written. Substituted text is
/// never rescanned for placeholders.
pub fn assemble(template: &str, root: &Path, scan: &ScanResult) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in placeholder_re().captures_iter(template) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let key = &caps[1];
        let Some(text) = substitute(key, root, scan)? else {
            continue;
        };
        out.push_str(&template[last..whole.start]);
        out.push_str(&text);
        last = whole.end;
    }
    out.push_str(&template[last..]);
    Ok(out)
}

fn substitute(key: &str, root: &Path, scan: &ScanResult) -> Result<Option<String>> {
    if let Some(block) = scan.block(key) {
        return Ok(Some(block.content.clone()));
    }
    if scan.inventory.contains_file(key) {
        return Ok(Some(file_section(root, key)?));
    }
    if let Some(folder) = key.strip_suffix('/') {
        if scan.inventory.contains_folder(folder) {
            return Ok(Some(folder_section(root, folder, scan)?));
        }
    }
    tracing::debug!(placeholder = key, "no match; left as is");
    Ok(None)
}

fn read_file(root: &Path, rel: &str) -> Result<String> {
    let path = paths::resolve_relative(root, rel)?;
    std::fs::read_to_string(&path).map_err(|source| TagsmithError::Read { path, source })
}

/// One file in the wrapped form a whole-file response is expected to echo.
fn file_section(root: &Path, rel: &str) -> Result<String> {
    let content = read_file(root, rel)?;
    let nl = if content.ends_with('\n') { "" } else { "\n" };
    Ok(format!(
        "{TAG_FILE_BEGIN} {rel}\n{content}{nl}{TAG_FILE_END} {rel}\n"
    ))
}

fn folder_section(root: &Path, folder: &str, scan: &ScanResult) -> Result<String> {
    let shown = if folder.is_empty() { "/" } else { folder };
    let mut out = format!(
        "Files in folder {shown} (each delimited by {TAG_FILE_BEGIN} and {TAG_FILE_END} tags):\n\n"
    );
    let prefix = format!("{folder}/");
    for rel in scan
        .inventory
        .file_names
        .iter()
        .filter(|f| f.starts_with(&prefix))
    {
        out.push_str(&file_section(root, rel)?);
        out.push('\n');
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner;
    use crate::tree::{ExtensionFilter, WalkOptions};
    use tempfile::TempDir;

    fn setup() -> (TempDir, ScanResult) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg/sub")).unwrap();
        std::fs::write(
            dir.path().join("a.py"),
            "# block_begin greet\nprint('hi')\n# block_end\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("pkg/x.txt"), "x").unwrap();
        std::fs::write(dir.path().join("pkg/sub/y.txt"), "y\n").unwrap();
        let opts = WalkOptions::new(ExtensionFilter::parse(".py,.txt"));
        let scan = scanner::scan(dir.path(), &opts).unwrap();
        (dir, scan)
    }

    #[test]
    fn substitutes_blocks() {
        let (dir, scan) = setup();
        let out = assemble("Fix this:\n${greet}done", dir.path(), &scan).unwrap();
        assert_eq!(out, "Fix this:\nprint('hi')\ndone");
    }

    #[test]
    fn substitutes_files_wrapped() {
        let (dir, scan) = setup();
        let out = assemble("${/pkg/x.txt}", dir.path(), &scan).unwrap();
        assert_eq!(out, "file_begin /pkg/x.txt\nx\nfile_end /pkg/x.txt\n");
    }

    #[test]
    fn substitutes_folders_recursively() {
        let (dir, scan) = setup();
        let out = assemble("${/pkg/}", dir.path(), &scan).unwrap();
        assert!(out.starts_with("Files in folder /pkg "));
        assert!(out.contains("file_begin /pkg/x.txt\nx\nfile_end /pkg/x.txt\n"));
        assert!(out.contains("file_begin /pkg/sub/y.txt\ny\nfile_end /pkg/sub/y.txt\n"));
        assert!(!out.contains("/a.py"));

        let all = assemble("${/}", dir.path(), &scan).unwrap();
        assert!(all.contains("file_begin /a.py"));
        assert!(all.contains("file_begin /pkg/sub/y.txt"));
    }

    #[test]
    fn unknown_placeholders_untouched() {
        let (dir, scan) = setup();
        let template = "cost: ${price} and ${/missing.py} ${/nope/}";
        assert_eq!(assemble(template, dir.path(), &scan).unwrap(), template);
    }

    #[test]
    fn substituted_text_not_rescanned() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("a.py"),
            "# block_begin one\n${two}\n# block_end\n# block_begin two\nX\n# block_end\n",
        )
        .unwrap();
        let opts = WalkOptions::new(ExtensionFilter::parse(".py"));
        let scan = scanner::scan(dir.path(), &opts).unwrap();
        assert_eq!(assemble("${one}", dir.path(), &scan).unwrap(), "${two}\n");
    }
}
