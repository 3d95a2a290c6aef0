//! Turn a generated response into mutation instructions.
//!
//! The response is untrusted text. Tags are matched with or without a comment
//! prefix, conflicting edits (the same region or file twice, a begin inside an
//! open region) are rejected, and stray end tags are only logged.

use crate::error::{Result, TagsmithError};
use crate::region::{Region, RegionCollector, Step};
use crate::tags::{
    self, TagFamily, INJECTION, NEW_FILE, REGION, TAG_BLOCK_BEGIN, TAG_FILE_BEGIN,
    TAG_INJECT_BEGIN, TAG_NEW_FILE_BEGIN, WHOLE_FILE,
};
use crate::types::{Inventory, MutationInstruction, UpdateStrategy};
use std::collections::HashSet;

/// Parser for one response under one strategy.
#[derive(Debug, Clone)]
pub struct ResponseParser<'a> {
    strategy: UpdateStrategy,
    inventory: &'a Inventory,
    allow_overwrite: bool,
}

impl<'a> ResponseParser<'a> {
    pub fn new(strategy: UpdateStrategy, inventory: &'a Inventory) -> Self {
        Self {
            strategy,
            inventory,
            allow_overwrite: false,
        }
    }

    /// Keep new-file instructions whose path already exists, treating them as
    /// overwrites instead of conflicts.
    pub fn allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }

    pub fn parse(&self, response: &str) -> Result<Vec<MutationInstruction>> {
        match self.strategy {
            UpdateStrategy::None => Ok(Vec::new()),
            UpdateStrategy::Blocks => block_replacements(response, REGION),
            UpdateStrategy::InjectionPoints => block_replacements(response, INJECTION),
            UpdateStrategy::WholeFile => {
                let mut out = self.full_file_replacements(response)?;
                out.extend(self.new_file_creations(response)?);
                Ok(out)
            }
        }
    }

    fn full_file_replacements(&self, response: &str) -> Result<Vec<MutationInstruction>> {
        let mut out = Vec::new();
        for region in collect_regions(response, WHOLE_FILE)? {
            if !self.inventory.contains_file(&region.name) {
                tracing::warn!(
                    path = %region.name,
                    "response replaces a file that was not scanned; ignoring it"
                );
                continue;
            }
            out.push(MutationInstruction::FullFileReplacement {
                new_content: region.joined(),
                relative_path: region.name,
            });
        }
        Ok(out)
    }

    fn new_file_creations(&self, response: &str) -> Result<Vec<MutationInstruction>> {
        let mut out = Vec::new();
        for region in collect_regions(response, NEW_FILE)? {
            if self.inventory.contains_file(&region.name) {
                if !self.allow_overwrite {
                    return Err(TagsmithError::NewFileConflict(region.name));
                }
                tracing::warn!(path = %region.name, "new file already exists and will be overwritten");
            }
            out.push(MutationInstruction::NewFileCreation {
                content: region.joined(),
                relative_path: region.name,
            });
        }
        Ok(out)
    }
}

/// Parse `response` with default options.
pub fn parse(
    strategy: UpdateStrategy,
    response: &str,
    inventory: &Inventory,
) -> Result<Vec<MutationInstruction>> {
    ResponseParser::new(strategy, inventory).parse(response)
}

fn block_replacements(response: &str, family: TagFamily) -> Result<Vec<MutationInstruction>> {
    Ok(collect_regions(response, family)?
        .into_iter()
        .map(|r| MutationInstruction::BlockReplacement {
            new_content: r.joined(),
            block_name: r.name,
        })
        .collect())
}

/// Every closed region of `family` in `response`, in order of appearance.
fn collect_regions(response: &str, family: TagFamily) -> Result<Vec<Region>> {
    let mut collector = RegionCollector::new(family);
    let mut seen = HashSet::new();
    let mut regions = Vec::new();

    for line in response.lines() {
        match collector.feed(line) {
            Step::Closed(region) => {
                if !seen.insert(region.name.clone()) {
                    return Err(duplicate(family, region.name));
                }
                regions.push(region);
            }
            Step::NestedBegin { name, open } => {
                if family.named_end {
                    return Err(duplicate(family, name));
                }
                return Err(TagsmithError::NestedBegin {
                    tag: family.begin.to_string(),
                    name,
                    open,
                    line: collector.line_no(),
                });
            }
            Step::StrayEnd => {
                tracing::warn!(
                    tag = family.end,
                    line = collector.line_no(),
                    "end tag without an open region in response; ignoring it"
                );
            }
            Step::MissingName => {
                return Err(TagsmithError::MissingName {
                    tag: family.begin.to_string(),
                    location: "response".to_string(),
                    line: collector.line_no(),
                })
            }
            Step::Unrooted(name) => return Err(TagsmithError::InvalidPath(name)),
            Step::Opened(_) | Step::Content | Step::Outside => {}
        }
    }

    if let Some(region) = collector.finish() {
        tracing::warn!(
            tag = family.begin,
            name = %region.name,
            line = region.begin_line,
            "response ends inside an open region; dropping it"
        );
    }
    Ok(regions)
}

fn duplicate(family: TagFamily, name: String) -> TagsmithError {
    if family == WHOLE_FILE {
        TagsmithError::DuplicateFileContent(name)
    } else if family == NEW_FILE {
        TagsmithError::NewFileConflict(name)
    } else {
        TagsmithError::DuplicateResponseRegion {
            tag: family.begin.to_string(),
            name,
        }
    }
}

/// The strategy whose tags appear in `response`, for hinting when a response
/// parsed under another strategy produced nothing.
pub fn detect_strategy(response: &str) -> Option<UpdateStrategy> {
    if tags::has_tag_lines(response, TAG_FILE_BEGIN)
        || tags::has_tag_lines(response, TAG_NEW_FILE_BEGIN)
    {
        Some(UpdateStrategy::WholeFile)
    } else if tags::has_tag_lines(response, TAG_INJECT_BEGIN) {
        Some(UpdateStrategy::InjectionPoints)
    } else if tags::has_tag_lines(response, TAG_BLOCK_BEGIN) {
        Some(UpdateStrategy::Blocks)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Display summary
// ---------------------------------------------------------------------------

const SUMMARY_LABELS: &[(TagFamily, &str)] = &[
    (WHOLE_FILE, "File Updated"),
    (NEW_FILE, "File Created"),
    (REGION, "Block Updated"),
    (INJECTION, "Block Injected"),
];

/// The response with every tagged region collapsed to a one-line marker, for
/// showing to a person.
pub fn summarize(response: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut depth = 0usize;

    for line in response.lines() {
        if SUMMARY_LABELS
            .iter()
            .any(|(f, _)| tags::is_tag_word_line(line, f.end))
        {
            depth = depth.saturating_sub(1);
            continue;
        }
        if let Some((family, label)) = SUMMARY_LABELS
            .iter()
            .find(|(f, _)| tags::is_tag_word_line(line, f.begin))
        {
            depth += 1;
            if depth == 1 {
                let name = tags::parse_name_from_tag_line(line, family.begin).unwrap_or_default();
                out.push(format!("{label}: {name}"));
            }
            continue;
        }
        if depth == 0 {
            out.push(line.to_string());
        }
    }

    out.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory(files: &[&str]) -> Inventory {
        Inventory {
            file_names: files.iter().map(|f| f.to_string()).collect(),
            folder_names: vec![String::new()],
        }
    }

    fn block(name: &str, content: &str) -> MutationInstruction {
        MutationInstruction::BlockReplacement {
            block_name: name.to_string(),
            new_content: content.to_string(),
        }
    }

    #[test]
    fn blocks_strategy_extracts_regions() {
        let text = "Here you go:\nblock_begin greet\nhowdy\n    indented\nblock_end\n// block_begin bye\nsee ya\n// block_end\nThanks";
        let out = parse(UpdateStrategy::Blocks, text, &Inventory::default()).unwrap();
        assert_eq!(
            out,
            vec![block("greet", "howdy\n    indented"), block("bye", "see ya")]
        );
    }

    #[test]
    fn blocks_strategy_rejects_duplicates() {
        let text = "block_begin a\n1\nblock_end\nblock_begin a\n2\nblock_end";
        let err = parse(UpdateStrategy::Blocks, text, &Inventory::default()).unwrap_err();
        assert!(matches!(
            err,
            TagsmithError::DuplicateResponseRegion { ref name, .. } if name == "a"
        ));
    }

    #[test]
    fn nested_begin_is_fatal() {
        let text = "inject_begin a\n1\ninject_begin b\n2\ninject_end";
        let err = parse(UpdateStrategy::InjectionPoints, text, &Inventory::default()).unwrap_err();
        assert!(matches!(
            err,
            TagsmithError::NestedBegin { ref name, ref open, line: 3, .. } if name == "b" && open == "a"
        ));
    }

    #[test]
    fn injection_points_rejects_duplicates() {
        let text = "inject_begin a\n1\ninject_end\ninject_begin a\n2\ninject_end";
        let err = parse(UpdateStrategy::InjectionPoints, text, &Inventory::default()).unwrap_err();
        assert!(matches!(
            err,
            TagsmithError::DuplicateResponseRegion { ref tag, ref name } if tag == "inject_begin" && name == "a"
        ));
    }

    #[test]
    fn blocks_nested_begin_is_fatal() {
        let text = "block_begin a\n1\nblock_begin b\n2\nblock_end";
        let err = parse(UpdateStrategy::Blocks, text, &Inventory::default()).unwrap_err();
        assert!(matches!(
            err,
            TagsmithError::NestedBegin { ref name, ref open, line: 3, .. } if name == "b" && open == "a"
        ));
    }

    #[test]
    fn unnamed_begin_reports_response_location() {
        let text = "Here you go:\nblock_begin\nx\nblock_end";
        let err = parse(UpdateStrategy::Blocks, text, &Inventory::default()).unwrap_err();
        assert!(matches!(
            err,
            TagsmithError::MissingName { ref tag, ref location, line: 2 } if tag == "block_begin" && location == "response"
        ));
        assert_eq!(err.to_string(), "response:2: 'block_begin' is missing a name");
    }

    #[test]
    fn stray_end_is_ignored() {
        let text = "inject_end\ninject_begin a\nx\ninject_end\ninject_end";
        let out = parse(UpdateStrategy::InjectionPoints, text, &Inventory::default()).unwrap();
        assert_eq!(out, vec![block("a", "x")]);
    }

    #[test]
    fn injection_ignores_block_tags() {
        let text = "block_begin a\nx\nblock_end";
        let out = parse(UpdateStrategy::InjectionPoints, text, &Inventory::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn none_strategy_yields_nothing() {
        let text = "block_begin a\nx\nblock_end\nfile_begin /a.py\ny\nfile_end /a.py";
        let out = parse(UpdateStrategy::None, text, &inventory(&["/a.py"])).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn whole_file_replacement() {
        let text = "file_begin /a.py\nNEW CONTENT\nfile_end /a.py";
        let out = parse(UpdateStrategy::WholeFile, text, &inventory(&["/a.py"])).unwrap();
        assert_eq!(
            out,
            vec![MutationInstruction::FullFileReplacement {
                relative_path: "/a.py".to_string(),
                new_content: "NEW CONTENT".to_string(),
            }]
        );
    }

    #[test]
    fn whole_file_keeps_foreign_tags_as_content() {
        let text = "// file_begin /docs.md\nuse `file_begin /x` and\nfile_end /x\n// file_end /docs.md";
        let out = parse(UpdateStrategy::WholeFile, text, &inventory(&["/docs.md"])).unwrap();
        assert_eq!(
            out[0],
            MutationInstruction::FullFileReplacement {
                relative_path: "/docs.md".to_string(),
                new_content: "use `file_begin /x` and\nfile_end /x".to_string(),
            }
        );
    }

    #[test]
    fn whole_file_duplicate_path_is_fatal() {
        let inv = inventory(&["/a.py"]);
        let after_close = "file_begin /a.py\n1\nfile_end /a.py\nfile_begin /a.py\n2\nfile_end /a.py";
        let before_close = "file_begin /a.py\n1\nfile_begin /a.py\n2\nfile_end /a.py";
        for text in [after_close, before_close] {
            let err = parse(UpdateStrategy::WholeFile, text, &inv).unwrap_err();
            assert!(matches!(err, TagsmithError::DuplicateFileContent(ref p) if p == "/a.py"));
        }
    }

    #[test]
    fn detects_strategy_from_tags() {
        assert_eq!(
            detect_strategy("new_file_begin /x.txt\nhi\nnew_file_end /x.txt"),
            Some(UpdateStrategy::WholeFile)
        );
        assert_eq!(
            detect_strategy("// inject_begin a\nx\n// inject_end"),
            Some(UpdateStrategy::InjectionPoints)
        );
        assert_eq!(
            detect_strategy("block_begin a\nx\nblock_end"),
            Some(UpdateStrategy::Blocks)
        );
        assert_eq!(detect_strategy("just prose"), None);
    }

    #[test]
    fn whole_file_unknown_path_is_skipped() {
        let text = "file_begin /ghost.py\nx\nfile_end /ghost.py";
        let out = parse(UpdateStrategy::WholeFile, text, &inventory(&["/a.py"])).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn new_file_creation() {
        let text = "Create this:\nnew_file_begin /pkg/x.txt\nhi\nnew_file_end /pkg/x.txt\n";
        let out = parse(UpdateStrategy::WholeFile, text, &inventory(&["/a.py"])).unwrap();
        assert_eq!(
            out,
            vec![MutationInstruction::NewFileCreation {
                relative_path: "/pkg/x.txt".to_string(),
                content: "hi".to_string(),
            }]
        );
    }

    #[test]
    fn new_file_over_existing_is_conflict() {
        let text = "new_file_begin /a.py\nx\nnew_file_end /a.py";
        let inv = inventory(&["/a.py"]);
        let err = parse(UpdateStrategy::WholeFile, text, &inv).unwrap_err();
        assert!(matches!(err, TagsmithError::NewFileConflict(ref p) if p == "/a.py"));

        let out = ResponseParser::new(UpdateStrategy::WholeFile, &inv)
            .allow_overwrite(true)
            .parse(text)
            .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn new_file_twice_is_conflict() {
        let text = "new_file_begin /n.txt\n1\nnew_file_end /n.txt\nnew_file_begin /n.txt\n2\nnew_file_end /n.txt";
        let err = ResponseParser::new(UpdateStrategy::WholeFile, &Inventory::default())
            .allow_overwrite(true)
            .parse(text)
            .unwrap_err();
        assert!(matches!(err, TagsmithError::NewFileConflict(ref p) if p == "/n.txt"));
    }

    #[test]
    fn new_file_unrooted_is_invalid() {
        let text = "new_file_begin pkg/x.txt\nx\nnew_file_end pkg/x.txt";
        let err = parse(UpdateStrategy::WholeFile, text, &Inventory::default()).unwrap_err();
        assert!(matches!(err, TagsmithError::InvalidPath(_)));
    }

    #[test]
    fn unclosed_region_is_dropped() {
        let text = "block_begin a\ncut off mid";
        let out = parse(UpdateStrategy::Blocks, text, &Inventory::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn summarize_collapses_regions() {
        let text = "Intro\nfile_begin /a.py\ncode\nfile_end /a.py\nblock_begin greet\nhi\nblock_end\nnew_file_begin /n.txt\nn\nnew_file_end /n.txt\nDone";
        assert_eq!(
            summarize(text),
            "Intro\nFile Updated: /a.py\nBlock Updated: greet\nFile Created: /n.txt\nDone"
        );
    }
}
