use crate::error::{Result, TagsmithError};
use crate::region::{RegionCollector, Step};
use crate::tags::{self, TagFamily};
use crate::tree::{self, TreeFile, WalkOptions};
use crate::types::{Inventory, MutationInstruction, TextBlock};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Output of one scan: the inventory and every named block, keyed by name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    pub inventory: Inventory,
    pub blocks: BTreeMap<String, TextBlock>,
}

impl ScanResult {
    pub fn block(&self, name: &str) -> Option<&TextBlock> {
        self.blocks.get(name)
    }

    /// Replace a block's content in memory and mark it dirty. Returns false
    /// when no block has that name.
    pub fn update_block(&mut self, name: &str, content: impl Into<String>) -> bool {
        match self.blocks.get_mut(name) {
            Some(block) => {
                block.set_content(content);
                true
            }
            None => {
                tracing::warn!(block = name, "update for unknown block ignored");
                false
            }
        }
    }

    /// One `BlockReplacement` per dirty block, ready for a mutation run.
    pub fn dirty_replacements(&self) -> Vec<MutationInstruction> {
        self.blocks
            .values()
            .filter(|b| b.dirty)
            .map(|b| MutationInstruction::BlockReplacement {
                block_name: b.name.clone(),
                new_content: b.content.clone(),
            })
            .collect()
    }
}

/// Walk `root` and collect the inventory and all `block_begin`/`block_end`
/// regions of the allow-listed files.
///
/// Duplicate block names, unmatched end tags and unnamed begin tags abort the
/// whole scan.
pub fn scan(root: &Path, opts: &WalkOptions) -> Result<ScanResult> {
    let tree = tree::walk(root, opts)?;
    let mut result = ScanResult {
        inventory: Inventory {
            file_names: Vec::with_capacity(tree.files.len()),
            folder_names: tree.folders,
        },
        blocks: BTreeMap::new(),
    };

    for file in &tree.files {
        result.inventory.file_names.push(file.rel.clone());
        visit_file(file, &mut result.blocks)?;
    }

    tracing::debug!(
        files = result.inventory.file_names.len(),
        folders = result.inventory.folder_names.len(),
        blocks = result.blocks.len(),
        "scan complete"
    );
    Ok(result)
}

fn visit_file(file: &TreeFile, blocks: &mut BTreeMap<String, TextBlock>) -> Result<()> {
    let read_err = |source| TagsmithError::Read {
        path: file.path.clone(),
        source,
    };
    let mut reader = BufReader::new(std::fs::File::open(&file.path).map_err(read_err)?);
    let mut collector = RegionCollector::new(tags::REGION);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).map_err(read_err)? == 0 {
            break;
        }
        match collector.feed(&line) {
            Step::Opened(name) => open_block(blocks, file, name)?,
            Step::NestedBegin { name, .. } => {
                if let Some(prev) = collector.reopen(name.clone()) {
                    store(blocks, &prev.name, prev.verbatim());
                }
                open_block(blocks, file, name)?;
            }
            Step::Closed(region) => store(blocks, &region.name, region.verbatim()),
            Step::StrayEnd => {
                return Err(TagsmithError::UnmatchedEndTag {
                    tag: tags::TAG_BLOCK_END.to_string(),
                    file: file.rel.clone(),
                    line: collector.line_no(),
                })
            }
            Step::MissingName | Step::Unrooted(_) => {
                return Err(missing_name(tags::REGION, file, collector.line_no()))
            }
            Step::Content | Step::Outside => {}
        }
    }

    if let Some(region) = collector.finish() {
        tracing::warn!(
            file = %file.rel,
            block = %region.name,
            line = region.begin_line,
            "block is never closed; keeping content up to end of file"
        );
        store(blocks, &region.name, region.verbatim());
    }
    Ok(())
}

fn open_block(
    blocks: &mut BTreeMap<String, TextBlock>,
    file: &TreeFile,
    name: String,
) -> Result<()> {
    if let Some(existing) = blocks.get(&name) {
        return Err(TagsmithError::DuplicateBlockName {
            name,
            first: existing.source_file.clone(),
            second: file.rel.clone(),
        });
    }
    blocks.insert(name.clone(), TextBlock::new(file.rel.clone(), name));
    Ok(())
}

fn store(blocks: &mut BTreeMap<String, TextBlock>, name: &str, content: String) {
    if let Some(block) = blocks.get_mut(name) {
        block.content = content;
    }
}

fn missing_name(family: TagFamily, file: &TreeFile, line: usize) -> TagsmithError {
    TagsmithError::MissingName {
        tag: family.begin.to_string(),
        location: file.rel.clone(),
        line,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
