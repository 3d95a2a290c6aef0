use crate::error::{Result, TagsmithError};
use crate::paths;
use crate::tags::{self, TagFamily, INJECTION, REGION};
use crate::tree::{self, ExtensionFilter, TreeFile, WalkOptions};
use crate::types::{ApplyReport, FileFailure, ModifiedFile, MutationInstruction, UpdateStrategy};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// MutationRun
// ---------------------------------------------------------------------------

/// One request's worth of edits against a source tree. Built once, executed
/// once: `execute` consumes the run.
#[derive(Debug, Clone)]
pub struct MutationRun {
    root: PathBuf,
    strategy: UpdateStrategy,
    instructions: Vec<MutationInstruction>,
    walk: WalkOptions,
    output_suffix: Option<String>,
    allow_overwrite: bool,
}

impl MutationRun {
    pub fn new(
        root: impl Into<PathBuf>,
        strategy: UpdateStrategy,
        instructions: Vec<MutationInstruction>,
        extensions: ExtensionFilter,
    ) -> Self {
        Self {
            root: root.into(),
            strategy,
            instructions,
            walk: WalkOptions::new(extensions),
            output_suffix: None,
            allow_overwrite: false,
        }
    }

    pub fn exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.walk = self.walk.exclude_dirs(dirs);
        self
    }

    /// Write modified files next to the originals, with `suffix` spliced in
    /// before the extension, instead of over them.
    pub fn output_suffix(mut self, suffix: Option<String>) -> Self {
        self.output_suffix = suffix.filter(|s| !s.is_empty());
        self
    }

    pub fn allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }

    /// Apply every instruction.
    ///
    /// New-file targets are all validated before anything is written. After
    /// that, a file that cannot be read or written is recorded in the report
    /// and the run moves on to the next one.
    pub fn execute(self) -> Result<ApplyReport> {
        if let Some(suffix) = &self.output_suffix {
            if suffix.contains(['/', '\\']) {
                return Err(TagsmithError::InvalidPath(suffix.clone()));
            }
        }
        let plan = Plan::new(&self.instructions);
        let new_files = self.preflight_new_files(&plan)?;
        let tree = tree::walk(&self.root, &self.walk)?;
        let family = block_family(self.strategy);

        let mut report = ApplyReport::default();
        let mut matched: HashSet<&str> = HashSet::new();

        for file in &tree.files {
            match self.visit_file(file, &plan, family) {
                Ok(Some((modified, hits))) => {
                    matched.extend(hits);
                    report.modified.push(modified);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(file = %file.rel, error = %e, "failed to update file; continuing");
                    report.failures.push(FileFailure {
                        relative_path: file.rel.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        for (rel, path, content) in new_files {
            match crate::io::atomic_write(&path, content.as_bytes()) {
                Ok(()) => {
                    tracing::info!(file = %rel, "created file");
                    report.created.push(rel.to_string());
                }
                Err(e) => {
                    tracing::warn!(file = %rel, error = %e, "failed to create file; continuing");
                    report.failures.push(FileFailure {
                        relative_path: rel.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        for target in plan.targets() {
            if !matched.contains(target) {
                tracing::warn!(instruction = target, "instruction matched no file");
                report.skipped.push(target.to_string());
            }
        }

        Ok(report)
    }

    /// Resolve every new-file path and refuse existing targets, before the
    /// tree is touched.
    fn preflight_new_files<'p>(&self, plan: &Plan<'p>) -> Result<Vec<(&'p str, PathBuf, &'p str)>> {
        let mut out = Vec::with_capacity(plan.new_files.len());
        for (rel, content) in &plan.new_files {
            let path = paths::resolve_relative(&self.root, rel)?;
            if path.exists() && !self.allow_overwrite {
                return Err(TagsmithError::NewFileConflict(rel.to_string()));
            }
            out.push((*rel, path, *content));
        }
        Ok(out)
    }

    /// Returns the modification record and the instruction targets that hit,
    /// or `None` when the file is left alone.
    fn visit_file<'p>(
        &self,
        file: &TreeFile,
        plan: &Plan<'p>,
        family: TagFamily,
    ) -> Result<Option<(ModifiedFile, Vec<&'p str>)>> {
        tracing::debug!(file = %file.rel, "visiting");
        let original = std::fs::read_to_string(&file.path)?;

        let (content, hits, blocks) = if let Some((rel, new_content)) =
            plan.full_files.get_key_value(file.rel.as_str())
        {
            (new_content.to_string(), vec![*rel], Vec::new())
        } else {
            let mut content = original;
            let mut hits = Vec::new();
            for (name, new_content) in &plan.blocks {
                if let Some(updated) = replace_region(&content, family, name, new_content) {
                    content = updated;
                    hits.push(*name);
                }
            }
            if hits.is_empty() {
                return Ok(None);
            }
            let blocks = hits.iter().map(|h| h.to_string()).collect();
            (content, hits, blocks)
        };

        let target = self.output_path(&file.path);
        crate::io::atomic_write(&target, content.as_bytes())?;
        let written_to = paths::relative_path(&self.root, &target);
        tracing::info!(file = %file.rel, written_to = %written_to, "updated file");

        Ok(Some((
            ModifiedFile {
                relative_path: file.rel.clone(),
                written_to,
                blocks,
            },
            hits,
        )))
    }

    fn output_path(&self, path: &Path) -> PathBuf {
        match &self.output_suffix {
            Some(suffix) => paths::add_filename_suffix(path, suffix),
            None => path.to_path_buf(),
        }
    }
}

/// Apply `instructions` to the tree under `root` with default options.
pub fn apply(
    root: &Path,
    strategy: UpdateStrategy,
    instructions: Vec<MutationInstruction>,
    extensions: ExtensionFilter,
    output_suffix: Option<String>,
) -> Result<ApplyReport> {
    MutationRun::new(root, strategy, instructions, extensions)
        .output_suffix(output_suffix)
        .execute()
}

/// The tag family block replacements target under `strategy`.
pub fn block_family(strategy: UpdateStrategy) -> TagFamily {
    match strategy {
        UpdateStrategy::InjectionPoints => INJECTION,
        _ => REGION,
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Instructions sorted by kind, borrowing from the run.
struct Plan<'a> {
    full_files: HashMap<&'a str, &'a str>,
    blocks: Vec<(&'a str, &'a str)>,
    new_files: Vec<(&'a str, &'a str)>,
    order: Vec<&'a str>,
}

impl<'a> Plan<'a> {
    fn new(instructions: &'a [MutationInstruction]) -> Self {
        let mut plan = Plan {
            full_files: HashMap::new(),
            blocks: Vec::new(),
            new_files: Vec::new(),
            order: Vec::new(),
        };
        for inst in instructions {
            match inst {
                MutationInstruction::FullFileReplacement {
                    relative_path,
                    new_content,
                } => {
                    plan.full_files.insert(relative_path, new_content);
                    plan.order.push(relative_path);
                }
                MutationInstruction::BlockReplacement {
                    block_name,
                    new_content,
                } => {
                    plan.blocks.push((block_name, new_content));
                    plan.order.push(block_name);
                }
                MutationInstruction::NewFileCreation {
                    relative_path,
                    content,
                } => plan.new_files.push((relative_path, content)),
            }
        }
        plan
    }

    /// Targets that must match something in the tree.
    fn targets(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.order.iter().copied()
    }
}

// ---------------------------------------------------------------------------
// Line-indexed region edit
// ---------------------------------------------------------------------------

/// Replace the lines strictly between `<begin> name` and the next end tag of
/// `family` with `new_content`. Tag lines and everything outside the region
/// are kept byte for byte. Returns `None` when the region is not in `content`.
///
/// The inserted text ends with a line terminator (matching the begin line's
/// `\n` or `\r\n`) unless it is empty.
pub fn replace_region(
    content: &str,
    family: TagFamily,
    name: &str,
    new_content: &str,
) -> Option<String> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let begin = lines
        .iter()
        .position(|l| tags::is_tag_line_with_name(l, family.begin, name))?;
    let Some(end) = lines[begin + 1..]
        .iter()
        .position(|l| tags::is_tag_word_line(l, family.end))
        .map(|i| begin + 1 + i)
    else {
        tracing::warn!(block = name, line = begin + 1, "region has no end tag; leaving it alone");
        return None;
    };

    if lines[end + 1..]
        .iter()
        .any(|l| tags::is_tag_line_with_name(l, family.begin, name))
    {
        tracing::warn!(block = name, "region appears more than once in file; only the first was replaced");
    }

    let eol = if lines[begin].ends_with("\r\n") { "\r\n" } else { "\n" };
    let mut out = String::with_capacity(content.len() + new_content.len());
    for line in &lines[..=begin] {
        out.push_str(line);
    }
    for line in new_content.lines() {
        out.push_str(line);
        out.push_str(eol);
    }
    for line in &lines[end..] {
        out.push_str(line);
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
