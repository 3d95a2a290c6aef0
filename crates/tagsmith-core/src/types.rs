use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// UpdateStrategy
// ---------------------------------------------------------------------------

/// Which tag families a response is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStrategy {
    WholeFile,
    InjectionPoints,
    #[default]
    Blocks,
    None,
}

impl UpdateStrategy {
    pub fn all() -> &'static [UpdateStrategy] {
        &[
            UpdateStrategy::WholeFile,
            UpdateStrategy::InjectionPoints,
            UpdateStrategy::Blocks,
            UpdateStrategy::None,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UpdateStrategy::WholeFile => "whole_file",
            UpdateStrategy::InjectionPoints => "injection_points",
            UpdateStrategy::Blocks => "blocks",
            UpdateStrategy::None => "none",
        }
    }
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UpdateStrategy {
    type Err = crate::error::TagsmithError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "whole_file" | "files" => Ok(UpdateStrategy::WholeFile),
            "injection_points" | "inject" => Ok(UpdateStrategy::InjectionPoints),
            "blocks" => Ok(UpdateStrategy::Blocks),
            "none" => Ok(UpdateStrategy::None),
            _ => Err(crate::error::TagsmithError::InvalidStrategy(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TextBlock
// ---------------------------------------------------------------------------

/// A named region found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Owning file, in inventory form.
    pub source_file: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub dirty: bool,
}

impl TextBlock {
    pub fn new(source_file: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            name: name.into(),
            content: String::new(),
            dirty: false,
        }
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.dirty = true;
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub file_names: Vec<String>,
    pub folder_names: Vec<String>,
}

impl Inventory {
    pub fn contains_file(&self, rel: &str) -> bool {
        self.file_names.iter().any(|f| f == rel)
    }

    pub fn contains_folder(&self, rel: &str) -> bool {
        self.folder_names.iter().any(|f| f == rel)
    }
}

// ---------------------------------------------------------------------------
// MutationInstruction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MutationInstruction {
    FullFileReplacement {
        relative_path: String,
        new_content: String,
    },
    BlockReplacement {
        block_name: String,
        new_content: String,
    },
    NewFileCreation {
        relative_path: String,
        content: String,
    },
}

impl MutationInstruction {
    /// The path or block name this instruction targets.
    pub fn target(&self) -> &str {
        match self {
            MutationInstruction::FullFileReplacement { relative_path, .. }
            | MutationInstruction::NewFileCreation { relative_path, .. } => relative_path,
            MutationInstruction::BlockReplacement { block_name, .. } => block_name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MutationInstruction::FullFileReplacement { .. } => "full_file_replacement",
            MutationInstruction::BlockReplacement { .. } => "block_replacement",
            MutationInstruction::NewFileCreation { .. } => "new_file_creation",
        }
    }
}

// ---------------------------------------------------------------------------
// ApplyReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedFile {
    pub relative_path: String,
    /// Where the new content was written (differs from `relative_path` when
    /// an output suffix is in effect).
    pub written_to: String,
    /// Blocks replaced in this file; empty for a full-file replacement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub relative_path: String,
    pub error: String,
}

/// What one mutation run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub modified: Vec<ModifiedFile>,
    pub created: Vec<String>,
    /// Targets of instructions that matched nothing in the tree.
    pub skipped: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_from_str() {
        for s in UpdateStrategy::all() {
            assert_eq!(s.as_str().parse::<UpdateStrategy>().unwrap(), *s);
        }
        assert_eq!(
            "files".parse::<UpdateStrategy>().unwrap(),
            UpdateStrategy::WholeFile
        );
        assert_eq!(
            "Injection-Points".parse::<UpdateStrategy>().unwrap(),
            UpdateStrategy::InjectionPoints
        );
        assert!("diff".parse::<UpdateStrategy>().is_err());
    }

    #[test]
    fn strategy_yaml_is_snake_case() {
        let yaml = serde_yaml::to_string(&UpdateStrategy::WholeFile).unwrap();
        assert_eq!(yaml.trim(), "whole_file");
    }

    #[test]
    fn instruction_json_is_tagged() {
        let inst = MutationInstruction::BlockReplacement {
            block_name: "greet".to_string(),
            new_content: "howdy".to_string(),
        };
        let json = serde_json::to_value(&inst).unwrap();
        assert_eq!(json["type"], "block_replacement");
        assert_eq!(json["block_name"], "greet");
        assert_eq!(inst.target(), "greet");
    }

    #[test]
    fn set_content_marks_dirty() {
        let mut block = TextBlock::new("/a.py", "greet");
        assert!(!block.dirty);
        block.set_content("howdy\n");
        assert!(block.dirty);
        assert_eq!(block.content, "howdy\n");
    }
}
