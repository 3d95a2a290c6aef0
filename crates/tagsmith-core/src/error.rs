use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagsmithError {
    #[error("not initialized: run 'tagsmith init'")]
    NotInitialized,

    #[error("source folder not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("duplicate block name '{name}' in {second} (first defined in {first}); block names must be unique across all files")]
    DuplicateBlockName {
        name: String,
        first: String,
        second: String,
    },

    #[error("{file}:{line}: found '{tag}' without a matching begin tag")]
    UnmatchedEndTag {
        tag: String,
        file: String,
        line: usize,
    },

    #[error("{location}:{line}: '{tag}' is missing a name")]
    MissingName {
        tag: String,
        location: String,
        line: usize,
    },

    #[error("response line {line}: found '{tag} {name}' while '{open}' is still open")]
    NestedBegin {
        tag: String,
        name: String,
        open: String,
        line: usize,
    },

    #[error("response contains '{tag} {name}' more than once; refusing conflicting edits")]
    DuplicateResponseRegion { tag: String, name: String },

    #[error("response contains the full content of {0} more than once")]
    DuplicateFileContent(String),

    #[error("new file {0} already exists; refusing to overwrite it")]
    NewFileConflict(String),

    #[error("invalid relative path '{0}': must start with '/' and stay inside the source folder")]
    InvalidPath(String),

    #[error("invalid update strategy '{0}': expected whole_file, injection_points, blocks or none")]
    InvalidStrategy(String),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TagsmithError>;
