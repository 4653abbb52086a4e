use std::path::PathBuf;
use std::time::Duration;

use crate::hash::Hash;

/// error type for loam operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("ref not found: {0}")]
    RefNotFound(String),

    #[error("path not found in tree: {0}")]
    PathNotFound(String),

    #[error("not a commit: {0}")]
    NotACommit(String),

    #[error("branch already exists: {0}")]
    BranchExists(String),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("cannot delete checked-out branch: {0}")]
    CheckedOutBranch(String),

    #[error("HEAD is detached: a branch is required")]
    DetachedHead,

    #[error("merge conflict in {0}")]
    MergeConflict(String),

    #[error("unrelated histories: no common ancestor")]
    UnrelatedHistories,

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("invalid tree entry name: {0}")]
    InvalidEntryName(String),

    #[error("duplicate tree entry name: {0}")]
    DuplicateEntryName(String),

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),

    #[error("sandbox failed: {0}")]
    SandboxFailed(String),

    #[error("sandbox timed out after {0:?}")]
    SandboxTimeout(Duration),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
