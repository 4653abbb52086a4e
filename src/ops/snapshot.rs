use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::refs::{Head, RefTable};
use crate::repo::Repo;
use crate::types::Object;
use crate::worktree::WorkTree;

/// the on-disk snapshot document
///
/// this shape is normative: objects as `[hash, object]` pairs, refs as
/// `[name, hex-or-empty]` pairs (empty string marks an unborn ref), HEAD
/// as a ref name or 40-hex hash, and the live files with absolute paths.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDoc {
    objects: Vec<(Hash, Object)>,
    refs: Vec<(String, String)>,
    head: String,
    #[serde(rename = "workingFiles")]
    working_files: Vec<WorkingFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WorkingFile {
    path: String,
    content: String,
}

/// full engine state for inspection and tests
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseDump {
    /// every stored object, sorted by hash
    pub objects: Vec<(Hash, Object)>,
    /// every ref, sorted by name; `None` marks an unborn ref
    pub refs: Vec<(String, Option<Hash>)>,
    pub head: Head,
}

/// export engine state
pub async fn database_dump(repo: &Repo) -> DatabaseDump {
    let mut objects = repo.store.dump().await;
    objects.sort_by_key(|(hash, _)| *hash);

    DatabaseDump {
        objects,
        refs: repo
            .refs
            .iter()
            .map(|(name, hash)| (name.to_string(), hash))
            .collect(),
        head: repo.head.clone(),
    }
}

/// write the engine state to a host file as pretty-printed JSON
pub async fn save_snapshot(repo: &Repo, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let mut objects = repo.store.dump().await;
    objects.sort_by_key(|(hash, _)| *hash);

    let doc = SnapshotDoc {
        objects,
        refs: repo
            .refs
            .iter()
            .map(|(name, hash)| {
                let value = hash.map(|h| h.to_hex()).unwrap_or_default();
                (name.to_string(), value)
            })
            .collect(),
        head: repo.head.to_string(),
        working_files: repo
            .worktree
            .files()
            .map(|f| WorkingFile {
                path: f.path.to_string_lossy().into_owned(),
                content: f.content.clone(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&doc)?;
    fs::write(path, json).with_path(path)
}

/// restore engine state from a snapshot file
///
/// the document is parsed and validated completely before any engine
/// state moves, so a failure at any point leaves the prior state intact.
pub async fn load_snapshot(repo: &mut Repo, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_path(path)?;
    let doc: SnapshotDoc = serde_json::from_str(&text)?;

    // stage references
    let mut refs = RefTable::default();
    for (name, value) in &doc.refs {
        let hash = if value.is_empty() {
            None
        } else {
            Some(Hash::from_hex(value)?)
        };
        refs.set(name.clone(), hash);
    }

    // stage HEAD: a known ref name, else a detached hash
    let head = if refs.contains(&doc.head) {
        Head::Symbolic(doc.head.clone())
    } else {
        match Hash::from_hex(&doc.head) {
            Ok(hash) => Head::Detached(hash),
            Err(_) => {
                return Err(Error::CorruptSnapshot(format!(
                    "head is neither a known ref nor a hash: {}",
                    doc.head
                )))
            }
        }
    };

    // stage the working tree
    let mut worktree = WorkTree::new(repo.root());
    for file in &doc.working_files {
        worktree.write(&file.path, file.content.clone());
    }

    // the store validates hashes and injectivity before replacing itself
    repo.store.load(doc.objects).await?;

    repo.refs = refs;
    repo.head = head;
    repo.worktree = worktree;
    Ok(())
}
