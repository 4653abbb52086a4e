use crate::error::Result;
use crate::ops::trees::flatten_commit_tree;
use crate::repo::Repo;
use crate::types::{Blob, Object};

/// working tree changes relative to the HEAD tree
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Status {
    /// in the working tree, not in HEAD
    pub new: Vec<String>,
    /// in both, with differing content
    pub modified: Vec<String>,
    /// in HEAD, gone from the working tree
    pub deleted: Vec<String>,
}

impl Status {
    pub fn is_clean(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }
}

/// compare the (ignore-filtered) working tree against the HEAD tree
///
/// the HEAD tree is empty while the current branch is unborn, so every
/// file shows as new before the first commit.
pub async fn status(repo: &Repo) -> Result<Status> {
    let head_files = flatten_commit_tree(repo.store.as_ref(), repo.head_commit()).await?;
    let filter = repo.ignore_filter();

    let mut status = Status::default();
    let mut seen = std::collections::BTreeSet::new();

    for entry in repo.worktree.files() {
        let rel = repo.worktree.rel_path(&entry.path);
        if let Some(filter) = &filter {
            if filter.ignores(&rel) {
                continue;
            }
        }
        let blob_hash = Object::Blob(Blob::new(entry.content.clone())).hash();
        match head_files.get(&rel) {
            None => status.new.push(rel.clone()),
            Some(head_hash) if *head_hash != blob_hash => status.modified.push(rel.clone()),
            Some(_) => {}
        }
        seen.insert(rel);
    }

    for path in head_files.keys() {
        if !seen.contains(path) {
            status.deleted.push(path.clone());
        }
    }

    // worktree iteration is path-ordered already; keep the contract explicit
    status.new.sort();
    status.modified.sort();
    status.deleted.sort();
    Ok(status)
}
