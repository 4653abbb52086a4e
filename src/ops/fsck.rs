use std::collections::HashSet;

use crate::error::Result;
use crate::hash::Hash;
use crate::refs::Head;
use crate::repo::Repo;
use crate::types::{EntryKind, Object};

/// integrity report
#[derive(Debug, Default)]
pub struct FsckReport {
    /// objects examined
    pub objects_checked: usize,
    /// stored hash differs from recomputed hash, or the object is
    /// internally inconsistent (wrong kind behind a reference, unsorted
    /// tree entries)
    pub corrupt: Vec<Hash>,
    /// referenced but absent from the store
    pub missing: Vec<MissingObject>,
    /// present but unreachable from any ref or HEAD
    pub dangling: Vec<Hash>,
}

impl FsckReport {
    pub fn is_ok(&self) -> bool {
        self.corrupt.is_empty() && self.missing.is_empty()
    }
}

#[derive(Debug)]
pub struct MissingObject {
    pub hash: Hash,
    pub referenced_by: String,
}

/// verify object-graph integrity
///
/// every object reachable from the refs and HEAD is walked; every stored
/// object is re-hashed against its key. dangling objects are reported but
/// do not fail the check.
pub async fn fsck(repo: &Repo) -> Result<FsckReport> {
    let mut report = FsckReport::default();
    let mut reachable: HashSet<Hash> = HashSet::new();

    // roots: every born ref plus a detached HEAD
    let mut commit_queue: Vec<(Hash, String)> = repo
        .refs
        .iter()
        .filter_map(|(name, hash)| hash.map(|h| (h, name.to_string())))
        .collect();
    if let Head::Detached(hash) = &repo.head {
        commit_queue.push((*hash, "HEAD".to_string()));
    }

    let mut tree_queue: Vec<(Hash, String)> = Vec::new();

    while let Some((hash, referenced_by)) = commit_queue.pop() {
        if reachable.contains(&hash) {
            continue;
        }
        match repo.store.get(&hash).await {
            None => report.missing.push(MissingObject {
                hash,
                referenced_by,
            }),
            Some(Object::Commit(commit)) => {
                reachable.insert(hash);
                let label = format!("commit {}", hash);
                tree_queue.push((commit.tree, label.clone()));
                for parent in commit.parents {
                    commit_queue.push((parent, label.clone()));
                }
            }
            Some(_) => report.corrupt.push(hash),
        }
    }

    while let Some((hash, referenced_by)) = tree_queue.pop() {
        if reachable.contains(&hash) {
            continue;
        }
        match repo.store.get(&hash).await {
            None => report.missing.push(MissingObject {
                hash,
                referenced_by,
            }),
            Some(Object::Tree(tree)) => {
                reachable.insert(hash);

                // entries must be strictly increasing by name
                let sorted = tree
                    .entries()
                    .windows(2)
                    .all(|w| w[0].name.as_bytes() < w[1].name.as_bytes());
                if !sorted {
                    report.corrupt.push(hash);
                }

                let label = format!("tree {}", hash);
                for entry in tree.entries() {
                    match entry.kind {
                        EntryKind::Tree => tree_queue.push((entry.hash, label.clone())),
                        EntryKind::Blob => match repo.store.get(&entry.hash).await {
                            None => report.missing.push(MissingObject {
                                hash: entry.hash,
                                referenced_by: label.clone(),
                            }),
                            Some(Object::Blob(_)) => {
                                reachable.insert(entry.hash);
                            }
                            Some(_) => report.corrupt.push(entry.hash),
                        },
                    }
                }
            }
            Some(_) => report.corrupt.push(hash),
        }
    }

    // re-hash everything in the store
    for (hash, object) in repo.store.dump().await {
        report.objects_checked += 1;
        if object.hash() != hash {
            report.corrupt.push(hash);
        } else if !reachable.contains(&hash) {
            report.dangling.push(hash);
        }
    }

    Ok(report)
}
