use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::ops::checkout::checkout;
use crate::ops::commit::{commit, CommitOptions};
use crate::ops::trees::flatten_commit_tree;
use crate::repo::Repo;
use crate::store::{read_blob, read_commit, ObjectStore};

/// how a merge concluded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// theirs is already reachable from HEAD, nothing to do
    AlreadyUpToDate,
    /// HEAD was an ancestor of theirs; resolved by checkout
    FastForward,
    /// a new merge commit was created
    Merged(Hash),
}

impl std::fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeOutcome::AlreadyUpToDate => write!(f, "Already up to date"),
            MergeOutcome::FastForward => write!(f, "Fast-forward"),
            MergeOutcome::Merged(_) => write!(f, "Merge successful"),
        }
    }
}

/// merge a branch into the current branch
///
/// fails with [`Error::DetachedHead`] when HEAD is not on a branch.
/// three-way reconciliation against the nearest common ancestor. changes
/// coming from theirs are staged in a scratch list and applied to the
/// working tree only when every path reconciles, so a conflict leaves the
/// working tree untouched.
pub async fn merge(repo: &mut Repo, branch: &str) -> Result<MergeOutcome> {
    // the result advances the current branch, so there must be one
    if repo.head.is_detached() {
        return Err(Error::DetachedHead);
    }

    let theirs = repo
        .resolve(branch)
        .await
        .ok_or_else(|| Error::RefNotFound(branch.to_string()))?;
    let ours = repo
        .head_commit()
        .ok_or_else(|| Error::RefNotFound(repo.head.to_string()))?;

    if ours == theirs {
        return Ok(MergeOutcome::AlreadyUpToDate);
    }

    let base = merge_base(repo.store.as_ref(), ours, theirs).await?;
    if base == ours {
        checkout(repo, branch).await?;
        return Ok(MergeOutcome::FastForward);
    }
    if base == theirs {
        return Ok(MergeOutcome::AlreadyUpToDate);
    }

    let base_tree = flatten_commit_tree(repo.store.as_ref(), Some(base)).await?;
    let our_tree = flatten_commit_tree(repo.store.as_ref(), Some(ours)).await?;
    let their_tree = flatten_commit_tree(repo.store.as_ref(), Some(theirs)).await?;

    let paths: BTreeSet<&String> = base_tree
        .keys()
        .chain(our_tree.keys())
        .chain(their_tree.keys())
        .collect();

    // stage theirs-side changes; None means delete
    let mut staged: Vec<(String, Option<Hash>)> = Vec::new();
    for &path in &paths {
        let b = base_tree.get(path);
        let o = our_tree.get(path);
        let t = their_tree.get(path);

        if o == t {
            // both sides agree (including both deleted)
            continue;
        }
        if b == o {
            // only theirs moved: take it
            staged.push((path.clone(), t.copied()));
            continue;
        }
        if b == t {
            // only ours moved: keep it
            continue;
        }
        return Err(Error::MergeConflict(path.clone()));
    }

    for (path, blob_hash) in staged {
        match blob_hash {
            Some(hash) => {
                let blob = read_blob(repo.store.as_ref(), &hash).await?;
                repo.worktree.write(path, blob.content);
            }
            None => repo.worktree.delete(path),
        }
    }

    let message = format!("Merge branch '{}'", branch);
    let hash = commit(
        repo,
        &message,
        CommitOptions {
            parents: Some(vec![ours, theirs]),
            ..Default::default()
        },
    )
    .await?;

    Ok(MergeOutcome::Merged(hash))
}

/// nearest common ancestor of two commits
///
/// collects every ancestor of `ours`, then walks breadth-first from
/// `theirs`; the first hash already seen on the ours side is the base.
async fn merge_base(store: &dyn ObjectStore, ours: Hash, theirs: Hash) -> Result<Hash> {
    let mut our_ancestors = HashSet::new();
    let mut queue = VecDeque::from([ours]);
    while let Some(hash) = queue.pop_front() {
        if !our_ancestors.insert(hash) {
            continue;
        }
        let commit = read_commit(store, &hash).await?;
        queue.extend(commit.parents);
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([theirs]);
    while let Some(hash) = queue.pop_front() {
        if our_ancestors.contains(&hash) {
            return Ok(hash);
        }
        if !visited.insert(hash) {
            continue;
        }
        let commit = read_commit(store, &hash).await?;
        queue.extend(commit.parents);
    }

    Err(Error::UnrelatedHistories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::branch::create_branch;
    use crate::ops::log::log;
    use crate::refs::Head;

    fn opts_at(timestamp: i64) -> CommitOptions {
        CommitOptions {
            timestamp: Some(timestamp),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fast_forward() {
        let mut repo = Repo::new("/repo");
        repo.write("a.txt", "A");
        commit(&mut repo, "c1", opts_at(1)).await.unwrap();

        create_branch(&mut repo, "feat").unwrap();
        checkout(&mut repo, "feat").await.unwrap();
        repo.write("b.txt", "B");
        commit(&mut repo, "c2", opts_at(2)).await.unwrap();

        checkout(&mut repo, "main").await.unwrap();
        let outcome = merge(&mut repo, "feat").await.unwrap();

        assert_eq!(outcome, MergeOutcome::FastForward);
        assert_eq!(outcome.to_string(), "Fast-forward");
        assert_eq!(repo.read("b.txt").unwrap().content, "B");
        assert_eq!(log(&mut repo, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_three_way_no_conflict() {
        let mut repo = Repo::new("/repo");
        repo.write("base.txt", "base");
        commit(&mut repo, "init", opts_at(1)).await.unwrap();

        create_branch(&mut repo, "feat").unwrap();
        checkout(&mut repo, "feat").await.unwrap();
        repo.write("feat.txt", "feat");
        commit(&mut repo, "fc", opts_at(2)).await.unwrap();

        checkout(&mut repo, "main").await.unwrap();
        repo.write("main.txt", "main");
        commit(&mut repo, "mc", opts_at(3)).await.unwrap();

        let outcome = merge(&mut repo, "feat").await.unwrap();
        assert_eq!(outcome.to_string(), "Merge successful");

        assert_eq!(repo.read("base.txt").unwrap().content, "base");
        assert_eq!(repo.read("feat.txt").unwrap().content, "feat");
        assert_eq!(repo.read("main.txt").unwrap().content, "main");

        let entries = log(&mut repo, None).await.unwrap();
        assert_eq!(entries[0].commit.parents.len(), 2);
    }

    #[tokio::test]
    async fn test_conflict_leaves_worktree_untouched() {
        let mut repo = Repo::new("/repo");
        repo.write("x", "0");
        commit(&mut repo, "c0", opts_at(1)).await.unwrap();

        create_branch(&mut repo, "b").unwrap();
        checkout(&mut repo, "b").await.unwrap();
        repo.write("x", "B");
        commit(&mut repo, "cb", opts_at(2)).await.unwrap();

        checkout(&mut repo, "main").await.unwrap();
        repo.write("x", "M");
        commit(&mut repo, "cm", opts_at(3)).await.unwrap();

        let result = merge(&mut repo, "b").await;
        match result {
            Err(Error::MergeConflict(path)) => assert_eq!(path, "x"),
            other => panic!("expected conflict, got {:?}", other),
        }

        // ours side intact
        assert_eq!(repo.read("x").unwrap().content, "M");
    }

    #[tokio::test]
    async fn test_merge_equal_heads_already_up_to_date() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        commit(&mut repo, "c1", opts_at(1)).await.unwrap();
        create_branch(&mut repo, "same").unwrap();

        let outcome = merge(&mut repo, "same").await.unwrap();
        assert_eq!(outcome, MergeOutcome::AlreadyUpToDate);
        assert_eq!(outcome.to_string(), "Already up to date");
    }

    #[tokio::test]
    async fn test_merge_ancestor_already_up_to_date() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        commit(&mut repo, "c1", opts_at(1)).await.unwrap();
        create_branch(&mut repo, "old").unwrap();
        repo.write("a", "2");
        commit(&mut repo, "c2", opts_at(2)).await.unwrap();

        let outcome = merge(&mut repo, "old").await.unwrap();
        assert_eq!(outcome, MergeOutcome::AlreadyUpToDate);
    }

    #[tokio::test]
    async fn test_unrelated_histories() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        commit(&mut repo, "c1", opts_at(1)).await.unwrap();

        // a second root commit on an orphan branch
        repo.refs.set("refs/heads/orphan", None);
        repo.head = Head::Symbolic("refs/heads/orphan".to_string());
        repo.write("b", "2");
        commit(&mut repo, "orphan", opts_at(2)).await.unwrap();

        let result = merge(&mut repo, "main").await;
        assert!(matches!(result, Err(Error::UnrelatedHistories)));
    }

    #[tokio::test]
    async fn test_merge_detached_head_fails() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        let c1 = commit(&mut repo, "c1", opts_at(1)).await.unwrap();

        create_branch(&mut repo, "feat").unwrap();
        checkout(&mut repo, "feat").await.unwrap();
        repo.write("b", "2");
        commit(&mut repo, "c2", opts_at(2)).await.unwrap();

        // detach onto the first commit, then try to merge
        checkout(&mut repo, &c1.to_hex()).await.unwrap();
        let result = merge(&mut repo, "feat").await;
        assert!(matches!(result, Err(Error::DetachedHead)));
    }

    #[tokio::test]
    async fn test_merge_takes_their_delete() {
        let mut repo = Repo::new("/repo");
        repo.write("doomed.txt", "x");
        repo.write("keep.txt", "k");
        commit(&mut repo, "c0", opts_at(1)).await.unwrap();

        create_branch(&mut repo, "cleanup").unwrap();
        checkout(&mut repo, "cleanup").await.unwrap();
        repo.delete("doomed.txt");
        commit(&mut repo, "rm", opts_at(2)).await.unwrap();

        checkout(&mut repo, "main").await.unwrap();
        repo.write("keep.txt", "k2");
        commit(&mut repo, "edit", opts_at(3)).await.unwrap();

        let outcome = merge(&mut repo, "cleanup").await.unwrap();
        assert!(matches!(outcome, MergeOutcome::Merged(_)));
        assert!(repo.read("doomed.txt").is_none());
        assert_eq!(repo.read("keep.txt").unwrap().content, "k2");
    }

    #[tokio::test]
    async fn test_merge_base_linear() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        let c1 = commit(&mut repo, "c1", opts_at(1)).await.unwrap();
        repo.write("a", "2");
        let c2 = commit(&mut repo, "c2", opts_at(2)).await.unwrap();

        let base = merge_base(repo.store.as_ref(), c2, c1).await.unwrap();
        assert_eq!(base, c1);
        let base = merge_base(repo.store.as_ref(), c1, c2).await.unwrap();
        assert_eq!(base, c1);
    }
}
