use std::collections::BTreeMap;

use crate::error::Result;
use crate::hash::Hash;
use crate::ops::trees::build_tree;
use crate::refs::Head;
use crate::repo::Repo;
use crate::types::{Blob, Commit, Object};

/// commit options
#[derive(Clone, Debug, Default)]
pub struct CommitOptions {
    /// author identity, defaults to "loam"
    pub author: Option<String>,
    /// explicit parents, overriding the resolved HEAD
    pub parents: Option<Vec<Hash>>,
    /// author timestamp in milliseconds; defaults to wall-clock time.
    /// tests inject a fixed value here for determinism.
    pub timestamp: Option<i64>,
}

/// current wall-clock time in milliseconds since the epoch
pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// snapshot the working tree into a new commit
///
/// every live file (after ignore filtering) becomes a blob; the flat path
/// mapping folds into a tree DAG; the commit object points at the root
/// tree. all object writes land before the reference update publishes the
/// result. committing an unchanged tree is permitted and produces a new
/// commit.
pub async fn commit(repo: &mut Repo, message: &str, opts: CommitOptions) -> Result<Hash> {
    let filter = repo.ignore_filter();

    // blobs for every surviving file
    let mut files: BTreeMap<String, Hash> = BTreeMap::new();
    let mut blobs = Vec::new();
    for entry in repo.worktree.files() {
        let rel = repo.worktree.rel_path(&entry.path);
        if let Some(filter) = &filter {
            if filter.ignores(&rel) {
                continue;
            }
        }
        let blob = Object::Blob(Blob::new(entry.content.clone()));
        files.insert(rel, blob.hash());
        blobs.push(blob);
    }
    for blob in blobs {
        repo.store.put(blob).await;
    }

    let tree = build_tree(repo.store.as_ref(), &files).await?;

    let parents = match opts.parents {
        Some(parents) => parents,
        None => repo.head_commit().into_iter().collect(),
    };
    let commit = Commit::new(
        tree,
        parents,
        opts.author.as_deref().unwrap_or("loam"),
        opts.timestamp.unwrap_or_else(now_millis),
        message,
    );
    let hash = repo.store.put(Object::Commit(commit)).await;

    // publish: advance the current branch, or HEAD itself when detached
    match repo.head.clone() {
        Head::Symbolic(name) => repo.refs.set(name, Some(hash)),
        Head::Detached(_) => repo.head = Head::Detached(hash),
    }

    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::MAIN;
    use crate::store::read_commit;

    fn opts_at(timestamp: i64) -> CommitOptions {
        CommitOptions {
            timestamp: Some(timestamp),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_first_commit_has_no_parents() {
        let mut repo = Repo::new("/repo");
        repo.write("a.txt", "A");

        let hash = commit(&mut repo, "c1", opts_at(1)).await.unwrap();
        let c = read_commit(repo.store.as_ref(), &hash).await.unwrap();

        assert!(c.parents.is_empty());
        assert_eq!(c.message, "c1");
        assert_eq!(repo.refs.get(MAIN), Some(Some(hash)));
        assert_eq!(repo.head_commit(), Some(hash));
    }

    #[tokio::test]
    async fn test_second_commit_chains_to_first() {
        let mut repo = Repo::new("/repo");
        repo.write("a.txt", "A");
        let c1 = commit(&mut repo, "c1", opts_at(1)).await.unwrap();

        repo.write("a.txt", "A2");
        let c2 = commit(&mut repo, "c2", opts_at(2)).await.unwrap();

        let c = read_commit(repo.store.as_ref(), &c2).await.unwrap();
        assert_eq!(c.parents, vec![c1]);
    }

    #[tokio::test]
    async fn test_empty_commit_allowed() {
        let mut repo = Repo::new("/repo");
        repo.write("a.txt", "A");
        let c1 = commit(&mut repo, "c1", opts_at(1)).await.unwrap();
        let c2 = commit(&mut repo, "c2", opts_at(2)).await.unwrap();

        assert_ne!(c1, c2);
        let first = read_commit(repo.store.as_ref(), &c1).await.unwrap();
        let second = read_commit(repo.store.as_ref(), &c2).await.unwrap();
        assert_eq!(first.tree, second.tree);
    }

    #[tokio::test]
    async fn test_ignored_files_excluded() {
        let mut repo = Repo::new("/repo");
        repo.write(".gitignore", "*.log\n");
        repo.write("keep.txt", "k");
        repo.write("debug.log", "noise");

        let hash = commit(&mut repo, "c", opts_at(1)).await.unwrap();
        let c = read_commit(repo.store.as_ref(), &hash).await.unwrap();
        let flat = crate::ops::trees::flatten_tree(repo.store.as_ref(), &c.tree)
            .await
            .unwrap();

        assert!(flat.contains_key("keep.txt"));
        assert!(flat.contains_key(".gitignore"));
        assert!(!flat.contains_key("debug.log"));
    }

    #[tokio::test]
    async fn test_explicit_parents_override_head() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        let c1 = commit(&mut repo, "c1", opts_at(1)).await.unwrap();
        commit(&mut repo, "c2", opts_at(2)).await.unwrap();

        let c3 = commit(
            &mut repo,
            "c3",
            CommitOptions {
                parents: Some(vec![c1]),
                timestamp: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let c = read_commit(repo.store.as_ref(), &c3).await.unwrap();
        assert_eq!(c.parents, vec![c1]);
    }

    #[tokio::test]
    async fn test_tree_hash_is_order_independent() {
        // same final file set through different edit sequences
        let mut one = Repo::new("/repo");
        one.write("a", "1");
        one.write("b", "tmp");
        one.delete("b");
        one.write("c/d", "2");

        let mut two = Repo::new("/repo");
        two.write("c/d", "2");
        two.write("a", "1");

        let h1 = commit(&mut one, "m", opts_at(5)).await.unwrap();
        let h2 = commit(&mut two, "m", opts_at(5)).await.unwrap();

        let t1 = read_commit(one.store.as_ref(), &h1).await.unwrap().tree;
        let t2 = read_commit(two.store.as_ref(), &h2).await.unwrap().tree;
        assert_eq!(t1, t2);
        // identical metadata too, so the commit hashes agree
        assert_eq!(h1, h2);
    }

    #[tokio::test]
    async fn test_detached_commit_advances_head_only() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        let c1 = commit(&mut repo, "c1", opts_at(1)).await.unwrap();

        repo.head = Head::Detached(c1);
        repo.write("a", "2");
        let c2 = commit(&mut repo, "c2", opts_at(2)).await.unwrap();

        assert_eq!(repo.head, Head::Detached(c2));
        // the branch stayed where it was
        assert_eq!(repo.refs.get(MAIN), Some(Some(c1)));
    }
}
