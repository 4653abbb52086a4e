use crate::error::{Error, Result};
use crate::ops::trees::flatten_tree;
use crate::refs::{Head, RefTable};
use crate::repo::Repo;
use crate::store::{read_blob, read_commit};

/// restore the working tree from a commit
///
/// the target resolves as a hash, a full ref name, or a short branch name.
/// the working tree is cleared first: uncommitted edits are destroyed
/// without prompt - that is the documented contract. restored files start
/// back at version 0.
pub async fn checkout(repo: &mut Repo, hash_or_ref: &str) -> Result<()> {
    let hash = repo
        .resolve(hash_or_ref)
        .await
        .ok_or_else(|| Error::RefNotFound(hash_or_ref.to_string()))?;
    let commit = read_commit(repo.store.as_ref(), &hash).await?;

    let files = flatten_tree(repo.store.as_ref(), &commit.tree).await?;

    repo.worktree.clear();
    for (rel, blob_hash) in files {
        let blob = read_blob(repo.store.as_ref(), &blob_hash).await?;
        repo.worktree.write(rel, blob.content);
    }

    // full ref name, then short branch name, then detach
    repo.head = if repo.refs.contains(hash_or_ref) {
        Head::Symbolic(hash_or_ref.to_string())
    } else {
        let full = RefTable::full_name(hash_or_ref);
        if repo.refs.contains(&full) {
            Head::Symbolic(full)
        } else {
            Head::Detached(hash)
        }
    };

    Ok(())
}
