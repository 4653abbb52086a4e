use crate::error::{Error, Result};
use crate::refs::RefTable;
use crate::repo::Repo;

/// create a branch at the current HEAD position
///
/// before the first commit the new branch is unborn, like `main`.
pub fn create_branch(repo: &mut Repo, name: &str) -> Result<()> {
    let full = RefTable::full_name(name);
    if repo.refs.contains(&full) {
        return Err(Error::BranchExists(name.to_string()));
    }
    repo.refs.set(full, repo.head_commit());
    Ok(())
}

/// delete a branch
///
/// refuses to remove the branch HEAD currently resolves through. a
/// detached HEAD guards nothing, even when it was last on this branch.
pub fn delete_branch(repo: &mut Repo, name: &str) -> Result<()> {
    let full = RefTable::full_name(name);
    if !repo.refs.contains(&full) {
        return Err(Error::BranchNotFound(name.to_string()));
    }
    if repo.head.symbolic() == Some(full.as_str()) {
        return Err(Error::CheckedOutBranch(name.to_string()));
    }
    repo.refs.remove(&full);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::checkout::checkout;
    use crate::ops::commit::{commit, CommitOptions};
    use crate::refs::Head;

    fn opts_at(timestamp: i64) -> CommitOptions {
        CommitOptions {
            timestamp: Some(timestamp),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_branch_at_head() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        let c1 = commit(&mut repo, "c1", opts_at(1)).await.unwrap();

        create_branch(&mut repo, "feat").unwrap();
        assert_eq!(repo.refs.get("refs/heads/feat"), Some(Some(c1)));
    }

    #[test]
    fn test_create_branch_before_first_commit_is_unborn() {
        let mut repo = Repo::new("/repo");
        create_branch(&mut repo, "feat").unwrap();
        assert_eq!(repo.refs.get("refs/heads/feat"), Some(None));
    }

    #[test]
    fn test_create_existing_branch_fails() {
        let mut repo = Repo::new("/repo");
        assert!(matches!(
            create_branch(&mut repo, "main"),
            Err(Error::BranchExists(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_current_branch_fails() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        commit(&mut repo, "c1", opts_at(1)).await.unwrap();

        assert!(matches!(
            delete_branch(&mut repo, "main"),
            Err(Error::CheckedOutBranch(_))
        ));
    }

    #[test]
    fn test_delete_missing_branch_fails() {
        let mut repo = Repo::new("/repo");
        assert!(matches!(
            delete_branch(&mut repo, "ghost"),
            Err(Error::BranchNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_other_branch() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        commit(&mut repo, "c1", opts_at(1)).await.unwrap();
        create_branch(&mut repo, "feat").unwrap();

        delete_branch(&mut repo, "feat").unwrap();
        assert!(!repo.refs.contains("refs/heads/feat"));
    }

    #[tokio::test]
    async fn test_detached_head_does_not_guard() {
        let mut repo = Repo::new("/repo");
        repo.write("a", "1");
        let c1 = commit(&mut repo, "c1", opts_at(1)).await.unwrap();
        repo.write("a", "2");
        commit(&mut repo, "c2", opts_at(2)).await.unwrap();

        checkout(&mut repo, &c1.to_hex()).await.unwrap();
        assert_eq!(repo.head, Head::Detached(c1));

        // detached: main is deletable
        delete_branch(&mut repo, "main").unwrap();
        assert!(!repo.refs.contains("refs/heads/main"));
    }
}
