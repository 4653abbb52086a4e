use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// a commit object pointing to a tree with metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// root tree hash
    pub tree: Hash,
    /// parent commit hashes (empty for initial, 1 for linear, 2+ for merge)
    pub parents: Vec<Hash>,
    /// author identity
    pub author: String,
    /// unix timestamp (milliseconds since epoch)
    pub timestamp: i64,
    /// commit message
    pub message: String,
}

impl Commit {
    /// create a new commit
    pub fn new(
        tree: Hash,
        parents: Vec<Hash>,
        author: impl Into<String>,
        timestamp: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parents,
            author: author.into(),
            timestamp,
            message: message.into(),
        }
    }

    /// is this an initial commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// is this a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_new() {
        let c = Commit::new(Hash::ZERO, vec![], "author", 0, "message");
        assert_eq!(c.tree, Hash::ZERO);
        assert!(c.parents.is_empty());
        assert_eq!(c.author, "author");
        assert_eq!(c.message, "message");
        assert!(c.is_root());
        assert!(!c.is_merge());
    }

    #[test]
    fn test_commit_with_parent() {
        let parent = Hash::from_hex("abcdef0123456789abcdef0123456789abcdef01").unwrap();
        let c = Commit::new(Hash::ZERO, vec![parent], "author", 0, "message");
        assert!(!c.is_root());
        assert!(!c.is_merge());
    }

    #[test]
    fn test_commit_merge() {
        let p1 = Hash::from_hex("1111111111111111111111111111111111111111").unwrap();
        let p2 = Hash::from_hex("2222222222222222222222222222222222222222").unwrap();
        let c = Commit::new(Hash::ZERO, vec![p1, p2], "author", 0, "merge");
        assert!(c.is_merge());
    }
}
