use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash;

/// a directory tree - collection of entries sorted by name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// create a new tree from entries
    ///
    /// entries end up sorted ascending by raw name bytes. names must be
    /// valid single path segments, and two entries may not share a name.
    pub fn new(entries: Vec<TreeEntry>) -> Result<Self> {
        let mut sorted: Vec<TreeEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            check_entry_name(&entry.name)?;
            // an exact hit at the insertion point is a name collision
            let probe =
                sorted.binary_search_by(|e| e.name.as_bytes().cmp(entry.name.as_bytes()));
            match probe {
                Ok(_) => return Err(Error::DuplicateEntryName(entry.name)),
                Err(pos) => sorted.insert(pos, entry),
            }
        }
        Ok(Self { entries: sorted })
    }

    /// create an empty tree
    pub fn empty() -> Self {
        Self { entries: vec![] }
    }

    /// get entries slice
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// look up entry by name
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_bytes().cmp(name.as_bytes()))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is tree empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// a tree entry name is one non-empty path segment: no separator, no NUL,
/// and not one of the dot names the walk would misread
fn check_entry_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name != "."
        && name != ".."
        && name.bytes().all(|b| b != b'/' && b != 0);
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidEntryName(name.to_string()))
    }
}

/// a single entry in a tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub kind: EntryKind,
    pub hash: Hash,
    pub name: String,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind, hash: Hash) -> Self {
        Self {
            kind,
            hash,
            name: name.into(),
        }
    }

    /// fixed mode token for this entry's kind
    pub fn mode(&self) -> &'static str {
        self.kind.mode()
    }
}

/// kind of tree entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// regular file (blob)
    Blob,
    /// subdirectory (tree)
    Tree,
}

impl EntryKind {
    /// type tag used in serialized tree lines
    pub fn tag(&self) -> &'static str {
        match self {
            EntryKind::Blob => "blob",
            EntryKind::Tree => "tree",
        }
    }

    /// fixed mode token: "100644" for blobs, "040000" for trees
    pub fn mode(&self) -> &'static str {
        match self {
            EntryKind::Blob => "100644",
            EntryKind::Tree => "040000",
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryKind::Tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_empty() {
        let t = Tree::empty();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn test_tree_sorting() {
        let entries = vec![
            TreeEntry::new("zebra", EntryKind::Blob, Hash::ZERO),
            TreeEntry::new("alpha", EntryKind::Blob, Hash::ZERO),
            TreeEntry::new("beta", EntryKind::Tree, Hash::ZERO),
        ];
        let tree = Tree::new(entries).unwrap();
        let names: Vec<_> = tree.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "zebra"]);
    }

    #[test]
    fn test_tree_get() {
        let entries = vec![
            TreeEntry::new("alpha", EntryKind::Blob, Hash::ZERO),
            TreeEntry::new("beta", EntryKind::Tree, Hash::ZERO),
        ];
        let tree = Tree::new(entries).unwrap();

        assert!(tree.get("alpha").is_some());
        assert!(tree.get("beta").is_some());
        assert!(tree.get("gamma").is_none());
    }

    #[test]
    fn test_tree_rejects_empty_name() {
        let entries = vec![TreeEntry::new("", EntryKind::Blob, Hash::ZERO)];
        assert!(Tree::new(entries).is_err());
    }

    #[test]
    fn test_tree_rejects_slash_in_name() {
        let entries = vec![TreeEntry::new("foo/bar", EntryKind::Blob, Hash::ZERO)];
        assert!(Tree::new(entries).is_err());
    }

    #[test]
    fn test_tree_rejects_dot_names() {
        assert!(Tree::new(vec![TreeEntry::new(".", EntryKind::Blob, Hash::ZERO)]).is_err());
        assert!(Tree::new(vec![TreeEntry::new("..", EntryKind::Blob, Hash::ZERO)]).is_err());
    }

    #[test]
    fn test_tree_rejects_duplicates() {
        let entries = vec![
            TreeEntry::new("same", EntryKind::Blob, Hash::ZERO),
            TreeEntry::new("same", EntryKind::Tree, Hash::ZERO),
        ];
        assert!(Tree::new(entries).is_err());
    }

    #[test]
    fn test_entry_modes() {
        assert_eq!(EntryKind::Blob.mode(), "100644");
        assert_eq!(EntryKind::Tree.mode(), "040000");
    }
}
