use serde::{Deserialize, Serialize};

use crate::hash::{hash_bytes, Hash};
use crate::types::{Commit, Tree};

/// a blob - immutable file payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub content: String,
}

impl Blob {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// an object stored in the object database
///
/// objects are a tagged union, not a class hierarchy: serialization and
/// hashing dispatch on the tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

/// object kind tag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob(_) => ObjectKind::Blob,
            Object::Tree(_) => ObjectKind::Tree,
            Object::Commit(_) => ObjectKind::Commit,
        }
    }

    /// serialize the object payload
    ///
    /// this byte format is normative - object hashes are computed over it,
    /// so any change breaks hash stability:
    /// - blob: raw content bytes
    /// - tree: one `"<mode> <kind> <hex-hash> <name>"` line per entry,
    ///   joined by a single newline, no trailing newline
    /// - commit: `tree`, `parent` (per parent, in order), `author`,
    ///   `committer` (equal to author) lines, a blank line, then the
    ///   message verbatim
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Object::Blob(blob) => blob.content.as_bytes().to_vec(),
            Object::Tree(tree) => {
                let lines: Vec<String> = tree
                    .entries()
                    .iter()
                    .map(|e| {
                        format!("{} {} {} {}", e.mode(), e.kind.tag(), e.hash.to_hex(), e.name)
                    })
                    .collect();
                lines.join("\n").into_bytes()
            }
            Object::Commit(commit) => {
                let mut lines = vec![format!("tree {}", commit.tree.to_hex())];
                for parent in &commit.parents {
                    lines.push(format!("parent {}", parent.to_hex()));
                }
                lines.push(format!("author {} {}", commit.author, commit.timestamp));
                lines.push(format!("committer {} {}", commit.author, commit.timestamp));
                lines.push(String::new());
                lines.push(commit.message.clone());
                lines.join("\n").into_bytes()
            }
        }
    }

    /// compute the content hash of this object
    pub fn hash(&self) -> Hash {
        hash_bytes(self.kind().tag(), &self.payload())
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Object::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Object::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Object::Commit(c) => Some(c),
            _ => None,
        }
    }
}
