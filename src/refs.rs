use std::collections::BTreeMap;

use crate::hash::Hash;

/// prefix for branch refs
pub const HEADS_PREFIX: &str = "refs/heads/";

/// the default branch ref, present from construction
pub const MAIN: &str = "refs/heads/main";

/// the current position in the commit graph
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Head {
    /// points through a named ref
    Symbolic(String),
    /// points directly at a commit
    Detached(Hash),
}

impl Head {
    pub fn is_detached(&self) -> bool {
        matches!(self, Head::Detached(_))
    }

    /// the ref name when symbolic
    pub fn symbolic(&self) -> Option<&str> {
        match self {
            Head::Symbolic(name) => Some(name),
            Head::Detached(_) => None,
        }
    }
}

impl std::fmt::Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Head::Symbolic(name) => write!(f, "{}", name),
            Head::Detached(hash) => write!(f, "{}", hash),
        }
    }
}

/// named pointers into the commit graph
///
/// a ref holding `None` exists but has no commits yet (an unborn branch);
/// `refs/heads/main` starts that way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefTable {
    refs: BTreeMap<String, Option<Hash>>,
}

impl RefTable {
    /// table with the unborn `main` branch seeded
    pub fn new() -> Self {
        let mut refs = BTreeMap::new();
        refs.insert(MAIN.to_string(), None);
        Self { refs }
    }

    /// expand a short branch name to its full ref name
    pub fn full_name(name: &str) -> String {
        if name.starts_with("refs/") {
            name.to_string()
        } else {
            format!("{}{}", HEADS_PREFIX, name)
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.refs.contains_key(name)
    }

    /// value of a ref; outer `None` when the ref does not exist, inner
    /// `None` when it is unborn
    pub fn get(&self, name: &str) -> Option<Option<Hash>> {
        self.refs.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, hash: Option<Hash>) {
        self.refs.insert(name.into(), hash);
    }

    pub fn remove(&mut self, name: &str) -> Option<Option<Hash>> {
        self.refs.remove(name)
    }

    /// all refs, ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Hash>)> {
        self.refs.iter().map(|(name, hash)| (name.as_str(), *hash))
    }

    /// short names of all branches under `refs/heads/`, ordered
    pub fn branches(&self) -> Vec<String> {
        self.refs
            .keys()
            .filter_map(|name| name.strip_prefix(HEADS_PREFIX))
            .map(String::from)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
