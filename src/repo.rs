use std::path::{Path, PathBuf};

use crate::hash::Hash;
use crate::ignore::IgnoreFilter;
use crate::refs::{Head, RefTable, HEADS_PREFIX, MAIN};
use crate::store::{MemoryStore, ObjectStore};
use crate::worktree::{FileEntry, WorkTree};

/// options for [`Repo::readdir`]
#[derive(Clone, Copy, Debug, Default)]
pub struct ReaddirOptions {
    /// return full descendant paths instead of immediate child names
    pub recursive: bool,
    /// apply the working tree's `.gitignore`, if present
    pub ignore: bool,
}

/// the version engine
///
/// composes the object store, working tree, ignore filter, and reference
/// table behind the mutation and history API. one instance expects
/// cooperative single-threaded access; callers serialize.
pub struct Repo {
    root: PathBuf,
    pub(crate) store: Box<dyn ObjectStore>,
    pub(crate) worktree: WorkTree,
    pub(crate) refs: RefTable,
    pub(crate) head: Head,
}

impl Repo {
    /// engine rooted at `root` over the in-memory store
    ///
    /// `refs/heads/main` exists from the start, unborn; HEAD points at it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_store(root, Box::new(MemoryStore::new()))
    }

    /// engine over a caller-supplied object store
    pub fn with_store(root: impl Into<PathBuf>, store: Box<dyn ObjectStore>) -> Self {
        let root = root.into();
        Self {
            worktree: WorkTree::new(&root),
            store,
            refs: RefTable::new(),
            head: Head::Symbolic(MAIN.to_string()),
            root,
        }
    }

    /// engine root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn refs(&self) -> &RefTable {
        &self.refs
    }

    pub fn head(&self) -> &Head {
        &self.head
    }

    // ------------------------------------------------------------------
    // working tree surface
    // ------------------------------------------------------------------

    /// create or update a file
    pub fn write(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.worktree.write(path, content);
    }

    /// read a live file
    pub fn read(&self, path: impl AsRef<Path>) -> Option<&FileEntry> {
        self.worktree.read(path)
    }

    /// remove a live file; absent paths are a silent no-op
    pub fn delete(&mut self, path: impl AsRef<Path>) {
        self.worktree.delete(path);
    }

    /// every live file, ordered by path
    pub fn get_all_files(&self) -> Vec<&FileEntry> {
        self.worktree.files().collect()
    }

    /// list names under `path`, sorted ascending
    ///
    /// non-recursive listings fold descendants to their unique first
    /// segment; recursive listings return full relative paths.
    pub fn readdir(&self, path: impl AsRef<Path>, opts: ReaddirOptions) -> Vec<String> {
        let dir = self.worktree.resolve(&path);
        let filter = if opts.ignore { self.ignore_filter() } else { None };

        let mut names = Vec::new();
        for rel in self.worktree.descendants(&dir) {
            if let Some(filter) = &filter {
                let from_root = self.worktree.rel_path(&dir.join(&rel));
                if filter.ignores(&from_root) {
                    continue;
                }
            }
            if opts.recursive {
                names.push(rel);
            } else if let Some(first) = rel.split('/').next() {
                names.push(first.to_string());
            }
        }
        names.sort();
        names.dedup();
        names
    }

    /// filter parsed from the working tree's root `.gitignore`, if present
    pub fn ignore_filter(&self) -> Option<IgnoreFilter> {
        self.worktree
            .read(".gitignore")
            .map(|f| IgnoreFilter::parse(&f.content))
    }

    // ------------------------------------------------------------------
    // resolution
    // ------------------------------------------------------------------

    /// the commit HEAD currently points at, `None` while unborn
    pub fn head_commit(&self) -> Option<Hash> {
        match &self.head {
            Head::Symbolic(name) => self.refs.get(name).flatten(),
            Head::Detached(hash) => Some(*hash),
        }
    }

    /// resolve a hash or ref name to a commit-graph hash
    ///
    /// order: exact object hash in the store, then full ref name, then
    /// short branch name under `refs/heads/`.
    pub async fn resolve(&self, hash_or_ref: &str) -> Option<Hash> {
        if let Ok(hash) = Hash::from_hex(hash_or_ref) {
            if self.store.get(&hash).await.is_some() {
                return Some(hash);
            }
        }
        if let Some(value) = self.refs.get(hash_or_ref) {
            return value;
        }
        self.refs
            .get(&format!("{}{}", HEADS_PREFIX, hash_or_ref))
            .flatten()
    }
}
