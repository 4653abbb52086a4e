use std::collections::BTreeMap;

use crate::error::Result;
use crate::hash::Hash;
use crate::store::{read_tree, ObjectStore};
use crate::types::{EntryKind, Object, Tree, TreeEntry};

/// split a relative path into (parent dir, base name); parent is `""` at
/// the root
fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    }
}

fn depth(dir: &str) -> usize {
    if dir.is_empty() {
        0
    } else {
        dir.matches('/').count() + 1
    }
}

/// fold a flat `(relative path -> blob hash)` mapping into a tree DAG
///
/// builds one tree per directory, deepest first, storing each; the root
/// tree hash comes back. the result depends only on the final mapping,
/// never on the order writes happened in.
pub async fn build_tree(
    store: &dyn ObjectStore,
    files: &BTreeMap<String, Hash>,
) -> Result<Hash> {
    let mut dirs: BTreeMap<String, Vec<TreeEntry>> = BTreeMap::new();
    dirs.insert(String::new(), Vec::new());

    for (path, hash) in files {
        let (dir, name) = split_parent(path);
        dirs.entry(dir.to_string())
            .or_default()
            .push(TreeEntry::new(name, EntryKind::Blob, *hash));

        // register the ancestor chain so empty intermediates exist
        let mut cur = dir;
        while !cur.is_empty() {
            let (parent, _) = split_parent(cur);
            dirs.entry(parent.to_string()).or_default();
            cur = parent;
        }
    }

    // deepest directories first so parents see child hashes
    let mut names: Vec<String> = dirs.keys().filter(|d| !d.is_empty()).cloned().collect();
    names.sort_by_key(|d| std::cmp::Reverse(depth(d)));

    for name in names {
        let entries = dirs.remove(&name).unwrap_or_default();
        let tree = Tree::new(entries)?;
        let hash = store.put(Object::Tree(tree)).await;

        let (parent, base) = split_parent(&name);
        dirs.entry(parent.to_string())
            .or_default()
            .push(TreeEntry::new(base, EntryKind::Tree, hash));
    }

    let root_entries = dirs.remove("").unwrap_or_default();
    let root = Tree::new(root_entries)?;
    Ok(store.put(Object::Tree(root)).await)
}

/// flatten a tree DAG into a `(relative path -> blob hash)` mapping
pub async fn flatten_tree(
    store: &dyn ObjectStore,
    tree_hash: &Hash,
) -> Result<BTreeMap<String, Hash>> {
    let mut files = BTreeMap::new();
    let mut stack = vec![(String::new(), *tree_hash)];

    while let Some((prefix, hash)) = stack.pop() {
        let tree = read_tree(store, &hash).await?;
        for entry in tree.entries() {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{}/{}", prefix, entry.name)
            };
            match entry.kind {
                EntryKind::Blob => {
                    files.insert(path, entry.hash);
                }
                EntryKind::Tree => stack.push((path, entry.hash)),
            }
        }
    }

    Ok(files)
}

/// flatten the tree of a commit, or produce the empty mapping when there
/// is no commit (unborn branch)
pub(crate) async fn flatten_commit_tree(
    store: &dyn ObjectStore,
    commit: Option<Hash>,
) -> Result<BTreeMap<String, Hash>> {
    match commit {
        Some(hash) => {
            let commit = crate::store::read_commit(store, &hash).await?;
            flatten_tree(store, &commit.tree).await
        }
        None => Ok(BTreeMap::new()),
    }
}
