use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::types::Object;

/// content-addressed object storage
///
/// the interface is asynchronous so that disk-backed stores can slot in
/// behind the same engine; the in-memory default completes immediately.
/// implementations are safe per operation, callers serialize engine-level
/// sequences themselves.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// fetch an object by hash, `None` when absent
    async fn get(&self, hash: &Hash) -> Option<Object>;

    /// store an object under its content hash, returning the hash
    ///
    /// idempotent: writing an existing hash leaves the stored content
    /// untouched.
    async fn put(&self, object: Object) -> Hash;

    /// export every (hash, object) pair - snapshot use only, order not
    /// observable
    async fn dump(&self) -> Vec<(Hash, Object)>;

    /// replace the entire store contents
    ///
    /// fails without mutating when the input maps one hash to two distinct
    /// objects, or when an object's recomputed hash differs from its key.
    async fn load(&self, objects: Vec<(Hash, Object)>) -> Result<()>;
}

/// in-memory object store, the default backend
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<Hash, Object>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// number of stored objects
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, hash: &Hash) -> Option<Object> {
        self.objects.lock().get(hash).cloned()
    }

    async fn put(&self, object: Object) -> Hash {
        let hash = object.hash();
        self.objects.lock().entry(hash).or_insert(object);
        hash
    }

    async fn dump(&self) -> Vec<(Hash, Object)> {
        self.objects
            .lock()
            .iter()
            .map(|(h, o)| (*h, o.clone()))
            .collect()
    }

    async fn load(&self, objects: Vec<(Hash, Object)>) -> Result<()> {
        // validate before touching current contents
        let mut staged = HashMap::with_capacity(objects.len());
        for (hash, object) in objects {
            if object.hash() != hash {
                return Err(Error::CorruptObject(hash));
            }
            if let Some(existing) = staged.get(&hash) {
                // same hash seen twice: only acceptable when identical
                if *existing != object {
                    return Err(Error::CorruptSnapshot(format!(
                        "two distinct objects share hash {}",
                        hash
                    )));
                }
            }
            staged.insert(hash, object);
        }

        *self.objects.lock() = staged;
        Ok(())
    }
}

/// fetch a blob or fail
pub async fn read_blob(store: &dyn ObjectStore, hash: &Hash) -> Result<crate::types::Blob> {
    match store.get(hash).await {
        Some(Object::Blob(blob)) => Ok(blob),
        Some(_) => Err(Error::CorruptObject(*hash)),
        None => Err(Error::ObjectNotFound(*hash)),
    }
}

/// fetch a tree or fail
pub async fn read_tree(store: &dyn ObjectStore, hash: &Hash) -> Result<crate::types::Tree> {
    match store.get(hash).await {
        Some(Object::Tree(tree)) => Ok(tree),
        Some(_) => Err(Error::CorruptObject(*hash)),
        None => Err(Error::ObjectNotFound(*hash)),
    }
}

/// fetch a commit or fail
pub async fn read_commit(store: &dyn ObjectStore, hash: &Hash) -> Result<crate::types::Commit> {
    match store.get(hash).await {
        Some(Object::Commit(commit)) => Ok(commit),
        Some(_) => Err(Error::NotACommit(hash.to_hex())),
        None => Err(Error::ObjectNotFound(*hash)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Blob;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryStore::new();
        let obj = Object::Blob(Blob::new("hello"));
        let hash = store.put(obj.clone()).await;

        assert_eq!(store.get(&hash).await, Some(obj));
    }

    #[tokio::test]
    async fn test_get_absent() {
        let store = MemoryStore::new();
        assert!(store.get(&Hash::ZERO).await.is_none());
    }

    #[tokio::test]
    async fn test_put_idempotent() {
        let store = MemoryStore::new();
        let obj = Object::Blob(Blob::new("same"));
        let h1 = store.put(obj.clone()).await;
        let h2 = store.put(obj).await;

        assert_eq!(h1, h2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_dump_and_load_roundtrip() {
        let store = MemoryStore::new();
        store.put(Object::Blob(Blob::new("a"))).await;
        store.put(Object::Blob(Blob::new("b"))).await;

        let mut dumped = store.dump().await;
        dumped.sort_by_key(|(h, _)| *h);

        let fresh = MemoryStore::new();
        fresh.load(dumped.clone()).await.unwrap();

        let mut roundtripped = fresh.dump().await;
        roundtripped.sort_by_key(|(h, _)| *h);
        assert_eq!(dumped, roundtripped);
    }

    #[tokio::test]
    async fn test_load_rejects_bad_hash() {
        let store = MemoryStore::new();
        store.put(Object::Blob(Blob::new("keep"))).await;

        let result = store
            .load(vec![(Hash::ZERO, Object::Blob(Blob::new("bad key")))])
            .await;
        assert!(matches!(result, Err(Error::CorruptObject(_))));

        // prior contents intact
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_load_replaces_contents() {
        let store = MemoryStore::new();
        let old = store.put(Object::Blob(Blob::new("old"))).await;

        let new_obj = Object::Blob(Blob::new("new"));
        let new_hash = new_obj.hash();
        store.load(vec![(new_hash, new_obj)]).await.unwrap();

        assert!(store.get(&old).await.is_none());
        assert!(store.get(&new_hash).await.is_some());
    }
}
