pub mod entry;
pub mod partition;
pub mod router;
pub mod storage;

use crate::error::ShardisResult;
use crate::types::{Fetched, Update, ValueType};
use router::HashRouter;
use std::sync::Arc;

/// Default number of blocks in the hashed key space.
pub const DEFAULT_BLOCK_COUNT: u32 = 20;
/// Default number of partitions the blocks are split across.
pub const DEFAULT_NODE_COUNT: u32 = 10;

/// The sharded in-memory store. Each block is locked independently, so the
/// store itself is shared without an outer lock.
#[derive(Debug)]
pub struct ShardedStore {
    router: HashRouter,
}

impl ShardedStore {
    pub fn new(block_count: u32, node_count: u32) -> ShardisResult<Self> {
        Ok(ShardedStore {
            router: HashRouter::new(block_count, node_count)?,
        })
    }

    pub fn router(&self) -> &HashRouter {
        &self.router
    }

    /// Typed read. `Ok(None)` means the key does not exist.
    pub fn get(&self, ty: ValueType, key: &[u8], fields: &[Vec<u8>]) -> ShardisResult<Option<Fetched>> {
        let route = self.router.route(key)?;
        route.partition.get(ty, route.block, route.hash, key, fields)
    }

    /// Typed write. Returns the number of map fields that were added.
    pub fn set(&self, key: &[u8], update: Update<'_>) -> ShardisResult<usize> {
        let route = self.router.route(key)?;
        route.partition.set(route.block, route.hash, key, update)
    }

    /// Returns true if the key existed.
    pub fn delete(&self, key: &[u8]) -> ShardisResult<bool> {
        let route = self.router.route(key)?;
        route.partition.delete(route.block, route.hash, key)
    }

    pub fn get_string(&self, key: &[u8]) -> ShardisResult<Option<Vec<u8>>> {
        match self.get(ValueType::String, key, &[])? {
            Some(Fetched::String(s)) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    pub fn get_fields(&self, key: &[u8], fields: &[Vec<u8>]) -> ShardisResult<Option<Vec<Vec<u8>>>> {
        match self.get(ValueType::Map, key, fields)? {
            Some(Fetched::Fields(values)) => Ok(Some(values)),
            _ => Ok(None),
        }
    }

    /// Total number of keys across every partition.
    pub fn key_count(&self) -> usize {
        self.router.partitions().iter().map(|p| p.key_count()).sum()
    }
}

impl Default for ShardedStore {
    fn default() -> Self {
        ShardedStore {
            router: HashRouter::new(DEFAULT_BLOCK_COUNT, DEFAULT_NODE_COUNT)
                .expect("default topology is valid"),
        }
    }
}

pub type SharedStore = Arc<ShardedStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShardisError;

    fn strings(items: &[&str]) -> Vec<Vec<u8>> {
        items.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_set_get_roundtrip_many_keys() {
        let store = ShardedStore::default();
        for i in 0..500 {
            let key = format!("key:{i}");
            store.set(key.as_bytes(), Update::String(format!("v{i}").as_bytes())).unwrap();
        }
        for i in 0..500 {
            let key = format!("key:{i}");
            assert_eq!(store.get_string(key.as_bytes()).unwrap(), Some(format!("v{i}").into_bytes()));
        }
        assert_eq!(store.key_count(), 500);
    }

    #[test]
    fn test_type_mismatch_across_store() {
        let store = ShardedStore::default();
        store.set(b"s", Update::String(b"1")).unwrap();
        store.set(b"h", Update::Map(&strings(&["f", "v"]))).unwrap();

        assert!(matches!(store.get_fields(b"s", &[]), Err(ShardisError::WrongType)));
        assert!(matches!(store.get_string(b"h"), Err(ShardisError::WrongType)));
    }

    #[test]
    fn test_hset_counts_and_overwrites() {
        let store = ShardedStore::default();
        assert_eq!(store.set(b"k", Update::Map(&strings(&["f1", "v1", "f2", "v1"]))).unwrap(), 2);
        assert_eq!(store.set(b"k", Update::Map(&strings(&["f1", "v2"]))).unwrap(), 0);
        assert_eq!(
            store.get_fields(b"k", &strings(&["f1", "missing"])).unwrap(),
            Some(strings(&["v2", "-1"]))
        );
    }

    #[test]
    fn test_delete() {
        let store = ShardedStore::default();
        assert!(!store.delete(b"ghost").unwrap());
        store.set(b"k", Update::String(b"v")).unwrap();
        assert!(store.delete(b"k").unwrap());
        assert_eq!(store.get_string(b"k").unwrap(), None);
    }

    #[test]
    fn test_custom_topology() {
        let store = ShardedStore::new(7, 3).unwrap();
        assert_eq!(store.router().block_count(), 7);
        assert_eq!(store.router().partitions().len(), 3);
        assert!(ShardedStore::new(2, 4).is_err());
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(ShardedStore::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("t{t}:{i}");
                        store.set(key.as_bytes(), Update::String(key.as_bytes())).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.key_count(), 1600);
        assert_eq!(store.get_string(b"t3:17").unwrap(), Some(b"t3:17".to_vec()));
    }
}
