use super::entry::EntryNode;
use crate::error::ShardisResult;
use crate::types::{Fetched, Update, ValueType};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Hash-bucket table for one block. Buckets are keyed by the full CRC32 of
/// the key; each bucket is a collision chain.
#[derive(Debug, Default)]
pub struct Storage {
    buckets: HashMap<u32, Box<EntryNode>>,
}

impl Storage {
    pub fn new() -> Self {
        Storage {
            buckets: HashMap::new(),
        }
    }

    pub fn get(
        &self,
        ty: ValueType,
        hash: u32,
        key: &[u8],
        fields: &[Vec<u8>],
    ) -> ShardisResult<Option<Fetched>> {
        match self.buckets.get(&hash) {
            Some(head) => head.get(ty, key, fields),
            None => Ok(None),
        }
    }

    /// Returns the number of map fields that did not exist before.
    pub fn set(&mut self, hash: u32, key: &[u8], update: Update<'_>) -> ShardisResult<usize> {
        match self.buckets.entry(hash) {
            Entry::Occupied(mut bucket) => bucket.get_mut().set(key, update),
            Entry::Vacant(bucket) => {
                let (node, added) = EntryNode::create(key, update);
                bucket.insert(Box::new(node));
                Ok(added)
            }
        }
    }

    /// Returns true if a node was unlinked.
    pub fn delete(&mut self, hash: u32, key: &[u8]) -> bool {
        let Some(head) = self.buckets.remove(&hash) else {
            return false;
        };
        let (rest, removed) = head.remove(key);
        if let Some(rest) = rest {
            self.buckets.insert(hash, rest);
        }
        removed
    }

    /// Number of stored keys across all chains.
    pub fn len(&self) -> usize {
        self.buckets.values().map(|head| head.chain_len()).sum()
    }
}
