use crate::error::ShardisResult;
use crate::types::{Fetched, Update, Value, ValueType};

/// A keyed value inside one hash bucket. Keys whose hashes collide are
/// chained through `child` in insertion order.
#[derive(Debug)]
pub struct EntryNode {
    key: Vec<u8>,
    value: Value,
    child: Option<Box<EntryNode>>,
}

impl EntryNode {
    /// Create a node from its first write. Returns the node and the number
    /// of new map fields the write added.
    pub fn create(key: &[u8], update: Update<'_>) -> (Self, usize) {
        let (value, added) = Value::create(update);
        let node = EntryNode {
            key: key.to_vec(),
            value,
            child: None,
        };
        (node, added)
    }

    /// Update the node holding `key`, or append a new one at the tail.
    pub fn set(&mut self, key: &[u8], update: Update<'_>) -> ShardisResult<usize> {
        if self.key == key {
            return self.value.apply(update);
        }
        match self.child.as_deref_mut() {
            Some(child) => child.set(key, update),
            None => {
                let (node, added) = EntryNode::create(key, update);
                self.child = Some(Box::new(node));
                Ok(added)
            }
        }
    }

    /// Find the node holding `key` in this chain.
    pub fn find(&self, key: &[u8]) -> Option<&EntryNode> {
        let mut cursor = Some(self);
        while let Some(node) = cursor {
            if node.key == key {
                return Some(node);
            }
            cursor = node.child.as_deref();
        }
        None
    }

    pub fn get(&self, ty: ValueType, key: &[u8], fields: &[Vec<u8>]) -> ShardisResult<Option<Fetched>> {
        match self.find(key) {
            Some(node) => node.value.read(ty, fields).map(Some),
            None => Ok(None),
        }
    }

    /// Unlink the node holding `key`. Returns the new chain head (None when
    /// the chain is now empty) and whether a node was removed.
    pub fn remove(mut self: Box<Self>, key: &[u8]) -> (Option<Box<EntryNode>>, bool) {
        if self.key == key {
            return (self.child.take(), true);
        }
        match self.child.take() {
            Some(child) => {
                let (rest, removed) = child.remove(key);
                self.child = rest;
                (Some(self), removed)
            }
            None => (Some(self), false),
        }
    }

    /// Number of nodes in the chain starting here.
    pub fn chain_len(&self) -> usize {
        let mut len = 0;
        let mut cursor = Some(self);
        while let Some(node) = cursor {
            len += 1;
            cursor = node.child.as_deref();
        }
        len
    }
}
