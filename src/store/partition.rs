use super::storage::Storage;
use crate::error::{ShardisError, ShardisResult};
use crate::types::{Fetched, Update, ValueType};
use parking_lot::Mutex;

/// Inclusive range of block numbers `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: u32,
    pub end: u32,
}

impl BlockRange {
    pub fn new(start: u32, end: u32) -> Self {
        BlockRange { start, end }
    }

    pub fn contains(&self, block: u32) -> bool {
        block >= self.start && block <= self.end
    }

    pub fn block_count(&self) -> u32 {
        self.end + 1 - self.start
    }
}

/// Owner of a contiguous block range, with one locked Storage per block.
#[derive(Debug)]
pub struct Partition {
    id: usize,
    range: BlockRange,
    blocks: Vec<Mutex<Storage>>,
}

impl Partition {
    pub fn new(id: usize, range: BlockRange) -> Self {
        let blocks = (0..range.block_count()).map(|_| Mutex::new(Storage::new())).collect();
        Partition { id, range, blocks }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn range(&self) -> BlockRange {
        self.range
    }

    pub fn in_range(&self, block: u32) -> bool {
        self.range.contains(block)
    }

    fn block(&self, block: u32) -> ShardisResult<&Mutex<Storage>> {
        if !self.range.contains(block) {
            return Err(ShardisError::Routing(block));
        }
        self.blocks
            .get((block - self.range.start) as usize)
            .ok_or(ShardisError::Routing(block))
    }

    pub fn get(
        &self,
        ty: ValueType,
        block: u32,
        hash: u32,
        key: &[u8],
        fields: &[Vec<u8>],
    ) -> ShardisResult<Option<Fetched>> {
        self.block(block)?.lock().get(ty, hash, key, fields)
    }

    pub fn set(&self, block: u32, hash: u32, key: &[u8], update: Update<'_>) -> ShardisResult<usize> {
        self.block(block)?.lock().set(hash, key, update)
    }

    pub fn delete(&self, block: u32, hash: u32, key: &[u8]) -> ShardisResult<bool> {
        Ok(self.block(block)?.lock().delete(hash, key))
    }

    /// Number of keys held across all blocks.
    pub fn key_count(&self) -> usize {
        self.blocks.iter().map(|b| b.lock().len()).sum()
    }
}
