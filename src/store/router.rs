use super::partition::{BlockRange, Partition};
use crate::error::{ShardisError, ShardisResult};

/// CRC32 (IEEE) of the key bytes.
pub fn hash_key(key: &[u8]) -> u32 {
    crc32fast::hash(key)
}

/// Split `0..block_count` into `node_count` contiguous ranges.
///
/// Every range gets `block_count / node_count` blocks. Half of the
/// remainder (rounded down) is handed out one block at a time to the first
/// partitions; the rest goes to the last partition.
pub fn assign_ranges(block_count: u32, node_count: u32) -> ShardisResult<Vec<BlockRange>> {
    if node_count == 0 {
        return Err(ShardisError::InvalidTopology(
            "node count must be at least 1".into(),
        ));
    }
    if block_count < node_count {
        return Err(ShardisError::InvalidTopology(format!(
            "block count {block_count} is smaller than node count {node_count}"
        )));
    }

    let base = block_count / node_count;
    let remainder = block_count % node_count;
    let spread = remainder / 2;

    let mut ranges = Vec::with_capacity(node_count as usize);
    let mut start = 0u32;
    for i in 0..node_count {
        let extra = if i == node_count - 1 {
            remainder - spread
        } else if i < spread {
            1
        } else {
            0
        };
        let end = start + base + extra - 1;
        ranges.push(BlockRange::new(start, end));
        start = end + 1;
    }

    Ok(ranges)
}

/// Where a key lives.
#[derive(Debug)]
pub struct Route<'a> {
    pub partition: &'a Partition,
    pub block: u32,
    pub hash: u32,
}

/// Static key -> block -> partition router.
#[derive(Debug)]
pub struct HashRouter {
    block_count: u32,
    partitions: Vec<Partition>,
}

impl HashRouter {
    pub fn new(block_count: u32, node_count: u32) -> ShardisResult<Self> {
        let partitions = assign_ranges(block_count, node_count)?
            .into_iter()
            .enumerate()
            .map(|(id, range)| Partition::new(id, range))
            .collect();
        Ok(HashRouter {
            block_count,
            partitions,
        })
    }

    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn block_of(&self, hash: u32) -> u32 {
        hash % self.block_count
    }

    pub fn route(&self, key: &[u8]) -> ShardisResult<Route<'_>> {
        let hash = hash_key(key);
        let block = self.block_of(hash);
        let partition = self
            .partitions
            .iter()
            .find(|p| p.in_range(block))
            .ok_or(ShardisError::Routing(block))?;
        Ok(Route {
            partition,
            block,
            hash,
        })
    }
}
