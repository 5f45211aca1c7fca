//! Shard-adjacency topology oracle.
//!
//! Lays `num_shards` out on a 2D grid and declares two shards adjacent when
//! they share a row or a column. The layout is fixed at construction;
//! [`GridTopology::neighbors`] answers the directory's "which shard pairs may
//! be adjacent" queries when walking derived-shard candidates.

use crate::ShardId;

/// Grid constraint over the shard id space.
///
/// Shards `0..num_shards` fill rows of width `ceil(sqrt(num_shards))`; the
/// last row may be short. `neighbors(s)` returns every shard in the same row
/// or column as `s`, self included, in ascending order.
#[derive(Debug, Clone)]
pub struct GridTopology {
    num_shards: ShardId,
    cols: ShardId,
    /// Precomputed adjacency lists, indexed by shard id.
    neighbors: Vec<Vec<ShardId>>,
}

impl GridTopology {
    /// Build the grid for the given shard count.
    ///
    /// # Panics
    ///
    /// Panics if `num_shards` is 0.
    pub fn new(num_shards: ShardId) -> Self {
        assert!(num_shards > 0, "num_shards must be > 0");
        let cols = (num_shards as f64).sqrt().ceil() as ShardId;

        let neighbors = (0..num_shards)
            .map(|s| {
                let (row, col) = (s / cols, s % cols);
                (0..num_shards)
                    .filter(|&t| t / cols == row || t % cols == col)
                    .collect()
            })
            .collect();

        Self {
            num_shards,
            cols,
            neighbors,
        }
    }

    pub fn num_shards(&self) -> ShardId {
        self.num_shards
    }

    /// Grid width.
    pub fn cols(&self) -> ShardId {
        self.cols
    }

    /// Shards structurally adjacent to `shard_id` (same row or column,
    /// self included), ascending.
    pub fn neighbors(&self, shard_id: ShardId) -> &[ShardId] {
        &self.neighbors[shard_id as usize]
    }
}
