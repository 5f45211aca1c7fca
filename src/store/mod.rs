//! Partitioned graph store API and the shared-memory implementation.

pub mod sharedmem;

pub use sharedmem::SharedMemStore;

use std::collections::HashSet;

use crate::error::Result;
use crate::proxy::VertexProxy;
use crate::row::Row;
use crate::schema::FieldDecl;
use crate::shard::Shard;
use crate::{ShardId, VertexId};

/// Capability interface for a sharded graph store.
///
/// The shared-memory engine is one concrete implementer; a distributed or
/// persistent backend would implement the same surface. Proxies are generic
/// over this trait — they resolve their row through the store on every
/// access rather than caching a pointer into one backend's storage.
///
/// Single-threaded by contract (see crate docs): no method suspends, blocks,
/// or tolerates concurrent callers.
pub trait PartitionedGraphStore {
    // === SCHEMA & COUNTS ===

    /// Field metadata for vertex rows.
    fn vertex_fields(&self) -> &[FieldDecl];

    /// Field metadata for edge rows.
    fn edge_fields(&self) -> &[FieldDecl];

    /// Number of shards in the store.
    fn num_shards(&self) -> ShardId;

    /// Number of vertices in the graph.
    fn num_vertices(&self) -> usize;

    /// Number of edges in the graph, across all shards.
    fn num_edges(&self) -> usize;

    // === FINE-GRAINED API ===

    /// Insert a vertex with `hash(vid) mod num_shards` as its master.
    ///
    /// `row` defaults to a null row built from the vertex schema. Returns
    /// `false` without mutating anything if `vid` already exists.
    fn add_vertex(&mut self, vid: VertexId, row: Option<Row>) -> bool;

    /// Insert a directed edge routed to `hash((source, target)) mod
    /// num_shards`.
    ///
    /// Endpoints that do not exist yet are created with default rows; the
    /// routed shard is recorded as a mirror of any endpoint it does not
    /// master. Duplicate `(source, target)` pairs are appended as parallel
    /// edges, deliberately.
    fn add_edge(&mut self, source: VertexId, target: VertexId, row: Option<Row>);

    /// Proxy for the vertex `vid`, or `None` if it was never inserted.
    fn get_vertex(&self, vid: VertexId) -> Option<VertexProxy>;

    /// Vertex ids whose integer field at `fieldpos` equals `value`.
    ///
    /// Not implemented: always `Err(Unsupported)`, never a silent empty
    /// result.
    fn find_vertices_by_int(&self, fieldpos: usize, value: i64) -> Result<Vec<VertexId>>;

    /// Vertex ids whose string field at `fieldpos` equals `value`.
    ///
    /// Not implemented: always `Err(Unsupported)`.
    fn find_vertices_by_str(&self, fieldpos: usize, value: &str) -> Result<Vec<VertexId>>;

    /// Master shard of `vid`, or `None` if it was never inserted.
    fn master_of(&self, vid: VertexId) -> Option<ShardId>;

    /// Current mirror set of `vid`. Empty for unknown or unmirrored
    /// vertices.
    fn mirrors_of(&self, vid: VertexId) -> HashSet<ShardId>;

    // === COARSE-GRAINED API ===

    /// Live borrow of a shard.
    fn shard(&self, shard_id: ShardId) -> &Shard;

    /// Live mutable borrow of a shard. Writes land directly in storage.
    fn shard_mut(&mut self, shard_id: ShardId) -> &mut Shard;

    /// Independently owned deep copy of a shard, safe for isolated work and
    /// a later [`commit_shard`](Self::commit_shard).
    fn shard_copy(&self, shard_id: ShardId) -> Shard;

    /// Build a derived shard, labeled `adjacent_to`, holding only the edges
    /// of shard `adjacent_to` incident to vertices mastered by `shard_id`
    /// (no vertices are copied).
    ///
    /// Iterates `shard_id`'s vertices in native order; for each qualifying
    /// vertex, all in-edges precede all out-edges, in index order. A single
    /// edge can qualify from both endpoints and is then copied twice —
    /// dedup is deliberately not guaranteed. Each copied edge records its
    /// origin offset for write-back.
    fn shard_contents_adj_to(&self, shard_id: ShardId, adjacent_to: ShardId) -> Shard;

    /// Shard ids structurally adjacent to `shard_id` under the topology
    /// constraint.
    fn adjacent_shards(&self, shard_id: ShardId) -> &[ShardId];

    /// Commit a caller-owned shard (a copy or a derived shard) back to
    /// storage.
    ///
    /// Vertex rows commit in place on `shard` — flags clear, nothing is
    /// written back (a vertex shard is never derived). Modified edge fields
    /// are written to the canonical edge in shard `shard.id()`, resolved
    /// through the origin-offset map when `shard` is derived.
    ///
    /// # Panics
    ///
    /// Panics if a canonical edge row cannot be located (stale derived
    /// shard) or if a local row's field count disagrees with its canonical
    /// row.
    fn commit_shard(&mut self, shard: &mut Shard);

    /// Commit every modified field of the live shard `shard_id` in place.
    ///
    /// This is the live-shard counterpart of
    /// [`commit_shard`](Self::commit_shard): the shard being committed
    /// already is the shard of record, so flags clear and snapshots sync
    /// with no copying.
    fn commit_shard_in_place(&mut self, shard_id: ShardId);

    // === ROW RESOLUTION (proxy support) ===

    /// Incident edge offsets of `vid` within shard `shard_id`:
    /// `(in_offsets, out_offsets)`. A direction that is not wanted comes
    /// back empty.
    fn adj_edge_offsets(
        &self,
        shard_id: ShardId,
        vid: VertexId,
        want_in: bool,
        want_out: bool,
    ) -> (Vec<usize>, Vec<usize>);

    /// Vertex row at a global pointer-table offset.
    fn vertex_row(&self, offset: usize) -> &Row;

    /// Mutable vertex row at a global pointer-table offset.
    fn vertex_row_mut(&mut self, offset: usize) -> &mut Row;

    /// Edge row at `offset` within shard `shard_id`.
    fn edge_row(&self, shard_id: ShardId, offset: usize) -> &Row;

    /// Mutable edge row at `offset` within shard `shard_id`.
    fn edge_row_mut(&mut self, shard_id: ShardId, offset: usize) -> &mut Row;
}
