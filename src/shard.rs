//! Single-shard storage unit: vertex rows, edge triples, derived-shard
//! origin map.
//!
//! A shard owns an ordered list of vertex ids with parallel row storage, and
//! an ordered list of directed edges, each `(source, target)` with a parallel
//! row. NOT Send+Sync by contract -- single-writer access assumed.
//!
//! A shard built by [`shard_contents_adj_to`] carries `origin_offsets`:
//! `origin_offsets[i]` is the offset of local edge `i` in the shard it was
//! copied from. The array is either empty (original shard) or exactly
//! `num_edges` long (derived shard); nothing in between.
//!
//! [`shard_contents_adj_to`]: crate::store::PartitionedGraphStore::shard_contents_adj_to

use crate::row::Row;
use crate::{ShardId, VertexId};

/// One shard of the partitioned graph. Deep copy is `Clone`.
#[derive(Debug, Clone)]
pub struct Shard {
    id: ShardId,
    /// Vertex ids in insertion order.
    vertex_ids: Vec<VertexId>,
    /// Row storage parallel to `vertex_ids`.
    vertex_rows: Vec<Row>,
    /// Edge endpoints `(source, target)` in insertion order.
    edges: Vec<(VertexId, VertexId)>,
    /// Row storage parallel to `edges`.
    edge_rows: Vec<Row>,
    /// For derived shards: offset of each local edge in the origin shard.
    origin_offsets: Vec<usize>,
}

impl Shard {
    /// Create an empty shard labeled `id`.
    pub fn new(id: ShardId) -> Self {
        Self {
            id,
            vertex_ids: Vec::new(),
            vertex_rows: Vec::new(),
            edges: Vec::new(),
            edge_rows: Vec::new(),
            origin_offsets: Vec::new(),
        }
    }

    /// Shard label. For a derived shard this is the id of the shard the
    /// edges were copied from, not the shard they were filtered against.
    pub fn id(&self) -> ShardId {
        self.id
    }

    pub fn num_vertices(&self) -> usize {
        self.vertex_ids.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether this shard is a derived (adjacency-filtered) copy.
    pub fn is_derived(&self) -> bool {
        !self.origin_offsets.is_empty()
    }

    // -- Vertices -------------------------------------------------------------

    /// Append a vertex row. Returns the local offset of the new vertex.
    pub fn add_vertex(&mut self, vid: VertexId, row: Row) -> usize {
        self.vertex_ids.push(vid);
        self.vertex_rows.push(row);
        self.vertex_ids.len() - 1
    }

    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.vertex_ids
    }

    pub fn vertex(&self, pos: usize) -> Option<VertexId> {
        self.vertex_ids.get(pos).copied()
    }

    pub fn vertex_data(&self, pos: usize) -> Option<&Row> {
        self.vertex_rows.get(pos)
    }

    pub fn vertex_data_mut(&mut self, pos: usize) -> Option<&mut Row> {
        self.vertex_rows.get_mut(pos)
    }

    // -- Edges ----------------------------------------------------------------

    /// Append an edge row. Returns the local offset of the new edge.
    pub fn add_edge(&mut self, source: VertexId, target: VertexId, row: Row) -> usize {
        self.edges.push((source, target));
        self.edge_rows.push(row);
        self.edges.len() - 1
    }

    /// Endpoints `(source, target)` of the edge at `pos`.
    pub fn edge(&self, pos: usize) -> Option<(VertexId, VertexId)> {
        self.edges.get(pos).copied()
    }

    pub fn edge_data(&self, pos: usize) -> Option<&Row> {
        self.edge_rows.get(pos)
    }

    pub fn edge_data_mut(&mut self, pos: usize) -> Option<&mut Row> {
        self.edge_rows.get_mut(pos)
    }

    // -- Derived-shard origin map ---------------------------------------------

    /// Record the origin offset of the most recently appended edge.
    ///
    /// Only the derived-shard builder calls this, once per appended edge,
    /// which is what keeps the `{0, num_edges}` invariant.
    pub(crate) fn push_origin_offset(&mut self, offset: usize) {
        self.origin_offsets.push(offset);
        debug_assert_eq!(self.origin_offsets.len(), self.edges.len());
    }

    /// Origin-shard offset of local edge `pos`. `None` on an original shard.
    pub fn origin_offset(&self, pos: usize) -> Option<usize> {
        self.origin_offsets.get(pos).copied()
    }
}
