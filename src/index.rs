//! In-memory secondary indexes over shard storage.
//!
//! Maintained inline with every insertion — never rebuilt, since vertices
//! and edges are append-only in this design.
//!
//! [`VertexIndex`] maps a vertex id to its offset in the store's global
//! vertex pointer table. [`EdgeIndex`] is per shard and maps a vertex id to
//! the offsets of its incident in/out edges within that shard.

use std::collections::HashMap;

use crate::VertexId;

/// Global vertex lookup: vid → dense offset in the vertex pointer table.
///
/// Offsets are assigned at insertion time and never reused or compacted
/// (there is no vertex deletion).
#[derive(Debug, Default)]
pub struct VertexIndex {
    offsets: HashMap<VertexId, usize>,
}

impl VertexIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, vid: VertexId) -> bool {
        self.offsets.contains_key(&vid)
    }

    /// Register a vertex's global offset. O(1).
    pub fn add(&mut self, vid: VertexId, offset: usize) {
        self.offsets.insert(vid, offset);
    }

    /// Look up the global offset for a vertex id. O(1).
    pub fn offset_of(&self, vid: VertexId) -> Option<usize> {
        self.offsets.get(&vid).copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Per-shard adjacency index: vid → incident edge offsets within the shard.
///
/// In-offsets are edges whose target is the vid; out-offsets are edges whose
/// source is the vid. Offsets appear in insertion order.
#[derive(Debug, Default)]
pub struct EdgeIndex {
    in_edges: HashMap<VertexId, Vec<usize>>,
    out_edges: HashMap<VertexId, Vec<usize>>,
}

impl EdgeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the edge at `offset` under both endpoints.
    pub fn add(&mut self, source: VertexId, target: VertexId, offset: usize) {
        self.out_edges.entry(source).or_default().push(offset);
        self.in_edges.entry(target).or_default().push(offset);
    }

    /// Incident edge offsets for `vid`: `(in_offsets, out_offsets)`.
    ///
    /// A direction that is not wanted comes back empty without being looked
    /// up.
    pub fn edges_for(&self, vid: VertexId, want_in: bool, want_out: bool) -> (Vec<usize>, Vec<usize>) {
        let ins = if want_in {
            self.in_edges.get(&vid).cloned().unwrap_or_default()
        } else {
            Vec::new()
        };
        let outs = if want_out {
            self.out_edges.get(&vid).cloned().unwrap_or_default()
        } else {
            Vec::new()
        };
        (ins, outs)
    }
}
