//! Transient vertex and edge handles.
//!
//! A proxy wraps a storage location (global vertex offset, or shard id plus
//! edge offset) together with ids and partition bookkeeping captured at
//! construction. It never owns the underlying row; every data access goes
//! through the store, so a proxy cannot dangle into freed storage — it can
//! at worst go stale, which the append-only design rules out.
//!
//! Synchronization methods carry the shared-memory specialization: the
//! resolved row already is the canonical storage, so `write_changes`
//! commits in place, `refresh` is a no-op, and the async variant is an
//! alias for the synchronous one.

use std::collections::HashSet;

use crate::row::Row;
use crate::store::PartitionedGraphStore;
use crate::{ShardId, VertexId};

// ── Vertex Proxy ───────────────────────────────────────────────────

/// Handle to one vertex. Master and mirror information is a snapshot from
/// construction time; mirrors added by later edge insertions are not
/// reflected.
#[derive(Debug, Clone)]
pub struct VertexProxy {
    vid: VertexId,
    /// Offset in the store's global vertex pointer table.
    offset: usize,
    master: ShardId,
    mirrors: HashSet<ShardId>,
}

impl VertexProxy {
    pub(crate) fn new(
        vid: VertexId,
        offset: usize,
        master: ShardId,
        mirrors: HashSet<ShardId>,
    ) -> Self {
        Self {
            vid,
            offset,
            master,
            mirrors,
        }
    }

    pub fn id(&self) -> VertexId {
        self.vid
    }

    /// Shard authoritative for this vertex's data.
    pub fn master_shard(&self) -> ShardId {
        self.master
    }

    /// Number of shards this vertex spans (master + mirrors).
    pub fn num_spanned_shards(&self) -> usize {
        self.mirrors.len() + 1
    }

    /// Mirror shards spanned by this vertex, as captured at construction.
    pub fn shard_list(&self) -> Vec<ShardId> {
        self.mirrors.iter().copied().collect()
    }

    /// The vertex's row in storage. Resolves to the same row on every call.
    pub fn data<'s, S: PartitionedGraphStore>(&self, store: &'s S) -> &'s Row {
        store.vertex_row(self.offset)
    }

    /// Mutable access to the vertex's row. Writes stay uncommitted until a
    /// `write_*` call.
    pub fn data_mut<'s, S: PartitionedGraphStore>(&self, store: &'s mut S) -> &'s mut Row {
        store.vertex_row_mut(self.offset)
    }

    /// Commit modified fields synchronously. The row reference already is
    /// the canonical storage, so this clears flags and syncs snapshots in
    /// place.
    pub fn write_changes<S: PartitionedGraphStore>(&self, store: &mut S) {
        let row = store.vertex_row_mut(self.offset);
        for val in row.iter_mut() {
            if val.is_modified() {
                val.post_commit_state();
            }
        }
    }

    /// Same as the synchronous commit in shared memory.
    pub fn write_changes_async<S: PartitionedGraphStore>(&self, store: &mut S) {
        self.write_changes(store);
    }

    /// No effect in shared memory — the row is always current.
    pub fn refresh(&self) {}

    /// Commit immediately; the refresh half has no effect in shared memory.
    pub fn write_and_refresh<S: PartitionedGraphStore>(&self, store: &mut S) {
        self.write_changes(store);
        self.refresh();
    }

    /// Collect this vertex's adjacency within shard `shard_id` as edge
    /// proxies.
    ///
    /// `out_in` receives edges whose target is this vertex, `out_out` edges
    /// whose source is this vertex; pass `None` to skip a direction.
    /// `prefetch` is accepted for interface parity but has no effect — data
    /// is always attached eagerly in shared memory.
    pub fn adj_list<S: PartitionedGraphStore>(
        &self,
        store: &S,
        shard_id: ShardId,
        _prefetch: bool,
        out_in: Option<&mut Vec<EdgeProxy>>,
        out_out: Option<&mut Vec<EdgeProxy>>,
    ) {
        let (ins, outs) = store.adj_edge_offsets(
            shard_id,
            self.vid,
            out_in.is_some(),
            out_out.is_some(),
        );

        if let Some(out_in) = out_in {
            for offset in ins {
                let (source, target) = store
                    .shard(shard_id)
                    .edge(offset)
                    .expect("edge index returned offset past shard storage");
                out_in.push(EdgeProxy::new(source, target, offset, shard_id));
            }
        }
        if let Some(out_out) = out_out {
            for offset in outs {
                let (source, target) = store
                    .shard(shard_id)
                    .edge(offset)
                    .expect("edge index returned offset past shard storage");
                out_out.push(EdgeProxy::new(source, target, offset, shard_id));
            }
        }
    }
}

// ── Edge Proxy ─────────────────────────────────────────────────────

/// Handle to one directed edge within its owning shard.
#[derive(Debug, Clone)]
pub struct EdgeProxy {
    source: VertexId,
    target: VertexId,
    /// Edge offset within the owning shard.
    offset: usize,
    shard: ShardId,
}

impl EdgeProxy {
    pub(crate) fn new(source: VertexId, target: VertexId, offset: usize, shard: ShardId) -> Self {
        Self {
            source,
            target,
            offset,
            shard,
        }
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    pub fn target(&self) -> VertexId {
        self.target
    }

    /// Shard owning this edge.
    pub fn master_shard(&self) -> ShardId {
        self.shard
    }

    /// The edge's row in storage. Resolves to the same row on every call.
    pub fn data<'s, S: PartitionedGraphStore>(&self, store: &'s S) -> &'s Row {
        store.edge_row(self.shard, self.offset)
    }

    /// Mutable access to the edge's row. Writes stay uncommitted until a
    /// `write_*` call.
    pub fn data_mut<'s, S: PartitionedGraphStore>(&self, store: &'s mut S) -> &'s mut Row {
        store.edge_row_mut(self.shard, self.offset)
    }

    /// Commit modified fields synchronously, in place.
    pub fn write_changes<S: PartitionedGraphStore>(&self, store: &mut S) {
        let row = store.edge_row_mut(self.shard, self.offset);
        for val in row.iter_mut() {
            if val.is_modified() {
                val.post_commit_state();
            }
        }
    }

    /// Same as the synchronous commit in shared memory.
    pub fn write_changes_async<S: PartitionedGraphStore>(&self, store: &mut S) {
        self.write_changes(store);
    }

    /// No effect in shared memory — the row is always current.
    pub fn refresh(&self) {}

    /// Commit immediately; the refresh half has no effect in shared memory.
    pub fn write_and_refresh<S: PartitionedGraphStore>(&self, store: &mut S) {
        self.write_changes(store);
        self.refresh();
    }
}
