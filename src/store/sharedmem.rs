//! Shared-memory implementation of the partitioned graph store.
//!
//! Owns the shard array, the global vertex pointer table, the master/mirror
//! maps, and the index collaborators. Implements insertion, lookup,
//! derived-shard construction, and the commit protocol.
//!
//! Routing is deterministic: blake3 over the key bytes, first 8 bytes
//! little-endian, reduced modulo the shard count. The same vertex id (or the
//! same `(source, target)` pair) always lands in the same shard.

use std::collections::{HashMap, HashSet};

use crate::error::{GraphError, Result};
use crate::index::{EdgeIndex, VertexIndex};
use crate::proxy::VertexProxy;
use crate::row::Row;
use crate::schema::FieldDecl;
use crate::shard::Shard;
use crate::store::PartitionedGraphStore;
use crate::topology::GridTopology;
use crate::{ShardId, VertexId};

/// Reduce a blake3 hash to a shard id: first 8 bytes little-endian, mod N.
fn hash_to_shard(key: &[u8], num_shards: ShardId) -> ShardId {
    let hash = blake3::hash(key);
    let h = u64::from_le_bytes(hash.as_bytes()[0..8].try_into().unwrap());
    (h % num_shards as u64) as ShardId
}

/// Shared-memory graph store with fixed vertex and edge schemas.
///
/// Shards are laid out under a grid adjacency constraint fixed at
/// construction. All maps are plain fields of this value — construction and
/// teardown are ordinary Rust ownership, no ambient state.
pub struct SharedMemStore {
    vertex_fields: Vec<FieldDecl>,
    edge_fields: Vec<FieldDecl>,

    /// Backend shard storage, indexed by shard id.
    shards: Vec<Shard>,

    /// Shard adjacency constraint.
    topology: GridTopology,

    /// Fine-grained vertex lookup: vid → global offset.
    vertex_index: VertexIndex,

    /// `edge_index[s]` is the adjacency index for `shards[s]`.
    edge_index: Vec<EdgeIndex>,

    /// Global vertex pointer table: dense offset → (master shard, local
    /// offset). Offsets are never reused or compacted.
    vertex_locs: Vec<(ShardId, usize)>,

    /// Master shard of each vertex. Set once at first insertion, never
    /// reassigned.
    vid2master: HashMap<VertexId, ShardId>,

    /// Mirror shards of each vertex. Grows monotonically as edges arrive.
    vid2mirrors: HashMap<VertexId, HashSet<ShardId>>,

    /// Running edge count across all shards.
    edge_count: usize,
}

impl SharedMemStore {
    /// Create a store with fixed schemas and a grid topology over
    /// `num_shards` shards.
    ///
    /// # Panics
    ///
    /// Panics if `num_shards` is 0.
    pub fn new(
        vertex_fields: Vec<FieldDecl>,
        edge_fields: Vec<FieldDecl>,
        num_shards: ShardId,
    ) -> Self {
        let topology = GridTopology::new(num_shards);
        Self {
            vertex_fields,
            edge_fields,
            shards: (0..num_shards).map(Shard::new).collect(),
            topology,
            vertex_index: VertexIndex::new(),
            edge_index: (0..num_shards).map(|_| EdgeIndex::new()).collect(),
            vertex_locs: Vec::new(),
            vid2master: HashMap::new(),
            vid2mirrors: HashMap::new(),
            edge_count: 0,
        }
    }

    /// Master shard a vertex id routes to.
    fn vertex_shard(&self, vid: VertexId) -> ShardId {
        hash_to_shard(&vid.to_le_bytes(), self.num_shards())
    }

    /// Shard an edge `(source, target)` routes to.
    fn edge_shard(&self, source: VertexId, target: VertexId) -> ShardId {
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&source.to_le_bytes());
        key[8..].copy_from_slice(&target.to_le_bytes());
        hash_to_shard(&key, self.num_shards())
    }

    /// Record `shard_id` as a mirror of `vid` unless it is the master.
    /// Inserting an already-recorded mirror is a no-op — mirrors only grow.
    fn record_mirror(&mut self, vid: VertexId, shard_id: ShardId) {
        let master = *self
            .vid2master
            .get(&vid)
            .expect("mirror recorded for vertex without a master");
        if master != shard_id {
            self.vid2mirrors.entry(vid).or_default().insert(shard_id);
        }
    }
}

impl PartitionedGraphStore for SharedMemStore {
    // === SCHEMA & COUNTS ===

    fn vertex_fields(&self) -> &[FieldDecl] {
        &self.vertex_fields
    }

    fn edge_fields(&self) -> &[FieldDecl] {
        &self.edge_fields
    }

    fn num_shards(&self) -> ShardId {
        self.shards.len() as ShardId
    }

    fn num_vertices(&self) -> usize {
        self.vertex_locs.len()
    }

    fn num_edges(&self) -> usize {
        self.edge_count
    }

    // === FINE-GRAINED API ===

    fn add_vertex(&mut self, vid: VertexId, row: Option<Row>) -> bool {
        if self.vertex_index.has(vid) {
            return false;
        }

        let mut row = row.unwrap_or_else(|| Row::from_schema(&self.vertex_fields, true));
        assert_eq!(
            row.num_fields(),
            self.vertex_fields.len(),
            "vertex row field count {} disagrees with schema ({} fields)",
            row.num_fields(),
            self.vertex_fields.len()
        );
        row.set_is_vertex(true);

        let master = self.vertex_shard(vid);
        let local = self.shards[master as usize].add_vertex(vid, row);
        let offset = self.vertex_locs.len();
        self.vertex_locs.push((master, local));
        self.vid2master.insert(vid, master);
        self.vertex_index.add(vid, offset);

        tracing::trace!(vid, master, offset, "vertex added");
        true
    }

    fn add_edge(&mut self, source: VertexId, target: VertexId, row: Option<Row>) {
        let mut row = row.unwrap_or_else(|| Row::from_schema(&self.edge_fields, false));
        assert_eq!(
            row.num_fields(),
            self.edge_fields.len(),
            "edge row field count {} disagrees with schema ({} fields)",
            row.num_fields(),
            self.edge_fields.len()
        );
        row.set_is_vertex(false);

        let shard_id = self.edge_shard(source, target);
        let pos = self.shards[shard_id as usize].add_edge(source, target, row);
        self.edge_count += 1;
        self.edge_index[shard_id as usize].add(source, target, pos);

        // Edges may arrive before either endpoint exists; create masters on
        // demand, then record the routed shard as a mirror where needed.
        if !self.vertex_index.has(source) {
            self.add_vertex(source, None);
        }
        if !self.vertex_index.has(target) {
            self.add_vertex(target, None);
        }
        self.record_mirror(source, shard_id);
        self.record_mirror(target, shard_id);

        tracing::trace!(source, target, shard_id, pos, "edge added");
    }

    fn get_vertex(&self, vid: VertexId) -> Option<VertexProxy> {
        let offset = self.vertex_index.offset_of(vid)?;
        let master = *self
            .vid2master
            .get(&vid)
            .expect("vertex indexed without a master entry");
        let mirrors = self.mirrors_of(vid);
        Some(VertexProxy::new(vid, offset, master, mirrors))
    }

    fn find_vertices_by_int(&self, _fieldpos: usize, _value: i64) -> Result<Vec<VertexId>> {
        Err(GraphError::Unsupported(
            "indexed vertex lookup by integer field",
        ))
    }

    fn find_vertices_by_str(&self, _fieldpos: usize, _value: &str) -> Result<Vec<VertexId>> {
        Err(GraphError::Unsupported(
            "indexed vertex lookup by string field",
        ))
    }

    fn master_of(&self, vid: VertexId) -> Option<ShardId> {
        self.vid2master.get(&vid).copied()
    }

    fn mirrors_of(&self, vid: VertexId) -> HashSet<ShardId> {
        self.vid2mirrors.get(&vid).cloned().unwrap_or_default()
    }

    // === COARSE-GRAINED API ===

    fn shard(&self, shard_id: ShardId) -> &Shard {
        &self.shards[shard_id as usize]
    }

    fn shard_mut(&mut self, shard_id: ShardId) -> &mut Shard {
        &mut self.shards[shard_id as usize]
    }

    fn shard_copy(&self, shard_id: ShardId) -> Shard {
        self.shards[shard_id as usize].clone()
    }

    fn shard_contents_adj_to(&self, shard_id: ShardId, adjacent_to: ShardId) -> Shard {
        let mut derived = Shard::new(adjacent_to);
        let origin = &self.shards[adjacent_to as usize];

        // For each vertex mastered by shard_id whose mirrors span
        // adjacent_to (or trivially, when filtering a shard against
        // itself), copy its incident edges out of adjacent_to.
        for &vid in self.shards[shard_id as usize].vertex_ids() {
            let qualifies = shard_id == adjacent_to
                || self
                    .vid2mirrors
                    .get(&vid)
                    .is_some_and(|mirrors| mirrors.contains(&adjacent_to));
            if !qualifies {
                continue;
            }

            let (ins, outs) = self.edge_index[adjacent_to as usize].edges_for(vid, true, true);
            for offset in ins.into_iter().chain(outs) {
                let (source, target) = origin
                    .edge(offset)
                    .expect("edge index returned offset past shard storage");
                let row = origin
                    .edge_data(offset)
                    .expect("edge index returned offset past shard storage")
                    .clone();
                derived.add_edge(source, target, row);
                derived.push_origin_offset(offset);
            }
        }

        tracing::debug!(
            shard_id,
            adjacent_to,
            num_edges = derived.num_edges(),
            "derived shard built"
        );
        derived
    }

    fn adjacent_shards(&self, shard_id: ShardId) -> &[ShardId] {
        self.topology.neighbors(shard_id)
    }

    fn commit_shard(&mut self, shard: &mut Shard) {
        let id = shard.id();
        let mut fields_written = 0usize;

        // Vertex rows always commit in place — a vertex shard is never
        // derived, and an unmodified field is a no-op.
        for pos in 0..shard.num_vertices() {
            let row = shard
                .vertex_data_mut(pos)
                .expect("vertex count out of sync with row storage");
            for val in row.iter_mut() {
                if val.is_modified() {
                    val.post_commit_state();
                }
            }
        }

        // Edge rows write back to the canonical shard. For a derived shard
        // the canonical edge sits at the recorded origin offset; for a
        // plain copy the offsets coincide.
        let derived = shard.is_derived();
        let canonical_shard = &mut self.shards[id as usize];
        for pos in 0..shard.num_edges() {
            let origin_off = if derived {
                shard
                    .origin_offset(pos)
                    .expect("derived shard with partial origin-offset map")
            } else {
                pos
            };
            assert!(
                origin_off < canonical_shard.num_edges(),
                "stale derived shard: local edge {} maps to offset {} past shard {} ({} edges)",
                pos,
                origin_off,
                id,
                canonical_shard.num_edges()
            );

            let local = shard
                .edge_data_mut(pos)
                .expect("edge count out of sync with row storage");
            if !local.any_modified() {
                continue;
            }

            let canonical = canonical_shard
                .edge_data_mut(origin_off)
                .expect("canonical edge row missing despite bounds check");
            assert_eq!(
                local.num_fields(),
                canonical.num_fields(),
                "field count mismatch committing edge {} into shard {}",
                pos,
                id
            );

            for j in 0..local.num_fields() {
                let val = local.field_mut(j).expect("field position within count");
                if val.is_modified() {
                    val.post_commit_state();
                    *canonical.field_mut(j).expect("field position within count") = val.clone();
                    fields_written += 1;
                }
            }
        }

        tracing::debug!(shard_id = id, derived, fields_written, "shard committed");
    }

    fn commit_shard_in_place(&mut self, shard_id: ShardId) {
        let shard = &mut self.shards[shard_id as usize];
        for pos in 0..shard.num_vertices() {
            let row = shard
                .vertex_data_mut(pos)
                .expect("vertex count out of sync with row storage");
            for val in row.iter_mut() {
                if val.is_modified() {
                    val.post_commit_state();
                }
            }
        }
        for pos in 0..shard.num_edges() {
            let row = shard
                .edge_data_mut(pos)
                .expect("edge count out of sync with row storage");
            for val in row.iter_mut() {
                if val.is_modified() {
                    val.post_commit_state();
                }
            }
        }
        tracing::debug!(shard_id, "shard committed in place");
    }

    // === ROW RESOLUTION ===

    fn adj_edge_offsets(
        &self,
        shard_id: ShardId,
        vid: VertexId,
        want_in: bool,
        want_out: bool,
    ) -> (Vec<usize>, Vec<usize>) {
        self.edge_index[shard_id as usize].edges_for(vid, want_in, want_out)
    }

    fn vertex_row(&self, offset: usize) -> &Row {
        let (shard_id, pos) = self.vertex_locs[offset];
        self.shards[shard_id as usize]
            .vertex_data(pos)
            .expect("vertex pointer table entry past shard storage")
    }

    fn vertex_row_mut(&mut self, offset: usize) -> &mut Row {
        let (shard_id, pos) = self.vertex_locs[offset];
        self.shards[shard_id as usize]
            .vertex_data_mut(pos)
            .expect("vertex pointer table entry past shard storage")
    }

    fn edge_row(&self, shard_id: ShardId, offset: usize) -> &Row {
        self.shards[shard_id as usize]
            .edge_data(offset)
            .expect("edge offset past shard storage")
    }

    fn edge_row_mut(&mut self, shard_id: ShardId, offset: usize) -> &mut Row {
        self.shards[shard_id as usize]
            .edge_data_mut(offset)
            .expect("edge offset past shard storage")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;
    use crate::value::FieldData;

    fn test_store(num_shards: ShardId) -> SharedMemStore {
        SharedMemStore::new(
            vec![FieldDecl::new("rank", FieldKind::Double)],
            vec![FieldDecl::new("weight", FieldKind::Int)],
            num_shards,
        )
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = test_store(4);
        assert_eq!(store.num_shards(), 4);
        assert_eq!(store.num_vertices(), 0);
        assert_eq!(store.num_edges(), 0);
    }

    #[test]
    fn test_add_vertex_routes_by_hash() {
        let mut store = test_store(4);
        assert!(store.add_vertex(7, None));
        let master = store.master_of(7).unwrap();
        assert!(master < 4);
        // The vertex row landed in the master shard
        assert_eq!(store.shard(master).num_vertices(), 1);
        assert_eq!(store.shard(master).vertex(0), Some(7));
    }

    #[test]
    fn test_add_vertex_duplicate_rejected_without_mutation() {
        let mut store = test_store(4);
        assert!(store.add_vertex(7, None));
        let before = store.num_vertices();
        assert!(!store.add_vertex(7, None));
        assert_eq!(store.num_vertices(), before);
    }

    #[test]
    fn test_add_vertex_with_caller_row() {
        let mut store = test_store(4);
        let mut row = Row::from_schema(store.vertex_fields(), true);
        row.field_mut(0).unwrap().set_double(0.25).unwrap();
        assert!(store.add_vertex(1, Some(row)));

        let proxy = store.get_vertex(1).unwrap();
        assert_eq!(
            *proxy.data(&store).field(0).unwrap().data(),
            FieldData::Double(0.25)
        );
    }

    #[test]
    #[should_panic(expected = "field count")]
    fn test_add_vertex_schema_mismatch_panics() {
        let mut store = test_store(4);
        let row = Row::from_schema(
            &[
                FieldDecl::new("a", FieldKind::Int),
                FieldDecl::new("b", FieldKind::Int),
            ],
            true,
        );
        store.add_vertex(1, Some(row));
    }

    #[test]
    fn test_add_edge_creates_missing_endpoints() {
        let mut store = test_store(4);
        store.add_edge(1, 2, None);
        assert_eq!(store.num_vertices(), 2);
        assert_eq!(store.num_edges(), 1);
        assert!(store.master_of(1).is_some());
        assert!(store.master_of(2).is_some());
    }

    #[test]
    fn test_add_edge_does_not_duplicate_existing_endpoint() {
        let mut store = test_store(4);
        store.add_vertex(1, None);
        store.add_edge(1, 2, None);
        assert_eq!(store.num_vertices(), 2);
    }

    #[test]
    fn test_edge_routing_deterministic() {
        let store = test_store(8);
        for (s, t) in [(1u64, 2u64), (2, 1), (5, 5), (0, u64::MAX)] {
            assert_eq!(store.edge_shard(s, t), store.edge_shard(s, t));
        }
    }

    #[test]
    fn test_mirror_recorded_only_off_master() {
        let mut store = test_store(4);
        store.add_edge(1, 2, None);
        let shard_id = store.edge_shard(1, 2);
        for vid in [1, 2] {
            let master = store.master_of(vid).unwrap();
            let mirrors = store.mirrors_of(vid);
            if master == shard_id {
                assert!(!mirrors.contains(&shard_id));
            } else {
                assert_eq!(mirrors, HashSet::from([shard_id]));
            }
        }
    }

    #[test]
    fn test_get_vertex_unknown_is_none() {
        let store = test_store(4);
        assert!(store.get_vertex(42).is_none());
    }

    #[test]
    fn test_find_vertices_fails_fast() {
        let store = test_store(4);
        assert!(matches!(
            store.find_vertices_by_int(0, 1),
            Err(GraphError::Unsupported(_))
        ));
        assert!(matches!(
            store.find_vertices_by_str(0, "x"),
            Err(GraphError::Unsupported(_))
        ));
    }

    #[test]
    fn test_shard_copy_is_isolated() {
        let mut store = test_store(2);
        store.add_edge(1, 2, None);
        let shard_id = store.edge_shard(1, 2);

        let mut copy = store.shard_copy(shard_id);
        copy.edge_data_mut(0)
            .unwrap()
            .field_mut(0)
            .unwrap()
            .set_int(9)
            .unwrap();

        // Live storage untouched until commit
        assert_eq!(
            *store.shard(shard_id).edge_data(0).unwrap().field(0).unwrap().data(),
            FieldData::Null
        );
    }

    #[test]
    fn test_commit_shard_copy_writes_back_edges() {
        let mut store = test_store(2);
        store.add_edge(1, 2, None);
        let shard_id = store.edge_shard(1, 2);

        let mut copy = store.shard_copy(shard_id);
        copy.edge_data_mut(0)
            .unwrap()
            .field_mut(0)
            .unwrap()
            .set_int(9)
            .unwrap();
        store.commit_shard(&mut copy);

        let canonical = store.shard(shard_id).edge_data(0).unwrap();
        assert_eq!(*canonical.field(0).unwrap().data(), FieldData::Int(9));
        assert!(!canonical.field(0).unwrap().is_modified());
    }

    #[test]
    #[should_panic(expected = "stale derived shard")]
    fn test_commit_stale_derived_shard_panics() {
        let mut store = test_store(1);
        store.add_edge(1, 2, None);

        // Forge a derived shard pointing past the canonical storage.
        let mut stale = Shard::new(0);
        stale.add_edge(1, 2, Row::from_schema(store.edge_fields(), false));
        stale.push_origin_offset(99);
        stale
            .edge_data_mut(0)
            .unwrap()
            .field_mut(0)
            .unwrap()
            .set_int(1)
            .unwrap();
        store.commit_shard(&mut stale);
    }

    #[test]
    fn test_adjacent_shards_follows_grid() {
        let store = test_store(4);
        assert_eq!(store.adjacent_shards(0), &[0, 1, 2]);
        assert_eq!(store.adjacent_shards(3), &[1, 2, 3]);
    }

    #[test]
    fn test_commit_shard_in_place_clears_flags() {
        let mut store = test_store(2);
        store.add_edge(1, 2, None);
        let shard_id = store.edge_shard(1, 2);

        store
            .shard_mut(shard_id)
            .edge_data_mut(0)
            .unwrap()
            .field_mut(0)
            .unwrap()
            .set_int(5)
            .unwrap();
        assert!(store.shard(shard_id).edge_data(0).unwrap().any_modified());

        store.commit_shard_in_place(shard_id);
        let row = store.shard(shard_id).edge_data(0).unwrap();
        assert!(!row.any_modified());
        assert_eq!(*row.field(0).unwrap().data(), FieldData::Int(5));
        assert_eq!(*row.field(0).unwrap().previous(), FieldData::Int(5));
    }
}
