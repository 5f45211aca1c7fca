//! shardgraph — in-memory reference implementation of a sharded graph
//! storage engine.
//!
//! Vertices and edges are horizontally partitioned across a fixed number of
//! shards. Each vertex has one authoritative master shard (chosen by
//! deterministic hashing) plus zero or more mirror shards holding edges
//! incident to it. Callers interact through short-lived [`VertexProxy`] /
//! [`EdgeProxy`] handles rather than raw storage pointers, and commit only
//! the fields they actually modified — including write-back through a
//! derived shard's origin-offset map.
//!
//! Single-threaded by design: shards, rows, proxies, and the store's maps
//! carry no internal synchronization, and every call runs to completion on
//! the caller's thread. A multi-threaded or distributed variant layers
//! locking or transactions over the same invariants.
//!
//! ```
//! use shardgraph::{FieldDecl, FieldKind, PartitionedGraphStore, SharedMemStore};
//!
//! let mut store = SharedMemStore::new(
//!     vec![FieldDecl::new("rank", FieldKind::Double)],
//!     vec![FieldDecl::new("weight", FieldKind::Int)],
//!     4,
//! );
//! store.add_edge(1, 2, None); // endpoints created on demand
//!
//! let v = store.get_vertex(1).unwrap();
//! v.data_mut(&mut store).field_mut(0).unwrap().set_double(0.85).unwrap();
//! v.write_changes(&mut store);
//! ```

pub mod error;
pub mod index;
pub mod proxy;
pub mod row;
pub mod schema;
pub mod shard;
pub mod store;
pub mod topology;
pub mod value;

pub use error::{GraphError, Result};
pub use proxy::{EdgeProxy, VertexProxy};
pub use row::Row;
pub use schema::{FieldDecl, FieldKind};
pub use shard::Shard;
pub use store::{PartitionedGraphStore, SharedMemStore};
pub use topology::GridTopology;
pub use value::{FieldData, Value};

/// Vertex identifier.
pub type VertexId = u64;

/// Shard identifier. Shards are numbered `0..num_shards`.
pub type ShardId = u16;
