//! Distributed Sharded Container Library
//!
//! This crate gives the ranks of a tightly coupled parallel job shared,
//! ephemeral container data structures: maps, sets, queues, and priority
//! queues partitioned into N shards, each hosted in the memory of one server
//! process. A handle routes every operation to the shard that owns it:
//! in-process when the shard is local, over RPC otherwise.
//!
//! ## Architecture Modules
//! The crate is composed of five loosely coupled subsystems:
//!
//! - **`codec`**: The wire codec. A fixed binary encoding (network byte
//!   order, length-prefixed strings and sequences) shared by every message.
//! - **`rpc`**: The request-response fabric. A process-wide TCP service that
//!   binds named handlers on servers and dispatches `(shard_id, name)` calls
//!   from clients.
//! - **`cluster`**: The cluster directory. The immutable map from shard id to
//!   network endpoint, fixed at job launch.
//! - **`bootstrap`**: The launch-runtime adapter. Rank, size, and the global
//!   barriers that sequence collection construction.
//! - **`containers`**: The public container façades and their shared
//!   routing/fan-out core.
//!
//! ## Guarantees (and non-guarantees)
//! Shards are volatile: a server crash loses its shard. RPC is best-effort
//! at-most-once over reliable streams; there is no retry, replication, or
//! consensus. Accesses to one shard are serialised by its mutex; nothing is
//! ordered across shards.

pub mod bootstrap;
pub mod cluster;
pub mod codec;
pub mod containers;
pub mod error;
pub mod rpc;

pub use self::error::{Result, ShardboxError};
