//! Distributed Container Module
//!
//! The public container façades. A collection is partitioned into N shards,
//! one per server process; a handle routes each operation to the shard that
//! owns it and executes it against that shard's in-memory store under the
//! shard mutex.
//!
//! ## Core Concepts
//! - **Routing**: keyed kinds hash the key (`hash(key) mod N`); queue-like
//!   kinds take the shard id from the caller.
//! - **Local fast path**: when the routed shard is the one this process
//!   serves, the handle skips the RPC layer and runs the same closure the
//!   handler would run. Purely a latency optimisation.
//! - **Fan-out**: whole-collection reads (`contains`, `get_all_data`) visit
//!   every shard in ascending shard id order and concatenate the per-shard
//!   results, preserving each shard's native order. All-or-nothing: one
//!   failed sub-call fails the whole operation.
//! - **Construction barriers**: servers bind handlers, everyone barriers,
//!   clients attach, everyone barriers. No operation may be issued earlier.
//!
//! ## Kinds
//! - **`unordered_map`**: hash table, point operations.
//! - **`map`**: ordered map with a range-scan `contains` for range-typed keys.
//! - **`multimap`**: ordered map allowing several values per key.
//! - **`set`**: ordered key set with point membership.
//! - **`queue`**: FIFO queue addressed by explicit shard.
//! - **`priority_queue`**: max-heap addressed by explicit shard.

pub mod common;
pub mod map;
pub mod multimap;
pub mod priority_queue;
pub mod queue;
pub mod set;
pub mod unordered_map;

#[cfg(test)]
mod tests;

pub use self::common::ContainerOptions;
pub use self::map::{KeyRange, OrderedMap};
pub use self::multimap::Multimap;
pub use self::priority_queue::PriorityQueue;
pub use self::queue::Queue;
pub use self::set::Set;
pub use self::unordered_map::UnorderedMap;
