//! Cluster Directory Module
//!
//! The static view of the job: which hosts serve which shards, and what role
//! the local process plays. Unlike a gossip-style membership service, the
//! directory is fixed at job launch; the surrounding parallel-launch runtime
//! decides placement, and every participant constructs an identical
//! directory from the same server list.
//!
//! ## Core Concepts
//! - **Endpoint rule**: shard `s` is served by `server_list[s]` at port
//!   `base_port + s`, uniformly for every collection in the job.
//! - **Immutability**: the directory never changes after construction and is
//!   readable from any thread without synchronisation.
//! - **One per process**: real jobs initialise the process-wide directory
//!   once (`ClusterDirectory::init_global`); tests simulating several
//!   processes build explicit directories instead.

pub mod directory;
