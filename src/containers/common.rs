//! Shared container machinery: options, routing, and dispatch.
//!
//! Every container kind owns a `ContainerCore` that knows the collection
//! name, the shard layout, the local role, and the RPC service to go through
//! for remote shards. The kinds differ only in their local store and handler
//! set.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, ShardboxError};
use crate::rpc::RpcService;
use crate::rpc::registry::RpcHandlerFn;

/// Named construction options for a collection (one per participant).
///
/// Every participant of a job must construct the same collection with the
/// same `name` and `num_servers`; `is_server`/`my_server` describe the local
/// process's role.
#[derive(Debug, Clone)]
pub struct ContainerOptions {
    pub(crate) name: String,
    pub(crate) is_server: bool,
    pub(crate) my_server: u16,
    pub(crate) num_servers: u16,
    pub(crate) server_on_node: bool,
}

impl ContainerOptions {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_server: false,
            my_server: 0,
            num_servers: 1,
            server_on_node: false,
        }
    }

    /// Whether this process hosts a shard of the collection.
    pub fn with_is_server(mut self, is_server: bool) -> Self {
        self.is_server = is_server;
        self
    }

    /// The shard id owned by this process (servers only).
    pub fn with_my_server(mut self, my_server: u16) -> Self {
        self.my_server = my_server;
        self
    }

    /// Total shard count N, fixed for the lifetime of the collection.
    pub fn with_num_servers(mut self, num_servers: u16) -> Self {
        self.num_servers = num_servers;
        self
    }

    /// Enables the in-process fast path for operations routed to the local
    /// shard. Only meaningful on a server process.
    pub fn with_server_on_node(mut self, server_on_node: bool) -> Self {
        self.server_on_node = server_on_node;
        self
    }
}

/// The routing and dispatch state shared by every container kind.
pub(crate) struct ContainerCore {
    name: String,
    num_servers: u16,
    my_server: u16,
    is_server: bool,
    server_on_node: bool,
    rpc: Arc<RpcService>,
}

impl ContainerCore {
    pub fn new(options: ContainerOptions, rpc: Arc<RpcService>) -> Result<Self> {
        if options.name.is_empty() {
            return Err(ShardboxError::Config(
                "collection name must not be empty".to_string(),
            ));
        }
        if options.num_servers == 0 {
            return Err(ShardboxError::Config(
                "a collection needs at least one server".to_string(),
            ));
        }
        let directory = rpc.directory();
        if options.num_servers != directory.num_servers() {
            return Err(ShardboxError::Config(format!(
                "collection '{}' wants {} servers but the directory lists {}",
                options.name,
                options.num_servers,
                directory.num_servers()
            )));
        }
        if options.is_server {
            if !directory.is_server() {
                return Err(ShardboxError::Config(format!(
                    "collection '{}' marks this process as a server but the directory does not",
                    options.name
                )));
            }
            if options.my_server >= options.num_servers {
                return Err(ShardboxError::Config(format!(
                    "shard {} out of range for {} servers",
                    options.my_server, options.num_servers
                )));
            }
            if options.my_server != directory.my_shard() {
                return Err(ShardboxError::Config(format!(
                    "collection '{}' claims shard {} but this process serves shard {}",
                    options.name,
                    options.my_server,
                    directory.my_shard()
                )));
            }
        } else if options.server_on_node {
            // The fast path invokes the local store in-process; without a
            // hosted shard there is nothing to invoke.
            return Err(ShardboxError::Config(format!(
                "collection '{}' enables server_on_node without is_server",
                options.name
            )));
        }

        Ok(Self {
            name: options.name,
            num_servers: options.num_servers,
            my_server: options.my_server,
            is_server: options.is_server,
            server_on_node: options.server_on_node,
            rpc,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_server(&self) -> bool {
        self.is_server
    }

    pub fn rpc(&self) -> &Arc<RpcService> {
        &self.rpc
    }

    /// Physical name of the local shard, `{name}#{shard}`. Disambiguates
    /// co-located shards in logs.
    pub fn shard_name(&self) -> String {
        format!("{}#{}", self.name, self.my_server)
    }

    /// Wire name of an operation handler, `{name}_{op}`.
    pub fn handler_name(&self, op: &str) -> String {
        format!("{}_{}", self.name, op)
    }

    /// Shard owning a key: `hash(key) mod N`. The hasher is deterministic,
    /// so every participant running the job binary routes identically.
    pub fn route<K: Hash>(&self, key: &K) -> u16 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.num_servers as u64) as u16
    }

    /// Whether an operation routed to `shard` may bypass RPC and run on the
    /// local store directly.
    pub fn is_local(&self, shard: u16) -> bool {
        self.server_on_node && self.is_server && shard == self.my_server
    }

    /// Validates a caller-chosen shard id (queue-like kinds).
    pub fn validate_shard(&self, shard: u16) -> Result<()> {
        if shard >= self.num_servers {
            return Err(ShardboxError::Config(format!(
                "shard {} out of range for {} servers",
                shard, self.num_servers
            )));
        }
        Ok(())
    }

    /// Visits every shard in ascending shard id order, concatenating the
    /// per-shard results. The local closure is used for the shard this
    /// process serves (when the fast path applies); every other shard is
    /// reached over RPC. The first failing sub-call fails the fan-out and
    /// discards partial results.
    pub async fn fan_out<A, R>(
        &self,
        op: &str,
        args: &A,
        local: impl Fn() -> Result<Vec<R>>,
    ) -> Result<Vec<R>>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let handler = self.handler_name(op);
        let mut combined = Vec::new();
        for shard in 0..self.num_servers {
            let mut part = if self.is_local(shard) {
                local()?
            } else {
                self.rpc.client().call(shard, &handler, args).await?
            };
            combined.append(&mut part);
        }
        Ok(combined)
    }

    /// Binds a collection's full handler set. On a duplicate name, the
    /// bindings made so far are rolled back and the error surfaces, leaving
    /// any other collection's handlers untouched.
    pub fn bind_all(&self, bindings: Vec<(String, RpcHandlerFn)>) -> Result<()> {
        let registry = self.rpc.registry();
        for (index, (name, handler)) in bindings.iter().enumerate() {
            if let Err(e) = registry.bind_handler(name, handler.clone()) {
                for (bound, _) in bindings.iter().take(index) {
                    registry.unbind(bound);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Removes this collection's handler bindings (server teardown).
    pub fn unbind_handlers(&self, ops: &[&str]) {
        if self.is_server {
            for op in ops {
                self.rpc.registry().unbind(&self.handler_name(op));
            }
        }
    }
}
