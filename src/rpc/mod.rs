//! RPC Fabric Module
//!
//! A name-addressed request-response layer over TCP. Servers bind named
//! handlers; clients call `(shard_id, handler_name)` and get the decoded
//! result back.
//!
//! ## Core Concepts
//! - **One service per process**: every collection in the job multiplexes
//!   over the same listener and the same handler registry, keyed by handler
//!   name. This keeps the connection count proportional to the number of
//!   peers, not the number of collections.
//! - **Framing**: `u32` big-endian length prefix, then the codec-encoded
//!   envelope (`protocol`).
//! - **Ordering**: FIFO between one client and one server on one stream.
//!   Nothing is promised across streams.
//! - **Failures**: connect/read/write/decode failures surface from the call
//!   that triggered them. An application-level miss is not a failure; it is
//!   encoded in the returned value.
//!
//! ## Submodules
//! - **`protocol`**: wire envelopes and frame I/O.
//! - **`registry`**: process-wide handler-name registry.
//! - **`server`**: listener + per-connection dispatch loop.
//! - **`client`**: pooled connections, `call` / `call_async` / timeouts.

pub mod client;
pub mod protocol;
pub mod registry;
pub mod server;


use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, OnceLock};

use crate::cluster::directory::ClusterDirectory;
use crate::error::{Result, ShardboxError};
use self::client::RpcClient;
use self::registry::HandlerRegistry;
use self::server::RpcServer;

static GLOBAL_SERVICE: OnceLock<Arc<RpcService>> = OnceLock::new();

/// The process-wide RPC endpoint: handler registry, client pool, and (on
/// server processes) the listener bound at `base_port + my_shard`.
///
/// Real jobs initialise one service per process via
/// [`RpcService::init_global`]; tests simulating several processes construct
/// explicit services with [`RpcService::start`].
pub struct RpcService {
    directory: Arc<ClusterDirectory>,
    registry: Arc<HandlerRegistry>,
    client: Arc<RpcClient>,
    server: Option<RpcServer>,
}

impl RpcService {
    /// Starts a service for this process: binds the listener when the
    /// directory marks the process as a server, and prepares the client pool.
    pub async fn start(directory: Arc<ClusterDirectory>) -> Result<Arc<Self>> {
        Self::start_with_max_frame(directory, protocol::DEFAULT_MAX_FRAME_BYTES).await
    }

    pub async fn start_with_max_frame(
        directory: Arc<ClusterDirectory>,
        max_frame: usize,
    ) -> Result<Arc<Self>> {
        let registry = Arc::new(HandlerRegistry::new());

        let server = if directory.is_server() {
            let port = directory.port_for(directory.my_shard())?;
            let bind_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
            Some(RpcServer::start(bind_addr, registry.clone(), max_frame).await?)
        } else {
            None
        };

        let client = Arc::new(RpcClient::new(directory.clone(), max_frame));

        Ok(Arc::new(Self {
            directory,
            registry,
            client,
            server,
        }))
    }

    /// Initialises the process-wide service. May be called once per process;
    /// a second initialisation is a configuration error.
    pub async fn init_global(directory: Arc<ClusterDirectory>) -> Result<Arc<Self>> {
        let service = Self::start(directory).await?;
        GLOBAL_SERVICE
            .set(service.clone())
            .map_err(|_| ShardboxError::Config("RPC service already initialised".to_string()))?;
        Ok(service)
    }

    /// Returns the process-wide service initialised by
    /// [`RpcService::init_global`].
    pub fn global() -> Result<Arc<Self>> {
        GLOBAL_SERVICE
            .get()
            .cloned()
            .ok_or_else(|| ShardboxError::Config("RPC service not initialised".to_string()))
    }

    pub fn directory(&self) -> &Arc<ClusterDirectory> {
        &self.directory
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn client(&self) -> &Arc<RpcClient> {
        &self.client
    }

    /// The listener address, when this process hosts a shard.
    pub fn server_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(|server| server.local_addr())
    }
}
