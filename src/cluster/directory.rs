use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::error::{Result, ShardboxError};

static GLOBAL_DIRECTORY: OnceLock<Arc<ClusterDirectory>> = OnceLock::new();

/// Immutable mapping from shard id to network endpoint, plus the local
/// process's role in the job.
pub struct ClusterDirectory {
    servers: Vec<String>,
    base_port: u16,
    my_shard: u16,
    is_server: bool,
}

impl ClusterDirectory {
    pub fn new(
        servers: Vec<String>,
        base_port: u16,
        my_shard: u16,
        is_server: bool,
    ) -> Result<Arc<Self>> {
        if servers.is_empty() {
            return Err(ShardboxError::Config(
                "server list must not be empty".to_string(),
            ));
        }
        if servers.len() > u16::MAX as usize {
            return Err(ShardboxError::Config(format!(
                "server list of {} entries exceeds the shard id range",
                servers.len()
            )));
        }
        let num_servers = servers.len() as u16;
        if base_port.checked_add(num_servers - 1).is_none() {
            return Err(ShardboxError::Config(format!(
                "base port {} with {} servers overflows the port range",
                base_port, num_servers
            )));
        }
        if is_server && my_shard >= num_servers {
            return Err(ShardboxError::Config(format!(
                "local shard {} out of range for {} servers",
                my_shard, num_servers
            )));
        }

        tracing::info!(
            "Cluster directory: {} servers, base port {}, local shard {} ({})",
            num_servers,
            base_port,
            my_shard,
            if is_server { "server" } else { "client" }
        );

        Ok(Arc::new(Self {
            servers,
            base_port,
            my_shard,
            is_server,
        }))
    }

    /// Builds a directory from a hostfile: one server host per line, shard
    /// ids assigned in file order. Blank lines are skipped.
    pub fn from_hostfile<P: AsRef<Path>>(
        path: P,
        base_port: u16,
        my_shard: u16,
        is_server: bool,
    ) -> Result<Arc<Self>> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let servers: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(servers, base_port, my_shard, is_server)
    }

    /// Initialises the process-wide directory. May be called once per
    /// process; a second initialisation is a configuration error.
    pub fn init_global(
        servers: Vec<String>,
        base_port: u16,
        my_shard: u16,
        is_server: bool,
    ) -> Result<Arc<Self>> {
        let directory = Self::new(servers, base_port, my_shard, is_server)?;
        GLOBAL_DIRECTORY
            .set(directory.clone())
            .map_err(|_| ShardboxError::Config("cluster directory already initialised".to_string()))?;
        Ok(directory)
    }

    /// Returns the process-wide directory set by
    /// [`ClusterDirectory::init_global`].
    pub fn global() -> Result<Arc<Self>> {
        GLOBAL_DIRECTORY
            .get()
            .cloned()
            .ok_or_else(|| ShardboxError::Config("cluster directory not initialised".to_string()))
    }

    /// The `(host, port)` serving a shard.
    pub fn endpoint(&self, shard: u16) -> Result<(&str, u16)> {
        let host = self
            .servers
            .get(shard as usize)
            .ok_or_else(|| {
                ShardboxError::Config(format!(
                    "shard {} out of range for {} servers",
                    shard,
                    self.servers.len()
                ))
            })?;
        Ok((host.as_str(), self.port_for(shard)?))
    }

    /// The listening port for a shard: `base_port + shard`.
    pub fn port_for(&self, shard: u16) -> Result<u16> {
        if (shard as usize) >= self.servers.len() {
            return Err(ShardboxError::Config(format!(
                "shard {} out of range for {} servers",
                shard,
                self.servers.len()
            )));
        }
        // Construction guarantees base_port + num_servers - 1 fits in u16.
        Ok(self.base_port + shard)
    }

    pub fn num_servers(&self) -> u16 {
        self.servers.len() as u16
    }

    pub fn base_port(&self) -> u16 {
        self.base_port
    }

    pub fn my_shard(&self) -> u16 {
        self.my_shard
    }

    pub fn is_server(&self) -> bool {
        self.is_server
    }
}
