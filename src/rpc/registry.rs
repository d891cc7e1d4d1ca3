//! Handler Registry
//!
//! Process-wide map from handler name to handler closure. Collections bind
//! their handlers here during construction, before the post-construction
//! barrier; after that point the registry is only read.
//!
//! Handler names must be unique within the process. Collection names are
//! unique per job and handler names are derived as `{collection}_{op}`, so a
//! duplicate bind means two collections collided on a name; that is a fatal
//! configuration error.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

use crate::error::{Result, ShardboxError};

/// A bound handler: decodes its argument bytes, runs against the local
/// shard, and returns its encoded result.
///
/// Handlers are synchronous on purpose: they take the shard mutex for their
/// whole body and must not issue further RPCs, so there is nothing for them
/// to await.
pub type RpcHandlerFn = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync>;

pub struct HandlerRegistry {
    handlers: DashMap<String, RpcHandlerFn>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Binds a named handler. Binding a name twice is a configuration error.
    pub fn bind<F>(&self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.bind_handler(name, Arc::new(handler))
    }

    /// Non-generic form of [`HandlerRegistry::bind`] for pre-built handlers.
    pub fn bind_handler(&self, name: &str, handler: RpcHandlerFn) -> Result<()> {
        match self.handlers.entry(name.to_string()) {
            Entry::Occupied(_) => Err(ShardboxError::Config(format!(
                "handler '{}' is already bound",
                name
            ))),
            Entry::Vacant(entry) => {
                entry.insert(handler);
                tracing::debug!("Bound handler: {}", name);
                Ok(())
            }
        }
    }

    /// Removes a handler binding. Used by server-side teardown.
    pub fn unbind(&self, name: &str) {
        if self.handlers.remove(name).is_some() {
            tracing::debug!("Unbound handler: {}", name);
        }
    }

    /// Runs the named handler against a request body.
    pub fn dispatch(&self, name: &str, body: &[u8]) -> Result<Vec<u8>> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ShardboxError::UnknownHandler(name.to_string()))?;
        handler.value()(body)
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
