//! Distributed FIFO queue.
//!
//! Queue shards are addressed explicitly: the caller names the shard for
//! every operation instead of routing by key. A common pattern gives each
//! rank "its" shard for work-stealing style coordination.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::common::{ContainerCore, ContainerOptions};
use crate::bootstrap::Bootstrap;
use crate::codec;
use crate::error::{Result, ShardboxError};
use crate::rpc::RpcService;
use crate::rpc::registry::RpcHandlerFn;

const OPS: &[&str] = &["Push", "Pop", "Size"];

pub struct Queue<T> {
    core: ContainerCore,
    store: Option<Arc<Mutex<VecDeque<T>>>>,
}

impl<T> Queue<T>
where
    T: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub async fn new(
        options: ContainerOptions,
        rpc: Arc<RpcService>,
        bootstrap: &dyn Bootstrap,
    ) -> Result<Self> {
        let core = ContainerCore::new(options, rpc)?;
        let store = if core.is_server() {
            let store = Arc::new(Mutex::new(VecDeque::new()));
            Self::bind_handlers(&core, &store)?;
            tracing::info!("Serving queue shard {}", core.shard_name());
            Some(store)
        } else {
            None
        };
        bootstrap.barrier().await;
        bootstrap.barrier().await;
        Ok(Self { core, store })
    }

    /// Appends a value to the chosen shard's queue.
    pub async fn push(&self, value: T, shard: u16) -> Result<bool> {
        self.core.validate_shard(shard)?;
        if self.core.is_local(shard) {
            Ok(Self::local_push(self.local_store()?, value))
        } else {
            tracing::debug!("{} Push -> shard {}", self.core.name(), shard);
            self.core
                .rpc()
                .client()
                .call(shard, &self.core.handler_name("Push"), &value)
                .await
        }
    }

    /// Pops the front of the chosen shard's queue; `(false, default)` when
    /// empty.
    pub async fn pop(&self, shard: u16) -> Result<(bool, T)> {
        self.core.validate_shard(shard)?;
        if self.core.is_local(shard) {
            Ok(Self::local_pop(self.local_store()?))
        } else {
            tracing::debug!("{} Pop -> shard {}", self.core.name(), shard);
            self.core
                .rpc()
                .client()
                .call(shard, &self.core.handler_name("Pop"), &())
                .await
        }
    }

    /// Number of entries in the chosen shard's queue.
    pub async fn size(&self, shard: u16) -> Result<usize> {
        self.core.validate_shard(shard)?;
        if self.core.is_local(shard) {
            Ok(Self::local_size(self.local_store()?))
        } else {
            tracing::debug!("{} Size -> shard {}", self.core.name(), shard);
            self.core
                .rpc()
                .client()
                .call(shard, &self.core.handler_name("Size"), &())
                .await
        }
    }

    fn local_store(&self) -> Result<&Arc<Mutex<VecDeque<T>>>> {
        self.store.as_ref().ok_or_else(|| {
            ShardboxError::Config(format!(
                "collection '{}' hosts no local shard",
                self.core.name()
            ))
        })
    }

    fn bind_handlers(core: &ContainerCore, store: &Arc<Mutex<VecDeque<T>>>) -> Result<()> {
        let mut bindings: Vec<(String, RpcHandlerFn)> = Vec::new();

        let s = store.clone();
        bindings.push((
            core.handler_name("Push"),
            Arc::new(move |body: &[u8]| {
                let value: T = codec::decode(body)?;
                codec::encode(&Self::local_push(&s, value))
            }),
        ));

        let s = store.clone();
        bindings.push((
            core.handler_name("Pop"),
            Arc::new(move |_body: &[u8]| codec::encode(&Self::local_pop(&s))),
        ));

        let s = store.clone();
        bindings.push((
            core.handler_name("Size"),
            Arc::new(move |_body: &[u8]| codec::encode(&Self::local_size(&s))),
        ));

        core.bind_all(bindings)
    }

    fn local_push(store: &Mutex<VecDeque<T>>, value: T) -> bool {
        store.lock().push_back(value);
        true
    }

    fn local_pop(store: &Mutex<VecDeque<T>>) -> (bool, T) {
        match store.lock().pop_front() {
            Some(value) => (true, value),
            None => (false, T::default()),
        }
    }

    fn local_size(store: &Mutex<VecDeque<T>>) -> usize {
        store.lock().len()
    }
}

impl<T> Drop for Queue<T> {
    fn drop(&mut self) {
        if let Some(store) = &self.store {
            self.core.unbind_handlers(OPS);
            store.lock().clear();
            tracing::debug!("Tore down shard {}", self.core.shard_name());
        }
    }
}
