//! Distributed priority queue.
//!
//! Each shard is a max-heap on the value's `Ord`; the comparator-greatest
//! value is on top. Custom priorities are expressed by wrapping the value in
//! a newtype with the desired `Ord` (or `std::cmp::Reverse` for a min-heap).
//! Shards are addressed explicitly by the caller, like [`super::queue`].
//!
//! `top` reads the greatest value without removing it; it is served by its
//! own handler so a remote peek never mutates the shard.

use std::collections::BinaryHeap;
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

const OPS: &[&str] = &["Push", "Pop", "Top", "Size"];

pub struct PriorityQueue<T> {
    core: ContainerCore,
    store: Option<Arc<Mutex<BinaryHeap<T>>>>,
}

impl<T> PriorityQueue<T>
where
    T: Clone + Ord + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub async fn new(
        options: ContainerOptions,
        rpc: Arc<RpcService>,
        bootstrap: &dyn Bootstrap,
    ) -> Result<Self> {
        let core = ContainerCore::new(options, rpc)?;
        let store = if core.is_server() {
            let store = Arc::new(Mutex::new(BinaryHeap::new()));
            Self::bind_handlers(&core, &store)?;
            tracing::info!("Serving priority queue shard {}", core.shard_name());
            Some(store)
        } else {
            None
        };
        bootstrap.barrier().await;
        bootstrap.barrier().await;
        Ok(Self { core, store })
    }

    /// Pushes a value onto the chosen shard's heap.
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

    /// Removes and returns the greatest value; `(false, default)` when the
    /// shard is empty.
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

    /// Returns the greatest value without removing it; `(false, default)`
    /// when the shard is empty.
    pub async fn top(&self, shard: u16) -> Result<(bool, T)> {
        self.core.validate_shard(shard)?;
        if self.core.is_local(shard) {
            Ok(Self::local_top(self.local_store()?))
        } else {
            tracing::debug!("{} Top -> shard {}", self.core.name(), shard);
            self.core
                .rpc()
                .client()
                .call(shard, &self.core.handler_name("Top"), &())
                .await
        }
    }

    /// Number of values on the chosen shard's heap.
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

    fn local_store(&self) -> Result<&Arc<Mutex<BinaryHeap<T>>>> {
        self.store.as_ref().ok_or_else(|| {
            ShardboxError::Config(format!(
                "collection '{}' hosts no local shard",
                self.core.name()
            ))
        })
    }

    fn bind_handlers(core: &ContainerCore, store: &Arc<Mutex<BinaryHeap<T>>>) -> Result<()> {
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
            core.handler_name("Top"),
            Arc::new(move |_body: &[u8]| codec::encode(&Self::local_top(&s))),
        ));

        let s = store.clone();
        bindings.push((
            core.handler_name("Size"),
            Arc::new(move |_body: &[u8]| codec::encode(&Self::local_size(&s))),
        ));

        core.bind_all(bindings)
    }

    fn local_push(store: &Mutex<BinaryHeap<T>>, value: T) -> bool {
        store.lock().push(value);
        true
    }

    fn local_pop(store: &Mutex<BinaryHeap<T>>) -> (bool, T) {
        match store.lock().pop() {
            Some(value) => (true, value),
            None => (false, T::default()),
        }
    }

    fn local_top(store: &Mutex<BinaryHeap<T>>) -> (bool, T) {
        match store.lock().peek() {
            Some(value) => (true, value.clone()),
            None => (false, T::default()),
        }
    }

    fn local_size(store: &Mutex<BinaryHeap<T>>) -> usize {
        store.lock().len()
    }
}

impl<T> Drop for PriorityQueue<T> {
    fn drop(&mut self) {
        if let Some(store) = &self.store {
            self.core.unbind_handlers(OPS);
            store.lock().clear();
            tracing::debug!("Tore down shard {}", self.core.shard_name());
        }
    }
}
