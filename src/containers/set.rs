//! Distributed ordered set: hashed routing, point membership.

use std::collections::BTreeSet;
use std::hash::Hash;
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

const OPS: &[&str] = &["Put", "Get", "Erase", "GetAllData"];

pub struct Set<K> {
    core: ContainerCore,
    store: Option<Arc<Mutex<BTreeSet<K>>>>,
}

impl<K> Set<K>
where
    K: Clone + Ord + Hash + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub async fn new(
        options: ContainerOptions,
        rpc: Arc<RpcService>,
        bootstrap: &dyn Bootstrap,
    ) -> Result<Self> {
        let core = ContainerCore::new(options, rpc)?;
        let store = if core.is_server() {
            let store = Arc::new(Mutex::new(BTreeSet::new()));
            Self::bind_handlers(&core, &store)?;
            tracing::info!("Serving set shard {}", core.shard_name());
            Some(store)
        } else {
            None
        };
        bootstrap.barrier().await;
        bootstrap.barrier().await;
        Ok(Self { core, store })
    }

    /// Inserts the key; inserting an existing key is still a success.
    pub async fn put(&self, key: K) -> Result<bool> {
        let shard = self.core.route(&key);
        if self.core.is_local(shard) {
            Ok(Self::local_put(self.local_store()?, key))
        } else {
            tracing::debug!("{} Put -> shard {}", self.core.name(), shard);
            self.core
                .rpc()
                .client()
                .call(shard, &self.core.handler_name("Put"), &key)
                .await
        }
    }

    /// Point membership on the key's shard.
    pub async fn get(&self, key: &K) -> Result<bool> {
        let shard = self.core.route(key);
        if self.core.is_local(shard) {
            Ok(Self::local_get(self.local_store()?, key))
        } else {
            tracing::debug!("{} Get -> shard {}", self.core.name(), shard);
            self.core
                .rpc()
                .client()
                .call(shard, &self.core.handler_name("Get"), key)
                .await
        }
    }

    /// Removes the key; reports whether it existed.
    pub async fn erase(&self, key: &K) -> Result<bool> {
        let shard = self.core.route(key);
        if self.core.is_local(shard) {
            Ok(Self::local_erase(self.local_store()?, key))
        } else {
            tracing::debug!("{} Erase -> shard {}", self.core.name(), shard);
            self.core
                .rpc()
                .client()
                .call(shard, &self.core.handler_name("Erase"), key)
                .await
        }
    }

    /// Every key on every shard, concatenated in shard id order; within a
    /// shard, ascending order.
    pub async fn get_all_data(&self) -> Result<Vec<K>> {
        self.core
            .fan_out("GetAllData", &(), || {
                Ok(Self::local_get_all(self.local_store()?))
            })
            .await
    }

    pub fn shard_of(&self, key: &K) -> u16 {
        self.core.route(key)
    }

    fn local_store(&self) -> Result<&Arc<Mutex<BTreeSet<K>>>> {
        self.store.as_ref().ok_or_else(|| {
            ShardboxError::Config(format!(
                "collection '{}' hosts no local shard",
                self.core.name()
            ))
        })
    }

    fn bind_handlers(core: &ContainerCore, store: &Arc<Mutex<BTreeSet<K>>>) -> Result<()> {
        let mut bindings: Vec<(String, RpcHandlerFn)> = Vec::new();

        let s = store.clone();
        bindings.push((
            core.handler_name("Put"),
            Arc::new(move |body: &[u8]| {
                let key: K = codec::decode(body)?;
                codec::encode(&Self::local_put(&s, key))
            }),
        ));

        let s = store.clone();
        bindings.push((
            core.handler_name("Get"),
            Arc::new(move |body: &[u8]| {
                let key: K = codec::decode(body)?;
                codec::encode(&Self::local_get(&s, &key))
            }),
        ));

        let s = store.clone();
        bindings.push((
            core.handler_name("Erase"),
            Arc::new(move |body: &[u8]| {
                let key: K = codec::decode(body)?;
                codec::encode(&Self::local_erase(&s, &key))
            }),
        ));

        let s = store.clone();
        bindings.push((
            core.handler_name("GetAllData"),
            Arc::new(move |_body: &[u8]| codec::encode(&Self::local_get_all(&s))),
        ));

        core.bind_all(bindings)
    }

    fn local_put(store: &Mutex<BTreeSet<K>>, key: K) -> bool {
        store.lock().insert(key);
        true
    }

    fn local_get(store: &Mutex<BTreeSet<K>>, key: &K) -> bool {
        store.lock().contains(key)
    }

    fn local_erase(store: &Mutex<BTreeSet<K>>, key: &K) -> bool {
        store.lock().remove(key)
    }

    fn local_get_all(store: &Mutex<BTreeSet<K>>) -> Vec<K> {
        store.lock().iter().cloned().collect()
    }
}

impl<K> Drop for Set<K> {
    fn drop(&mut self) {
        if let Some(store) = &self.store {
            self.core.unbind_handlers(OPS);
            store.lock().clear();
            tracing::debug!("Tore down shard {}", self.core.shard_name());
        }
    }
}
