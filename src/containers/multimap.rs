//! Distributed multimap: an ordered map where a key holds several values.
//!
//! `put` appends; `get` returns the oldest value for the key; `erase` drops
//! the key with everything under it.

use std::collections::BTreeMap;
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

pub struct Multimap<K, V> {
    core: ContainerCore,
    store: Option<Arc<Mutex<BTreeMap<K, Vec<V>>>>>,
}

impl<K, V> Multimap<K, V>
where
    K: Clone + Ord + Hash + Serialize + DeserializeOwned + Send + Sync + 'static,
    V: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub async fn new(
        options: ContainerOptions,
        rpc: Arc<RpcService>,
        bootstrap: &dyn Bootstrap,
    ) -> Result<Self> {
        let core = ContainerCore::new(options, rpc)?;
        let store = if core.is_server() {
            let store = Arc::new(Mutex::new(BTreeMap::new()));
            Self::bind_handlers(&core, &store)?;
            tracing::info!("Serving multimap shard {}", core.shard_name());
            Some(store)
        } else {
            None
        };
        bootstrap.barrier().await;
        bootstrap.barrier().await;
        Ok(Self { core, store })
    }

    /// Appends a value under the key.
    pub async fn put(&self, key: K, value: V) -> Result<bool> {
        let shard = self.core.route(&key);
        if self.core.is_local(shard) {
            Ok(Self::local_put(self.local_store()?, key, value))
        } else {
            tracing::debug!("{} Put -> shard {}", self.core.name(), shard);
            self.core
                .rpc()
                .client()
                .call(shard, &self.core.handler_name("Put"), &(&key, &value))
                .await
        }
    }

    /// The oldest value under the key; `(false, default)` when absent.
    pub async fn get(&self, key: &K) -> Result<(bool, V)> {
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

    /// Removes the key and all of its values.
    pub async fn erase(&self, key: &K) -> Result<(bool, V)> {
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

    /// Every `(key, value)` pair, flattened in key order per shard,
    /// concatenated in shard id order.
    pub async fn get_all_data(&self) -> Result<Vec<(K, V)>> {
        self.core
            .fan_out("GetAllData", &(), || {
                Ok(Self::local_get_all(self.local_store()?))
            })
            .await
    }

    pub fn shard_of(&self, key: &K) -> u16 {
        self.core.route(key)
    }

    fn local_store(&self) -> Result<&Arc<Mutex<BTreeMap<K, Vec<V>>>>> {
        self.store.as_ref().ok_or_else(|| {
            ShardboxError::Config(format!(
                "collection '{}' hosts no local shard",
                self.core.name()
            ))
        })
    }

    fn bind_handlers(core: &ContainerCore, store: &Arc<Mutex<BTreeMap<K, Vec<V>>>>) -> Result<()> {
        let mut bindings: Vec<(String, RpcHandlerFn)> = Vec::new();

        let s = store.clone();
        bindings.push((
            core.handler_name("Put"),
            Arc::new(move |body: &[u8]| {
                let (key, value): (K, V) = codec::decode(body)?;
                codec::encode(&Self::local_put(&s, key, value))
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

    fn local_put(store: &Mutex<BTreeMap<K, Vec<V>>>, key: K, value: V) -> bool {
        store.lock().entry(key).or_default().push(value);
        true
    }

    fn local_get(store: &Mutex<BTreeMap<K, Vec<V>>>, key: &K) -> (bool, V) {
        match store.lock().get(key).and_then(|values| values.first()) {
            Some(value) => (true, value.clone()),
            None => (false, V::default()),
        }
    }

    fn local_erase(store: &Mutex<BTreeMap<K, Vec<V>>>, key: &K) -> (bool, V) {
        (store.lock().remove(key).is_some(), V::default())
    }

    fn local_get_all(store: &Mutex<BTreeMap<K, Vec<V>>>) -> Vec<(K, V)> {
        let map = store.lock();
        map.iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.clone(), v.clone())))
            .collect()
    }
}

impl<K, V> Drop for Multimap<K, V> {
    fn drop(&mut self) {
        if let Some(store) = &self.store {
            self.core.unbind_handlers(OPS);
            store.lock().clear();
            tracing::debug!("Tore down shard {}", self.core.shard_name());
        }
    }
}
