//! Distributed ordered map.
//!
//! Keys are routed by hash; each shard keeps a `BTreeMap` ordered by the
//! key's `Ord` implementation. Custom comparators are expressed by wrapping
//! the key in a newtype with the desired `Ord`.
//!
//! Beyond the point operations, the ordered map supports a range-scan
//! `contains` for range-typed keys (see [`KeyRange`]): all entries whose key
//! covers the probe or is covered by it. Keys overlapping a probe must form
//! a contiguous run of the ordering for the scan to be exact.

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

const OPS: &[&str] = &["Put", "Get", "Erase", "Contains", "GetAllData"];

/// Containment relation for range-typed keys.
///
/// `a.covers(b)` answers whether `a`'s range reaches `b`; the scan in
/// [`OrderedMap::contains`] emits entries related to the probe in either
/// direction. Point-like keys treat coverage as equality.
pub trait KeyRange {
    fn covers(&self, other: &Self) -> bool;
}

macro_rules! point_key_range {
    ($($ty:ty),* $(,)?) => {
        $(impl KeyRange for $ty {
            fn covers(&self, other: &Self) -> bool {
                self == other
            }
        })*
    };
}

point_key_range!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, String);

/// A sharded, ordered `K -> V` map.
pub struct OrderedMap<K, V> {
    core: ContainerCore,
    store: Option<Arc<Mutex<BTreeMap<K, V>>>>,
}

impl<K, V> OrderedMap<K, V>
where
    K: Clone + Ord + Hash + KeyRange + Serialize + DeserializeOwned + Send + Sync + 'static,
    V: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Builds the collection on this participant.
    ///
    /// Servers create their shard store and bind its handlers; the two
    /// barriers keep construction in lockstep across the job. No operation
    /// may be issued before `new` returns on every participant.
    pub async fn new(
        options: ContainerOptions,
        rpc: Arc<RpcService>,
        bootstrap: &dyn Bootstrap,
    ) -> Result<Self> {
        let core = ContainerCore::new(options, rpc)?;
        let store = if core.is_server() {
            let store = Arc::new(Mutex::new(BTreeMap::new()));
            Self::bind_handlers(&core, &store)?;
            tracing::info!("Serving ordered map shard {}", core.shard_name());
            Some(store)
        } else {
            None
        };
        // All shards must be bound before any client issues a call.
        bootstrap.barrier().await;
        // Clients attach lazily through the directory; the second barrier
        // keeps operations from starting before every participant is ready.
        bootstrap.barrier().await;
        Ok(Self { core, store })
    }

    /// Inserts or replaces; last writer wins.
    pub async fn put(&self, key: K, value: V) -> Result<bool> {
        let shard = self.core.route(&key);
        if self.core.is_local(shard) {
            tracing::debug!("{} Put (local)", self.core.shard_name());
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

    /// Looks the key up on its shard; `(false, default)` when absent.
    pub async fn get(&self, key: &K) -> Result<(bool, V)> {
        let shard = self.core.route(key);
        if self.core.is_local(shard) {
            tracing::debug!("{} Get (local)", self.core.shard_name());
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

    /// Removes the key from its shard; the flag reports whether it existed.
    pub async fn erase(&self, key: &K) -> Result<(bool, V)> {
        let shard = self.core.route(key);
        if self.core.is_local(shard) {
            tracing::debug!("{} Erase (local)", self.core.shard_name());
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

    /// Fan-out range scan: every entry, on any shard, whose key covers the
    /// probe or is covered by it, concatenated in shard id order.
    pub async fn contains(&self, key: &K) -> Result<Vec<(K, V)>> {
        self.core
            .fan_out("Contains", key, || {
                Ok(Self::local_contains(self.local_store()?, key))
            })
            .await
    }

    /// Fan-out enumeration of the whole collection, concatenated in shard id
    /// order; within a shard, ascending key order.
    pub async fn get_all_data(&self) -> Result<Vec<(K, V)>> {
        self.core
            .fan_out("GetAllData", &(), || {
                Ok(Self::local_get_all(self.local_store()?))
            })
            .await
    }

    /// The shard a key routes to.
    pub fn shard_of(&self, key: &K) -> u16 {
        self.core.route(key)
    }

    fn local_store(&self) -> Result<&Arc<Mutex<BTreeMap<K, V>>>> {
        self.store.as_ref().ok_or_else(|| {
            ShardboxError::Config(format!(
                "collection '{}' hosts no local shard",
                self.core.name()
            ))
        })
    }

    fn bind_handlers(core: &ContainerCore, store: &Arc<Mutex<BTreeMap<K, V>>>) -> Result<()> {
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
            core.handler_name("Contains"),
            Arc::new(move |body: &[u8]| {
                let key: K = codec::decode(body)?;
                codec::encode(&Self::local_contains(&s, &key))
            }),
        ));

        let s = store.clone();
        bindings.push((
            core.handler_name("GetAllData"),
            Arc::new(move |_body: &[u8]| codec::encode(&Self::local_get_all(&s))),
        ));

        core.bind_all(bindings)
    }

    fn local_put(store: &Mutex<BTreeMap<K, V>>, key: K, value: V) -> bool {
        let mut map = store.lock();
        map.insert(key, value);
        true
    }

    fn local_get(store: &Mutex<BTreeMap<K, V>>, key: &K) -> (bool, V) {
        let map = store.lock();
        match map.get(key) {
            Some(value) => (true, value.clone()),
            None => (false, V::default()),
        }
    }

    fn local_erase(store: &Mutex<BTreeMap<K, V>>, key: &K) -> (bool, V) {
        let mut map = store.lock();
        (map.remove(key).is_some(), V::default())
    }

    /// Range scan centred on the probe:
    /// 1. position at the least key >= probe;
    /// 2. an empty tail means no match;
    /// 3. step left once if the predecessor still covers the probe;
    /// 4. advance, emitting entries related to the probe in either
    ///    direction, and stop at the first unrelated key.
    fn local_contains(store: &Mutex<BTreeMap<K, V>>, probe: &K) -> Vec<(K, V)> {
        let map = store.lock();
        let mut matches = Vec::new();

        let Some(mut cursor) = map.range(probe.clone()..).next().map(|(k, _)| k.clone()) else {
            return matches;
        };

        if let Some((prev, _)) = map.range(..cursor.clone()).next_back() {
            if prev.covers(probe) {
                cursor = prev.clone();
            }
        }

        for (k, v) in map.range(cursor..) {
            if probe.covers(k) || k.covers(probe) {
                matches.push((k.clone(), v.clone()));
            } else {
                break;
            }
        }
        matches
    }

    fn local_get_all(store: &Mutex<BTreeMap<K, V>>) -> Vec<(K, V)> {
        let map = store.lock();
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K, V> Drop for OrderedMap<K, V> {
    fn drop(&mut self) {
        if let Some(store) = &self.store {
            self.core.unbind_handlers(OPS);
            store.lock().clear();
            tracing::debug!("Tore down shard {}", self.core.shard_name());
        }
    }
}
