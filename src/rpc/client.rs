//! RPC Client
//!
//! Name-addressed calls to any shard of the job. The endpoint for shard `s`
//! is the directory host for `s` at port `base_port + s`. One connection per
//! shard is kept in a pool and reused; requests on a pooled connection are
//! serialised by a per-connection lock, which preserves FIFO ordering on the
//! stream. A connection that fails (or times out with a response still in
//! flight) is evicted from the pool and the next call reconnects.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::protocol::{self, RequestEnvelope, ResponseEnvelope};
use crate::cluster::directory::ClusterDirectory;
use crate::codec;
use crate::error::{Result, ShardboxError};

pub struct RpcClient {
    directory: Arc<ClusterDirectory>,
    connections: DashMap<u16, Arc<Mutex<TcpStream>>>,
    max_frame: usize,
}

impl RpcClient {
    pub fn new(directory: Arc<ClusterDirectory>, max_frame: usize) -> Self {
        Self {
            directory,
            connections: DashMap::new(),
            max_frame,
        }
    }

    /// Calls a named handler on a shard and waits for its result.
    ///
    /// Blocks the calling task until the response arrives or the transport
    /// fails. There is no default timeout; see [`RpcClient::call_with_timeout`].
    pub async fn call<A, R>(&self, shard: u16, handler: &str, args: &A) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = encode_request(handler, args)?;
        let payload = self.exchange(shard, &request).await?;
        decode_response(handler, &payload)
    }

    /// Like [`RpcClient::call`] but fails with [`ShardboxError::Timeout`] if no
    /// response arrives within `timeout`.
    pub async fn call_with_timeout<A, R>(
        &self,
        shard: u16,
        handler: &str,
        args: &A,
        timeout: Duration,
    ) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = encode_request(handler, args)?;
        match tokio::time::timeout(timeout, self.exchange(shard, &request)).await {
            Ok(payload) => decode_response(handler, &payload?),
            Err(_) => {
                // The response may still arrive on the pooled stream and
                // desynchronise later exchanges; retire the connection.
                self.connections.remove(&shard);
                Err(ShardboxError::Timeout { shard, timeout })
            }
        }
    }

    /// Issues the call on a spawned task and returns its handle.
    pub fn call_async<A, R>(
        self: &Arc<Self>,
        shard: u16,
        handler: &str,
        args: &A,
    ) -> JoinHandle<Result<R>>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned + Send + 'static,
    {
        let client = Arc::clone(self);
        let handler = handler.to_string();
        let request = encode_request(&handler, args);
        tokio::spawn(async move {
            let payload = client.exchange(shard, &request?).await?;
            decode_response(&handler, &payload)
        })
    }

    /// Sends one framed request on the shard's pooled connection and reads
    /// the matching response.
    async fn exchange(&self, shard: u16, request: &[u8]) -> Result<Vec<u8>> {
        let connection = self.connection(shard).await?;
        let mut stream = connection.lock().await;
        let result = async {
            protocol::write_frame(&mut *stream, request, self.max_frame).await?;
            protocol::read_frame(&mut *stream, self.max_frame).await
        }
        .await;
        drop(stream);
        if result.is_err() {
            self.connections.remove(&shard);
        }
        result
    }

    async fn connection(&self, shard: u16) -> Result<Arc<Mutex<TcpStream>>> {
        if let Some(existing) = self.connections.get(&shard) {
            return Ok(existing.value().clone());
        }
        let (host, port) = self.directory.endpoint(shard)?;
        tracing::debug!("Connecting to shard {} at {}:{}", shard, host, port);
        let stream = TcpStream::connect((host, port)).await?;
        let connection = Arc::new(Mutex::new(stream));
        // A concurrent connect to the same shard may race us; last insert
        // wins and the loser's stream simply serves its in-flight call.
        self.connections.insert(shard, connection.clone());
        Ok(connection)
    }
}

fn encode_request<A>(handler: &str, args: &A) -> Result<Vec<u8>>
where
    A: Serialize + ?Sized,
{
    let body = codec::encode(args)?;
    codec::encode(&RequestEnvelope {
        handler: handler.to_string(),
        body,
    })
}

fn decode_response<R>(handler: &str, payload: &[u8]) -> Result<R>
where
    R: DeserializeOwned,
{
    match codec::decode::<ResponseEnvelope>(payload)? {
        ResponseEnvelope::Ok(body) => codec::decode(&body),
        ResponseEnvelope::Err(message) => Err(ShardboxError::Handler {
            handler: handler.to_string(),
            message,
        }),
    }
}
