//! RPC Server
//!
//! One TCP listener per server process. The accept loop spawns a task per
//! connection; each connection decodes frames strictly in order, dispatches
//! through the handler registry, and writes the response before reading the
//! next frame. That gives FIFO request/response ordering per stream; nothing
//! is promised across streams.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use super::protocol::{self, RequestEnvelope, ResponseEnvelope};
use super::registry::HandlerRegistry;
use crate::codec;
use crate::error::{Result, ShardboxError};

pub struct RpcServer {
    local_addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

impl RpcServer {
    /// Binds the listener and spawns the accept loop.
    pub async fn start(
        bind_addr: SocketAddr,
        registry: Arc<HandlerRegistry>,
        max_frame: usize,
    ) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("RPC server listening on {}", local_addr);

        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        let registry = registry.clone();
                        tokio::spawn(async move {
                            serve_connection(stream, peer, registry, max_frame).await;
                        });
                    }
                    Err(e) => {
                        tracing::error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
        });

        Ok(Self {
            local_addr,
            accept_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for RpcServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<HandlerRegistry>,
    max_frame: usize,
) {
    tracing::debug!("Accepted RPC connection from {}", peer);

    loop {
        let frame = match protocol::read_frame(&mut stream, max_frame).await {
            Ok(frame) => frame,
            Err(ShardboxError::Transport(ref e)) if e.kind() == ErrorKind::UnexpectedEof => {
                tracing::debug!("Connection from {} closed", peer);
                return;
            }
            Err(e) => {
                tracing::warn!("Dropping connection from {}: {}", peer, e);
                return;
            }
        };

        let response = match codec::decode::<RequestEnvelope>(&frame) {
            Ok(request) => match registry.dispatch(&request.handler, &request.body) {
                Ok(body) => ResponseEnvelope::Ok(body),
                Err(e) => {
                    tracing::warn!("Handler '{}' failed: {}", request.handler, e);
                    ResponseEnvelope::Err(e.to_string())
                }
            },
            Err(e) => ResponseEnvelope::Err(format!("malformed request: {}", e)),
        };

        let payload = match codec::encode(&response) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to encode response for {}: {}", peer, e);
                return;
            }
        };

        if let Err(e) = protocol::write_frame(&mut stream, &payload, max_frame).await {
            tracing::warn!("Failed to write response to {}: {}", peer, e);
            return;
        }
    }
}
