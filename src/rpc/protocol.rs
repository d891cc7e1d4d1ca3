//! RPC Wire Protocol
//!
//! Defines the envelopes exchanged between client and server, and the frame
//! layout that carries them over a stream.
//!
//! Every message is a frame: a `u32` big-endian length prefix followed by
//! that many payload bytes. The payload is the codec encoding of one
//! envelope. A request names its handler and carries the pre-encoded
//! argument tuple; a response carries either the handler's encoded result or
//! the server-side error text.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, ShardboxError};

/// Upper bound on a single frame unless the service is configured otherwise.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// One request: which handler to run and the encoded positional arguments.
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub handler: String,
    pub body: Vec<u8>,
}

/// One response: the handler's encoded result, or why it could not run.
///
/// `Err` is reserved for dispatch and handler failures. An application-level
/// miss (absent key, empty queue) is a regular `Ok` body whose decoded value
/// says `(false, default)`.
#[derive(Debug, Serialize, Deserialize)]
pub enum ResponseEnvelope {
    Ok(Vec<u8>),
    Err(String),
}

/// Writes one length-prefixed frame.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8], max_frame: usize) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > max_frame {
        return Err(ShardboxError::FrameTooLarge {
            len: payload.len(),
            max: max_frame,
        });
    }
    writer.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one length-prefixed frame.
pub async fn read_frame<R>(reader: &mut R, max_frame: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    reader.read_exact(&mut header).await?;
    let len = u32::from_be_bytes(header) as usize;
    if len > max_frame {
        return Err(ShardboxError::FrameTooLarge {
            len,
            max: max_frame,
        });
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}
