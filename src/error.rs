//! Error types for shardbox.
//!
//! The taxonomy follows the failure classes of the system:
//! - **Config**: invalid wiring detected at construction (duplicate handler
//!   name, shard out of range, mismatched server count). Fatal for the
//!   collection being built.
//! - **Transport / Codec**: the connection or the byte stream failed; the
//!   triggering operation surfaces the error and the caller decides whether
//!   to retry.
//! - **Handler**: a bound handler (or the dispatch for it) failed on the
//!   server side; the message travelled back over the wire.
//!
//! A missing key or an empty queue is *not* an error anywhere in this crate;
//! those outcomes are encoded in operation return values as `(false, default)`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShardboxError {
    /// Invalid configuration detected at construction time.
    #[error("configuration error: {0}")]
    Config(String),

    /// The underlying connection failed (connect, read, or write).
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// A payload could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// A frame exceeded the configured size limit.
    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },

    /// No handler is bound under the requested name.
    #[error("no handler bound for '{0}'")]
    UnknownHandler(String),

    /// The remote handler reported a failure.
    #[error("handler '{handler}' failed: {message}")]
    Handler { handler: String, message: String },

    /// A call did not complete within the caller-supplied deadline.
    #[error("call to shard {shard} timed out after {timeout:?}")]
    Timeout { shard: u16, timeout: Duration },
}

pub type Result<T> = std::result::Result<T, ShardboxError>;
