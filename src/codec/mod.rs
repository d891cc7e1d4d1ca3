//! Wire Codec
//!
//! A single, fixed binary encoding shared by every message that crosses the
//! network. All participants of a job run the same binary, so the encoding
//! only needs to be stable and deterministic, not self-describing.
//!
//! ## Encoding rules
//! - Integers are fixed-width, network byte order (big-endian).
//! - Strings and byte sequences are length-prefixed (u64 length, then bytes).
//! - Sequences are length-prefixed homogeneous runs of their element encoding.
//! - User-defined records participate by deriving `Serialize`/`Deserialize`;
//!   the derive is the registration.
//!
//! Trailing bytes after a decoded value are rejected.

use std::io::Cursor;

use bincode::Options;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, ShardboxError};


fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
}

/// Encodes a value into the wire representation.
pub fn encode<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    Ok(wire_options().serialize(value)?)
}

/// Decodes a value from the wire representation. The value must account for
/// every input byte; leftovers mean a framing bug somewhere upstream.
pub fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut cursor = Cursor::new(bytes);
    let value = wire_options().deserialize_from(&mut cursor)?;
    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(ShardboxError::Codec(Box::new(bincode::ErrorKind::Custom(
            format!(
                "{} trailing bytes after decoded value",
                bytes.len() - consumed
            ),
        ))));
    }
    Ok(value)
}
