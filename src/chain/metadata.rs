//! Chunked transaction metadata.
//!
//! The ledger limits a single metadata byte string to 64 bytes, far less than
//! a DID anchoring payload. The payload is split into ordered chunks under
//! `c` and consumers rebuild it by concatenating them in array order.
//!
//! On the wire each chunk is a `0x`-prefixed hex string, the byte
//! convention used by the ledger's JSON metadata schema:
//!
//! ```text
//! { "v": 1, "c": ["0x0a1b...", "0x..."] }
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Largest byte string the ledger accepts inside metadata.
pub const MAX_CHUNK_SIZE: usize = 64;

/// Chunk size used when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = MAX_CHUNK_SIZE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    /// Chunk size must be positive.
    #[error("Invalid argument: chunk size must be greater than 0")]
    InvalidChunkSize,

    #[error("Invalid argument: chunk size {0} exceeds the {max} byte metadata limit", max = MAX_CHUNK_SIZE)]
    ChunkSizeTooLarge(usize),
}

/// Split `input` into ordered chunks of at most `chunk_size` bytes.
///
/// Only the final chunk may be shorter. Empty input yields no chunks.
/// `chunk_size` must lie in `1..=MAX_CHUNK_SIZE`.
pub fn chunk_bytes(input: &[u8], chunk_size: usize) -> Result<Vec<Vec<u8>>, ChunkError> {
    if chunk_size == 0 {
        return Err(ChunkError::InvalidChunkSize);
    }
    if chunk_size > MAX_CHUNK_SIZE {
        return Err(ChunkError::ChunkSizeTooLarge(chunk_size));
    }
    Ok(input.chunks(chunk_size).map(<[u8]>::to_vec).collect())
}

/// Metadata attached to the publish transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataBody {
    /// Payload format version.
    pub v: u32,
    /// Ordered payload chunks.
    #[serde(serialize_with = "serialize_chunks", deserialize_with = "deserialize_chunks")]
    pub c: Vec<Vec<u8>>,
}

impl MetadataBody {
    /// Build a metadata body by chunking `payload`.
    pub fn from_payload(version: u32, payload: &[u8], chunk_size: usize) -> Result<Self, ChunkError> {
        Ok(Self {
            v: version,
            c: chunk_bytes(payload, chunk_size)?,
        })
    }

    /// Concatenate the chunks back into the original payload.
    pub fn reassemble(&self) -> Vec<u8> {
        self.c.concat()
    }

    pub fn payload_len(&self) -> usize {
        self.c.iter().map(Vec::len).sum()
    }
}

fn serialize_chunks<S: Serializer>(chunks: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(chunks.iter().map(|chunk| format!("0x{}", hex::encode(chunk))))
}

fn deserialize_chunks<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error> {
    let raw = Vec::<String>::deserialize(deserializer)?;
    raw.iter()
        .map(|s| {
            let digits = s
                .strip_prefix("0x")
                .ok_or_else(|| D::Error::custom(format!("chunk '{}' is missing the 0x prefix", s)))?;
            let bytes = hex::decode(digits).map_err(D::Error::custom)?;
            if bytes.len() > MAX_CHUNK_SIZE {
                return Err(D::Error::custom(format!(
                    "chunk of {} bytes exceeds the {} byte limit",
                    bytes.len(),
                    MAX_CHUNK_SIZE
                )));
            }
            Ok(bytes)
        })
        .collect()
}
