//! EBML element construction and serialization.

use bytes::{BufMut, BytesMut};

use crate::ebml::tags::MatroskaTag;
use crate::ebml::vint::encode_vint;
use crate::error::Result;

/// A single element ready to serialize: tag, size field, payload.
///
/// Elements are transient; each build path constructs them fresh and nothing
/// mutates after construction.
#[derive(Debug, Clone)]
pub struct BuildElement {
    /// Element tag, supplying the canonical ID bytes.
    pub tag: MatroskaTag,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
    /// Encoded size field, normally derived from the payload length.
    pub size_field: Vec<u8>,
}

impl BuildElement {
    /// Create an element whose size field is computed from the payload
    /// length.
    pub fn new(tag: MatroskaTag, payload: Vec<u8>) -> Result<Self> {
        let size_field = encode_vint(payload.len() as u64)?;
        Ok(Self {
            tag,
            payload,
            size_field,
        })
    }

    /// Create an element with an explicit, pre-encoded size field.
    ///
    /// Used to stamp the unknown-size sentinel onto a streaming Cluster.
    pub fn with_size_field(tag: MatroskaTag, payload: Vec<u8>, size_field: Vec<u8>) -> Self {
        Self {
            tag,
            payload,
            size_field,
        }
    }

    /// Total serialized length in bytes.
    pub fn encoded_len(&self) -> usize {
        self.tag.id().len() + self.size_field.len() + self.payload.len()
    }

    /// Serialize as ID bytes, size field, payload, in that order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_slice(self.tag.id());
        buf.put_slice(&self.size_field);
        buf.put_slice(&self.payload);
        buf.to_vec()
    }
}

/// Read a big-endian unsigned integer from a leaf payload.
///
/// Leading zero bytes are harmless; an empty payload reads as zero.
pub fn read_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

/// Encode an unsigned integer as the shortest big-endian byte run, at least
/// one byte.
pub fn encode_uint(value: u64) -> Vec<u8> {
    let width = usize::max(1, (64 - value.leading_zeros() as usize + 7) / 8);
    let mut out = vec![0u8; width];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = (value >> (8 * (width - 1 - i))) as u8;
    }
    out
}
