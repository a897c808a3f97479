//! Error types for webmend.

use thiserror::Error;

use crate::ebml::MatroskaTag;

/// Result type for webmend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for webmend operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An element ID outside the WebM tag subset.
    #[error("unknown element id {0:02X?}")]
    UnknownId(Vec<u8>),

    /// Fewer bytes remain than an element header or payload needs.
    #[error("truncated element: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    /// A VINT leading byte with no marker bit set.
    #[error("invalid vint: no marker bit in leading byte")]
    InvalidVint,

    /// A size value too large for an 8-byte VINT.
    #[error("element size {0} does not fit in an 8-byte vint")]
    OversizedElement(u64),

    /// The unknown-size sentinel on an element that does not allow it.
    #[error("unknown-size {0} element (only Segment and Cluster may omit their size)")]
    UnexpectedUnknownSize(MatroskaTag),

    /// A leaf the rebuild step requires is absent from the input.
    #[error("missing required element: {0}")]
    MissingElement(MatroskaTag),
}
