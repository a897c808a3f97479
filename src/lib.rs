//! webmend: EBML/Matroska (WebM) parsing and seekable rebuild.
//!
//! Browser media recorders emit WebM with indeterminate-length elements and
//! no overall duration, which leaves the file unseekable outside the live
//! session. This crate decodes such a stream into its typed elements and
//! re-emits a corrected container: every size computed, duration recovered
//! from the last cluster timestamp plus the last block's relative timecode.
//!
//! # Modules
//!
//! - `ebml` - generic EBML framing: tag registry, VINT codec, flat parser,
//!   element builder
//! - `webm` - WebM-level container rebuild and from-scratch stream writing
//!
//! # Architecture
//!
//! Parsing deliberately flattens the element tree into one ordered leaf
//! sequence instead of keeping a nested structure. The rebuild pass recovers
//! hierarchy positionally - a Timestamp opens a cluster, the SimpleBlocks
//! after it belong to that cluster - which keeps the whole transform a
//! single pure pass over the sequence. Everything is buffer-to-buffer; file
//! handling belongs to the caller.
//!
//! ```no_run
//! # fn main() -> webmend::Result<()> {
//! let recorded = std::fs::read("capture.webm").expect("read capture");
//! let fixed = webmend::mend(&recorded)?;
//! std::fs::write("capture-fixed.webm", fixed).expect("write output");
//! # Ok(())
//! # }
//! ```

pub mod ebml;
pub mod error;
pub mod webm;

pub use ebml::{parse_flatten, BuildElement, MatroskaTag, ParsedElement};
pub use error::{Error, Result};
pub use webm::{rebuild, simple_block, streaming_cluster, WebmWriter};

/// Parse a recorded stream and rebuild it as a seekable container.
pub fn mend(input: &[u8]) -> Result<Vec<u8>> {
    let elements = parse_flatten(input)?;
    rebuild(&elements)
}
