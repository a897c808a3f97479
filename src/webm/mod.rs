//! WebM-level operations: container rebuild and from-scratch stream writing.

mod rebuild;
mod writer;

pub use rebuild::rebuild;
pub use writer::{simple_block, streaming_cluster, WebmWriter};
