//! Generic EBML framing: tag registry, VINT codec, flat parser, element
//! builder.

mod element;
mod parser;
mod tags;
mod vint;

pub use element::{encode_uint, read_uint, BuildElement};
pub use parser::{parse_flatten, parse_one, ParsedElement};
pub use tags::MatroskaTag;
pub use vint::{decode_size, encode_vint, vint_width, ElementSize, UNKNOWN_SIZE};
