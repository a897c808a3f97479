//! Recursive descent EBML parsing into a flat element stream.
//!
//! Container payloads are parsed recursively and their children spliced into
//! the output in encounter order; the containers themselves are never
//! emitted. Hierarchy is recovered positionally on rebuild (a Timestamp opens
//! a cluster, following SimpleBlocks belong to it), so the flat sequence is
//! the canonical in-memory form of a file.

use crate::ebml::tags::MatroskaTag;
use crate::ebml::vint::{decode_size, vint_width, ElementSize};
use crate::error::{Error, Result};

/// Minimum bytes any element occupies: one ID byte, one size byte, one
/// payload byte. Browsers cut live recordings mid-element, so a shorter tail
/// is end of data rather than an error.
const MIN_ELEMENT_LEN: usize = 3;

/// One parsed element: its tag, raw payload, and the total number of input
/// bytes consumed to produce it (ID + size field + payload).
#[derive(Debug, Clone)]
pub struct ParsedElement {
    /// Element tag.
    pub tag: MatroskaTag,
    /// Raw payload bytes. For a container this spans all of its children.
    pub payload: Vec<u8>,
    /// Bytes consumed from the input; the caller advances its cursor by this.
    pub consumed: usize,
}

/// Parse the single element starting at `offset`.
pub fn parse_one(buf: &[u8], offset: usize) -> Result<ParsedElement> {
    let rest = buf.get(offset..).ok_or(Error::Truncated {
        need: offset,
        have: buf.len(),
    })?;
    let (tag, header_len, size) = parse_header(rest)?;
    let payload = match size {
        ElementSize::Known(n) => {
            let end = header_len + n as usize;
            if rest.len() < end {
                return Err(Error::Truncated {
                    need: end,
                    have: rest.len(),
                });
            }
            rest[header_len..end].to_vec()
        }
        ElementSize::Unknown => match tag {
            // A cluster's extent is the sum of its children, up to the next
            // cluster or the end of data.
            MatroskaTag::Cluster => {
                let extent = resolve_cluster_extent(&rest[header_len..])?;
                rest[header_len..header_len + extent].to_vec()
            }
            // The segment owns everything that follows it.
            MatroskaTag::Segment => rest[header_len..].to_vec(),
            other => return Err(Error::UnexpectedUnknownSize(other)),
        },
    };
    let consumed = header_len + payload.len();
    Ok(ParsedElement {
        tag,
        payload,
        consumed,
    })
}

/// Parse a complete WebM byte stream into its flattened leaf elements.
///
/// Exactly two top-level elements are read: the EBML header, then the
/// Segment. Bytes past the Segment's resolved extent are not revisited.
pub fn parse_flatten(buf: &[u8]) -> Result<Vec<ParsedElement>> {
    let mut out = Vec::new();
    let header = parse_one(buf, 0)?;
    parse_children(header.tag, &header.payload, &mut out)?;
    let segment = parse_one(buf, header.consumed)?;
    parse_children(segment.tag, &segment.payload, &mut out)?;
    tracing::debug!(
        elements = out.len(),
        bytes = header.consumed + segment.consumed,
        "flattened webm stream"
    );
    Ok(out)
}

/// Decode an element header: tag, header length, size field value.
fn parse_header(rest: &[u8]) -> Result<(MatroskaTag, usize, ElementSize)> {
    let first = *rest.first().ok_or(Error::Truncated {
        need: MIN_ELEMENT_LEN,
        have: 0,
    })?;
    let id_len = vint_width(first)?;
    let id_bytes = rest.get(..id_len).ok_or(Error::Truncated {
        need: id_len,
        have: rest.len(),
    })?;
    let tag = MatroskaTag::from_id(id_bytes).ok_or_else(|| Error::UnknownId(id_bytes.to_vec()))?;
    let size_first = *rest.get(id_len).ok_or(Error::Truncated {
        need: id_len + 1,
        have: rest.len(),
    })?;
    let size_len = vint_width(size_first)?;
    let header_len = id_len + size_len;
    let size_bytes = rest.get(id_len..header_len).ok_or(Error::Truncated {
        need: header_len,
        have: rest.len(),
    })?;
    Ok((tag, header_len, decode_size(size_bytes)))
}

/// Parse the children filling `parent`'s payload, splicing the children of
/// nested containers into `out` in encounter order.
fn parse_children(
    parent: MatroskaTag,
    buf: &[u8],
    out: &mut Vec<ParsedElement>,
) -> Result<()> {
    let mut pos = 0usize;
    while pos < buf.len() {
        let element = match parse_one(buf, pos) {
            Ok(element) => element,
            // A recording cut mid-block ends the cluster's data.
            Err(Error::Truncated { .. }) if parent == MatroskaTag::Cluster => break,
            Err(e) => return Err(e),
        };
        pos += element.consumed;
        if element.tag.is_container() {
            parse_children(element.tag, &element.payload, out)?;
        } else {
            out.push(element);
        }
        if buf.len() < pos + MIN_ELEMENT_LEN {
            break;
        }
    }
    Ok(())
}

/// Compute the payload length of an unknown-size Cluster.
///
/// Every cluster child carries its own size, so summing children until the
/// next Cluster ID yields the true extent. A tail shorter than
/// [`MIN_ELEMENT_LEN`], or a child overshooting the buffer, marks a truncated
/// live recording: stop cleanly with what was consumed.
fn resolve_cluster_extent(buf: &[u8]) -> Result<usize> {
    let mut total = 0usize;
    while total < buf.len() {
        let rest = &buf[total..];
        let id_len = vint_width(rest[0])?;
        let id_bytes = match rest.get(..id_len) {
            Some(bytes) => bytes,
            None => break, // ID cut off
        };
        let tag =
            MatroskaTag::from_id(id_bytes).ok_or_else(|| Error::UnknownId(id_bytes.to_vec()))?;
        if tag == MatroskaTag::Cluster {
            break; // next sibling begins here
        }
        let size_first = match rest.get(id_len) {
            Some(&byte) => byte,
            None => break, // size field cut off
        };
        let size_len = vint_width(size_first)?;
        let data_len = match rest.get(id_len..id_len + size_len).map(decode_size) {
            Some(ElementSize::Known(n)) => n as usize,
            Some(ElementSize::Unknown) => return Err(Error::UnexpectedUnknownSize(tag)),
            None => break, // size field cut off
        };
        let consumed = id_len + size_len + data_len;
        if rest.len() < consumed {
            // Cut mid-payload: the remainder belongs to this cluster.
            total = buf.len();
            break;
        }
        total += consumed;
        if buf.len() < total + MIN_ELEMENT_LEN {
            break;
        }
    }
    tracing::trace!(extent = total, "resolved unknown-size cluster");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ebml::element::BuildElement;
    use crate::ebml::vint::UNKNOWN_SIZE;

    fn leaf(tag: MatroskaTag, payload: &[u8]) -> Vec<u8> {
        BuildElement::new(tag, payload.to_vec()).unwrap().to_bytes()
    }

    fn container(tag: MatroskaTag, children: &[Vec<u8>]) -> Vec<u8> {
        BuildElement::new(tag, children.concat()).unwrap().to_bytes()
    }

    fn unknown_size(tag: MatroskaTag, payload: Vec<u8>) -> Vec<u8> {
        BuildElement::with_size_field(tag, payload, UNKNOWN_SIZE.to_vec()).to_bytes()
    }

    #[test]
    fn test_parse_one_leaf() {
        let bytes = leaf(MatroskaTag::Timestamp, &[0x00, 0x00, 0x03, 0xE8]);
        let element = parse_one(&bytes, 0).unwrap();
        assert_eq!(element.tag, MatroskaTag::Timestamp);
        assert_eq!(element.payload, [0x00, 0x00, 0x03, 0xE8]);
        assert_eq!(element.consumed, 6);
    }

    #[test]
    fn test_parse_one_unknown_id_fails() {
        let err = parse_one(&[0xFF, 0x81, 0x00], 0).unwrap_err();
        assert!(matches!(err, Error::UnknownId(id) if id == vec![0xFF]));
    }

    #[test]
    fn test_parse_one_truncated_payload_fails() {
        // Size says 4 bytes but only 2 remain.
        let err = parse_one(&[0xE7, 0x84, 0x00, 0x00], 0).unwrap_err();
        assert!(matches!(err, Error::Truncated { need: 6, have: 4 }));
    }

    #[test]
    fn test_unknown_size_outside_segment_and_cluster_fails() {
        let bytes = unknown_size(MatroskaTag::Info, vec![]);
        let err = parse_one(&bytes, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedUnknownSize(MatroskaTag::Info)
        ));
    }

    #[test]
    fn test_flatten_emits_only_leaves_in_order() {
        let header = container(
            MatroskaTag::Ebml,
            &[
                leaf(MatroskaTag::EbmlVersion, &[0x01]),
                leaf(MatroskaTag::DocType, b"webm"),
            ],
        );
        let segment = container(
            MatroskaTag::Segment,
            &[container(
                MatroskaTag::Info,
                &[
                    leaf(MatroskaTag::TimestampScale, &[0x0F, 0x42, 0x40]),
                    leaf(MatroskaTag::MuxingApp, b"rec"),
                ],
            )],
        );
        let stream = [header, segment].concat();

        let elements = parse_flatten(&stream).unwrap();
        let tags: Vec<MatroskaTag> = elements.iter().map(|e| e.tag).collect();
        assert_eq!(
            tags,
            [
                MatroskaTag::EbmlVersion,
                MatroskaTag::DocType,
                MatroskaTag::TimestampScale,
                MatroskaTag::MuxingApp,
            ]
        );
        assert!(elements.iter().all(|e| !e.tag.is_container()));
    }

    #[test]
    fn test_unknown_cluster_extent_stops_at_next_cluster() {
        let first_children = [
            leaf(MatroskaTag::Timestamp, &[0x00, 0x00, 0x00, 0x00]),
            leaf(MatroskaTag::SimpleBlock, &[0x81, 0x00, 0x00, 0x80, 0xAA]),
        ]
        .concat();
        let second = container(
            MatroskaTag::Cluster,
            &[leaf(MatroskaTag::Timestamp, &[0x00, 0x00, 0x03, 0xE8])],
        );
        let stream = [
            unknown_size(MatroskaTag::Cluster, first_children.clone()),
            second,
        ]
        .concat();

        let element = parse_one(&stream, 0).unwrap();
        assert_eq!(element.tag, MatroskaTag::Cluster);
        assert_eq!(element.payload, first_children);
        // 4 ID bytes + 8 sentinel bytes + children.
        assert_eq!(element.consumed, 12 + first_children.len());
    }

    #[test]
    fn test_unknown_cluster_extent_reaches_end_of_buffer() {
        let children = leaf(MatroskaTag::Timestamp, &[0x00, 0x00, 0x00, 0x00]);
        let stream = unknown_size(MatroskaTag::Cluster, children.clone());
        let element = parse_one(&stream, 0).unwrap();
        assert_eq!(element.payload, children);
    }

    #[test]
    fn test_truncated_tail_is_tolerated() {
        // A stream cut two bytes into a trailing SimpleBlock header: the
        // parser stops cleanly after the last complete element.
        let children = [
            leaf(MatroskaTag::Timestamp, &[0x00, 0x00, 0x00, 0x00]),
            leaf(MatroskaTag::SimpleBlock, &[0x81, 0x00, 0x00, 0x80, 0xAA]),
        ]
        .concat();
        let mut segment_payload = unknown_size(MatroskaTag::Cluster, children);
        segment_payload.extend([0xA3, 0x85]); // SimpleBlock ID + size, no payload

        let header = container(MatroskaTag::Ebml, &[leaf(MatroskaTag::EbmlVersion, &[0x01])]);
        let stream = [
            header,
            unknown_size(MatroskaTag::Segment, segment_payload),
        ]
        .concat();

        let elements = parse_flatten(&stream).unwrap();
        let tags: Vec<MatroskaTag> = elements.iter().map(|e| e.tag).collect();
        assert_eq!(
            tags,
            [
                MatroskaTag::EbmlVersion,
                MatroskaTag::Timestamp,
                MatroskaTag::SimpleBlock,
            ]
        );
    }

    #[test]
    fn test_cluster_cut_mid_block_drops_partial_block() {
        let children = [
            leaf(MatroskaTag::Timestamp, &[0x00, 0x00, 0x00, 0x00]),
            leaf(
                MatroskaTag::SimpleBlock,
                &[0x81, 0x00, 0x00, 0x80, 0xAA, 0xBB, 0xCC, 0xDD],
            ),
        ]
        .concat();
        // Drop the last three payload bytes of the block.
        let cut = &children[..children.len() - 3];

        let header = container(MatroskaTag::Ebml, &[leaf(MatroskaTag::EbmlVersion, &[0x01])]);
        let stream = [
            header,
            unknown_size(
                MatroskaTag::Segment,
                unknown_size(MatroskaTag::Cluster, cut.to_vec()),
            ),
        ]
        .concat();

        let elements = parse_flatten(&stream).unwrap();
        let tags: Vec<MatroskaTag> = elements.iter().map(|e| e.tag).collect();
        assert_eq!(tags, [MatroskaTag::EbmlVersion, MatroskaTag::Timestamp]);
    }

    #[test]
    fn test_consumed_spans_are_contiguous() {
        let stream = [
            leaf(MatroskaTag::Timestamp, &[0x00]),
            leaf(MatroskaTag::SimpleBlock, &[0x81, 0x00, 0x00, 0x80]),
            leaf(MatroskaTag::Timestamp, &[0x01]),
        ]
        .concat();
        let mut pos = 0;
        while pos < stream.len() {
            let element = parse_one(&stream, pos).unwrap();
            pos += element.consumed;
        }
        assert_eq!(pos, stream.len());
    }
}
