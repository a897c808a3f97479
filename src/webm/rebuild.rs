//! Rebuild a seekable, fixed-size WebM container from a flat element stream.
//!
//! Streaming recorders leave Segment and Cluster sizes unknown and never
//! write an overall Duration, which makes the file unseekable outside the
//! live session. The rebuild pass recovers Duration from the last cluster
//! timestamp plus the last block's relative timecode, then re-emits every
//! container with a computed size.

use bytes::{BufMut, BytesMut};

use crate::ebml::{read_uint, vint_width, BuildElement, MatroskaTag, ParsedElement};
use crate::error::{Error, Result};

/// The seven EBML header leaves, in canonical emit order.
const EBML_HEADER_LEAVES: [MatroskaTag; 7] = [
    MatroskaTag::EbmlVersion,
    MatroskaTag::EbmlReadVersion,
    MatroskaTag::EbmlMaxIdLength,
    MatroskaTag::EbmlMaxSizeLength,
    MatroskaTag::DocType,
    MatroskaTag::DocTypeVersion,
    MatroskaTag::DocTypeReadVersion,
];

/// Rebuild a complete container from the parsed element sequence of one
/// file.
///
/// Deterministic: the same input sequence always produces identical bytes.
/// Assumes one video and one audio track; with more, both rebuilt track
/// entries share the first-seen number/UID/codec/type leaves and the extras
/// are ignored.
pub fn rebuild(elements: &[ParsedElement]) -> Result<Vec<u8>> {
    let header = rebuild_ebml_header(elements)?;
    let info = rebuild_info(elements)?;
    let tracks = rebuild_tracks(elements)?;
    let clusters = rebuild_clusters(elements)?;

    let mut segment_payload = BytesMut::new();
    segment_payload.put_slice(&info.to_bytes());
    segment_payload.put_slice(&tracks.to_bytes());
    for cluster in &clusters {
        segment_payload.put_slice(&cluster.to_bytes());
    }
    let segment = BuildElement::new(MatroskaTag::Segment, segment_payload.to_vec())?;

    tracing::debug!(clusters = clusters.len(), "rebuilt container");

    let mut out = BytesMut::with_capacity(header.encoded_len() + segment.encoded_len());
    out.put_slice(&header.to_bytes());
    out.put_slice(&segment.to_bytes());
    Ok(out.to_vec())
}

/// First occurrence of `tag` in the stream.
fn first(elements: &[ParsedElement], tag: MatroskaTag) -> Result<&ParsedElement> {
    elements
        .iter()
        .find(|e| e.tag == tag)
        .ok_or(Error::MissingElement(tag))
}

/// Last occurrence of `tag` in the stream.
fn last(elements: &[ParsedElement], tag: MatroskaTag) -> Result<&ParsedElement> {
    elements
        .iter()
        .rev()
        .find(|e| e.tag == tag)
        .ok_or(Error::MissingElement(tag))
}

/// Copy the first occurrence of `tag` into a build element.
fn copy_first(elements: &[ParsedElement], tag: MatroskaTag) -> Result<BuildElement> {
    let element = first(elements, tag)?;
    BuildElement::new(element.tag, element.payload.clone())
}

fn rebuild_ebml_header(elements: &[ParsedElement]) -> Result<BuildElement> {
    let mut payload = BytesMut::new();
    for tag in EBML_HEADER_LEAVES {
        payload.put_slice(&copy_first(elements, tag)?.to_bytes());
    }
    BuildElement::new(MatroskaTag::Ebml, payload.to_vec())
}

/// Recover the overall duration in timestamp-scale units.
///
/// Every block's absolute time is its cluster timestamp plus its own
/// relative timecode, so the last timestamp plus the last block's offset is
/// the total duration.
fn compute_duration(elements: &[ParsedElement]) -> Result<f32> {
    let timestamp = read_uint(&last(elements, MatroskaTag::Timestamp)?.payload);
    let block = &last(elements, MatroskaTag::SimpleBlock)?.payload;
    let track_len = vint_width(*block.first().ok_or(Error::Truncated { need: 1, have: 0 })?)?;
    let timecode = block.get(track_len..track_len + 2).ok_or(Error::Truncated {
        need: track_len + 2,
        have: block.len(),
    })?;
    let relative = u16::from_be_bytes([timecode[0], timecode[1]]);
    Ok((timestamp + u64::from(relative)) as f32)
}

fn rebuild_info(elements: &[ParsedElement]) -> Result<BuildElement> {
    let duration = BuildElement::new(
        MatroskaTag::Duration,
        compute_duration(elements)?.to_be_bytes().to_vec(),
    )?;
    let mut payload = BytesMut::new();
    payload.put_slice(&copy_first(elements, MatroskaTag::TimestampScale)?.to_bytes());
    payload.put_slice(&duration.to_bytes());
    payload.put_slice(&copy_first(elements, MatroskaTag::MuxingApp)?.to_bytes());
    payload.put_slice(&copy_first(elements, MatroskaTag::WritingApp)?.to_bytes());
    BuildElement::new(MatroskaTag::Info, payload.to_vec())
}

fn rebuild_tracks(elements: &[ParsedElement]) -> Result<BuildElement> {
    let number = copy_first(elements, MatroskaTag::TrackNumber)?;
    let uid = copy_first(elements, MatroskaTag::TrackUid)?;
    let codec = copy_first(elements, MatroskaTag::CodecId)?;
    let track_type = copy_first(elements, MatroskaTag::TrackType)?;

    let mut video_settings = BytesMut::new();
    video_settings.put_slice(&copy_first(elements, MatroskaTag::PixelWidth)?.to_bytes());
    video_settings.put_slice(&copy_first(elements, MatroskaTag::PixelHeight)?.to_bytes());
    let video = BuildElement::new(MatroskaTag::VideoTrack, video_settings.to_vec())?;

    let mut video_entry = BytesMut::new();
    for element in [&number, &uid, &codec, &track_type, &video] {
        video_entry.put_slice(&element.to_bytes());
    }
    let video_entry = BuildElement::new(MatroskaTag::Track, video_entry.to_vec())?;

    let mut audio_settings = BytesMut::new();
    audio_settings.put_slice(&copy_first(elements, MatroskaTag::Channels)?.to_bytes());
    audio_settings.put_slice(&copy_first(elements, MatroskaTag::SamplingFrequency)?.to_bytes());
    let audio = BuildElement::new(MatroskaTag::AudioTrack, audio_settings.to_vec())?;

    let codec_private = copy_first(elements, MatroskaTag::CodecPrivate)?;
    let mut audio_entry = BytesMut::new();
    for element in [&number, &uid, &codec, &track_type, &codec_private, &audio] {
        audio_entry.put_slice(&element.to_bytes());
    }
    let audio_entry = BuildElement::new(MatroskaTag::Track, audio_entry.to_vec())?;

    let mut payload = BytesMut::new();
    payload.put_slice(&video_entry.to_bytes());
    payload.put_slice(&audio_entry.to_bytes());
    BuildElement::new(MatroskaTag::Tracks, payload.to_vec())
}

/// Partition the flat stream into clusters.
///
/// A Timestamp opens a cluster, following SimpleBlocks join it, and the next
/// Timestamp (or the end of input) closes it. Blocks before the first
/// timestamp have no cluster to join and are skipped. Every rebuilt cluster
/// carries a known, computed size.
fn rebuild_clusters(elements: &[ParsedElement]) -> Result<Vec<BuildElement>> {
    let mut clusters = Vec::new();
    let mut current: Option<BytesMut> = None;
    for element in elements {
        match element.tag {
            MatroskaTag::Timestamp => {
                if let Some(payload) = current.take() {
                    clusters.push(BuildElement::new(MatroskaTag::Cluster, payload.to_vec())?);
                }
                let timestamp =
                    BuildElement::new(MatroskaTag::Timestamp, element.payload.clone())?;
                let mut payload = BytesMut::new();
                payload.put_slice(&timestamp.to_bytes());
                current = Some(payload);
            }
            MatroskaTag::SimpleBlock => {
                if let Some(payload) = current.as_mut() {
                    let block =
                        BuildElement::new(MatroskaTag::SimpleBlock, element.payload.clone())?;
                    payload.put_slice(&block.to_bytes());
                }
            }
            _ => {}
        }
    }
    if let Some(payload) = current.take() {
        clusters.push(BuildElement::new(MatroskaTag::Cluster, payload.to_vec())?);
    }
    Ok(clusters)
}
