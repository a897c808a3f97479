//! From-scratch WebM stream construction.
//!
//! Builds the fixed head of a streaming capture (EBML header, Segment
//! opener, Info, Tracks with Opus private data) and the per-frame pieces
//! (streaming clusters, simple blocks) directly from raw encoded payloads,
//! without parsing anything. Shares only the low-level element builder with
//! the rebuild path.

use bytes::{BufMut, BytesMut};

use crate::ebml::{encode_uint, encode_vint, BuildElement, MatroskaTag, UNKNOWN_SIZE};
use crate::error::Result;

const TRACK_TYPE_VIDEO: u64 = 1;
const TRACK_TYPE_AUDIO: u64 = 2;

/// Keyframe bit of the SimpleBlock flags byte.
const FLAG_KEYFRAME: u8 = 0x80;

/// Name stamped into MuxingApp/WritingApp.
const APP_NAME: &str = "webmend";

/// Nanosecond timestamp scale: cluster timestamps count milliseconds.
const TIMESTAMP_SCALE_NS: u32 = 1_000_000;

/// Builder for the head of a streaming WebM capture.
///
/// Defaults match a browser capture: VP9 video at 1280x720 on track 1,
/// 48 kHz stereo Opus on track 2.
pub struct WebmWriter {
    video_track_id: u64,
    video_codec: String,
    width: u64,
    height: u64,
    audio_track_id: u64,
    audio_codec: String,
    sample_rate: f32,
    channels: u8,
}

impl WebmWriter {
    /// Create a writer with default track configuration.
    pub fn new() -> Self {
        Self {
            video_track_id: 1,
            video_codec: "V_VP9".to_string(),
            width: 1280,
            height: 720,
            audio_track_id: 2,
            audio_codec: "A_OPUS".to_string(),
            sample_rate: 48_000.0,
            channels: 2,
        }
    }

    /// Set video dimensions.
    pub fn dimensions(mut self, width: u64, height: u64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the video track number and codec ID.
    pub fn video_track(mut self, id: u64, codec: impl Into<String>) -> Self {
        self.video_track_id = id;
        self.video_codec = codec.into();
        self
    }

    /// Set the audio track number, codec ID, sample rate and channel count.
    pub fn audio_track(
        mut self,
        id: u64,
        codec: impl Into<String>,
        sample_rate: f32,
        channels: u8,
    ) -> Self {
        self.audio_track_id = id;
        self.audio_codec = codec.into();
        self.sample_rate = sample_rate;
        self.channels = channels;
        self
    }

    /// The EBML header for a "webm" doctype stream.
    pub fn ebml_header(&self) -> Result<Vec<u8>> {
        let mut payload = BytesMut::new();
        for (tag, value) in [
            (MatroskaTag::EbmlVersion, 1u64),
            (MatroskaTag::EbmlReadVersion, 1),
            (MatroskaTag::EbmlMaxIdLength, 4),
            (MatroskaTag::EbmlMaxSizeLength, 8),
        ] {
            payload.put_slice(&BuildElement::new(tag, encode_uint(value))?.to_bytes());
        }
        payload.put_slice(&BuildElement::new(MatroskaTag::DocType, b"webm".to_vec())?.to_bytes());
        for tag in [MatroskaTag::DocTypeVersion, MatroskaTag::DocTypeReadVersion] {
            payload.put_slice(&BuildElement::new(tag, encode_uint(2))?.to_bytes());
        }
        Ok(BuildElement::new(MatroskaTag::Ebml, payload.to_vec())?.to_bytes())
    }

    /// Segment opener for live emission: ID plus the unknown-size sentinel,
    /// no payload. Children stream in behind it.
    pub fn segment_start(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(4 + UNKNOWN_SIZE.len());
        buf.put_slice(MatroskaTag::Segment.id());
        buf.put_slice(&UNKNOWN_SIZE);
        buf.to_vec()
    }

    /// Segment Info with the fixed nanosecond timestamp scale.
    pub fn info(&self) -> Result<Vec<u8>> {
        let mut payload = BytesMut::new();
        payload.put_slice(
            &BuildElement::new(
                MatroskaTag::TimestampScale,
                TIMESTAMP_SCALE_NS.to_be_bytes().to_vec(),
            )?
            .to_bytes(),
        );
        for tag in [MatroskaTag::MuxingApp, MatroskaTag::WritingApp] {
            payload.put_slice(&BuildElement::new(tag, APP_NAME.as_bytes().to_vec())?.to_bytes());
        }
        Ok(BuildElement::new(MatroskaTag::Info, payload.to_vec())?.to_bytes())
    }

    /// Tracks container: one video entry, one audio entry with synthesized
    /// Opus private data.
    pub fn tracks(&self) -> Result<Vec<u8>> {
        let mut payload = BytesMut::new();
        payload.put_slice(&self.video_entry()?.to_bytes());
        payload.put_slice(&self.audio_entry()?.to_bytes());
        Ok(BuildElement::new(MatroskaTag::Tracks, payload.to_vec())?.to_bytes())
    }

    fn video_entry(&self) -> Result<BuildElement> {
        let mut settings = BytesMut::new();
        settings.put_slice(
            &BuildElement::new(MatroskaTag::PixelWidth, encode_uint(self.width))?.to_bytes(),
        );
        settings.put_slice(
            &BuildElement::new(MatroskaTag::PixelHeight, encode_uint(self.height))?.to_bytes(),
        );
        let video = BuildElement::new(MatroskaTag::VideoTrack, settings.to_vec())?;

        let mut entry = BytesMut::new();
        for element in [
            BuildElement::new(MatroskaTag::TrackNumber, encode_uint(self.video_track_id))?,
            BuildElement::new(MatroskaTag::TrackUid, encode_uint(self.video_track_id))?,
            BuildElement::new(MatroskaTag::CodecId, self.video_codec.as_bytes().to_vec())?,
            BuildElement::new(MatroskaTag::TrackType, encode_uint(TRACK_TYPE_VIDEO))?,
            video,
        ] {
            entry.put_slice(&element.to_bytes());
        }
        BuildElement::new(MatroskaTag::Track, entry.to_vec())
    }

    fn audio_entry(&self) -> Result<BuildElement> {
        let mut settings = BytesMut::new();
        settings.put_slice(
            &BuildElement::new(MatroskaTag::Channels, encode_uint(u64::from(self.channels)))?
                .to_bytes(),
        );
        settings.put_slice(
            &BuildElement::new(
                MatroskaTag::SamplingFrequency,
                self.sample_rate.to_be_bytes().to_vec(),
            )?
            .to_bytes(),
        );
        let audio = BuildElement::new(MatroskaTag::AudioTrack, settings.to_vec())?;

        let mut entry = BytesMut::new();
        for element in [
            BuildElement::new(MatroskaTag::TrackNumber, encode_uint(self.audio_track_id))?,
            BuildElement::new(MatroskaTag::TrackUid, encode_uint(self.audio_track_id))?,
            BuildElement::new(MatroskaTag::CodecId, self.audio_codec.as_bytes().to_vec())?,
            BuildElement::new(MatroskaTag::TrackType, encode_uint(TRACK_TYPE_AUDIO))?,
            BuildElement::new(
                MatroskaTag::CodecPrivate,
                opus_codec_private(self.channels, self.sample_rate),
            )?,
            audio,
        ] {
            entry.put_slice(&element.to_bytes());
        }
        BuildElement::new(MatroskaTag::Track, entry.to_vec())
    }
}

impl Default for WebmWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Opus codec initialization bytes per the Opus-in-WebM mapping: magic,
/// version, channel count, pre-skip, sample rate (little-endian), output
/// gain, mapping family, two reserved bytes.
fn opus_codec_private(channels: u8, sample_rate: f32) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(21);
    buf.put_slice(b"OpusHead");
    buf.put_u8(1); // version
    buf.put_u8(channels);
    buf.put_u16(0); // pre-skip
    buf.put_u32_le(sample_rate as u32);
    buf.put_u16(0); // output gain
    buf.put_u8(0); // mapping family
    buf.put_slice(&[0x00, 0x00]);
    buf.to_vec()
}

/// Frame a single encoded payload as a SimpleBlock: track number VINT,
/// 2-byte relative timecode, flags byte, frame bytes.
pub fn simple_block(
    track_number: u64,
    relative_timecode: i16,
    frame: &[u8],
    keyframe: bool,
) -> Result<Vec<u8>> {
    let mut payload = BytesMut::with_capacity(4 + frame.len());
    payload.put_slice(&encode_vint(track_number)?);
    payload.put_i16(relative_timecode);
    payload.put_u8(if keyframe { FLAG_KEYFRAME } else { 0x00 });
    payload.put_slice(frame);
    Ok(BuildElement::new(MatroskaTag::SimpleBlock, payload.to_vec())?.to_bytes())
}

/// Open a cluster for live emission: unknown size, base timestamp in
/// milliseconds. Blocks stream in behind it; a rebuild pass computes the
/// final size.
pub fn streaming_cluster(timescale_ms: u32) -> Result<Vec<u8>> {
    let timestamp = BuildElement::new(
        MatroskaTag::Timestamp,
        timescale_ms.to_be_bytes().to_vec(),
    )?;
    let cluster = BuildElement::with_size_field(
        MatroskaTag::Cluster,
        timestamp.to_bytes(),
        UNKNOWN_SIZE.to_vec(),
    );
    Ok(cluster.to_bytes())
}
