//! Matroska element registry, restricted to the subset WebM uses.
//!
//! Element IDs are stored with their marker bit intact, exactly as they
//! appear on the wire, so lookup is a plain byte comparison.

use std::fmt;

/// A known Matroska/WebM element.
///
/// The set is closed: an ID that does not map to a variant is not decodable
/// by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatroskaTag {
    // EBML header
    Ebml,
    EbmlVersion,
    EbmlReadVersion,
    EbmlMaxIdLength,
    EbmlMaxSizeLength,
    DocType,
    DocTypeVersion,
    DocTypeReadVersion,

    // Segment and seeking
    Segment,
    SeekHead,
    Seek,
    SeekId,
    SeekPosition,
    Void,

    // Segment information
    Info,
    TimestampScale,
    MuxingApp,
    WritingApp,
    Duration,
    DateUtc,

    // Tracks
    Tracks,
    Track,
    TrackNumber,
    TrackUid,
    TrackType,
    FlagLacing,
    Language,
    CodecId,
    CodecPrivate,
    CodecDelay,
    SeekPreRoll,
    DefaultDuration,
    VideoTrack,
    PixelWidth,
    PixelHeight,
    AudioTrack,
    SamplingFrequency,
    Channels,
    BitDepth,

    // Clusters
    Cluster,
    Timestamp,
    SimpleBlock,
    BlockGroup,
    Block,

    // Cueing data
    Cues,
    CuePoint,
    CueTime,
    CueTrackPositions,
    CueTrack,
    CueClusterPosition,
}

impl MatroskaTag {
    /// Canonical ID bytes as they appear on the wire (1-4 bytes).
    pub fn id(&self) -> &'static [u8] {
        match self {
            Self::Ebml => &[0x1A, 0x45, 0xDF, 0xA3],
            Self::EbmlVersion => &[0x42, 0x86],
            Self::EbmlReadVersion => &[0x42, 0xF7],
            Self::EbmlMaxIdLength => &[0x42, 0xF2],
            Self::EbmlMaxSizeLength => &[0x42, 0xF3],
            Self::DocType => &[0x42, 0x82],
            Self::DocTypeVersion => &[0x42, 0x87],
            Self::DocTypeReadVersion => &[0x42, 0x85],
            Self::Segment => &[0x18, 0x53, 0x80, 0x67],
            Self::SeekHead => &[0x11, 0x4D, 0x9B, 0x74],
            Self::Seek => &[0x4D, 0xBB],
            Self::SeekId => &[0x53, 0xAB],
            Self::SeekPosition => &[0x53, 0xAC],
            Self::Void => &[0xEC],
            Self::Info => &[0x15, 0x49, 0xA9, 0x66],
            Self::TimestampScale => &[0x2A, 0xD7, 0xB1],
            Self::MuxingApp => &[0x4D, 0x80],
            Self::WritingApp => &[0x57, 0x41],
            Self::Duration => &[0x44, 0x89],
            Self::DateUtc => &[0x44, 0x61],
            Self::Tracks => &[0x16, 0x54, 0xAE, 0x6B],
            Self::Track => &[0xAE],
            Self::TrackNumber => &[0xD7],
            Self::TrackUid => &[0x73, 0xC5],
            Self::TrackType => &[0x83],
            Self::FlagLacing => &[0x9C],
            Self::Language => &[0x22, 0xB5, 0x9C],
            Self::CodecId => &[0x86],
            Self::CodecPrivate => &[0x63, 0xA2],
            Self::CodecDelay => &[0x56, 0xAA],
            Self::SeekPreRoll => &[0x56, 0xBB],
            Self::DefaultDuration => &[0x23, 0xE3, 0x83],
            Self::VideoTrack => &[0xE0],
            Self::PixelWidth => &[0xB0],
            Self::PixelHeight => &[0xBA],
            Self::AudioTrack => &[0xE1],
            Self::SamplingFrequency => &[0xB5],
            Self::Channels => &[0x9F],
            Self::BitDepth => &[0x62, 0x64],
            Self::Cluster => &[0x1F, 0x43, 0xB6, 0x75],
            Self::Timestamp => &[0xE7],
            Self::SimpleBlock => &[0xA3],
            Self::BlockGroup => &[0xA0],
            Self::Block => &[0xA1],
            Self::Cues => &[0x1C, 0x53, 0xBB, 0x6B],
            Self::CuePoint => &[0xBB],
            Self::CueTime => &[0xB3],
            Self::CueTrackPositions => &[0xB7],
            Self::CueTrack => &[0xF7],
            Self::CueClusterPosition => &[0xF1],
        }
    }

    /// Look up a tag from its encoded ID bytes. Exact match only.
    pub fn from_id(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x1A, 0x45, 0xDF, 0xA3] => Some(Self::Ebml),
            [0x42, 0x86] => Some(Self::EbmlVersion),
            [0x42, 0xF7] => Some(Self::EbmlReadVersion),
            [0x42, 0xF2] => Some(Self::EbmlMaxIdLength),
            [0x42, 0xF3] => Some(Self::EbmlMaxSizeLength),
            [0x42, 0x82] => Some(Self::DocType),
            [0x42, 0x87] => Some(Self::DocTypeVersion),
            [0x42, 0x85] => Some(Self::DocTypeReadVersion),
            [0x18, 0x53, 0x80, 0x67] => Some(Self::Segment),
            [0x11, 0x4D, 0x9B, 0x74] => Some(Self::SeekHead),
            [0x4D, 0xBB] => Some(Self::Seek),
            [0x53, 0xAB] => Some(Self::SeekId),
            [0x53, 0xAC] => Some(Self::SeekPosition),
            [0xEC] => Some(Self::Void),
            [0x15, 0x49, 0xA9, 0x66] => Some(Self::Info),
            [0x2A, 0xD7, 0xB1] => Some(Self::TimestampScale),
            [0x4D, 0x80] => Some(Self::MuxingApp),
            [0x57, 0x41] => Some(Self::WritingApp),
            [0x44, 0x89] => Some(Self::Duration),
            [0x44, 0x61] => Some(Self::DateUtc),
            [0x16, 0x54, 0xAE, 0x6B] => Some(Self::Tracks),
            [0xAE] => Some(Self::Track),
            [0xD7] => Some(Self::TrackNumber),
            [0x73, 0xC5] => Some(Self::TrackUid),
            [0x83] => Some(Self::TrackType),
            [0x9C] => Some(Self::FlagLacing),
            [0x22, 0xB5, 0x9C] => Some(Self::Language),
            [0x86] => Some(Self::CodecId),
            [0x63, 0xA2] => Some(Self::CodecPrivate),
            [0x56, 0xAA] => Some(Self::CodecDelay),
            [0x56, 0xBB] => Some(Self::SeekPreRoll),
            [0x23, 0xE3, 0x83] => Some(Self::DefaultDuration),
            [0xE0] => Some(Self::VideoTrack),
            [0xB0] => Some(Self::PixelWidth),
            [0xBA] => Some(Self::PixelHeight),
            [0xE1] => Some(Self::AudioTrack),
            [0xB5] => Some(Self::SamplingFrequency),
            [0x9F] => Some(Self::Channels),
            [0x62, 0x64] => Some(Self::BitDepth),
            [0x1F, 0x43, 0xB6, 0x75] => Some(Self::Cluster),
            [0xE7] => Some(Self::Timestamp),
            [0xA3] => Some(Self::SimpleBlock),
            [0xA0] => Some(Self::BlockGroup),
            [0xA1] => Some(Self::Block),
            [0x1C, 0x53, 0xBB, 0x6B] => Some(Self::Cues),
            [0xBB] => Some(Self::CuePoint),
            [0xB3] => Some(Self::CueTime),
            [0xB7] => Some(Self::CueTrackPositions),
            [0xF7] => Some(Self::CueTrack),
            [0xF1] => Some(Self::CueClusterPosition),
            _ => None,
        }
    }

    /// Whether this element holds child elements.
    ///
    /// The parser descends into containers and splices their children into
    /// the flat output. `Seek` and `BlockGroup` are deliberately kept opaque:
    /// nothing downstream reads inside them.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Ebml
                | Self::Segment
                | Self::SeekHead
                | Self::Info
                | Self::Tracks
                | Self::Track
                | Self::VideoTrack
                | Self::AudioTrack
                | Self::Cluster
                | Self::Cues
                | Self::CuePoint
                | Self::CueTrackPositions
        )
    }

    /// Element name as it appears in the Matroska specification.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ebml => "EBML",
            Self::EbmlVersion => "EBMLVersion",
            Self::EbmlReadVersion => "EBMLReadVersion",
            Self::EbmlMaxIdLength => "EBMLMaxIDLength",
            Self::EbmlMaxSizeLength => "EBMLMaxSizeLength",
            Self::DocType => "DocType",
            Self::DocTypeVersion => "DocTypeVersion",
            Self::DocTypeReadVersion => "DocTypeReadVersion",
            Self::Segment => "Segment",
            Self::SeekHead => "SeekHead",
            Self::Seek => "Seek",
            Self::SeekId => "SeekID",
            Self::SeekPosition => "SeekPosition",
            Self::Void => "Void",
            Self::Info => "Info",
            Self::TimestampScale => "TimestampScale",
            Self::MuxingApp => "MuxingApp",
            Self::WritingApp => "WritingApp",
            Self::Duration => "Duration",
            Self::DateUtc => "DateUTC",
            Self::Tracks => "Tracks",
            Self::Track => "TrackEntry",
            Self::TrackNumber => "TrackNumber",
            Self::TrackUid => "TrackUID",
            Self::TrackType => "TrackType",
            Self::FlagLacing => "FlagLacing",
            Self::Language => "Language",
            Self::CodecId => "CodecID",
            Self::CodecPrivate => "CodecPrivate",
            Self::CodecDelay => "CodecDelay",
            Self::SeekPreRoll => "SeekPreRoll",
            Self::DefaultDuration => "DefaultDuration",
            Self::VideoTrack => "Video",
            Self::PixelWidth => "PixelWidth",
            Self::PixelHeight => "PixelHeight",
            Self::AudioTrack => "Audio",
            Self::SamplingFrequency => "SamplingFrequency",
            Self::Channels => "Channels",
            Self::BitDepth => "BitDepth",
            Self::Cluster => "Cluster",
            Self::Timestamp => "Timestamp",
            Self::SimpleBlock => "SimpleBlock",
            Self::BlockGroup => "BlockGroup",
            Self::Block => "Block",
            Self::Cues => "Cues",
            Self::CuePoint => "CuePoint",
            Self::CueTime => "CueTime",
            Self::CueTrackPositions => "CueTrackPositions",
            Self::CueTrack => "CueTrack",
            Self::CueClusterPosition => "CueClusterPosition",
        }
    }
}

impl fmt::Display for MatroskaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_matches_canonical_id() {
        for tag in [
            MatroskaTag::Ebml,
            MatroskaTag::Segment,
            MatroskaTag::Cluster,
            MatroskaTag::Timestamp,
            MatroskaTag::SimpleBlock,
            MatroskaTag::TimestampScale,
            MatroskaTag::CodecPrivate,
            MatroskaTag::PixelWidth,
        ] {
            assert_eq!(MatroskaTag::from_id(tag.id()), Some(tag));
        }
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        assert_eq!(MatroskaTag::from_id(&[0xFF]), None);
        assert_eq!(MatroskaTag::from_id(&[0x42, 0x42]), None);
        // A prefix of a valid ID is not a match.
        assert_eq!(MatroskaTag::from_id(&[0x1A, 0x45]), None);
    }

    #[test]
    fn test_container_classification() {
        assert!(MatroskaTag::Segment.is_container());
        assert!(MatroskaTag::Cluster.is_container());
        assert!(MatroskaTag::Track.is_container());
        assert!(!MatroskaTag::SimpleBlock.is_container());
        assert!(!MatroskaTag::Duration.is_container());
        // Opaque by design: the parser never descends into these.
        assert!(!MatroskaTag::Seek.is_container());
        assert!(!MatroskaTag::BlockGroup.is_container());
    }

    #[test]
    fn test_display_uses_matroska_names() {
        assert_eq!(MatroskaTag::Track.to_string(), "TrackEntry");
        assert_eq!(MatroskaTag::VideoTrack.to_string(), "Video");
        assert_eq!(MatroskaTag::TimestampScale.to_string(), "TimestampScale");
    }
}
