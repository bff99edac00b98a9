/// Elementary media kind carried by a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    H264,
    Mpeg2Video,
    Aac,
    Ac3,
}

/// Whether a sample belongs to the video or audio merge path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Video,
    Audio,
}

impl MediaKind {
    pub fn frame_kind(self) -> FrameKind {
        match self {
            MediaKind::H264 | MediaKind::Mpeg2Video => FrameKind::Video,
            MediaKind::Aac | MediaKind::Ac3 => FrameKind::Audio,
        }
    }
}

/// A single decoded access unit, normalized and ready for time-ordered
/// emission.
#[derive(Debug, Clone)]
pub struct Frame {
    pub payload: Vec<u8>,
    pub pts_raw: i64,
    pub dts_raw: Option<i64>,
    pub full_time: i64,
    pub duration: i64,
    pub first_timestamp: i64,
    pub source: u8,
    pub sub_stream: u8,
    pub sync_frame: bool,
    pub media_kind: MediaKind,
    pub frame_kind: FrameKind,
    pub language_tag: [u8; 4],
    /// Monotonically increasing per-buffer sequence number assigned at
    /// insertion time, used only to break ties between frames that share a
    /// `full_time`. Never inspected outside `SortedFrameBuffer`.
    pub(crate) insertion_seq: u64,
}

impl Frame {
    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }
}

/// A sample as delivered by the external demultiplexer, before the ingest
/// handler has normalized its timestamps or assigned it to a buffer.
#[derive(Debug, Clone)]
pub struct IncomingSample {
    pub payload: Vec<u8>,
    pub size: u32,
    pub media_kind: MediaKind,
    pub sync_frame: bool,
    pub pts_raw: i64,
    pub dts_raw: Option<i64>,
    /// Plumbed through from the original callback shape; never read by the
    /// synchronizer itself (see the Open Questions in the design ledger).
    pub last_pcr: i64,
    pub source: u8,
    pub sub_stream: u8,
    pub language_tag: [u8; 4],
}

/// A frame handed to the muxer, tagged with whether it is the first
/// emission of a fresh worker generation.
#[derive(Debug, Clone)]
pub struct MuxerMessage {
    pub frame: Frame,
    pub source_discontinuity: bool,
}

/// Externally delivered lifecycle commands for the [`crate::supervisor::Supervisor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Start,
    Stop,
    Restart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_maps_to_frame_kind() {
        assert_eq!(MediaKind::H264.frame_kind(), FrameKind::Video);
        assert_eq!(MediaKind::Mpeg2Video.frame_kind(), FrameKind::Video);
        assert_eq!(MediaKind::Aac.frame_kind(), FrameKind::Audio);
        assert_eq!(MediaKind::Ac3.frame_kind(), FrameKind::Audio);
    }
}
