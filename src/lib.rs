//! Multi-source live frame synchronizer.
//!
//! Accepts decoded video/audio access units from several parallel ingest
//! sources carrying the same program, normalizes their 33-bit PTS/DTS
//! timestamps onto a shared 64-bit clock, time-merges them across sources
//! and media kinds, and emits a single ordered stream to a downstream
//! muxer.

pub mod buffer;
pub mod clock;
pub mod config;
pub mod core;
pub mod error;
pub mod ingest;
pub mod model;
pub mod status;
pub mod supervisor;
pub mod worker;

pub use config::SyncConfig;
pub use core::SyncCore;
pub use error::SyncError;
pub use ingest::{IngestHandler, SampleSource};
pub use model::{ControlSignal, Frame, FrameKind, IncomingSample, MediaKind, MuxerMessage};
pub use status::{LoggingStatusSink, NullStatusSink, StatusEvent, StatusSink};
pub use supervisor::Supervisor;

use std::sync::mpsc::Receiver;
use std::sync::Arc;

/// Convenience constructor wiring a [`SyncCore`], [`IngestHandler`], and
/// [`Supervisor`] together for a single session, along with the receiving
/// end of the muxer channel.
pub fn new_session(
    config: SyncConfig,
    status: Arc<dyn StatusSink>,
) -> (Arc<IngestHandler>, Arc<Supervisor>, Receiver<MuxerMessage>) {
    let core = SyncCore::new(config);
    let (tx, rx) = std::sync::mpsc::channel();
    let ingest = Arc::new(IngestHandler::new(core.clone(), status.clone()));
    let supervisor = Arc::new(Supervisor::new(core, tx, status));
    (ingest, supervisor, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn single_source_clean_stream_end_to_end() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (ingest, supervisor, rx) = new_session(SyncConfig::new(1, 16, 16).unwrap(), Arc::new(NullStatusSink));
        supervisor.start().unwrap();

        let video_key = IncomingSample {
            payload: vec![0xAA],
            size: 1,
            media_kind: MediaKind::H264,
            sync_frame: true,
            pts_raw: 0,
            dts_raw: Some(0),
            last_pcr: 0,
            source: 0,
            sub_stream: 0,
            language_tag: *b"eng\0",
        };
        ingest.on_sample(video_key).unwrap();
        ingest
            .on_sample(IncomingSample {
                payload: vec![0xBB],
                size: 1,
                media_kind: MediaKind::Aac,
                sync_frame: false,
                pts_raw: 1_800,
                dts_raw: None,
                last_pcr: 0,
                source: 0,
                sub_stream: 0,
                language_tag: *b"eng\0",
            })
            .unwrap();
        ingest
            .on_sample(IncomingSample {
                payload: vec![0xCC],
                size: 1,
                media_kind: MediaKind::H264,
                sync_frame: false,
                pts_raw: 3_600,
                dts_raw: Some(3_600),
                last_pcr: 0,
                source: 0,
                sub_stream: 0,
                language_tag: *b"eng\0",
            })
            .unwrap();
        ingest
            .on_sample(IncomingSample {
                payload: vec![0xDD],
                size: 1,
                media_kind: MediaKind::Aac,
                sync_frame: false,
                pts_raw: 3_600,
                dts_raw: None,
                last_pcr: 0,
                source: 0,
                sub_stream: 0,
                language_tag: *b"eng\0",
            })
            .unwrap();
        // A third video frame keeps the buffer above `active_sources` for
        // the second merge pass once the first video frame has been
        // popped; without it the worker would go idle after one emission.
        ingest
            .on_sample(IncomingSample {
                payload: vec![0xEE],
                size: 1,
                media_kind: MediaKind::H264,
                sync_frame: false,
                pts_raw: 7_200,
                dts_raw: Some(7_200),
                last_pcr: 0,
                source: 0,
                sub_stream: 0,
                language_tag: *b"eng\0",
            })
            .unwrap();

        let mut messages = Vec::new();
        while let Ok(msg) = rx.recv_timeout(Duration::from_millis(200)) {
            messages.push(msg);
            if messages.len() == 3 {
                break;
            }
        }

        supervisor.stop().unwrap();

        // Pass 1: the audio head (1800) is newer than the video head (0),
        // so `first_grab` flips immediately and video@0 is emitted in the
        // same pass with `source_discontinuity = true`.
        // Pass 2: the audio head (1800) is now <= the video head (3600),
        // so audio@1800 drains and is emitted, followed by video@3600.
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].frame.full_time, 0);
        assert!(messages[0].source_discontinuity);
        assert_eq!(messages[1].frame.full_time, 1_800);
        assert!(!messages[1].source_discontinuity);
        assert_eq!(messages[2].frame.full_time, 3_600);
        assert!(!messages[2].source_discontinuity);
    }
}
