use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::clock::ClockEvent;
use crate::core::SyncCore;
use crate::error::SyncError;
use crate::model::{Frame, FrameKind, IncomingSample};
use crate::status::{StatusEvent, StatusSink};
use crate::stream_state::StreamState;

/// External entry point the demultiplexer calls once per decoded access
/// unit. Implementations must be safe to call from any of the ingest
/// threads the embedder owns.
pub trait SampleSource: Send + Sync {
    fn on_sample(&self, sample: IncomingSample) -> Result<(), SyncError>;
}

#[derive(Default)]
struct States {
    video: HashMap<u8, StreamState>,
    audio: HashMap<(u8, u8), StreamState>,
}

/// Implements the ingest flow: per-source state updates, timestamp
/// normalization, and insertion into the shared buffers.
///
/// Grounded in the original synchronizer's `receive_frame`: the
/// key-frame gate, the audio-waits-for-video-anchor gate, and the
/// restart-on-discontinuity/overflow arming are all taken from there. On a
/// recoverable fault `receive_frame` drains the buffers, signals the sync
/// thread to quit, and *joins* it before returning, so no frame from the
/// next worker generation can race the drain; `on_sample` reproduces that
/// by waiting on the worker's generation counter rather than a raw
/// `JoinHandle`, since `IngestHandler` has no handle of its own to join.
pub struct IngestHandler {
    core: Arc<SyncCore>,
    states: Mutex<States>,
    status: Arc<dyn StatusSink>,
}

impl IngestHandler {
    pub fn new(core: Arc<SyncCore>, status: Arc<dyn StatusSink>) -> Self {
        Self { core, states: Mutex::new(States::default()), status }
    }
}

impl SampleSource for IngestHandler {
    fn on_sample(&self, sample: IncomingSample) -> Result<(), SyncError> {
        // MediaKind is a closed enum, so the "unknown media kind" drop case
        // from the original has no reachable path under this encoding.
        let frame_kind = sample.media_kind.frame_kind();
        let mut states = self.states.lock();

        if frame_kind == FrameKind::Audio {
            let video_found = states.video.get(&sample.source).map(|s| s.found_key_frame).unwrap_or(false);
            if !video_found {
                return Ok(());
            }
        }

        let overflow_threshold = self.core.config.overflow_threshold;
        let discontinuity_threshold = self.core.config.discontinuity_threshold;

        let (full_time, duration, first_timestamp, event) = match frame_kind {
            FrameKind::Video => {
                let state = states
                    .video
                    .entry(sample.source)
                    .or_insert_with(|| StreamState::new(overflow_threshold, discontinuity_threshold));
                if !state.found_key_frame {
                    if !sample.sync_frame {
                        return Ok(());
                    }
                    state.found_key_frame = true;
                    state.first_timestamp = sample.dts_raw.unwrap_or(sample.pts_raw);
                    self.status.on_event(StatusEvent::KeyFrameFound { source: sample.source });
                }
                state.record_bytes(sample.size as u64);
                let ts = sample.dts_raw.unwrap_or(sample.pts_raw);
                let (full_time, event) = state.dts_clock().normalize(ts);
                let duration = state.last_full_time.map(|last| full_time - last).unwrap_or(0);
                state.last_full_time = Some(full_time);
                (full_time, duration, state.first_timestamp, event)
            }
            FrameKind::Audio => {
                let state = states
                    .audio
                    .entry((sample.source, sample.sub_stream))
                    .or_insert_with(|| StreamState::new(overflow_threshold, discontinuity_threshold));
                state.record_bytes(sample.size as u64);
                let (full_time, event) = state.pts_clock().normalize(sample.pts_raw);
                let duration = state.last_full_time.map(|last| full_time - last).unwrap_or(0);
                state.last_full_time = Some(full_time);
                (full_time, duration, state.first_timestamp, event)
            }
        };
        drop(states);

        let mut restart_needed = false;
        match event {
            ClockEvent::Overflow { delta } => {
                self.status.on_event(StatusEvent::ClockOverflow {
                    source: sample.source,
                    sub_stream: sample.sub_stream,
                    delta,
                });
            }
            ClockEvent::Discontinuity { delta } => {
                self.status.on_event(StatusEvent::Discontinuity {
                    source: sample.source,
                    sub_stream: sample.sub_stream,
                    delta,
                });
                restart_needed = true;
            }
            ClockEvent::Normal => {}
        }

        let frame = Frame {
            payload: sample.payload,
            pts_raw: sample.pts_raw,
            dts_raw: sample.dts_raw,
            full_time,
            duration,
            first_timestamp,
            source: sample.source,
            sub_stream: sample.sub_stream,
            sync_frame: sample.sync_frame,
            media_kind: sample.media_kind,
            frame_kind,
            language_tag: sample.language_tag,
            insertion_seq: 0,
        };

        if !self.core.insert(frame) {
            self.status.on_event(StatusEvent::BufferFull { video: frame_kind == FrameKind::Video });
            restart_needed = true;
        }

        if restart_needed {
            let generation = self.core.current_generation();
            self.core.drain_all();
            self.core.request_quit();
            self.core.wait_for_worker_exit(generation);
        }

        Ok(())
    }
}
