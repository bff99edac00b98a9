use std::sync::atomic::Ordering;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::core::SyncCore;
use crate::model::{Frame, MuxerMessage};
use crate::status::{StatusEvent, StatusSink};

/// The single dedicated loop that drains the two Sorted Frame Buffers in
/// time-merge order and emits samples to the muxer.
///
/// Grounded directly in the original synchronizer's `frame_sync_thread`.
/// Two details are easy to get wrong and are taken verbatim from there:
///
/// - `first_grab` does not just skip one frame: every frame popped (audio
///   *and* video) while it is still true is discarded rather than emitted,
///   and video is not popped at all while it is true. It flips to false
///   the first time the audio head is found to be newer than the video
///   head (there is momentarily no old audio left to drain) -- from that
///   point on, for the remainder of this worker generation, every pop is
///   emitted for real, including the video frame popped in that same
///   pass.
/// - the `no_grab` stall counter only increments on that same branch
///   (audio momentarily out of data relative to video), not on every
///   non-ready pass.
pub struct SyncWorker {
    core: Arc<SyncCore>,
    muxer: Sender<MuxerMessage>,
    status: Arc<dyn StatusSink>,
}

impl SyncWorker {
    pub fn new(core: Arc<SyncCore>, muxer: Sender<MuxerMessage>, status: Arc<dyn StatusSink>) -> Self {
        Self { core, muxer, status }
    }

    /// Run the merge loop until `quit_requested` is observed. Called on a
    /// dedicated OS thread by the supervisor; returns once this worker
    /// generation has drained and exited.
    pub fn run(self) {
        self.core.worker_running.store(true, Ordering::Release);
        let active_sources = self.core.config.active_sources as usize;
        let idle_sleep = self.core.config.worker_idle_sleep;
        let stall_limit = self.core.config.audio_stall_limit;

        let mut first_grab = true;
        let mut no_grab: u32 = 0;
        let mut source_discontinuity = true;

        loop {
            if self.core.quit_requested() {
                self.core.drain_all();
                self.core.quit_requested.store(false, Ordering::Release);
                self.core.finish_generation();
                break;
            }

            let ready = {
                let guard = self.core.buffers.lock();
                guard.audio.len() > active_sources && guard.video.len() > active_sources
            };
            if !ready {
                std::thread::sleep(idle_sleep);
                continue;
            }

            let mut audio_time = {
                let guard = self.core.buffers.lock();
                match guard.audio.peek_head() {
                    Some(f) => f.full_time,
                    None => {
                        std::thread::sleep(idle_sleep);
                        continue;
                    }
                }
            };
            let video_time = {
                let guard = self.core.buffers.lock();
                match guard.video.peek_head() {
                    Some(f) => f.full_time,
                    None => {
                        std::thread::sleep(idle_sleep);
                        continue;
                    }
                }
            };

            if audio_time <= video_time {
                no_grab = 0;
                loop {
                    let should_pop = {
                        let guard = self.core.buffers.lock();
                        audio_time < video_time && guard.audio.len() > active_sources
                    };
                    if !should_pop || self.core.quit_requested() {
                        break;
                    }
                    let popped = {
                        let mut guard = self.core.buffers.lock();
                        guard.audio.pop_head()
                    };
                    let Some(frame) = popped else { break };
                    audio_time = frame.full_time;
                    self.release_or_discard(frame, first_grab, &mut source_discontinuity);
                }
            } else {
                warn!(
                    "not grabbing audio: video_time={video_time} audio_time={audio_time} active_sources={active_sources}"
                );
                first_grab = false;
                no_grab += 1;
                if no_grab >= stall_limit {
                    self.status.on_event(StatusEvent::AudioStalled { iterations: no_grab });
                    self.core.request_quit();
                    continue;
                }
            }

            if self.core.quit_requested() {
                continue;
            }

            if !first_grab {
                let popped = {
                    let mut guard = self.core.buffers.lock();
                    guard.video.pop_head()
                };
                if let Some(frame) = popped {
                    self.release_or_discard(frame, first_grab, &mut source_discontinuity);
                }
            } else {
                std::thread::sleep(idle_sleep);
            }
        }

        self.core.worker_running.store(false, Ordering::Release);
        debug!("sync worker exited");
    }

    fn release_or_discard(&self, frame: Frame, discard: bool, source_discontinuity: &mut bool) {
        if discard {
            trace!("discarding frame during priming: source={} full_time={}", frame.source, frame.full_time);
            return;
        }
        self.status.on_event(StatusEvent::FrameEmitted {
            source: frame.source,
            sub_stream: frame.sub_stream,
            full_time: frame.full_time,
        });
        let message = MuxerMessage { frame, source_discontinuity: *source_discontinuity };
        *source_discontinuity = false;
        let _ = self.muxer.send(message);
    }
}
