use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::buffer::SortedFrameBuffer;
use crate::config::SyncConfig;
use crate::model::Frame;

/// Owns the two Sorted Frame Buffers and the flags that coordinate ingest,
/// the sync worker, and the supervisor.
///
/// This collapses the original synchronizer's process-wide globals (buffer
/// arrays, entry counts, the "sync lock", the quit flag) into a single
/// value, shared as `Arc<SyncCore>` the way an AES67 stream handler shares
/// its state between the receiver thread and its owner. The single mutex
/// here guards exclusively the two buffers -- per-source
/// [`crate::stream_state::StreamState`] is never behind this lock, since it
/// has exactly one writer.
pub struct SyncCore {
    pub(crate) buffers: Mutex<Buffers>,
    pub(crate) quit_requested: AtomicBool,
    pub(crate) worker_running: AtomicBool,
    generation: AtomicU64,
    generation_lock: Mutex<()>,
    generation_cv: Condvar,
    pub config: SyncConfig,
}

pub(crate) struct Buffers {
    pub video: SortedFrameBuffer,
    pub audio: SortedFrameBuffer,
}

impl SyncCore {
    pub fn new(config: SyncConfig) -> Arc<Self> {
        let buffers = Buffers {
            video: SortedFrameBuffer::new(config.video_capacity),
            audio: SortedFrameBuffer::new(config.audio_capacity),
        };
        Arc::new(Self {
            buffers: Mutex::new(buffers),
            quit_requested: AtomicBool::new(false),
            worker_running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            generation_lock: Mutex::new(()),
            generation_cv: Condvar::new(),
            config,
        })
    }

    pub fn is_worker_running(&self) -> bool {
        self.worker_running.load(Ordering::Acquire)
    }

    pub(crate) fn request_quit(&self) {
        self.quit_requested.store(true, Ordering::Release);
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested.load(Ordering::Acquire)
    }

    /// Current worker generation. A generation is bumped exactly once, by
    /// the worker itself, each time it observes `quit_requested` and exits.
    pub(crate) fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Called by the exiting worker right after it has drained the buffers
    /// and cleared `quit_requested`. Wakes anyone blocked in
    /// `wait_for_worker_exit`.
    pub(crate) fn finish_generation(&self) {
        let _guard = self.generation_lock.lock();
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.generation_cv.notify_all();
    }

    /// Block until the worker generation that was live at `since` has
    /// exited, matching the original's `pthread_join` on the sync thread
    /// before `receive_frame` returns. A no-op if no worker is running.
    pub(crate) fn wait_for_worker_exit(&self, since: u64) {
        if !self.is_worker_running() {
            return;
        }
        let mut guard = self.generation_lock.lock();
        while self.generation.load(Ordering::Acquire) <= since && self.is_worker_running() {
            self.generation_cv.wait(&mut guard);
        }
    }

    /// Insert `frame` into the buffer matching its media kind. Returns
    /// `false` if the buffer was full (the caller must arm a restart).
    pub(crate) fn insert(&self, frame: Frame) -> bool {
        use crate::model::FrameKind;
        let mut guard = self.buffers.lock();
        let target = match frame.frame_kind {
            FrameKind::Video => &mut guard.video,
            FrameKind::Audio => &mut guard.audio,
        };
        target.insert(frame).is_ok()
    }

    /// Drain both buffers, discarding their contents. Called on restart and
    /// on final teardown so no frame leaks past a worker generation.
    pub(crate) fn drain_all(&self) {
        let mut guard = self.buffers.lock();
        guard.video.drain(|_| {});
        guard.audio.drain(|_| {});
    }
}
