use std::time::Instant;

use crate::clock::NormalizedClock;

/// Per-(source, sub_stream) state maintained by the ingest handler.
///
/// Mutated only by the ingest path for its own `(source, sub_stream)` pair
/// (single-writer); never touched by the sync worker or supervisor.
/// Grounded in the original synchronizer's per-source globals
/// (`found_key_frame`, `last_timestamp_pts`/`dts`, `overflow_pts`/`dts`) and
/// an AES67 stream handler's `StreamStats` counters.
#[derive(Debug)]
pub struct StreamState {
    pub found_key_frame: bool,
    pub first_timestamp: i64,
    pub last_full_time: Option<i64>,
    pts_clock: NormalizedClock,
    dts_clock: NormalizedClock,
    total_bytes: u64,
    clock_start: Option<Instant>,
    bitrate_bps: f64,
}

impl StreamState {
    pub fn new(overflow_threshold: i64, discontinuity_threshold: i64) -> Self {
        Self {
            found_key_frame: false,
            first_timestamp: 0,
            last_full_time: None,
            pts_clock: NormalizedClock::new(overflow_threshold, discontinuity_threshold),
            dts_clock: NormalizedClock::new(overflow_threshold, discontinuity_threshold),
            total_bytes: 0,
            clock_start: None,
            bitrate_bps: 0.0,
        }
    }

    pub fn pts_clock(&mut self) -> &mut NormalizedClock {
        &mut self.pts_clock
    }

    pub fn dts_clock(&mut self) -> &mut NormalizedClock {
        &mut self.dts_clock
    }

    /// Roll the instantaneous bitrate estimate forward by `bytes` received
    /// just now. Suitable for monitoring only.
    pub fn record_bytes(&mut self, bytes: u64) {
        let now = Instant::now();
        let start = *self.clock_start.get_or_insert(now);
        self.total_bytes += bytes;
        let elapsed = now.duration_since(start).as_secs_f64();
        if elapsed > 0.0 {
            self.bitrate_bps = (self.total_bytes as f64 * 8.0) / elapsed;
        }
    }

    pub fn bitrate_bps(&self) -> f64 {
        self.bitrate_bps
    }
}
