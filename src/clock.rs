use crate::config::OVERFLOW_EPOCH;

/// Outcome of normalizing one raw timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Ordinary advance; nothing notable happened.
    Normal,
    /// The 33-bit counter wrapped; the overflow accumulator was bumped.
    Overflow { delta: i64 },
    /// A backward jump or a forward jump beyond the discontinuity
    /// threshold that isn't a wrap; the worker should be restarted.
    Discontinuity { delta: i64 },
}

/// Tracks overflow state for a single timestamp domain (one stream's PTS,
/// or one stream's DTS) and converts raw 33-bit values into a monotone
/// 64-bit tick count.
///
/// Grounded in the overflow/discontinuity detection in the original
/// synchronizer's `receive_frame`: a backward jump is only treated as wrap
/// if the old timestamp was already in the upper half of its epoch: that
/// distinguishes true wraparound from a spurious backward jump near the
/// start of an epoch. The two thresholds are taken from [`crate::config::SyncConfig`]
/// rather than hardcoded, so an embedder can retune them without forking
/// this module.
#[derive(Debug)]
pub struct NormalizedClock {
    overflow: i64,
    last_full_time: Option<i64>,
    overflow_threshold: i64,
    discontinuity_threshold: i64,
}

impl NormalizedClock {
    pub fn new(overflow_threshold: i64, discontinuity_threshold: i64) -> Self {
        Self { overflow: 0, last_full_time: None, overflow_threshold, discontinuity_threshold }
    }

    /// Normalize one raw timestamp, returning the full time and what
    /// happened on the way there.
    pub fn normalize(&mut self, raw: i64) -> (i64, ClockEvent) {
        let Some(last) = self.last_full_time else {
            let full_time = raw + self.overflow;
            self.last_full_time = Some(full_time);
            return (full_time, ClockEvent::Normal);
        };

        let delta = raw + self.overflow - last;
        let mod_overflow = last.rem_euclid(OVERFLOW_EPOCH);

        let event = if delta < -self.overflow_threshold && mod_overflow > self.overflow_threshold {
            self.overflow += OVERFLOW_EPOCH;
            ClockEvent::Overflow { delta }
        } else if delta < 0 || delta > self.discontinuity_threshold {
            ClockEvent::Discontinuity { delta }
        } else {
            ClockEvent::Normal
        };

        let full_time = raw + self.overflow;
        self.last_full_time = Some(full_time);
        (full_time, event)
    }
}
