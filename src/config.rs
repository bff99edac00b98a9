use std::time::Duration;

use crate::error::SyncError;

/// Overflow epoch for 33-bit PTS/DTS values: 2^33.
pub const OVERFLOW_EPOCH: i64 = 8_589_934_592;

/// Magnitude of backward delta that, combined with the old timestamp being
/// in the upper half of its epoch, indicates genuine wraparound.
pub const OVERFLOW_THRESHOLD: i64 = 4_294_967_296;

/// Forward or backward jump beyond this many ticks (at 90 kHz) that isn't a
/// wrap is treated as a discontinuity.
pub const DISCONTINUITY_THRESHOLD: i64 = 60_000;

pub const MAX_SOURCES: u8 = 10;
pub const MAX_AUDIO_SUBSTREAMS: u8 = 4;

/// Validated configuration for a synchronizer session.
///
/// Construct via [`SyncConfig::new`] or [`SyncConfig::default`]; both paths
/// enforce the invariants the worker's readiness predicate depends on.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub video_capacity: usize,
    pub audio_capacity: usize,
    pub active_sources: u8,
    pub overflow_threshold: i64,
    pub discontinuity_threshold: i64,
    pub audio_stall_limit: u32,
    pub worker_idle_sleep: Duration,
    pub max_sources: u8,
    pub max_audio_substreams: u8,
}

impl SyncConfig {
    pub fn new(active_sources: u8, video_capacity: usize, audio_capacity: usize) -> Result<Self, SyncError> {
        let cfg = Self {
            video_capacity,
            audio_capacity,
            active_sources,
            overflow_threshold: OVERFLOW_THRESHOLD,
            discontinuity_threshold: DISCONTINUITY_THRESHOLD,
            audio_stall_limit: 15,
            worker_idle_sleep: Duration::from_millis(5),
            max_sources: MAX_SOURCES,
            max_audio_substreams: MAX_AUDIO_SUBSTREAMS,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), SyncError> {
        if self.active_sources == 0 {
            return Err(SyncError::Config("active_sources must be >= 1".into()));
        }
        if self.active_sources > self.max_sources {
            return Err(SyncError::Config(format!(
                "active_sources {} exceeds max_sources {}",
                self.active_sources, self.max_sources
            )));
        }
        if self.max_sources > MAX_SOURCES {
            return Err(SyncError::Config(format!(
                "max_sources {} exceeds hard ceiling {}",
                self.max_sources, MAX_SOURCES
            )));
        }
        if self.max_audio_substreams > MAX_AUDIO_SUBSTREAMS {
            return Err(SyncError::Config(format!(
                "max_audio_substreams {} exceeds hard ceiling {}",
                self.max_audio_substreams, MAX_AUDIO_SUBSTREAMS
            )));
        }
        if self.video_capacity <= self.active_sources as usize {
            return Err(SyncError::Config(
                "video_capacity must exceed active_sources or the readiness predicate can never be satisfied".into(),
            ));
        }
        if self.audio_capacity <= self.active_sources as usize {
            return Err(SyncError::Config(
                "audio_capacity must exceed active_sources or the readiness predicate can never be satisfied".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(1, 2_048, 2_048).expect("default configuration is always valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.video_capacity, 2_048);
        assert_eq!(cfg.audio_stall_limit, 15);
    }

    #[test]
    fn rejects_zero_active_sources() {
        assert!(SyncConfig::new(0, 2_048, 2_048).is_err());
    }

    #[test]
    fn rejects_capacity_not_exceeding_active_sources() {
        assert!(SyncConfig::new(4, 4, 2_048).is_err());
    }

    #[test]
    fn rejects_active_sources_beyond_ceiling() {
        assert!(SyncConfig::new(20, 2_048, 2_048).is_err());
    }
}
