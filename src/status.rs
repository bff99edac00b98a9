use log::{info, trace, warn};

/// Telemetry events raised by the synchronizer's internals. Stands in for
/// the original's message-dispatch/telemetry path: not wire-visible, purely
/// an in-process observability hook.
#[derive(Debug, Clone)]
pub enum StatusEvent {
    KeyFrameFound { source: u8 },
    ClockOverflow { source: u8, sub_stream: u8, delta: i64 },
    Discontinuity { source: u8, sub_stream: u8, delta: i64 },
    BufferFull { video: bool },
    AudioStalled { iterations: u32 },
    WorkerRestarted,
    FrameEmitted { source: u8, sub_stream: u8, full_time: i64 },
}

/// Receives [`StatusEvent`]s raised by the synchronizer. Implementations
/// must be cheap and non-blocking; they may be called from the ingest or
/// worker hot path.
pub trait StatusSink: Send + Sync {
    fn on_event(&self, event: StatusEvent);
}

/// Default sink: routes each event to the `log` facade at the same
/// granularity the original paired `fprintf`+`syslog` calls used.
#[derive(Debug, Default)]
pub struct LoggingStatusSink;

impl StatusSink for LoggingStatusSink {
    fn on_event(&self, event: StatusEvent) {
        match event {
            StatusEvent::KeyFrameFound { source } => {
                info!("source {source}: key frame found, synchronizer anchored");
            }
            StatusEvent::ClockOverflow { source, sub_stream, delta } => {
                info!("source {source} sub_stream {sub_stream}: clock overflow detected, delta={delta}");
            }
            StatusEvent::Discontinuity { source, sub_stream, delta } => {
                warn!("source {source} sub_stream {sub_stream}: discontinuity detected, delta={delta}");
            }
            StatusEvent::BufferFull { video } => {
                warn!("{} buffer full, arming restart", if video { "video" } else { "audio" });
            }
            StatusEvent::AudioStalled { iterations } => {
                warn!("audio stalled for {iterations} iterations, arming restart");
            }
            StatusEvent::WorkerRestarted => {
                info!("sync worker restarted");
            }
            StatusEvent::FrameEmitted { source, sub_stream, full_time } => {
                trace!("emit source={source} sub_stream={sub_stream} full_time={full_time}");
            }
        }
    }
}

/// Discards every event. Useful for tests and embedders with their own
/// telemetry path.
#[derive(Debug, Default)]
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn on_event(&self, _event: StatusEvent) {}
}
