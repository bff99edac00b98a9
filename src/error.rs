use thiserror::Error;

/// Fatal errors surfaced at session construction or lifecycle transitions.
///
/// Transient and recoverable faults (dropped samples, discontinuities,
/// buffer overflow, audio stall) are never represented here -- they are
/// logged and handled by arming a worker restart. Only conditions that
/// prevent a session from existing at all reach this type.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to spawn sync worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("supervisor is already running")]
    AlreadyRunning,

    #[error("supervisor is not running")]
    NotRunning,
}
