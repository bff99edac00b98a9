use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::info;
use parking_lot::Mutex;

use crate::core::SyncCore;
use crate::error::SyncError;
use crate::model::{ControlSignal, MuxerMessage};
use crate::status::{StatusEvent, StatusSink};
use crate::worker::SyncWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Draining,
}

/// Owns the lifecycle of the [`SyncWorker`]: start, stop, and
/// restart-on-discontinuity.
///
/// Grounded in the original synchronizer's restart loop (`runtime_thread`):
/// a dedicated supervisor thread spawns a worker, blocks on its join, and
/// on a non-terminal exit clears the quit flag and respawns. On a terminal
/// stop it drains the buffers and returns to `Idle`.
pub struct Supervisor {
    core: Arc<SyncCore>,
    muxer: Sender<MuxerMessage>,
    status: Arc<dyn StatusSink>,
    state: Mutex<State>,
    terminal: Arc<AtomicBool>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl Supervisor {
    pub fn new(core: Arc<SyncCore>, muxer: Sender<MuxerMessage>, status: Arc<dyn StatusSink>) -> Self {
        Self {
            core,
            muxer,
            status,
            state: Mutex::new(State::Idle),
            terminal: Arc::new(AtomicBool::new(false)),
            monitor: Mutex::new(None),
        }
    }

    pub fn start(&self) -> Result<(), SyncError> {
        let mut state = self.state.lock();
        if *state != State::Idle {
            return Err(SyncError::AlreadyRunning);
        }
        self.terminal.store(false, Ordering::Release);

        let core = self.core.clone();
        let muxer = self.muxer.clone();
        let status = self.status.clone();
        let terminal = self.terminal.clone();

        let handle = std::thread::Builder::new()
            .name("sync-supervisor".into())
            .spawn(move || Self::supervise(core, muxer, status, terminal))
            .map_err(SyncError::WorkerSpawn)?;

        *self.monitor.lock() = Some(handle);
        *state = State::Running;
        info!("supervisor started");
        Ok(())
    }

    /// Request a restart: the current worker generation drains and a fresh
    /// one starts, without returning to `Idle`.
    pub fn restart(&self) -> Result<(), SyncError> {
        let state = self.state.lock();
        if *state != State::Running {
            return Err(SyncError::NotRunning);
        }
        self.core.request_quit();
        Ok(())
    }

    pub fn stop(&self) -> Result<(), SyncError> {
        let mut state = self.state.lock();
        if *state == State::Idle {
            return Err(SyncError::NotRunning);
        }
        *state = State::Draining;
        self.terminal.store(true, Ordering::Release);
        self.core.request_quit();
        drop(state);

        if let Some(handle) = self.monitor.lock().take() {
            let _ = handle.join();
        }

        *self.state.lock() = State::Idle;
        info!("supervisor stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        *self.state.lock() == State::Running
    }

    /// Dispatch an externally delivered control signal to the matching
    /// lifecycle transition.
    pub fn handle(&self, signal: ControlSignal) -> Result<(), SyncError> {
        match signal {
            ControlSignal::Start => self.start(),
            ControlSignal::Stop => self.stop(),
            ControlSignal::Restart => self.restart(),
        }
    }

    fn supervise(core: Arc<SyncCore>, muxer: Sender<MuxerMessage>, status: Arc<dyn StatusSink>, terminal: Arc<AtomicBool>) {
        loop {
            let worker = SyncWorker::new(core.clone(), muxer.clone(), status.clone());
            worker.run();

            if terminal.load(Ordering::Acquire) {
                break;
            }
            status.on_event(StatusEvent::WorkerRestarted);
            info!("sync worker restarted by supervisor");
        }
    }
}
