//! User-facing `RealtimeSimulation` API.
//!
//! The engine runs on a dedicated background thread at its nominal tick
//! rate (`1 / dt`). Control surfaces submit parameter batches; renderers
//! read published snapshots.
//!
//! # Architecture
//!
//! ```text
//! Control thread(s)              Tick thread                 Renderer(s)
//!     |                              |                            |
//!     |                              | clock.start_tick()         |
//!     |--submit()------------------->| cmd_rx.try_recv()          |
//!     |   [cmd_tx: bounded(64)]      | engine.apply_batch()       |
//!     |<--rejections via reply_tx----| engine.step()              |
//!     |                              | ring.push(snapshot)        |
//!     |                              | clock.work_elapsed()       |
//!     |                              | park(budget - elapsed)     |
//!     |                              |                            |
//!     |                              |        latest_snapshot()<--|
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Sender, TrySendError};
use doppler_core::{ParamCommand, ParamError};

use crate::config::{ConfigError, EngineConfig, RealtimeConfig};
use crate::ring::SnapshotRing;
use crate::snapshot::EngineSnapshot;
use crate::tick::SimulationEngine;
use crate::tick_thread::{ParamBatch, TickThreadState};

// ── Error types ──────────────────────────────────────────────────

/// Error submitting parameter updates to the tick thread.
#[derive(Debug, PartialEq)]
pub enum SubmitError {
    /// The tick thread has shut down.
    Shutdown,
    /// The command channel is full (back-pressure).
    ChannelFull,
    /// The tick thread applied the batch but rejected this parameter.
    Rejected(ParamError),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shutdown => write!(f, "tick thread has shut down"),
            Self::ChannelFull => write!(f, "command channel full"),
            Self::Rejected(e) => write!(f, "parameter rejected: {e}"),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`RealtimeSimulation::shutdown`].
#[derive(Debug)]
pub struct ShutdownReport {
    /// Total time spent shutting down, in milliseconds.
    pub total_ms: u64,
    /// Whether the tick thread was joined successfully.
    pub tick_joined: bool,
    /// Ticks completed by the engine at shutdown, if it was recovered.
    pub ticks_run: Option<u64>,
}

// ── RealtimeSimulation ───────────────────────────────────────────

/// Realtime simulation driven by a background tick thread.
///
/// Dropping it shuts the thread down.
pub struct RealtimeSimulation {
    ring: Arc<SnapshotRing>,
    cmd_tx: Option<Sender<ParamBatch>>,
    shutdown_flag: Arc<AtomicBool>,
    tick_stopped: Arc<AtomicBool>,
    tick_thread: Option<JoinHandle<SimulationEngine>>,
    recovered_engine: Option<SimulationEngine>,
}

impl RealtimeSimulation {
    /// Build an engine from `config` and start ticking.
    pub fn new(config: EngineConfig, realtime: RealtimeConfig) -> Result<Self, ConfigError> {
        let engine = SimulationEngine::new(config)?;
        Self::from_engine(engine, realtime)
    }

    /// Start ticking an existing engine from its current state.
    pub fn from_engine(
        engine: SimulationEngine,
        realtime: RealtimeConfig,
    ) -> Result<Self, ConfigError> {
        realtime.validate()?;

        let ring = Arc::new(SnapshotRing::new(realtime.snapshot_ring_capacity));
        // Renderers get the initial state before the first tick lands.
        ring.push(engine.snapshot());

        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let tick_stopped = Arc::new(AtomicBool::new(false));
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(realtime.command_channel_capacity);

        let state = TickThreadState::new(
            engine,
            Arc::clone(&ring),
            cmd_rx,
            Arc::clone(&shutdown_flag),
            Arc::clone(&tick_stopped),
        );
        let tick_thread = thread::Builder::new()
            .name("doppler-tick".into())
            .spawn(move || state.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("tick thread: {e}"),
            })?;

        Ok(Self {
            ring,
            cmd_tx: Some(cmd_tx),
            shutdown_flag,
            tick_stopped,
            tick_thread: Some(tick_thread),
            recovered_engine: None,
        })
    }

    /// Submit parameter updates for the next tick boundary.
    ///
    /// Blocks until the tick thread has applied the batch (at most one
    /// tick period) and returns the commands it rejected.
    pub fn submit(
        &self,
        commands: Vec<ParamCommand>,
    ) -> Result<Vec<(ParamCommand, ParamError)>, SubmitError> {
        let cmd_tx = self.cmd_tx.as_ref().ok_or(SubmitError::Shutdown)?;

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let batch = ParamBatch {
            commands,
            reply: reply_tx,
        };
        cmd_tx.try_send(batch).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::ChannelFull,
            TrySendError::Disconnected(_) => SubmitError::Shutdown,
        })?;

        reply_rx.recv().map_err(|_| SubmitError::Shutdown)
    }

    fn submit_one(&self, command: ParamCommand) -> Result<(), SubmitError> {
        match self.submit(vec![command])?.pop() {
            Some((_, e)) => Err(SubmitError::Rejected(e)),
            None => Ok(()),
        }
    }

    /// Set the source velocity at the next tick boundary.
    pub fn set_source_speed(&self, value: f64) -> Result<(), SubmitError> {
        self.submit_one(ParamCommand::SetSourceSpeed(value))
    }

    /// Set the emitted frequency at the next tick boundary.
    pub fn set_source_frequency(&self, value: f64) -> Result<(), SubmitError> {
        self.submit_one(ParamCommand::SetSourceFrequency(value))
    }

    /// The most recently published snapshot.
    pub fn latest_snapshot(&self) -> Option<Arc<EngineSnapshot>> {
        self.ring.latest()
    }

    /// A retained snapshot by publish position.
    pub fn snapshot_at(&self, pos: u64) -> Option<Arc<EngineSnapshot>> {
        self.ring.get_by_pos(pos)
    }

    /// Number of snapshots published so far, including the initial one.
    pub fn published(&self) -> u64 {
        self.ring.published()
    }

    /// Whether the tick thread is still running.
    pub fn is_running(&self) -> bool {
        !self.tick_stopped.load(Ordering::Acquire)
    }

    /// Stop the tick thread and join it.
    ///
    /// Idempotent. The engine is kept for [`into_engine`](Self::into_engine).
    pub fn shutdown(&mut self) -> ShutdownReport {
        let start = Instant::now();

        self.shutdown_flag.store(true, Ordering::Release);
        // Drop the sender so any blocked submitter sees Shutdown.
        self.cmd_tx.take();

        let tick_joined = match self.tick_thread.take() {
            Some(handle) => {
                // Wake it from a budget park immediately.
                handle.thread().unpark();
                match handle.join() {
                    Ok(engine) => {
                        self.recovered_engine = Some(engine);
                        true
                    }
                    Err(_) => {
                        tracing::warn!("tick thread panicked, engine lost");
                        false
                    }
                }
            }
            None => self.recovered_engine.is_some(),
        };

        ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            tick_joined,
            ticks_run: self
                .recovered_engine
                .as_ref()
                .map(|e| e.current_tick().0),
        }
    }

    /// Shut down and hand back the engine in its final state.
    pub fn into_engine(mut self) -> Result<SimulationEngine, ConfigError> {
        self.shutdown();
        self.recovered_engine
            .take()
            .ok_or(ConfigError::EngineRecoveryFailed)
    }
}

impl Drop for RealtimeSimulation {
    fn drop(&mut self) {
        if self.tick_thread.is_some() {
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for RealtimeSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeSimulation")
            .field("running", &self.is_running())
            .field("published", &self.published())
            .finish()
    }
}
