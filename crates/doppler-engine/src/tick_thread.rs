//! Background tick loop for realtime mode.
//!
//! The tick thread owns [`SimulationEngine`] exclusively (moved in via
//! `thread::spawn`). No locks on the hot path: parameter batches arrive
//! on a bounded crossbeam channel, are applied only between ticks, and
//! rejected commands go back on a per-batch reply channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use doppler_core::{ParamCommand, ParamError};

use crate::pacer::{TickClock, WallClock};
use crate::ring::SnapshotRing;
use crate::tick::SimulationEngine;

/// A batch of parameter commands from a control thread, paired with a
/// reply channel for the rejected ones.
pub(crate) struct ParamBatch {
    pub commands: Vec<ParamCommand>,
    pub reply: Sender<Vec<(ParamCommand, ParamError)>>,
}

/// Wall clock whose idle wait parks the thread, so shutdown can wake it
/// immediately with `unpark()`.
struct ParkingClock {
    wall: WallClock,
    shutdown_flag: Arc<AtomicBool>,
}

impl TickClock for ParkingClock {
    fn start_tick(&mut self) {
        self.wall.start_tick();
    }

    fn work_elapsed(&mut self) -> Duration {
        self.wall.work_elapsed()
    }

    fn idle(&mut self, residual: Duration) {
        let deadline = Instant::now() + residual;
        // park_timeout may wake spuriously; loop until the deadline.
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            std::thread::park_timeout(deadline - now);
        }
    }
}

/// State held by the tick thread's main loop.
pub(crate) struct TickThreadState {
    engine: SimulationEngine,
    ring: Arc<SnapshotRing>,
    cmd_rx: Receiver<ParamBatch>,
    shutdown_flag: Arc<AtomicBool>,
    tick_stopped: Arc<AtomicBool>,
    clock: ParkingClock,
}

impl TickThreadState {
    pub fn new(
        engine: SimulationEngine,
        ring: Arc<SnapshotRing>,
        cmd_rx: Receiver<ParamBatch>,
        shutdown_flag: Arc<AtomicBool>,
        tick_stopped: Arc<AtomicBool>,
    ) -> Self {
        let clock = ParkingClock {
            wall: WallClock::new(),
            shutdown_flag: Arc::clone(&shutdown_flag),
        };
        Self {
            engine,
            ring,
            cmd_rx,
            shutdown_flag,
            tick_stopped,
            clock,
        }
    }

    /// Main tick loop. Runs until `shutdown_flag` is set.
    ///
    /// Consumes self and returns the engine so the owner can recover it
    /// through the `JoinHandle`.
    pub fn run(mut self) -> SimulationEngine {
        tracing::info!(
            dt = self.engine.config().dt,
            start_tick = self.engine.current_tick().0,
            "tick thread started"
        );

        while !self.shutdown_flag.load(Ordering::Acquire) {
            self.run_one_tick();
        }

        self.tick_stopped.store(true, Ordering::Release);
        tracing::info!(
            ticks = self.engine.current_tick().0,
            overload_events = self.engine.last_metrics().overload_events,
            "tick thread stopped"
        );
        self.engine
    }

    /// Apply pending batches, tick, publish, then idle. The keep-up
    /// measurement spans everything but the idle.
    fn run_one_tick(&mut self) {
        let cmd_rx = &self.cmd_rx;
        let ring = &self.ring;
        let tick = self.engine.execute_tick(
            &mut self.clock,
            |engine| drain_command_channel(cmd_rx, engine),
            // Publish before idling so renderers see it this period.
            |snapshot| ring.push(snapshot),
        );
        self.clock.idle(tick.result.residual);
    }
}

/// Drain all pending parameter batches into `engine`.
fn drain_command_channel(cmd_rx: &Receiver<ParamBatch>, engine: &mut SimulationEngine) {
    while let Ok(batch) = cmd_rx.try_recv() {
        let rejected = engine.apply_batch(batch.commands);
        // Best-effort reply; the caller may have dropped its receiver.
        let _ = batch.reply.send(rejected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn state(
        shutdown: &Arc<AtomicBool>,
    ) -> (TickThreadState, crossbeam_channel::Sender<ParamBatch>) {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let engine = SimulationEngine::new(EngineConfig::default()).unwrap();
        let st = TickThreadState::new(
            engine,
            Arc::new(SnapshotRing::new(4)),
            rx,
            Arc::clone(shutdown),
            Arc::new(AtomicBool::new(false)),
        );
        (st, tx)
    }

    #[test]
    fn drain_applies_and_replies() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let (mut st, tx) = state(&shutdown);
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        tx.send(ParamBatch {
            commands: vec![
                ParamCommand::SetSourceSpeed(-40.0),
                ParamCommand::SetSourceFrequency(-1.0),
            ],
            reply: reply_tx,
        })
        .unwrap();

        drain_command_channel(&st.cmd_rx, &mut st.engine);
        let rejected = reply_rx.recv().unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(st.engine.source().velocity(), -40.0);
    }

    #[test]
    fn one_tick_applies_then_publishes() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let (mut st, tx) = state(&shutdown);
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        tx.send(ParamBatch {
            commands: vec![ParamCommand::SetSourceSpeed(-40.0)],
            reply: reply_tx,
        })
        .unwrap();

        st.run_one_tick();
        assert!(reply_rx.recv().unwrap().is_empty());
        let published = st.ring.latest().unwrap();
        assert_eq!(published.tick.0, 1);
        assert_eq!(published.source_velocity, -40.0);
        assert_eq!(st.engine.last_metrics().overload_events, 0);
    }

    #[test]
    fn run_exits_immediately_when_flag_set() {
        let shutdown = Arc::new(AtomicBool::new(true));
        let (st, _tx) = state(&shutdown);
        let stopped = Arc::clone(&st.tick_stopped);
        let engine = st.run();
        assert_eq!(engine.current_tick().0, 0);
        assert!(stopped.load(Ordering::Acquire));
    }

    #[test]
    fn parking_idle_returns_on_shutdown() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut clock = ParkingClock {
            wall: WallClock::new(),
            shutdown_flag: flag,
        };
        let start = Instant::now();
        clock.idle(Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
