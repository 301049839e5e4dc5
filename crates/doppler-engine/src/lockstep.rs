//! Lockstep (synchronous) simulation driver.
//!
//! [`LockstepSimulation`] runs one tick per call to
//! [`step_sync()`](LockstepSimulation::step_sync) on the caller's thread:
//! apply parameter updates, execute the tick, publish a snapshot, then
//! idle out the remaining budget on its [`TickClock`].
//!
//! # Ownership model
//!
//! `LockstepSimulation` is [`Send`] but all mutating methods take
//! `&mut self`. Snapshots are owned copies, so callers may keep them
//! across steps. No background threads are involved.

use doppler_core::{ParamCommand, ParamError, TickId};

use crate::config::{ConfigError, EngineConfig};
use crate::metrics::StepMetrics;
use crate::pacer::{TickClock, WallClock};
use crate::snapshot::EngineSnapshot;
use crate::tick::{SimulationEngine, TickOutcome};

// Compile-time assertion: LockstepSimulation is Send with either clock.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<LockstepSimulation>();
        assert_send::<LockstepSimulation<crate::pacer::ScriptedClock>>();
    }
};

// ── StepResult ──────────────────────────────────────────────────

/// Result of a [`LockstepSimulation::step_sync()`] call.
#[derive(Clone, Debug)]
pub struct StepResult {
    /// State after this tick.
    pub snapshot: EngineSnapshot,
    /// What the tick did.
    pub outcome: TickOutcome,
    /// Commands rejected before the tick ran.
    pub rejected: Vec<(ParamCommand, ParamError)>,
    /// Performance metrics for this tick.
    pub metrics: StepMetrics,
}

// ── LockstepSimulation ──────────────────────────────────────────

/// Single-threaded simulation stepped by the caller.
///
/// # Example
///
/// ```
/// use doppler_engine::{EngineConfig, LockstepSimulation, ScriptedClock};
///
/// let mut sim = LockstepSimulation::new(EngineConfig::default(), ScriptedClock::default())?;
/// for _ in 0..10 {
///     sim.step_sync(vec![]);
/// }
/// assert_eq!(sim.current_tick().0, 10);
/// # Ok::<(), doppler_engine::ConfigError>(())
/// ```
pub struct LockstepSimulation<C: TickClock = WallClock> {
    engine: SimulationEngine,
    clock: C,
}

impl<C: TickClock> LockstepSimulation<C> {
    /// Validate `config`, build the engine, and pace it with `clock`.
    pub fn new(config: EngineConfig, clock: C) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: SimulationEngine::new(config)?,
            clock,
        })
    }

    /// Wrap an existing engine, e.g. one recovered from realtime mode.
    pub fn from_engine(engine: SimulationEngine, clock: C) -> Self {
        Self { engine, clock }
    }

    /// Execute one tick synchronously.
    ///
    /// Applies `commands` in order (rejections are returned, not fatal),
    /// runs the tick, takes the snapshot, then idles for the residual
    /// budget. Applying the commands and taking the snapshot both count
    /// against the budget. Overloaded ticks idle for zero.
    pub fn step_sync(&mut self, commands: Vec<ParamCommand>) -> StepResult {
        let tick = self.engine.execute_tick(
            &mut self.clock,
            |engine| engine.apply_batch(commands),
            |snapshot| snapshot,
        );
        self.clock.idle(tick.result.residual);

        let mut snapshot = tick.published;
        snapshot.overloaded = tick.result.metrics.overloaded;
        StepResult {
            snapshot,
            outcome: tick.result.outcome,
            rejected: tick.applied,
            metrics: tick.result.metrics,
        }
    }

    /// Step `n` ticks with no parameter changes; returns the last result.
    pub fn run_for(&mut self, n: u64) -> Option<StepResult> {
        let mut last = None;
        for _ in 0..n {
            last = Some(self.step_sync(Vec::new()));
        }
        last
    }

    /// Return to tick 0 and the configured initial parameters.
    pub fn reset(&mut self) -> Result<EngineSnapshot, ConfigError> {
        self.engine.reset()?;
        Ok(self.engine.snapshot())
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> EngineSnapshot {
        self.engine.snapshot()
    }

    /// Current tick ID (0 after construction or reset).
    pub fn current_tick(&self) -> TickId {
        self.engine.current_tick()
    }

    /// Metrics from the most recent tick.
    pub fn last_metrics(&self) -> &StepMetrics {
        self.engine.last_metrics()
    }

    /// The underlying engine.
    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// The pacing clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Take the engine back out.
    pub fn into_engine(self) -> SimulationEngine {
        self.engine
    }
}

impl<C: TickClock> std::fmt::Debug for LockstepSimulation<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockstepSimulation")
            .field("current_tick", &self.engine.current_tick())
            .field("overloaded", &self.engine.is_overloaded())
            .finish()
    }
}
