//! Fixed-interval tick pacing and keep-up monitoring.
//!
//! A [`TickClock`] measures how long a tick's work took and idles for the
//! rest of the budget. [`WallClock`] does this with real time;
//! [`ScriptedClock`] replays synthetic durations so tests can drive the
//! engine deterministically without sleeping.
//!
//! [`KeepUpMonitor`] turns measured durations into the per-tick
//! `overloaded` flag. Overload is advisory: ticks are never dropped.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Source of tick timing.
pub trait TickClock {
    /// Mark the start of a tick's work.
    fn start_tick(&mut self);

    /// Time spent on work since [`start_tick`](Self::start_tick).
    fn work_elapsed(&mut self) -> Duration;

    /// Wait out the residual budget before the next tick.
    fn idle(&mut self, residual: Duration);
}

/// Real-time clock: [`Instant`] for measurement, [`std::thread::sleep`]
/// for idling.
#[derive(Debug, Default)]
pub struct WallClock {
    tick_start: Option<Instant>,
}

impl WallClock {
    /// A clock with no tick in progress.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickClock for WallClock {
    fn start_tick(&mut self) {
        self.tick_start = Some(Instant::now());
    }

    fn work_elapsed(&mut self) -> Duration {
        self.tick_start
            .map(|start| start.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    fn idle(&mut self, residual: Duration) {
        if !residual.is_zero() {
            std::thread::sleep(residual);
        }
    }
}

/// Deterministic clock that reports queued work durations.
///
/// Each tick consumes one duration from the script; once the script runs
/// out every tick reports `fallback`. Requested idle time is recorded
/// instead of slept.
#[derive(Debug, Default)]
pub struct ScriptedClock {
    script: VecDeque<Duration>,
    fallback: Duration,
    current: Duration,
    idled: Vec<Duration>,
}

impl ScriptedClock {
    /// A clock replaying `durations`, then `Duration::ZERO`.
    pub fn new(durations: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            script: durations.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A clock reporting `duration` for every tick.
    pub fn constant(duration: Duration) -> Self {
        Self {
            fallback: duration,
            ..Self::default()
        }
    }

    /// Idle time requested after each tick so far.
    pub fn idled(&self) -> &[Duration] {
        &self.idled
    }
}

impl TickClock for ScriptedClock {
    fn start_tick(&mut self) {
        self.current = self.script.pop_front().unwrap_or(self.fallback);
    }

    fn work_elapsed(&mut self) -> Duration {
        self.current
    }

    fn idle(&mut self, residual: Duration) {
        self.idled.push(residual);
    }
}

/// Verdict for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepUp {
    /// Work exceeded the tick budget.
    pub overloaded: bool,
    /// `budget - elapsed`, floored at zero.
    pub residual: Duration,
}

/// Compares each tick's work time against the nominal budget.
#[derive(Clone, Debug)]
pub struct KeepUpMonitor {
    budget: Duration,
    overloaded: bool,
    overload_events: u64,
}

impl KeepUpMonitor {
    /// A monitor for ticks of `dt` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `dt` is negative, not finite, or too large for a
    /// [`Duration`]; `EngineConfig::validate` rejects such values first.
    pub fn new(dt: f64) -> Self {
        Self {
            budget: Duration::from_secs_f64(dt),
            overloaded: false,
            overload_events: 0,
        }
    }

    /// The per-tick budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Whether the most recent tick was over budget.
    pub fn is_overloaded(&self) -> bool {
        self.overloaded
    }

    /// Total over-budget ticks recorded.
    pub fn overload_events(&self) -> u64 {
        self.overload_events
    }

    /// Record one tick's work time.
    ///
    /// Logs once when the engine starts falling behind and once when it
    /// catches up again.
    pub fn record(&mut self, elapsed: Duration) -> KeepUp {
        let residual = self.budget.checked_sub(elapsed);
        let overloaded = residual.is_none();
        if overloaded {
            self.overload_events += 1;
            if !self.overloaded {
                tracing::warn!(
                    elapsed_us = elapsed.as_micros() as u64,
                    budget_us = self.budget.as_micros() as u64,
                    "tick over budget, simulation falling behind real time"
                );
            }
        } else if self.overloaded {
            tracing::info!(
                overload_events = self.overload_events,
                "tick back within budget"
            );
        }
        self.overloaded = overloaded;
        KeepUp {
            overloaded,
            residual: residual.unwrap_or(Duration::ZERO),
        }
    }

    /// Forget the overload state and count.
    pub fn reset(&mut self) {
        self.overloaded = false;
        self.overload_events = 0;
    }
}
