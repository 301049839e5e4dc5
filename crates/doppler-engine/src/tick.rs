//! Simulation engine: the single-threaded tick.
//!
//! [`SimulationEngine`] owns all simulation state (source, observer,
//! wavefront ring, emission scheduler, detector, keep-up monitor) and
//! runs one tick in a fixed order:
//!
//! ```text
//! source.advance -> ring.advance_all -> scheduler.tick (maybe ring.recycle)
//!   -> detector.scan -> keep-up check
//! ```
//!
//! Parameter updates are applied between ticks only. The engine never
//! sleeps itself; drivers ([`LockstepSimulation`](crate::LockstepSimulation),
//! [`RealtimeSimulation`](crate::RealtimeSimulation)) pass a
//! [`TickClock`] and idle for the residual budget.

use std::time::Duration;

use doppler_core::{
    ObserverState, ParamCommand, ParamError, SlotIndex, SourceState, TickId, WavefrontRing,
};

use crate::config::{ConfigError, EngineConfig};
use crate::detector::{FrequencyDetector, FrequencySample};
use crate::metrics::StepMetrics;
use crate::pacer::{KeepUpMonitor, TickClock};
use crate::scheduler::EmissionScheduler;
use crate::snapshot::{EngineSnapshot, WavefrontView};

// ── TickOutcome ──────────────────────────────────────────────────

/// What the physics of one tick did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    /// The tick that just completed.
    pub tick: TickId,
    /// Source velocity was reflected at a range limit.
    pub reflected: bool,
    /// Slot recycled for a new wavefront, if one was emitted.
    pub emitted: Option<SlotIndex>,
    /// Observed-frequency sample taken, if any.
    pub sample: Option<FrequencySample>,
    /// The held observed frequency went stale and was cleared.
    pub went_stale: bool,
}

// ── TickResult ───────────────────────────────────────────────────

/// A timed tick: the physics outcome plus keep-up verdict and metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct TickResult {
    /// Physics outcome.
    pub outcome: TickOutcome,
    /// Idle time the driver should wait before the next tick.
    pub residual: Duration,
    /// Metrics for this tick.
    pub metrics: StepMetrics,
}

// ── TimedTick ────────────────────────────────────────────────────

/// Everything [`SimulationEngine::execute_tick`] produced.
#[derive(Clone, Debug)]
pub struct TimedTick<T, R> {
    /// Timing verdict, outcome and metrics.
    pub result: TickResult,
    /// Return value of the `apply` hook.
    pub applied: T,
    /// Return value of the `publish` hook.
    pub published: R,
}

// ── SimulationEngine ─────────────────────────────────────────────

/// Owns every piece of simulation state and advances it one tick at a time.
#[derive(Clone, Debug)]
pub struct SimulationEngine {
    config: EngineConfig,
    source: SourceState,
    observer: ObserverState,
    ring: WavefrontRing,
    scheduler: EmissionScheduler,
    detector: FrequencyDetector,
    keep_up: KeepUpMonitor,
    current_tick: TickId,
    emissions: u64,
    samples: u64,
    stale_resets: u64,
    last_metrics: StepMetrics,
}

impl SimulationEngine {
    /// Construct an engine from a validated [`EngineConfig`].
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let source = Self::initial_source(&config)?;
        Ok(Self {
            observer: ObserverState::new(config.observer),
            ring: WavefrontRing::new(
                config.ring_capacity,
                config.initial_source,
                config.park_radius(),
            ),
            scheduler: EmissionScheduler::new(),
            detector: FrequencyDetector::new(config.crossing, config.stale_grace()),
            keep_up: KeepUpMonitor::new(config.dt),
            current_tick: TickId(0),
            emissions: 0,
            samples: 0,
            stale_resets: 0,
            last_metrics: StepMetrics::default(),
            source,
            config,
        })
    }

    fn initial_source(config: &EngineConfig) -> Result<SourceState, ConfigError> {
        let mut source = SourceState::at_rest(config.initial_source);
        source
            .set_speed(config.initial_speed)
            .and_then(|()| source.set_frequency(config.initial_frequency))
            .map_err(|e| ConfigError::InvalidInitialParameter {
                reason: e.to_string(),
            })?;
        Ok(source)
    }

    /// Run the physics of one tick.
    ///
    /// Infallible: every numeric path is defined for validated
    /// configuration. Does not touch the keep-up monitor; use
    /// [`execute_tick`](Self::execute_tick) for a timed tick.
    pub fn step(&mut self) -> TickOutcome {
        let cfg = &self.config;
        let tick = self.current_tick.next();

        let reflected = self.source.advance(
            cfg.dt,
            cfg.boundary,
            cfg.observer_margin_frac,
            cfg.space_margin_frac,
        );
        if reflected {
            tracing::trace!(
                tick = tick.0,
                x = self.source.position().x,
                velocity = self.source.velocity(),
                "source reflected"
            );
        }

        self.ring.advance_all(cfg.wave_speed, cfg.dt);

        let emitted = if self.scheduler.tick(self.source.period(), cfg.dt) {
            let slot = self.ring.recycle(self.source.position());
            self.emissions += 1;
            tracing::trace!(
                tick = tick.0,
                slot = slot.0,
                x = self.source.position().x,
                "wavefront emitted"
            );
            Some(slot)
        } else {
            None
        };

        let scan = self
            .detector
            .scan(&mut self.ring, self.observer.position.x, cfg.dt, cfg.wave_speed);
        if let Some(sample) = scan.sample {
            self.samples += 1;
            tracing::debug!(
                tick = tick.0,
                slot = sample.slot.0,
                wavelength = sample.wavelength,
                frequency = sample.frequency,
                "observed frequency sample"
            );
        }
        if scan.went_stale {
            self.stale_resets += 1;
            tracing::debug!(tick = tick.0, "observed frequency stale, cleared");
        }

        self.current_tick = tick;
        TickOutcome {
            tick,
            reflected,
            emitted,
            sample: scan.sample,
            went_stale: scan.went_stale,
        }
    }

    /// Run one full tick under `clock` and judge it against the budget.
    ///
    /// Everything between `clock.start_tick()` and the final
    /// `clock.work_elapsed()` counts as work: `apply` (parameter updates
    /// at the tick boundary), [`step`](Self::step), building the snapshot,
    /// and `publish`. Does not idle; the driver calls
    /// `clock.idle(result.residual)` afterwards.
    ///
    /// The snapshot handed to `publish` carries the overload verdict as of
    /// its own construction. If `publish` itself pushes the tick over
    /// budget, the metrics and [`is_overloaded`](Self::is_overloaded)
    /// report it but the already-published snapshot does not.
    pub fn execute_tick<C, T, R>(
        &mut self,
        clock: &mut C,
        apply: impl FnOnce(&mut Self) -> T,
        publish: impl FnOnce(EngineSnapshot) -> R,
    ) -> TimedTick<T, R>
    where
        C: TickClock + ?Sized,
    {
        clock.start_tick();
        let applied = apply(self);
        let outcome = self.step();

        let mut snapshot = self.snapshot();
        snapshot.overloaded = clock.work_elapsed() > self.keep_up.budget();
        let published = publish(snapshot);

        let elapsed = clock.work_elapsed();
        let keep_up = self.keep_up.record(elapsed);

        let metrics = StepMetrics {
            work_us: elapsed.as_micros() as u64,
            idle_us: keep_up.residual.as_micros() as u64,
            overloaded: keep_up.overloaded,
            emitted: outcome.emitted.is_some(),
            reflected: outcome.reflected,
            sample: outcome.sample.map(|s| s.frequency),
            overload_events: self.keep_up.overload_events(),
            emissions: self.emissions,
            samples: self.samples,
            stale_resets: self.stale_resets,
        };
        self.last_metrics = metrics.clone();

        TimedTick {
            result: TickResult {
                outcome,
                residual: keep_up.residual,
                metrics,
            },
            applied,
            published,
        }
    }

    /// Record an externally measured work time for the current tick.
    ///
    /// Returns `true` if the tick was over budget.
    pub fn record_timing(&mut self, elapsed: Duration) -> bool {
        self.keep_up.record(elapsed).overloaded
    }

    // ── Parameter updates ────────────────────────────────────────

    /// Set the source velocity, quantized. Mach number follows.
    pub fn set_source_speed(&mut self, value: f64) -> Result<(), ParamError> {
        self.source.set_speed(value)?;
        tracing::debug!(
            requested = value,
            velocity = self.source.velocity(),
            mach = self.mach_number(),
            "source speed set"
        );
        Ok(())
    }

    /// Set the emitted frequency; 0 silences the source.
    pub fn set_source_frequency(&mut self, value: f64) -> Result<(), ParamError> {
        self.source.set_frequency(value)?;
        tracing::debug!(
            requested = value,
            frequency = self.source.frequency(),
            period = self.source.period(),
            "source frequency set"
        );
        Ok(())
    }

    /// Apply one parameter command.
    pub fn apply(&mut self, command: ParamCommand) -> Result<(), ParamError> {
        match command {
            ParamCommand::SetSourceSpeed(v) => self.set_source_speed(v),
            ParamCommand::SetSourceFrequency(v) => self.set_source_frequency(v),
        }
    }

    /// Apply a batch of commands in order. Returns the rejected ones.
    ///
    /// A rejected command leaves its parameter unchanged and does not
    /// stop the rest of the batch.
    pub fn apply_batch(
        &mut self,
        commands: impl IntoIterator<Item = ParamCommand>,
    ) -> Vec<(ParamCommand, ParamError)> {
        commands
            .into_iter()
            .filter_map(|cmd| match self.apply(cmd) {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(
                        command = cmd.name(),
                        value = cmd.value(),
                        error = %e,
                        "parameter rejected"
                    );
                    Some((cmd, e))
                }
            })
            .collect()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Return to the tick-0 state described by the configuration.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.source = Self::initial_source(&self.config)?;
        self.ring = WavefrontRing::new(
            self.config.ring_capacity,
            self.config.initial_source,
            self.config.park_radius(),
        );
        self.scheduler.reset();
        self.detector.reset();
        self.keep_up.reset();
        self.current_tick = TickId(0);
        self.emissions = 0;
        self.samples = 0;
        self.stale_resets = 0;
        self.last_metrics = StepMetrics::default();
        Ok(())
    }

    // ── Read access ──────────────────────────────────────────────

    /// Owned copy of the current state for renderers.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            tick: self.current_tick,
            source_position: self.source.position(),
            source_velocity: self.source.velocity(),
            observer_position: self.observer.position,
            source_frequency: self.source.frequency(),
            observed_frequency: self.detector.observed_frequency(),
            mach_number: self.mach_number(),
            overloaded: self.keep_up.is_overloaded(),
            wavefronts: self.ring.slots().iter().map(WavefrontView::from).collect(),
        }
    }

    /// `|velocity| / c`.
    pub fn mach_number(&self) -> f64 {
        self.source.mach_number(self.config.wave_speed)
    }

    /// Most recent observed frequency; 0 when none or stale.
    pub fn observed_frequency(&self) -> f64 {
        self.detector.observed_frequency()
    }

    /// Whether the most recent timed tick ran over budget.
    pub fn is_overloaded(&self) -> bool {
        self.keep_up.is_overloaded()
    }

    /// Current tick ID (0 after construction or reset).
    pub fn current_tick(&self) -> TickId {
        self.current_tick
    }

    /// The configuration this engine was built from.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Source state.
    pub fn source(&self) -> &SourceState {
        &self.source
    }

    /// Observer state.
    pub fn observer(&self) -> &ObserverState {
        &self.observer
    }

    /// The wavefront ring.
    pub fn ring(&self) -> &WavefrontRing {
        &self.ring
    }

    /// Detection state.
    pub fn detector(&self) -> &FrequencyDetector {
        &self.detector
    }

    /// Metrics from the most recent timed tick.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }
}
