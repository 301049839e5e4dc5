//! Engine configuration, validation, and error types.
//!
//! [`EngineConfig`] holds the per-run constants and is consumed by
//! [`SimulationEngine::new`](crate::SimulationEngine::new), which calls
//! [`validate()`](EngineConfig::validate) first. [`RealtimeConfig`] sizes
//! the channel and snapshot ring used by the background tick thread.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use doppler_core::{CrossingDirection, Position, DEFAULT_RING_CAPACITY};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EngineConfig::validate()`] or while starting
/// a realtime simulation.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// `dt` is NaN, infinite, zero, negative, or too large to express as a
    /// tick budget.
    InvalidDt {
        /// The invalid value.
        value: f64,
    },
    /// Wave propagation speed is NaN, infinite, zero, or negative.
    InvalidWaveSpeed {
        /// The invalid value.
        value: f64,
    },
    /// Wavefront ring has fewer than 2 slots.
    RingTooSmall {
        /// The configured capacity.
        configured: usize,
    },
    /// Space boundary is NaN, infinite, zero, or negative.
    InvalidBoundary {
        /// The invalid value.
        value: f64,
    },
    /// Margin fractions leave no room for the source to move.
    InvalidMargins {
        /// Description of which invariant was violated.
        reason: String,
    },
    /// Staleness multiplier is zero.
    StaleTicksZero,
    /// Observer sits inside the source's range of motion, or on the side
    /// the crossing direction does not look at.
    ObserverInsideRange {
        /// Observer `x`.
        observer_x: f64,
        /// Nearest edge of the source range.
        range_edge: f64,
    },
    /// Initial source position lies outside its range of motion.
    SourceOutsideRange {
        /// Initial source `x`.
        source_x: f64,
    },
    /// Initial speed or frequency could not be applied.
    InvalidInitialParameter {
        /// Description of the failure.
        reason: String,
    },
    /// Snapshot ring for realtime mode has fewer than 2 slots.
    SnapshotRingTooSmall {
        /// The configured capacity.
        configured: usize,
    },
    /// Realtime command channel capacity is zero.
    CommandChannelZero,
    /// Engine could not be recovered from the tick thread (it panicked).
    EngineRecoveryFailed,
    /// The tick thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDt { value } => {
                write!(f, "dt must be finite, positive and representable, got {value}")
            }
            Self::InvalidWaveSpeed { value } => {
                write!(f, "wave_speed must be finite and positive, got {value}")
            }
            Self::RingTooSmall { configured } => {
                write!(f, "ring_capacity {configured} is below minimum of 2")
            }
            Self::InvalidBoundary { value } => {
                write!(f, "boundary must be finite and positive, got {value}")
            }
            Self::InvalidMargins { reason } => write!(f, "invalid margins: {reason}"),
            Self::StaleTicksZero => write!(f, "stale_ticks must be at least 1"),
            Self::ObserverInsideRange {
                observer_x,
                range_edge,
            } => write!(
                f,
                "observer at x={observer_x} is not outside the source range edge {range_edge}"
            ),
            Self::SourceOutsideRange { source_x } => {
                write!(f, "initial source x={source_x} is outside its range of motion")
            }
            Self::InvalidInitialParameter { reason } => {
                write!(f, "invalid initial parameter: {reason}")
            }
            Self::SnapshotRingTooSmall { configured } => {
                write!(f, "snapshot_ring_capacity {configured} is below minimum of 2")
            }
            Self::CommandChannelZero => write!(f, "command_channel_capacity must be at least 1"),
            Self::EngineRecoveryFailed => {
                write!(f, "engine could not be recovered from tick thread")
            }
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── EngineConfig ───────────────────────────────────────────────────

/// Per-run constants for a [`SimulationEngine`](crate::SimulationEngine).
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Nominal tick interval in seconds. Default: 0.05.
    pub dt: f64,
    /// Wave propagation speed `c`. Default: 343.0.
    pub wave_speed: f64,
    /// Number of wavefront slots. Default: 28. Minimum: 2.
    pub ring_capacity: usize,
    /// Extent of the simulation space along `x`. Default: 2000.0.
    pub boundary: f64,
    /// Fraction of `boundary` kept clear on the observer's side; the source
    /// reflects below `boundary * observer_margin_frac`. Default: 0.2.
    pub observer_margin_frac: f64,
    /// Fraction of `boundary` kept clear on the far side; the source
    /// reflects above `boundary * (1 - space_margin_frac)`. Default: 0.1.
    pub space_margin_frac: f64,
    /// Ticks of grace past one observed period before the observed
    /// frequency is considered stale. Default: 10.
    pub stale_ticks: u32,
    /// Which way wavefronts must travel to reach the observer.
    pub crossing: CrossingDirection,
    /// Fixed observer position. Default: `(200, 1000)`.
    pub observer: Position,
    /// Source position at tick 0. Default: `(1000, 1000)`.
    pub initial_source: Position,
    /// Source velocity at tick 0 (quantized). Default: 0.
    pub initial_speed: f64,
    /// Source frequency at tick 0 in Hz; 0 starts silent. Default: 2.0.
    pub initial_frequency: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dt: 0.05,
            wave_speed: 343.0,
            ring_capacity: DEFAULT_RING_CAPACITY,
            boundary: 2000.0,
            observer_margin_frac: 0.2,
            space_margin_frac: 0.1,
            stale_ticks: 10,
            crossing: CrossingDirection::TowardDecreasingX,
            observer: Position::new(200.0, 1000.0),
            initial_source: Position::new(1000.0, 1000.0),
            initial_speed: 0.0,
            initial_frequency: 2.0,
        }
    }
}

impl EngineConfig {
    /// Lower `x` limit of the source's range of motion.
    pub fn range_low(&self) -> f64 {
        self.boundary * self.observer_margin_frac
    }

    /// Upper `x` limit of the source's range of motion.
    pub fn range_high(&self) -> f64 {
        self.boundary * (1.0 - self.space_margin_frac)
    }

    /// Radius at which unused ring slots are parked.
    pub fn park_radius(&self) -> f64 {
        2.0 * self.boundary
    }

    /// Seconds of silence tolerated past one observed period.
    pub fn stale_grace(&self) -> f64 {
        f64::from(self.stale_ticks) * self.dt
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. dt must be positive and fit in a Duration budget.
        if self.dt <= 0.0 || Duration::try_from_secs_f64(self.dt).is_err() {
            return Err(ConfigError::InvalidDt { value: self.dt });
        }
        // 2. Wave speed must be finite and positive.
        if !self.wave_speed.is_finite() || self.wave_speed <= 0.0 {
            return Err(ConfigError::InvalidWaveSpeed {
                value: self.wave_speed,
            });
        }
        // 3. Ring >= 2.
        if self.ring_capacity < 2 {
            return Err(ConfigError::RingTooSmall {
                configured: self.ring_capacity,
            });
        }
        // 4. Boundary must be finite and positive.
        if !self.boundary.is_finite() || self.boundary <= 0.0 {
            return Err(ConfigError::InvalidBoundary {
                value: self.boundary,
            });
        }
        // 5. Margins in [0, 1) and leaving a non-empty range.
        for (name, frac) in [
            ("observer_margin_frac", self.observer_margin_frac),
            ("space_margin_frac", self.space_margin_frac),
        ] {
            if !frac.is_finite() || !(0.0..1.0).contains(&frac) {
                return Err(ConfigError::InvalidMargins {
                    reason: format!("{name} must be in [0.0, 1.0), got {frac}"),
                });
            }
        }
        if self.observer_margin_frac + self.space_margin_frac >= 1.0 {
            return Err(ConfigError::InvalidMargins {
                reason: format!(
                    "observer_margin_frac ({}) + space_margin_frac ({}) must be < 1.0",
                    self.observer_margin_frac, self.space_margin_frac,
                ),
            });
        }
        // 6. Staleness grace of at least one tick.
        if self.stale_ticks == 0 {
            return Err(ConfigError::StaleTicksZero);
        }
        // 7. Observer outside the source range, on the side the crossing
        //    test looks at. Otherwise the source could pass it.
        let (range_edge, outside) = match self.crossing {
            CrossingDirection::TowardDecreasingX => {
                (self.range_low(), self.observer.x < self.range_low())
            }
            CrossingDirection::TowardIncreasingX => {
                (self.range_high(), self.observer.x > self.range_high())
            }
        };
        if !self.observer.x.is_finite() || !outside {
            return Err(ConfigError::ObserverInsideRange {
                observer_x: self.observer.x,
                range_edge,
            });
        }
        // 8. Source starts inside its own range.
        let x = self.initial_source.x;
        if !x.is_finite() || x < self.range_low() || x > self.range_high() {
            return Err(ConfigError::SourceOutsideRange { source_x: x });
        }
        // 9. Initial parameters must be accepted by the source.
        let mut probe = doppler_core::SourceState::at_rest(self.initial_source);
        probe
            .set_speed(self.initial_speed)
            .and_then(|()| probe.set_frequency(self.initial_frequency))
            .map_err(|e| ConfigError::InvalidInitialParameter {
                reason: e.to_string(),
            })?;

        Ok(())
    }
}

// ── RealtimeConfig ─────────────────────────────────────────────────

/// Configuration for [`RealtimeSimulation`](crate::RealtimeSimulation).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RealtimeConfig {
    /// Pending parameter batches buffered for the tick thread. Default: 64.
    pub command_channel_capacity: usize,
    /// Snapshots retained for renderers. Default: 8. Minimum: 2.
    pub snapshot_ring_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            command_channel_capacity: 64,
            snapshot_ring_capacity: 8,
        }
    }
}

impl RealtimeConfig {
    /// Validate channel and ring sizes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_channel_capacity == 0 {
            return Err(ConfigError::CommandChannelZero);
        }
        if self.snapshot_ring_capacity < 2 {
            return Err(ConfigError::SnapshotRingTooSmall {
                configured: self.snapshot_ring_capacity,
            });
        }
        Ok(())
    }
}
