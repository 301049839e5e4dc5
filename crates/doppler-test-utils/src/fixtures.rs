//! Reusable engine fixtures.
//!
//! - [`reference_config`] / [`silent_config`] / [`moving_config`]: presets.
//! - [`live_wavefront`] / [`ring_with`]: rings with leading edges placed
//!   exactly where a detector test wants them.
//! - [`run_ticks`] / [`observed_after`]: drive an engine and collect outcomes.

use std::time::Duration;

use doppler_core::{CrossingDirection, Position, Wavefront, WavefrontRing};
use doppler_engine::{EngineConfig, ScriptedClock, SimulationEngine, TickOutcome};

/// Default observer `x` in the reference configuration.
pub const OBSERVER_X: f64 = 200.0;

/// The reference configuration: stationary 2 Hz source at `x = 1000`.
pub fn reference_config() -> EngineConfig {
    EngineConfig::default()
}

/// Reference configuration with the source silent from tick 0.
pub fn silent_config() -> EngineConfig {
    EngineConfig {
        initial_frequency: 0.0,
        ..EngineConfig::default()
    }
}

/// Reference configuration with the source moving at `speed` from tick 0.
pub fn moving_config(speed: f64) -> EngineConfig {
    EngineConfig {
        initial_speed: speed,
        ..EngineConfig::default()
    }
}

/// Mirror of the reference layout for [`CrossingDirection::TowardIncreasingX`]:
/// observer at `x = 1800`, source ranging over `[200, 1600]`.
pub fn mirrored_config() -> EngineConfig {
    EngineConfig {
        crossing: CrossingDirection::TowardIncreasingX,
        observer_margin_frac: 0.1,
        space_margin_frac: 0.2,
        observer: Position::new(1800.0, 1000.0),
        ..EngineConfig::default()
    }
}

/// An unobserved wavefront whose leading edge (in `direction`) sits at
/// `edge_x`.
pub fn live_wavefront(edge_x: f64, direction: CrossingDirection) -> Wavefront {
    let radius = 50.0;
    let center_x = match direction {
        CrossingDirection::TowardDecreasingX => edge_x + radius,
        CrossingDirection::TowardIncreasingX => edge_x - radius,
    };
    Wavefront {
        radius,
        center: Position::new(center_x, 0.0),
        observed: false,
    }
}

/// A ring of `capacity` parked slots whose first slots are overwritten by
/// live wavefronts with leading edges at `edges`, in storage order.
///
/// # Panics
///
/// Panics if `edges.len() > capacity`.
pub fn ring_with(capacity: usize, edges: &[f64], direction: CrossingDirection) -> WavefrontRing {
    assert!(edges.len() <= capacity, "more edges than slots");
    let mut ring = WavefrontRing::new(capacity, Position::new(1000.0, 0.0), 4000.0);
    for (slot, &edge) in ring.slots_mut().iter_mut().zip(edges) {
        *slot = live_wavefront(edge, direction);
    }
    ring
}

/// A scripted clock reporting `fast` work time except on the listed
/// ticks (1-based), which report `slow`.
pub fn clock_with_slow_ticks(
    ticks: u64,
    slow_ticks: &[u64],
    fast: Duration,
    slow: Duration,
) -> ScriptedClock {
    ScriptedClock::new((1..=ticks).map(|t| {
        if slow_ticks.contains(&t) {
            slow
        } else {
            fast
        }
    }))
}

/// Step `engine` `n` times and collect every outcome.
pub fn run_ticks(engine: &mut SimulationEngine, n: u64) -> Vec<TickOutcome> {
    (0..n).map(|_| engine.step()).collect()
}

/// Build an engine from `config`, step it `n` times, and return the
/// observed frequency it holds afterwards.
///
/// # Panics
///
/// Panics if `config` is invalid.
pub fn observed_after(config: EngineConfig, n: u64) -> f64 {
    let mut engine = SimulationEngine::new(config).expect("fixture config must be valid");
    run_ticks(&mut engine, n);
    engine.observed_frequency()
}

/// Every sampled frequency, in tick order.
pub fn sampled_frequencies(outcomes: &[TickOutcome]) -> Vec<f64> {
    outcomes
        .iter()
        .filter_map(|o| o.sample.map(|s| s.frequency))
        .collect()
}
