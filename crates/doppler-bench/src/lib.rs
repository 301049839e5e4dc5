//! Benchmark profiles for the Doppler wavefront simulation.
//!
//! - [`reference_profile`]: the default configuration, warmed up until the
//!   ring is full of live wavefronts and the observer is sampling.
//! - [`stress_profile`]: a large ring at a short `dt` with a fast source,
//!   so every tick scans many slots and emits often.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use doppler_engine::{ConfigError, EngineConfig, SimulationEngine};

/// Ticks needed before the reference ring is fully populated.
pub const WARMUP_TICKS: u64 = 300;

/// The reference configuration, moving towards the observer at `speed`.
pub fn reference_config(speed: f64) -> EngineConfig {
    EngineConfig {
        initial_speed: speed,
        ..EngineConfig::default()
    }
}

/// A reference engine stepped through [`WARMUP_TICKS`].
pub fn reference_profile(speed: f64) -> Result<SimulationEngine, ConfigError> {
    warmed(reference_config(speed), WARMUP_TICKS)
}

/// A 256-slot ring at `dt = 0.01` with a 20 Hz source at Mach 0.5.
pub fn stress_profile() -> Result<SimulationEngine, ConfigError> {
    let config = EngineConfig {
        dt: 0.01,
        ring_capacity: 256,
        initial_speed: -171.5,
        initial_frequency: 20.0,
        ..EngineConfig::default()
    };
    warmed(config, 2_000)
}

fn warmed(config: EngineConfig, ticks: u64) -> Result<SimulationEngine, ConfigError> {
    let mut engine = SimulationEngine::new(config)?;
    for _ in 0..ticks {
        engine.step();
    }
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_build() {
        let engine = reference_profile(-40.0).unwrap();
        assert_eq!(engine.current_tick().0, WARMUP_TICKS);
        assert!(engine.ring().recycles() >= 28);

        let stress = stress_profile().unwrap();
        assert_eq!(stress.config().ring_capacity, 256);
        assert!(stress.ring().recycles() > 256);
    }
}
