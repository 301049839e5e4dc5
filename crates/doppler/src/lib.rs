//! Doppler: a real-time simulation of the Doppler effect.
//!
//! A point source moves back and forth along `x`, emitting circular
//! wavefronts at a set frequency. A fixed observer measures the spacing
//! of arriving wavefronts and reports the frequency it hears.
//!
//! This is the facade crate that re-exports the public API from the
//! Doppler sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use doppler::prelude::*;
//!
//! // Source approaching the observer at 50 units/s, emitting 2 Hz.
//! let config = EngineConfig {
//!     initial_speed: -50.0,
//!     ..EngineConfig::default()
//! };
//! let mut sim = LockstepSimulation::new(config, ScriptedClock::default()).unwrap();
//!
//! let mut heard = 0.0;
//! for _ in 0..120 {
//!     heard = sim.step_sync(vec![]).snapshot.observed_frequency;
//! }
//! assert_eq!(heard, 2.34);
//!
//! // Speed changes apply at the next tick boundary.
//! let result = sim.step_sync(vec![ParamCommand::SetSourceSpeed(-300.0)]);
//! assert!(result.rejected.is_empty());
//! assert!((result.snapshot.mach_number - 300.0 / 343.0).abs() < 1e-12);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `doppler-core` | Wavefront ring, source kinematics, quantization, commands |
//! | [`engine`] | `doppler-engine` | Tick engine, detector, pacing, lockstep and realtime drivers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core data types (`doppler-core`).
///
/// Contains the [`types::WavefrontRing`], [`types::SourceState`] with its
/// kinematics, parameter quantization and [`types::ParamCommand`].
pub use doppler_core as types;

/// Simulation engine (`doppler-engine`).
///
/// [`engine::LockstepSimulation`] for stepping on the caller's thread,
/// [`engine::RealtimeSimulation`] for a background tick thread.
pub use doppler_engine as engine;

/// Common imports for typical Doppler usage.
///
/// ```rust
/// use doppler::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use doppler_core::{CrossingDirection, ParamCommand, ParamError, Position, TickId};

    // Engine
    pub use doppler_engine::{
        ConfigError, EngineConfig, EngineSnapshot, LockstepSimulation, RealtimeConfig,
        RealtimeSimulation, ScriptedClock, SimulationEngine, StepMetrics, StepResult, SubmitError,
        TickClock, WallClock,
    };
}
