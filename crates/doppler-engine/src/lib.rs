//! Doppler wavefront simulation engine.
//!
//! [`SimulationEngine`] advances a moving point source, its ring of
//! expanding wavefronts and a fixed observer's frequency detector in
//! fixed `dt` ticks. Two drivers pace it against real time:
//! [`LockstepSimulation`] on the caller's thread and
//! [`RealtimeSimulation`] on a background tick thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod detector;
pub mod lockstep;
pub mod metrics;
pub mod pacer;
pub mod realtime;
pub mod ring;
pub mod scheduler;
pub mod snapshot;
pub mod tick;
pub(crate) mod tick_thread;

pub use config::{ConfigError, EngineConfig, RealtimeConfig};
pub use detector::{FrequencyDetector, FrequencySample, ScanOutcome};
pub use lockstep::{LockstepSimulation, StepResult};
pub use metrics::StepMetrics;
pub use pacer::{KeepUp, KeepUpMonitor, ScriptedClock, TickClock, WallClock};
pub use realtime::{RealtimeSimulation, ShutdownReport, SubmitError};
pub use ring::SnapshotRing;
pub use scheduler::EmissionScheduler;
pub use snapshot::{EngineSnapshot, WavefrontView};
pub use tick::{SimulationEngine, TickOutcome, TickResult, TimedTick};
