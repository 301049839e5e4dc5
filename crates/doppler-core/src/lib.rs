//! Core types for the Doppler wavefront simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! data the engine operates on: the wavefront ring, source and observer
//! state with the source's kinematics, parameter quantization, parameter
//! commands, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod error;
pub mod geometry;
pub mod id;
pub mod quantize;
pub mod source;
pub mod wavefront;

pub use command::ParamCommand;
pub use error::ParamError;
pub use geometry::{CrossingDirection, Position};
pub use id::{SlotIndex, TickId};
pub use quantize::{round2, round_to_resolution};
pub use source::{ObserverState, SourceState};
pub use wavefront::{Wavefront, WavefrontRing, DEFAULT_RING_CAPACITY};
