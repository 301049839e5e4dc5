//! Test utilities for Doppler development.
//!
//! Configuration presets, hand-built wavefront rings for detector tests,
//! and helpers that run an engine for a fixed number of ticks and collect
//! what happened.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::*;
