//! Read-only per-tick state published to renderers.

use doppler_core::{Position, TickId, Wavefront};

/// Rendering view of one ring slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavefrontView {
    /// Current radius.
    pub radius: f64,
    /// Emission center.
    pub center: Position,
}

impl From<&Wavefront> for WavefrontView {
    fn from(w: &Wavefront) -> Self {
        Self {
            radius: w.radius,
            center: w.center,
        }
    }
}

/// Owned copy of the engine state after a tick.
///
/// Carries everything a renderer or status panel needs; holds no
/// reference back into the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSnapshot {
    /// Tick that produced this state.
    pub tick: TickId,
    /// Source position.
    pub source_position: Position,
    /// Signed source velocity along `x`.
    pub source_velocity: f64,
    /// Observer position.
    pub observer_position: Position,
    /// Emitted frequency in Hz; 0 when silent.
    pub source_frequency: f64,
    /// Most recent observed frequency in Hz; 0 when none or stale.
    pub observed_frequency: f64,
    /// `|velocity| / c`.
    pub mach_number: f64,
    /// Whether the tick that produced this state ran over budget.
    pub overloaded: bool,
    /// Every ring slot in storage order.
    pub wavefronts: Vec<WavefrontView>,
}

impl EngineSnapshot {
    /// Whether the source is currently faster than the waves it emits.
    pub fn is_supersonic(&self) -> bool {
        self.mach_number > 1.0
    }
}
