//! Periodic emission under a tick-quantized clock.
//!
//! `dt` rarely divides the source period evenly, so the scheduler cannot
//! wait for exact equality. It keeps an accumulator bounded to one period
//! (rounded to two decimals each tick to stop float drift) and fires
//! whenever the accumulator lands within a tenth of a tick of the period.

use doppler_core::round2;

/// Tracks time elapsed within the current source period.
#[derive(Clone, Debug, Default)]
pub struct EmissionScheduler {
    elapsed_in_period: f64,
}

impl EmissionScheduler {
    /// A scheduler at the start of a period.
    pub fn new() -> Self {
        Self::default()
    }

    /// Time accumulated in the current period.
    pub fn elapsed_in_period(&self) -> f64 {
        self.elapsed_in_period
    }

    /// Advance by one tick and report whether a wavefront is due.
    ///
    /// A zero `period` (silent source) never fires and holds the
    /// accumulator at zero, so emission restarts cleanly when a frequency
    /// is set again.
    pub fn tick(&mut self, period: f64, dt: f64) -> bool {
        if period <= 0.0 {
            self.elapsed_in_period = 0.0;
            return false;
        }
        self.elapsed_in_period = round2(self.elapsed_in_period % period) + dt;
        (self.elapsed_in_period - period).abs() < dt / 10.0
    }

    /// Restart the current period.
    pub fn reset(&mut self) {
        self.elapsed_in_period = 0.0;
    }
}
