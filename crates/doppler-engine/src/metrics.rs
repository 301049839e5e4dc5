//! Per-tick performance and event metrics.
//!
//! [`StepMetrics`] captures what a single tick did and how long it took,
//! plus cumulative counters since the last reset.

/// Timing and event metrics for a single tick.
///
/// Durations are in microseconds. Cumulative fields count from engine
/// construction or the last `reset()`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Measured work time for this tick, in microseconds.
    pub work_us: u64,
    /// Idle time requested after this tick, in microseconds.
    pub idle_us: u64,
    /// Whether this tick exceeded its budget.
    pub overloaded: bool,
    /// Whether a wavefront was emitted this tick.
    pub emitted: bool,
    /// Whether the source reflected off a range limit this tick.
    pub reflected: bool,
    /// Observed frequency sampled this tick, if any.
    pub sample: Option<f64>,
    /// Cumulative number of over-budget ticks.
    pub overload_events: u64,
    /// Cumulative number of emitted wavefronts.
    pub emissions: u64,
    /// Cumulative number of observed-frequency samples.
    pub samples: u64,
    /// Cumulative number of staleness resets.
    pub stale_resets: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.work_us, 0);
        assert_eq!(m.idle_us, 0);
        assert!(!m.overloaded);
        assert!(!m.emitted);
        assert!(!m.reflected);
        assert!(m.sample.is_none());
        assert_eq!(m.overload_events, 0);
        assert_eq!(m.emissions, 0);
        assert_eq!(m.samples, 0);
        assert_eq!(m.stale_resets, 0);
    }
}
