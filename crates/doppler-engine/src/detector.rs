//! Observed-frequency detection from wavefront arrivals.
//!
//! Each tick the detector walks adjacent slot pairs `(i-1, i)` in storage
//! order. The first pair where both wavefronts have passed the observer
//! and neither has been used yet gives a wavelength sample: the spacing
//! between their leading edges. The observed frequency is `c / lambda`.
//!
//! The walk is structural, not temporal: it ignores the ring cursor and
//! never pairs the last slot with the first. Samples at the wrap point are
//! therefore skipped, and the staleness timer covers the gap.
//!
//! The held frequency expires once the time since the last sample exceeds
//! one observed period plus a grace. The period is `1 / |f|`: wavefronts
//! that arrive out of emission order (a supersonic source) give a negative
//! sample, and their period is as long as that of the positive one.

use doppler_core::{round2, CrossingDirection, SlotIndex, WavefrontRing};

/// One accepted observed-frequency sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencySample {
    /// The earlier slot of the pair; marked observed by the scan.
    pub slot: SlotIndex,
    /// Signed spacing between the two leading edges.
    pub wavelength: f64,
    /// `round2(c / wavelength)`.
    pub frequency: f64,
}

/// What a single [`FrequencyDetector::scan`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScanOutcome {
    /// New sample, if a qualifying pair was found.
    pub sample: Option<FrequencySample>,
    /// Whether the held frequency went stale and was cleared this tick.
    pub went_stale: bool,
}

/// Detection state: the held observed frequency and the time since it
/// was last refreshed.
#[derive(Clone, Debug)]
pub struct FrequencyDetector {
    direction: CrossingDirection,
    stale_grace: f64,
    period_estimate_clock: f64,
    observed_frequency: f64,
}

impl FrequencyDetector {
    /// A detector looking for crossings in `direction`, tolerating
    /// `stale_grace` seconds past one observed period.
    pub fn new(direction: CrossingDirection, stale_grace: f64) -> Self {
        Self {
            direction,
            stale_grace,
            period_estimate_clock: 0.0,
            observed_frequency: 0.0,
        }
    }

    /// Most recent observed frequency; 0 when none or stale.
    pub fn observed_frequency(&self) -> f64 {
        self.observed_frequency
    }

    /// Seconds since the last accepted sample.
    pub fn period_estimate_clock(&self) -> f64 {
        self.period_estimate_clock
    }

    /// Clear the held frequency and clock.
    pub fn reset(&mut self) {
        self.period_estimate_clock = 0.0;
        self.observed_frequency = 0.0;
    }

    /// Run one tick of detection over `ring`.
    pub fn scan(
        &mut self,
        ring: &mut WavefrontRing,
        observer_x: f64,
        dt: f64,
        wave_speed: f64,
    ) -> ScanOutcome {
        let sample = self.find_pair(ring, observer_x, wave_speed);
        if let Some(s) = sample {
            if let Some(slot) = ring.get_mut(s.slot) {
                slot.observed = true;
            }
            self.observed_frequency = s.frequency;
            self.period_estimate_clock = 0.0;
        }

        self.period_estimate_clock += dt;
        let went_stale = self.observed_frequency != 0.0
            && self.period_estimate_clock > 1.0 / self.observed_frequency.abs() + self.stale_grace;
        if went_stale {
            self.reset();
        }

        ScanOutcome { sample, went_stale }
    }

    fn find_pair(
        &self,
        ring: &WavefrontRing,
        observer_x: f64,
        wave_speed: f64,
    ) -> Option<FrequencySample> {
        let dir = self.direction;
        ring.slots()
            .windows(2)
            .enumerate()
            .find_map(|(i, pair)| {
                let (earlier, later) = (&pair[0], &pair[1]);
                if earlier.observed || later.observed {
                    return None;
                }
                let edge = earlier.leading_edge(dir);
                if !dir.has_reached(edge, observer_x) {
                    return None;
                }
                let next_edge = later.leading_edge(dir);
                if !dir.has_reached(next_edge, observer_x) {
                    return None;
                }
                let wavelength = dir.separation(edge, next_edge);
                if wavelength == 0.0 {
                    return None;
                }
                Some(FrequencySample {
                    slot: SlotIndex(i),
                    wavelength,
                    frequency: round2(wave_speed / wavelength),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doppler_core::{Position, Wavefront};

    const C: f64 = 343.0;
    const DT: f64 = 0.05;
    const OBS_X: f64 = 400.0;

    /// A live wavefront centered at x=1000 whose leading edge sits at `edge`.
    fn live(edge: f64) -> Wavefront {
        Wavefront {
            radius: 1000.0 - edge,
            center: Position::new(1000.0, 0.0),
            observed: false,
        }
    }

    fn ring_with(slots: &[Wavefront]) -> WavefrontRing {
        let mut ring = WavefrontRing::new(4, Position::new(1000.0, 0.0), 4000.0);
        for (dst, src) in ring.slots_mut().iter_mut().zip(slots) {
            *dst = *src;
        }
        ring
    }

    fn detector() -> FrequencyDetector {
        FrequencyDetector::new(CrossingDirection::TowardDecreasingX, 10.0 * DT)
    }

    #[test]
    fn synthetic_pair_yields_c_over_lambda() {
        let mut ring = ring_with(&[live(OBS_X - 15.0), live(OBS_X - 5.0)]);
        let mut det = detector();
        let out = det.scan(&mut ring, OBS_X, DT, C);

        let sample = out.sample.expect("pair should be detected");
        assert_eq!(sample.slot, SlotIndex(0));
        assert!((sample.wavelength - 10.0).abs() < 1e-9);
        assert_eq!(det.observed_frequency(), round2(C / 10.0));
        assert!(ring.slots()[0].observed);
        assert!(!ring.slots()[1].observed);
        assert!((det.period_estimate_clock() - DT).abs() < 1e-12);
    }

    #[test]
    fn no_sample_until_both_cross() {
        let mut ring = ring_with(&[live(OBS_X - 15.0), live(OBS_X + 5.0)]);
        let mut det = detector();
        assert!(det.scan(&mut ring, OBS_X, DT, C).sample.is_none());
        assert!(!ring.slots()[0].observed);
    }

    #[test]
    fn observed_wavefronts_are_skipped() {
        let mut first = live(OBS_X - 15.0);
        first.observed = true;
        let mut ring = ring_with(&[first, live(OBS_X - 5.0)]);
        let mut det = detector();
        assert!(det.scan(&mut ring, OBS_X, DT, C).sample.is_none());
    }

    #[test]
    fn at_most_one_sample_per_scan() {
        let mut ring = ring_with(&[
            live(OBS_X - 30.0),
            live(OBS_X - 20.0),
            live(OBS_X - 10.0),
        ]);
        let mut det = detector();
        let first = det.scan(&mut ring, OBS_X, DT, C).sample.unwrap();
        assert_eq!(first.slot, SlotIndex(0));
        assert!(!ring.slots()[1].observed);

        let second = det.scan(&mut ring, OBS_X, DT, C).sample.unwrap();
        assert_eq!(second.slot, SlotIndex(1));
        assert!(det.scan(&mut ring, OBS_X, DT, C).sample.is_none());
    }

    #[test]
    fn wrap_pair_is_not_scanned() {
        // Only slots 3 and 0 are live; storage order never pairs them.
        let parked = Wavefront::parked(Position::new(1000.0, 0.0), 4000.0);
        let mut ring = ring_with(&[live(OBS_X - 5.0), parked, parked, live(OBS_X - 15.0)]);
        let mut det = detector();
        assert!(det.scan(&mut ring, OBS_X, DT, C).sample.is_none());
    }

    #[test]
    fn zero_wavelength_is_ignored() {
        let mut ring = ring_with(&[live(OBS_X - 5.0), live(OBS_X - 5.0)]);
        let mut det = detector();
        assert!(det.scan(&mut ring, OBS_X, DT, C).sample.is_none());
        assert_eq!(det.observed_frequency(), 0.0);
    }

    #[test]
    fn frequency_goes_stale() {
        let mut ring = ring_with(&[live(OBS_X - 15.0), live(OBS_X - 5.0)]);
        let mut det = detector();
        det.scan(&mut ring, OBS_X, DT, C);
        let f = det.observed_frequency();
        assert_eq!(f, 34.3);

        // 1/34.3 + 0.5 = ~0.529 s, i.e. stale on the 11th tick.
        let deadline = 1.0 / f + 10.0 * DT;
        let mut ticks = 1;
        loop {
            let out = det.scan(&mut ring, OBS_X, DT, C);
            ticks += 1;
            if out.went_stale {
                break;
            }
            assert!(ticks < 100, "never went stale");
        }
        assert_eq!(det.observed_frequency(), 0.0);
        assert_eq!(det.period_estimate_clock(), 0.0);
        assert!(ticks as f64 * DT > deadline);
        assert!((ticks - 1) as f64 * DT <= deadline + 1e-9);
    }

    /// Ticks after the first scan until the held value expires.
    fn ticks_until_stale(det: &mut FrequencyDetector, ring: &mut WavefrontRing) -> u32 {
        (1..100)
            .find(|_| det.scan(ring, OBS_X, DT, C).went_stale)
            .expect("never went stale")
    }

    #[test]
    fn negative_sample_expires_like_positive() {
        let mut forward = ring_with(&[live(OBS_X - 15.0), live(OBS_X - 5.0)]);
        let mut fwd = detector();
        fwd.scan(&mut forward, OBS_X, DT, C);
        assert_eq!(fwd.observed_frequency(), 34.3);

        let mut reversed = ring_with(&[live(OBS_X - 5.0), live(OBS_X - 15.0)]);
        let mut rev = detector();
        rev.scan(&mut reversed, OBS_X, DT, C);
        assert_eq!(rev.observed_frequency(), -34.3);

        let expected = ticks_until_stale(&mut fwd, &mut forward);
        assert_eq!(expected, 10);
        assert_eq!(ticks_until_stale(&mut rev, &mut reversed), expected);
    }

    #[test]
    fn no_staleness_without_frequency() {
        let mut ring = ring_with(&[]);
        let mut det = detector();
        for _ in 0..1000 {
            assert!(!det.scan(&mut ring, OBS_X, DT, C).went_stale);
        }
        assert!(det.period_estimate_clock() > 0.0);
    }

    #[test]
    fn increasing_x_direction_mirrors_detection() {
        let obs = 1900.0;
        let right = |edge: f64| Wavefront {
            radius: edge - 1000.0,
            center: Position::new(1000.0, 0.0),
            observed: false,
        };
        let mut ring = ring_with(&[right(obs + 15.0), right(obs + 5.0)]);
        let mut det = FrequencyDetector::new(CrossingDirection::TowardIncreasingX, 0.5);
        let sample = det.scan(&mut ring, obs, DT, C).sample.unwrap();
        assert!((sample.wavelength - 10.0).abs() < 1e-9);
        assert_eq!(sample.frequency, 34.3);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn scan_marks_at_most_the_earlier_slot(
                edges in prop::collection::vec(300.0f64..500.0, 2..16),
                used in prop::collection::vec(any::<bool>(), 16),
            ) {
                let mut ring =
                    WavefrontRing::new(edges.len(), Position::new(1000.0, 0.0), 4000.0);
                let placed = edges.iter().zip(&used);
                for (slot, (&edge, &observed)) in ring.slots_mut().iter_mut().zip(placed) {
                    *slot = Wavefront { observed, ..live(edge) };
                }
                let before: Vec<bool> = ring.slots().iter().map(|w| w.observed).collect();

                let out = detector().scan(&mut ring, OBS_X, DT, C);

                let changed: Vec<usize> = ring
                    .slots()
                    .iter()
                    .zip(&before)
                    .enumerate()
                    .filter(|(_, (w, b))| w.observed != **b)
                    .map(|(i, _)| i)
                    .collect();
                match out.sample {
                    None => prop_assert!(changed.is_empty()),
                    Some(s) => {
                        prop_assert_eq!(changed, vec![s.slot.0]);
                        prop_assert!(!before[s.slot.0] && !before[s.slot.0 + 1]);
                        let dir = CrossingDirection::TowardDecreasingX;
                        prop_assert!(ring.slots()[s.slot.0].leading_edge(dir) <= OBS_X);
                        prop_assert!(ring.slots()[s.slot.0 + 1].leading_edge(dir) <= OBS_X);
                        prop_assert!(s.wavelength != 0.0);
                    }
                }
            }
        }
    }
}
