//! Source and observer state, and the source's 1-D kinematics.

use crate::error::ParamError;
use crate::geometry::Position;
use crate::quantize::{round2, round_to_resolution};

/// The moving emitter.
///
/// Invariant: `period == 0.0` exactly when `frequency == 0.0` (a silent
/// source). Otherwise `period` is a quantized reciprocal of the requested
/// frequency and `frequency` is `1 / period` rounded to two decimals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceState {
    position: Position,
    velocity: f64,
    frequency: f64,
    period: f64,
}

impl SourceState {
    /// A stationary, silent source at `position`.
    pub fn at_rest(position: Position) -> Self {
        Self {
            position,
            velocity: 0.0,
            frequency: 0.0,
            period: 0.0,
        }
    }

    /// Current position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Signed velocity along `x`.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Emitted frequency in Hz; 0 when silent.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Emission period in seconds; 0 when silent.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Whether the source is currently emitting.
    pub fn is_silent(&self) -> bool {
        self.period == 0.0
    }

    /// Set the velocity, snapped with [`round_to_resolution`].
    pub fn set_speed(&mut self, value: f64) -> Result<(), ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NonFiniteSpeed { value });
        }
        self.velocity = round_to_resolution(value);
        Ok(())
    }

    /// Set the emitted frequency.
    ///
    /// Zero silences the source. Any other value is converted to a period,
    /// quantized, and the frequency recomputed from that period. A value
    /// so high that its period quantizes to zero is rejected rather than
    /// producing an infinite frequency.
    pub fn set_frequency(&mut self, value: f64) -> Result<(), ParamError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ParamError::InvalidFrequency { value });
        }
        if value == 0.0 {
            self.period = 0.0;
            self.frequency = 0.0;
            return Ok(());
        }
        let period = round_to_resolution(1.0 / value);
        if period <= 0.0 {
            return Err(ParamError::FrequencyOutOfRange { value });
        }
        self.period = period;
        self.frequency = round2(1.0 / period);
        Ok(())
    }

    /// Advance one tick and reflect at the spatial limits.
    ///
    /// The source reflects when its new `x` falls below
    /// `boundary * obs_margin_frac` or above
    /// `boundary * (1 - space_margin_frac)`. Position is never clamped, so
    /// the source may overshoot by up to one tick of travel. Returns `true`
    /// if the velocity was reflected.
    pub fn advance(
        &mut self,
        dt: f64,
        boundary: f64,
        obs_margin_frac: f64,
        space_margin_frac: f64,
    ) -> bool {
        self.position.x += self.velocity * dt;
        let low = boundary * obs_margin_frac;
        let high = boundary * (1.0 - space_margin_frac);
        let reflect = self.position.x < low || self.position.x > high;
        if reflect {
            self.velocity = -self.velocity;
        }
        reflect
    }

    /// Ratio of speed to wave propagation speed.
    pub fn mach_number(&self, wave_speed: f64) -> f64 {
        self.velocity.abs() / wave_speed
    }
}

/// The stationary listener.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverState {
    /// Fixed position for the run.
    pub position: Position,
}

impl ObserverState {
    /// An observer at `position`.
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: f64 = 2000.0;
    const OBS_FRAC: f64 = 0.2;
    const SPACE_FRAC: f64 = 0.1;

    fn source_at(x: f64, speed: f64) -> SourceState {
        let mut s = SourceState::at_rest(Position::new(x, 1000.0));
        s.set_speed(speed).unwrap();
        s
    }

    #[test]
    fn advance_moves_by_velocity_dt() {
        let mut s = source_at(1000.0, 50.0);
        assert!(!s.advance(0.05, BOUNDARY, OBS_FRAC, SPACE_FRAC));
        assert!((s.position().x - 1002.5).abs() < 1e-12);
        assert_eq!(s.velocity(), 50.0);
    }

    #[test]
    fn reflects_below_observer_margin() {
        let mut s = source_at(BOUNDARY * OBS_FRAC - 1.0, -20.0);
        assert!(s.advance(0.05, BOUNDARY, OBS_FRAC, SPACE_FRAC));
        assert_eq!(s.velocity(), 20.0);
        // Not clamped.
        assert!(s.position().x < BOUNDARY * OBS_FRAC);
    }

    #[test]
    fn reflects_above_space_margin() {
        let mut s = source_at(1799.5, 20.0);
        assert!(s.advance(0.05, BOUNDARY, OBS_FRAC, SPACE_FRAC));
        assert_eq!(s.velocity(), -20.0);
    }

    #[test]
    fn no_reflection_mid_range() {
        for v in [-300.0, -1.0, 0.0, 1.0, 300.0] {
            let mut s = source_at(1000.0, v);
            assert!(!s.advance(0.05, BOUNDARY, OBS_FRAC, SPACE_FRAC));
            assert_eq!(s.velocity(), v);
        }
    }

    #[test]
    fn speed_is_quantized() {
        let mut s = SourceState::at_rest(Position::default());
        s.set_speed(12.34).unwrap();
        assert_eq!(s.velocity(), 12.35);
        assert!(matches!(
            s.set_speed(f64::NAN),
            Err(ParamError::NonFiniteSpeed { .. })
        ));
        assert_eq!(s.velocity(), 12.35);
    }

    #[test]
    fn frequency_uses_quantized_period() {
        let mut s = SourceState::at_rest(Position::default());
        s.set_frequency(2.0).unwrap();
        assert_eq!(s.period(), 0.5);
        assert_eq!(s.frequency(), 2.0);

        // 1/3 = 0.333.. -> 0.35 -> 2.857.. -> 2.86
        s.set_frequency(3.0).unwrap();
        assert_eq!(s.period(), 0.35);
        assert_eq!(s.frequency(), 2.86);
    }

    #[test]
    fn zero_frequency_silences() {
        let mut s = SourceState::at_rest(Position::default());
        s.set_frequency(5.0).unwrap();
        s.set_frequency(0.0).unwrap();
        assert!(s.is_silent());
        assert_eq!(s.frequency(), 0.0);
        assert_eq!(s.period(), 0.0);
    }

    #[test]
    fn rejects_bad_frequencies() {
        let mut s = SourceState::at_rest(Position::default());
        s.set_frequency(2.0).unwrap();
        assert!(matches!(
            s.set_frequency(-1.0),
            Err(ParamError::InvalidFrequency { .. })
        ));
        assert!(matches!(
            s.set_frequency(f64::INFINITY),
            Err(ParamError::InvalidFrequency { .. })
        ));
        // 1/50 = 0.02 quantizes to a zero period.
        assert!(matches!(
            s.set_frequency(50.0),
            Err(ParamError::FrequencyOutOfRange { .. })
        ));
        // Rejection leaves the previous setting in place.
        assert_eq!(s.period(), 0.5);
    }

    #[test]
    fn mach_number_is_unsigned() {
        let s = source_at(1000.0, -171.5);
        assert!((s.mach_number(343.0) - 0.5).abs() < 1e-12);
    }
}
