//! Parameter quantization.
//!
//! Requested periods and speeds are snapped to a half-tenth grid
//! (`.0` / `.05` steps after scaling) so that emission times line up with
//! what the tick-driven scheduler can actually hit.

/// Snap `value` to the nearest point on the `0.05` grid using the
/// three-bucket rule.
///
/// The magnitude is scaled by 10 and split into integer and fractional
/// parts. A fraction below `0.25` rounds down, one at or above `0.75`
/// rounds up, and anything in between snaps to the midpoint `0.5`. The
/// sign is restored afterwards so the rule is symmetric about zero.
///
/// Non-finite input is returned unchanged.
///
/// ```
/// use doppler_core::round_to_resolution;
///
/// assert_eq!(round_to_resolution(0.12), 0.1);
/// assert_eq!(round_to_resolution(0.17), 0.15);
/// assert_eq!(round_to_resolution(0.2), 0.2);
/// ```
pub fn round_to_resolution(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scaled = value.abs() * 10.0;
    let int_part = scaled.floor();
    let frac = scaled - int_part;
    let snapped = if frac < 0.25 {
        int_part
    } else if frac >= 0.75 {
        int_part + 1.0
    } else {
        int_part + 0.5
    };
    (snapped / 10.0).copysign(value)
}

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
