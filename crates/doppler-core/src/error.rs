//! Error types for parameter updates.
//!
//! The numeric core is infallible; the only rejected inputs are parameter
//! changes that cannot be represented by the tick-driven scheduler.

use std::error::Error;
use std::fmt;

/// A parameter update that was rejected. The previous value stays in effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamError {
    /// Requested source speed is NaN or infinite.
    NonFiniteSpeed {
        /// The rejected value.
        value: f64,
    },
    /// Requested frequency is negative, NaN or infinite.
    InvalidFrequency {
        /// The rejected value.
        value: f64,
    },
    /// Requested frequency is so high its period quantizes to zero.
    FrequencyOutOfRange {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteSpeed { value } => {
                write!(f, "source speed must be finite, got {value}")
            }
            Self::InvalidFrequency { value } => {
                write!(f, "source frequency must be finite and >= 0, got {value}")
            }
            Self::FrequencyOutOfRange { value } => {
                write!(
                    f,
                    "source frequency {value} Hz is above the tick resolution"
                )
            }
        }
    }
}

impl Error for ParamError {}
