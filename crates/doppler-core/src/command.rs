//! Parameter-update commands.
//!
//! Produced by external controls (speed and frequency knobs) and applied
//! by the engine between ticks, never mid-tick.

/// A parameter change requested by a control surface.
///
/// # Examples
///
/// ```
/// use doppler_core::ParamCommand;
///
/// let batch = vec![
///     ParamCommand::SetSourceSpeed(-50.0),
///     ParamCommand::SetSourceFrequency(2.0),
/// ];
/// assert!(matches!(batch[0], ParamCommand::SetSourceSpeed(_)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamCommand {
    /// Set the source's signed velocity along `x`.
    SetSourceSpeed(f64),
    /// Set the emitted frequency in Hz; 0 silences the source.
    SetSourceFrequency(f64),
}

impl ParamCommand {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetSourceSpeed(_) => "set_source_speed",
            Self::SetSourceFrequency(_) => "set_source_frequency",
        }
    }

    /// The requested value.
    pub fn value(&self) -> f64 {
        match *self {
            Self::SetSourceSpeed(v) | Self::SetSourceFrequency(v) => v,
        }
    }
}
