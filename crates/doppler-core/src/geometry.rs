//! Planar positions and the crossing-direction convention.

/// A point in the simulation plane.
///
/// Motion is one-dimensional along `x`; `y` only places the source and
/// observer for rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// Horizontal coordinate, the axis of motion.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Construct a position from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which side of the source's range the observer sits on.
///
/// Determines which edge of a wavefront is its leading edge toward the
/// observer, and which way that edge has to pass the observer to count
/// as an arrival.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CrossingDirection {
    /// Observer is left of the source; wavefronts arrive moving toward
    /// decreasing `x`.
    #[default]
    TowardDecreasingX,
    /// Observer is right of the source; wavefronts arrive moving toward
    /// increasing `x`.
    TowardIncreasingX,
}

impl CrossingDirection {
    /// The `x` coordinate of the leading edge of a circle of `radius`
    /// centered at `center_x`.
    pub fn leading_edge(self, center_x: f64, radius: f64) -> f64 {
        match self {
            Self::TowardDecreasingX => center_x - radius,
            Self::TowardIncreasingX => center_x + radius,
        }
    }

    /// Whether a leading edge at `edge` has reached an observer at
    /// `observer_x`.
    pub fn has_reached(self, edge: f64, observer_x: f64) -> bool {
        match self {
            Self::TowardDecreasingX => edge <= observer_x,
            Self::TowardIncreasingX => edge >= observer_x,
        }
    }

    /// Signed spacing between an earlier wavefront's edge and the edge of
    /// the wavefront emitted after it. Positive for ordinary emission order.
    pub fn separation(self, earlier_edge: f64, later_edge: f64) -> f64 {
        match self {
            Self::TowardDecreasingX => later_edge - earlier_edge,
            Self::TowardIncreasingX => earlier_edge - later_edge,
        }
    }
}
