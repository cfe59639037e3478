//! Grid coordinates: qubit rows and time-step columns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based qubit index (a row of the circuit grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Index as `usize` for slice access.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Zero-based time step (a column of the circuit grid).
///
/// Columns define relative execution order; gates in the same column are
/// applied in ascending qubit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeStep(pub u32);

impl TimeStep {
    /// Last column a gate may occupy, so `depth` stays representable.
    pub const MAX: TimeStep = TimeStep(u32::MAX - 1);
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl From<u32> for TimeStep {
    fn from(step: u32) -> Self {
        TimeStep(step)
    }
}

/// A single `(qubit, time_step)` cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Row.
    pub qubit: QubitId,
    /// Column.
    pub step: TimeStep,
}

impl Cell {
    /// Create a cell from raw coordinates.
    pub fn new(qubit: impl Into<QubitId>, step: impl Into<TimeStep>) -> Self {
        Self {
            qubit: qubit.into(),
            step: step.into(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.qubit, self.step)
    }
}
