//! Placed gates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gate::GateKind;
use crate::qubit::{Cell, QubitId, TimeStep};

/// Identity of a placed gate, unique within one circuit and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GateId(pub u64);

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A gate placed on the grid.
///
/// For two-qubit kinds `qubit` is the control and `target` is always set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateInstance {
    /// Identity within the owning circuit.
    pub id: GateId,
    /// What gate this is.
    pub kind: GateKind,
    /// Qubit the gate sits on (control for two-qubit gates).
    pub qubit: QubitId,
    /// Column.
    pub step: TimeStep,
    /// Target qubit for two-qubit gates.
    pub target: Option<QubitId>,
    /// Rotation angle in radians for parameterized gates.
    pub parameter: Option<f64>,
}

impl GateInstance {
    /// The control (or only) cell.
    #[inline]
    pub fn cell(&self) -> Cell {
        Cell {
            qubit: self.qubit,
            step: self.step,
        }
    }

    /// The target cell, if any.
    #[inline]
    pub fn target_cell(&self) -> Option<Cell> {
        self.target.map(|qubit| Cell {
            qubit,
            step: self.step,
        })
    }

    /// Every cell this gate occupies.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        std::iter::once(self.cell()).chain(self.target_cell())
    }

    /// Whether this gate occupies `cell` as control or target.
    pub fn occupies(&self, cell: Cell) -> bool {
        self.cells().any(|c| c == cell)
    }

    /// Highest qubit index this gate touches.
    pub fn max_qubit(&self) -> QubitId {
        match self.target {
            Some(t) if t > self.qubit => t,
            _ => self.qubit,
        }
    }

    #[inline]
    pub fn is_two_qubit(&self) -> bool {
        self.kind.is_two_qubit()
    }

    /// Short label such as `RY(1.05)` or `CNOT q0→q2`.
    pub fn label(&self) -> String {
        match (self.parameter, self.target) {
            (Some(theta), _) => format!("{}({theta:.2})", self.kind),
            (None, Some(target)) => format!("{} {}→{}", self.kind, self.qubit, target),
            (None, None) => self.kind.to_string(),
        }
    }
}

impl fmt::Display for GateInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} at {}", self.label(), self.qubit, self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cnot(control: u32, target: u32, step: u32) -> GateInstance {
        GateInstance {
            id: GateId(0),
            kind: GateKind::CNOT,
            qubit: QubitId(control),
            step: TimeStep(step),
            target: Some(QubitId(target)),
            parameter: None,
        }
    }

    #[test]
    fn test_cells_include_target() {
        let gate = cnot(0, 2, 3);
        let cells: Vec<Cell> = gate.cells().collect();
        assert_eq!(cells, vec![Cell::new(0, 3), Cell::new(2, 3)]);
        assert!(gate.occupies(Cell::new(2, 3)));
        assert!(!gate.occupies(Cell::new(1, 3)));
        assert_eq!(gate.max_qubit(), QubitId(2));
    }

    #[test]
    fn test_labels() {
        assert_eq!(cnot(1, 0, 0).label(), "CNOT q1→q0");
        let ry = GateInstance {
            id: GateId(1),
            kind: GateKind::RY,
            qubit: QubitId(0),
            step: TimeStep(0),
            target: None,
            parameter: Some(std::f64::consts::FRAC_PI_3),
        };
        assert_eq!(ry.label(), "RY(1.05)");
        assert_eq!(ry.to_string(), "RY(1.05) on q0 at t0");
    }
}
