//! Error types for the circuit crate.

use crate::gate::GateKind;
use crate::instance::GateId;
use crate::qubit::{Cell, QubitId, TimeStep};
use thiserror::Error;

/// Reasons a circuit edit is refused.
///
/// A refused edit leaves the circuit exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CircuitError {
    /// Gate name is not part of the known gate set.
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// Gate kind is not offered by the active catalog.
    #[error("Gate {0} is not available in this catalog")]
    NotInCatalog(GateKind),

    /// Control qubit outside the register.
    #[error("Qubit {qubit} out of range for a {num_qubits}-qubit circuit")]
    QubitOutOfRange {
        /// Requested qubit.
        qubit: QubitId,
        /// Register size.
        num_qubits: u32,
    },

    /// Column beyond [`TimeStep::MAX`].
    #[error("Time step {0} is past the last column")]
    StepOutOfRange(TimeStep),

    /// The control cell already holds a gate (as control or as target).
    #[error("Cell {0} is already occupied")]
    CellOccupied(Cell),

    /// Two-qubit gates need at least two qubits.
    #[error("Gate {kind} needs at least 2 qubits, circuit has {num_qubits}")]
    TooFewQubits {
        /// Gate being placed.
        kind: GateKind,
        /// Register size.
        num_qubits: u32,
    },

    /// Explicit target is the control qubit itself.
    #[error("Target qubit {0} is the control qubit")]
    TargetIsControl(QubitId),

    /// Explicit target outside the register.
    #[error("Target qubit {qubit} out of range for a {num_qubits}-qubit circuit")]
    TargetOutOfRange {
        /// Requested target.
        qubit: QubitId,
        /// Register size.
        num_qubits: u32,
    },

    /// Resolved target cell already holds a gate.
    #[error("Target cell {0} is already occupied")]
    TargetOccupied(Cell),

    /// A target was supplied for a single-qubit gate.
    #[error("Gate {0} does not take a target qubit")]
    UnexpectedTarget(GateKind),

    /// A parameter was supplied for a fixed gate.
    #[error("Gate {0} does not take a parameter")]
    NotParameterized(GateKind),

    /// Parameter is NaN or infinite.
    #[error("Parameter {0} is not a finite angle")]
    InvalidParameter(f64),

    /// Strict policy: the step already has a two-qubit control.
    #[error("Time step {step} already has a two-qubit gate (control on {control})")]
    StepHasControl {
        /// Column in question.
        step: TimeStep,
        /// Control qubit of the gate already there.
        control: QubitId,
    },

    /// No gate with this id.
    #[error("Gate {0} not found")]
    GateNotFound(GateId),
}

/// Result type for circuit edits.
pub type CircuitResult<T> = Result<T, CircuitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = CircuitError::CellOccupied(Cell::new(1, 0));
        assert_eq!(err.to_string(), "Cell (q1, t0) is already occupied");

        let err = CircuitError::QubitOutOfRange {
            qubit: QubitId(5),
            num_qubits: 3,
        };
        assert!(err.to_string().contains("q5"));
        assert!(err.to_string().contains("3-qubit"));

        let err = CircuitError::StepHasControl {
            step: TimeStep(2),
            control: QubitId(0),
        };
        assert!(err.to_string().contains("t2"));
    }
}
