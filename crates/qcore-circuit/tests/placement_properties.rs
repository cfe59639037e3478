//! Property-based tests for grid placement rules.
//!
//! Random edit sequences are applied to a circuit and the grid invariants
//! are checked after every step.

use std::collections::HashSet;

use proptest::prelude::*;
use qcore_circuit::{Cell, CircuitModel, GateId, GateKind, QubitId, Retarget};

/// Edits that can be applied to a circuit.
#[derive(Debug, Clone)]
enum EditOp {
    Place(u32, u32, GateKind),
    PlaceCnot(u32, u32, Option<u32>),
    Remove(usize),
    Retarget(usize),
}

impl EditOp {
    fn apply(self, circuit: &mut CircuitModel) {
        match self {
            EditOp::Place(q, step, kind) => {
                let _ = circuit.place(q, step, kind, None);
            }
            EditOp::PlaceCnot(q, step, target) => {
                let _ = circuit.place(q, step, GateKind::CNOT, target.map(QubitId));
            }
            EditOp::Remove(i) => {
                if let Some(id) = nth_id(circuit, i) {
                    circuit.remove(id);
                }
            }
            EditOp::Retarget(i) => {
                if let Some(id) = nth_id(circuit, i) {
                    circuit.retarget(id);
                }
            }
        }
    }
}

fn nth_id(circuit: &CircuitModel, i: usize) -> Option<GateId> {
    if circuit.is_empty() {
        return None;
    }
    Some(circuit.gates()[i % circuit.len()].id)
}

fn arb_single_kind() -> impl Strategy<Value = GateKind> {
    prop::sample::select(
        GateKind::ALL
            .iter()
            .copied()
            .filter(|k| !k.is_two_qubit())
            .collect::<Vec<_>>(),
    )
}

/// Generate an edit for a circuit with the given number of qubits.
///
/// Qubit and target indices may fall outside the register so that
/// rejected edits are exercised too.
fn arb_edit(num_qubits: u32) -> impl Strategy<Value = EditOp> {
    let max_steps = 4_u32;
    prop_oneof![
        4 => (0..=num_qubits, 0..max_steps, arb_single_kind())
            .prop_map(|(q, s, k)| EditOp::Place(q, s, k)),
        3 => (0..=num_qubits, 0..max_steps, prop::option::of(0..=num_qubits))
            .prop_map(|(q, s, t)| EditOp::PlaceCnot(q, s, t)),
        1 => any::<usize>().prop_map(EditOp::Remove),
        2 => any::<usize>().prop_map(EditOp::Retarget),
    ]
}

fn arb_circuit() -> impl Strategy<Value = CircuitModel> {
    (1_u32..=5).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_edit(num_qubits), 0..=30).prop_map(move |ops| {
            let mut circuit = CircuitModel::new(num_qubits);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

/// Every cell is claimed by at most one gate and every target is valid.
fn assert_grid_invariants(circuit: &CircuitModel) -> Result<(), TestCaseError> {
    let mut seen: HashSet<Cell> = HashSet::new();
    for gate in circuit.gates() {
        for cell in gate.cells() {
            prop_assert!(seen.insert(cell), "cell {} claimed twice", cell);
        }
        prop_assert!(gate.qubit.0 < circuit.num_qubits());
        if gate.kind.is_two_qubit() {
            let target = gate.target.ok_or_else(|| TestCaseError::fail("CNOT without target"))?;
            prop_assert_ne!(target, gate.qubit);
            prop_assert!(target.0 < circuit.num_qubits());
        } else {
            prop_assert!(gate.target.is_none());
        }
    }
    Ok(())
}

proptest! {
    /// No two gates share a control or target cell, whatever the edit order.
    #[test]
    fn test_cells_are_exclusive(
        (num_qubits, ops) in (1_u32..=5).prop_flat_map(|n| (Just(n), prop::collection::vec(arb_edit(n), 0..=40)))
    ) {
        let mut circuit = CircuitModel::new(num_qubits);
        for op in ops {
            op.apply(&mut circuit);
            assert_grid_invariants(&circuit)?;
        }
    }

    /// Shrinking drops exactly the gates that touch a removed qubit.
    #[test]
    fn test_shrink_purges_exactly_out_of_range(
        circuit in arb_circuit(),
        new_count in 0_u32..=5,
    ) {
        let mut circuit = circuit;
        let expected: Vec<_> = circuit
            .gates()
            .iter()
            .filter(|g| g.max_qubit().0 < new_count)
            .cloned()
            .collect();
        let before = circuit.len();

        let removed = circuit.set_qubit_count(new_count);

        prop_assert_eq!(removed, before - expected.len());
        prop_assert_eq!(circuit.gates(), expected.as_slice());
        assert_grid_invariants(&circuit)?;
    }

    /// Retargeting visits every free candidate once before returning home.
    #[test]
    fn test_retarget_cycles_through_free_candidates(circuit in arb_circuit()) {
        let mut circuit = circuit;
        let n = circuit.num_qubits();
        let cnots: Vec<_> = circuit
            .gates()
            .iter()
            .filter(|g| g.is_two_qubit())
            .cloned()
            .collect();

        for cnot in cnots {
            let Some(home) = cnot.target else { continue };
            let candidates: HashSet<QubitId> = (0..n)
                .map(QubitId)
                .filter(|&q| q != cnot.qubit && q != home)
                .filter(|&q| circuit.is_cell_free(Cell { qubit: q, step: cnot.step }))
                .collect();

            if candidates.is_empty() {
                prop_assert_eq!(circuit.retarget(cnot.id), Retarget::Unchanged);
                prop_assert_eq!(circuit.retarget(cnot.id), Retarget::Unchanged);
                prop_assert_eq!(circuit.get(cnot.id).and_then(|g| g.target), Some(home));
                continue;
            }

            let mut visited = HashSet::new();
            loop {
                let Retarget::Moved(moved) = circuit.retarget(cnot.id) else {
                    return Err(TestCaseError::fail("retarget refused with free candidates"));
                };
                let target = moved.target.ok_or_else(|| TestCaseError::fail("target lost"))?;
                if target == home {
                    break;
                }
                prop_assert!(candidates.contains(&target), "{} is not a free candidate", target);
                prop_assert!(visited.insert(target), "{} visited twice", target);
                prop_assert!(visited.len() <= candidates.len());
            }
            prop_assert_eq!(visited, candidates);
            assert_grid_invariants(&circuit)?;
        }
    }

    /// Snapshots keep their contents after later edits.
    #[test]
    fn test_snapshot_survives_edits(
        circuit in arb_circuit(),
        ops in prop::collection::vec(arb_edit(5), 1..=10),
    ) {
        let mut circuit = circuit;
        let snapshot = circuit.snapshot();
        let frozen = snapshot.gates().to_vec();

        for op in ops {
            op.apply(&mut circuit);
        }
        circuit.set_qubit_count(1);

        prop_assert_eq!(snapshot.gates(), frozen.as_slice());
    }
}
