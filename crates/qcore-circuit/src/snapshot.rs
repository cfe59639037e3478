//! Immutable circuit snapshots.

use std::sync::Arc;

use crate::gate::{GateCatalog, GateDescriptor, GateKind};
use crate::instance::GateInstance;

/// A frozen copy of a circuit, in execution order.
///
/// Cloning is cheap; the gate list is shared. Later edits to the
/// originating [`CircuitModel`](crate::CircuitModel) never show up here.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitSnapshot {
    num_qubits: u32,
    gates: Arc<[GateInstance]>,
    catalog: Arc<GateCatalog>,
}

impl CircuitSnapshot {
    pub(crate) fn new(num_qubits: u32, gates: Vec<GateInstance>, catalog: Arc<GateCatalog>) -> Self {
        Self {
            num_qubits,
            gates: gates.into(),
            catalog,
        }
    }

    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Gates sorted by time step, then qubit.
    pub fn gates(&self) -> &[GateInstance] {
        &self.gates
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Catalog the circuit was built against.
    pub fn catalog(&self) -> &GateCatalog {
        &self.catalog
    }

    /// Display metadata for `kind` from the circuit's catalog.
    pub fn descriptor(&self, kind: GateKind) -> Option<&GateDescriptor> {
        self.catalog.get(kind)
    }

    /// Highest time step + 1, or 0 for an empty circuit.
    pub fn depth(&self) -> u32 {
        self.gates.iter().map(|g| g.step.0 + 1).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::{CircuitModel, GateCatalog, GateKind};

    #[test]
    fn test_snapshot_is_detached() {
        let mut circuit = CircuitModel::new(2);
        circuit.place(1, 1, GateKind::X, None).unwrap();
        let h = circuit.place(0, 0, GateKind::H, None).unwrap();

        let snapshot = circuit.snapshot();
        circuit.remove(h.id);
        circuit.set_qubit_count(1);

        assert_eq!(snapshot.num_qubits(), 2);
        assert_eq!(snapshot.gate_count(), 2);
        assert_eq!(snapshot.gates()[0].kind, GateKind::H);
        assert_eq!(snapshot.gates()[1].kind, GateKind::X);
        assert_eq!(snapshot.depth(), 2);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CircuitModel::new(3).snapshot();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.depth(), 0);
    }

    #[test]
    fn test_snapshot_carries_catalog_text() {
        let catalog = GateCatalog::from_entries(vec![(
            "H",
            Some("Had".to_string()),
            Some("Superposition maker".to_string()),
        )]);
        let mut circuit = CircuitModel::with_catalog(1, catalog);
        circuit.place(0, 0, GateKind::H, None).unwrap();

        let snapshot = circuit.snapshot();
        let descriptor = snapshot.descriptor(GateKind::H).unwrap();
        assert_eq!(descriptor.symbol, "Had");
        assert_eq!(descriptor.description, "Superposition maker");
        assert!(snapshot.descriptor(GateKind::X).is_none());
    }
}
