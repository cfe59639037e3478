//! The circuit grid model.
//!
//! A [`CircuitModel`] is a set of gates on a `(qubit × time step)` grid.
//! Every edit is validated before anything changes:
//!
//! ```text
//!   place ──→ catalog ──→ control cell ──→ parameter ──→ target ──→ policy ──→ commit
//!              (kind)       (free?)          (finite?)    (resolve)   (strict?)
//! ```
//!
//! **Invariants** (hold after every operation):
//! - every control and target cell is occupied by exactly one gate;
//! - two-qubit gates have a target different from their control;
//! - every control and target index is below `num_qubits`;
//! - no gate sits past [`TimeStep::MAX`];
//! - parameterized gates carry a finite angle, other gates carry none.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CircuitError, CircuitResult};
use crate::gate::{DEFAULT_ROTATION_ANGLE, GateCatalog, GateKind};
use crate::instance::{GateId, GateInstance};
use crate::qubit::{Cell, QubitId, TimeStep};
use crate::snapshot::CircuitSnapshot;

/// Extra placement restrictions on top of cell exclusivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    /// Only cell exclusivity is enforced.
    #[default]
    Relaxed,
    /// Additionally, at most one two-qubit gate per time step.
    OneControlPerStep,
}

/// Outcome of [`CircuitModel::retarget`].
#[derive(Debug, Clone, PartialEq)]
pub enum Retarget {
    /// The gate now points at a new target.
    Moved(GateInstance),
    /// No other valid target was free; nothing changed.
    Unchanged,
}

impl Retarget {
    pub fn is_moved(&self) -> bool {
        matches!(self, Retarget::Moved(_))
    }
}

/// Mutable circuit grid.
#[derive(Debug, Clone)]
pub struct CircuitModel {
    /// Register size.
    num_qubits: u32,
    /// Gates in insertion order.
    gates: Vec<GateInstance>,
    /// Occupied cells (controls and targets) → owning gate.
    occupancy: FxHashMap<Cell, GateId>,
    /// Gates that may be placed; shared with snapshots.
    catalog: Arc<GateCatalog>,
    /// Placement restrictions.
    policy: PlacementPolicy,
    /// Next id to hand out.
    next_id: u64,
}

impl CircuitModel {
    /// Create an empty circuit with the standard catalog and relaxed policy.
    pub fn new(num_qubits: u32) -> Self {
        Self::with_catalog(num_qubits, GateCatalog::standard())
    }

    /// Create an empty circuit restricted to `catalog`.
    pub fn with_catalog(num_qubits: u32, catalog: GateCatalog) -> Self {
        Self {
            num_qubits,
            gates: vec![],
            occupancy: FxHashMap::default(),
            catalog: Arc::new(catalog),
            policy: PlacementPolicy::default(),
            next_id: 0,
        }
    }

    /// Set the placement policy.
    ///
    /// Existing gates are not re-validated.
    pub fn with_policy(mut self, policy: PlacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    #[inline]
    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    pub fn catalog(&self) -> &GateCatalog {
        &self.catalog
    }

    /// Gates in insertion order.
    pub fn gates(&self) -> &[GateInstance] {
        &self.gates
    }

    /// Gates in execution order: time step ascending, then qubit ascending.
    pub fn ordered(&self) -> Vec<&GateInstance> {
        let mut ordered: Vec<&GateInstance> = self.gates.iter().collect();
        ordered.sort_by_key(|g| (g.step, g.qubit));
        ordered
    }

    pub fn get(&self, id: GateId) -> Option<&GateInstance> {
        self.gates.iter().find(|g| g.id == id)
    }

    /// Gate occupying `(qubit, step)` as control or target.
    pub fn gate_at(&self, qubit: impl Into<QubitId>, step: impl Into<TimeStep>) -> Option<&GateInstance> {
        let id = self.occupancy.get(&Cell::new(qubit, step))?;
        self.get(*id)
    }

    pub fn is_cell_free(&self, cell: Cell) -> bool {
        !self.occupancy.contains_key(&cell)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Number of occupied columns: highest time step + 1, or 0 when empty.
    pub fn depth(&self) -> u32 {
        self.gates.iter().map(|g| g.step.0 + 1).max().unwrap_or(0)
    }

    /// First column to the right of every placed gate.
    pub fn next_free_step(&self) -> TimeStep {
        TimeStep(self.depth())
    }

    /// Immutable copy of the current gates in execution order.
    pub fn snapshot(&self) -> CircuitSnapshot {
        CircuitSnapshot::new(
            self.num_qubits,
            self.ordered().into_iter().cloned().collect(),
            Arc::clone(&self.catalog),
        )
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Place a gate with its default parameter.
    ///
    /// For two-qubit kinds without `explicit_target` the target resolves to
    /// `(qubit + 1) mod num_qubits`. If that cell is taken the placement is
    /// refused; no other candidate is tried.
    pub fn place(
        &mut self,
        qubit: impl Into<QubitId>,
        step: impl Into<TimeStep>,
        kind: GateKind,
        explicit_target: Option<QubitId>,
    ) -> CircuitResult<GateInstance> {
        self.place_with(qubit, step, kind, explicit_target, None)
    }

    /// Place a parameterized gate with an explicit angle (radians).
    pub fn place_with_parameter(
        &mut self,
        qubit: impl Into<QubitId>,
        step: impl Into<TimeStep>,
        kind: GateKind,
        parameter: f64,
    ) -> CircuitResult<GateInstance> {
        self.place_with(qubit, step, kind, None, Some(parameter))
    }

    /// Place a gate in the first column after every existing gate.
    pub fn append(
        &mut self,
        qubit: impl Into<QubitId>,
        kind: GateKind,
        explicit_target: Option<QubitId>,
    ) -> CircuitResult<GateInstance> {
        let step = self.next_free_step();
        self.place_with(qubit, step, kind, explicit_target, None)
    }

    /// General placement: every optional input spelled out.
    pub fn place_with(
        &mut self,
        qubit: impl Into<QubitId>,
        step: impl Into<TimeStep>,
        kind: GateKind,
        explicit_target: Option<QubitId>,
        parameter: Option<f64>,
    ) -> CircuitResult<GateInstance> {
        let qubit = qubit.into();
        let step = step.into();

        if !self.catalog.contains(kind) {
            return Err(CircuitError::NotInCatalog(kind));
        }
        self.check_qubit(qubit)?;
        if step > TimeStep::MAX {
            return Err(CircuitError::StepOutOfRange(step));
        }

        let cell = Cell { qubit, step };
        if !self.is_cell_free(cell) {
            return Err(CircuitError::CellOccupied(cell));
        }

        let parameter = resolve_parameter(kind, parameter)?;
        let target = self.resolve_target(kind, qubit, step, explicit_target)?;

        if kind.is_two_qubit() && self.policy == PlacementPolicy::OneControlPerStep {
            if let Some(existing) = self.gates.iter().find(|g| g.is_two_qubit() && g.step == step) {
                return Err(CircuitError::StepHasControl {
                    step,
                    control: existing.qubit,
                });
            }
        }

        let gate = GateInstance {
            id: GateId(self.next_id),
            kind,
            qubit,
            step,
            target,
            parameter,
        };
        self.next_id += 1;
        self.commit(gate.clone());
        debug!("Placed {}", gate);
        Ok(gate)
    }

    fn check_qubit(&self, qubit: QubitId) -> CircuitResult<()> {
        if qubit.0 >= self.num_qubits {
            return Err(CircuitError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    fn resolve_target(
        &self,
        kind: GateKind,
        control: QubitId,
        step: TimeStep,
        explicit_target: Option<QubitId>,
    ) -> CircuitResult<Option<QubitId>> {
        if !kind.is_two_qubit() {
            return match explicit_target {
                Some(_) => Err(CircuitError::UnexpectedTarget(kind)),
                None => Ok(None),
            };
        }

        if self.num_qubits < 2 {
            return Err(CircuitError::TooFewQubits {
                kind,
                num_qubits: self.num_qubits,
            });
        }

        let target = match explicit_target {
            Some(target) => {
                if target == control {
                    return Err(CircuitError::TargetIsControl(target));
                }
                if target.0 >= self.num_qubits {
                    return Err(CircuitError::TargetOutOfRange {
                        qubit: target,
                        num_qubits: self.num_qubits,
                    });
                }
                target
            }
            None => QubitId((control.0 + 1) % self.num_qubits),
        };

        let cell = Cell {
            qubit: target,
            step,
        };
        if !self.is_cell_free(cell) {
            return Err(CircuitError::TargetOccupied(cell));
        }
        Ok(Some(target))
    }

    fn commit(&mut self, gate: GateInstance) {
        for cell in gate.cells() {
            self.occupancy.insert(cell, gate.id);
        }
        self.gates.push(gate);
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Remove a gate. Unknown ids are a no-op.
    pub fn remove(&mut self, id: GateId) -> Option<GateInstance> {
        let pos = self.gates.iter().position(|g| g.id == id)?;
        let gate = self.gates.remove(pos);
        for cell in gate.cells() {
            self.occupancy.remove(&cell);
        }
        debug!("Removed {}", gate);
        Some(gate)
    }

    /// Move a two-qubit gate's target to the next free qubit.
    ///
    /// Candidates are scanned cyclically from `current + 1`, skipping the
    /// control qubit and occupied cells in the same column. The scan stops
    /// when it wraps back to the current target.
    pub fn retarget(&mut self, id: GateId) -> Retarget {
        let Some(pos) = self.gates.iter().position(|g| g.id == id) else {
            return Retarget::Unchanged;
        };
        let gate = &self.gates[pos];
        let Some(current) = gate.target else {
            return Retarget::Unchanged;
        };
        let (control, step, n) = (gate.qubit, gate.step, self.num_qubits);

        let mut candidate = (current.0 + 1) % n;
        while candidate != current.0 {
            let cell = Cell::new(candidate, step);
            if candidate != control.0 && self.is_cell_free(cell) {
                self.occupancy.remove(&Cell {
                    qubit: current,
                    step,
                });
                self.occupancy.insert(cell, id);
                let gate = &mut self.gates[pos];
                gate.target = Some(QubitId(candidate));
                debug!("Retargeted {}", gate);
                return Retarget::Moved(gate.clone());
            }
            candidate = (candidate + 1) % n;
        }
        Retarget::Unchanged
    }

    /// Change the angle of a parameterized gate.
    pub fn set_parameter(&mut self, id: GateId, radians: f64) -> CircuitResult<GateInstance> {
        let gate = self
            .gates
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(CircuitError::GateNotFound(id))?;
        gate.parameter = resolve_parameter(gate.kind, Some(radians))?;
        Ok(gate.clone())
    }

    /// Resize the register, dropping every gate that no longer fits.
    ///
    /// Gates are never remapped. Returns how many were dropped.
    pub fn set_qubit_count(&mut self, num_qubits: u32) -> usize {
        let before = self.gates.len();
        self.num_qubits = num_qubits;
        self.gates.retain(|g| g.max_qubit().0 < num_qubits);
        let removed = before - self.gates.len();
        if removed > 0 {
            self.reindex();
            debug!("Resized to {} qubits, dropped {} gates", num_qubits, removed);
        }
        removed
    }

    /// Remove every gate.
    pub fn clear(&mut self) {
        self.gates.clear();
        self.occupancy.clear();
    }

    fn reindex(&mut self) {
        self.occupancy.clear();
        for gate in &self.gates {
            for cell in gate.cells() {
                self.occupancy.insert(cell, gate.id);
            }
        }
    }
}

fn resolve_parameter(kind: GateKind, parameter: Option<f64>) -> CircuitResult<Option<f64>> {
    match (kind.is_parameterized(), parameter) {
        (false, None) => Ok(None),
        (false, Some(_)) => Err(CircuitError::NotParameterized(kind)),
        (true, Some(p)) if !p.is_finite() => Err(CircuitError::InvalidParameter(p)),
        (true, p) => Ok(Some(p.unwrap_or(DEFAULT_ROTATION_ANGLE))),
    }
}
