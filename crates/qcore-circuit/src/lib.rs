//! QCore circuit model
//!
//! This crate holds the editable side of a learner's quantum circuit: the
//! gate catalog, the `(qubit × time step)` grid with its placement rules,
//! and immutable snapshots handed to a simulator.
//!
//! # Core Components
//!
//! - **Coordinates**: [`QubitId`], [`TimeStep`] and [`Cell`]
//! - **Gates**: [`GateKind`] and the read-only [`GateCatalog`]
//! - **Placed gates**: [`GateInstance`] identified by [`GateId`]
//! - **Circuit**: [`CircuitModel`], the mutable grid
//! - **Snapshots**: [`CircuitSnapshot`], a frozen copy in execution order
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qcore_circuit::{CircuitModel, GateKind, QubitId};
//!
//! let mut circuit = CircuitModel::new(2);
//! circuit.place(0, 0, GateKind::H, None).unwrap();
//!
//! // The target defaults to the next qubit
//! let cnot = circuit.place(0, 1, GateKind::CNOT, None).unwrap();
//! assert_eq!(cnot.target, Some(QubitId(1)));
//!
//! // Target cells are occupied too
//! assert!(circuit.place(1, 1, GateKind::X, None).is_err());
//!
//! let snapshot = circuit.snapshot();
//! assert_eq!(snapshot.depth(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Parameter |
//! |------|--------|-----------|
//! | `H` | 1 | - |
//! | `X`, `Y`, `Z` | 1 | - |
//! | `S`, `T` | 1 | - |
//! | `RX`, `RY`, `RZ` | 1 | angle, default π/2 |
//! | `CNOT` | 2 | - |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instance;
pub mod qubit;
pub mod snapshot;

pub use circuit::{CircuitModel, PlacementPolicy, Retarget};
pub use error::{CircuitError, CircuitResult};
pub use gate::{DEFAULT_ROTATION_ANGLE, GateArity, GateCatalog, GateDescriptor, GateKind};
pub use instance::{GateId, GateInstance};
pub use qubit::{Cell, QubitId, TimeStep};
pub use snapshot::CircuitSnapshot;
