//! Gate kinds and the gate catalog.

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CircuitError;

/// Rotation angle used when a parameterized gate is placed without one.
pub const DEFAULT_ROTATION_ANGLE: f64 = FRAC_PI_2;

/// How many grid rows a gate occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateArity {
    /// Acts on the qubit it is placed on.
    Single,
    /// Control on the placed qubit, target on a second qubit.
    TwoQubit,
}

/// Gate kinds the circuit builder knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateKind {
    /// Hadamard gate.
    H,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Phase gate (sqrt(Z)).
    S,
    /// T gate (fourth root of Z).
    T,
    /// Rotation around X.
    RX,
    /// Rotation around Y.
    RY,
    /// Rotation around Z.
    RZ,
    /// Controlled-NOT.
    CNOT,
}

impl GateKind {
    /// Every kind, in catalog order.
    pub const ALL: [GateKind; 10] = [
        GateKind::H,
        GateKind::X,
        GateKind::Y,
        GateKind::Z,
        GateKind::S,
        GateKind::T,
        GateKind::RX,
        GateKind::RY,
        GateKind::RZ,
        GateKind::CNOT,
    ];

    /// Wire identifier.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            GateKind::H => "H",
            GateKind::X => "X",
            GateKind::Y => "Y",
            GateKind::Z => "Z",
            GateKind::S => "S",
            GateKind::T => "T",
            GateKind::RX => "RX",
            GateKind::RY => "RY",
            GateKind::RZ => "RZ",
            GateKind::CNOT => "CNOT",
        }
    }

    /// Symbol shown on the grid.
    pub fn symbol(self) -> &'static str {
        match self {
            GateKind::CNOT => "⊕",
            other => other.name(),
        }
    }

    /// Short human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            GateKind::H => "Hadamard",
            GateKind::X => "Pauli-X",
            GateKind::Y => "Pauli-Y",
            GateKind::Z => "Pauli-Z",
            GateKind::S => "Phase",
            GateKind::T => "T gate",
            GateKind::RX => "X-rotation",
            GateKind::RY => "Y-rotation",
            GateKind::RZ => "Z-rotation",
            GateKind::CNOT => "Controlled-NOT",
        }
    }

    #[inline]
    pub fn arity(self) -> GateArity {
        match self {
            GateKind::CNOT => GateArity::TwoQubit,
            _ => GateArity::Single,
        }
    }

    #[inline]
    pub fn is_two_qubit(self) -> bool {
        self.arity() == GateArity::TwoQubit
    }

    /// Whether the gate takes a rotation angle.
    #[inline]
    pub fn is_parameterized(self) -> bool {
        matches!(self, GateKind::RX | GateKind::RY | GateKind::RZ)
    }

    /// Catalog entry for this kind.
    pub fn descriptor(self) -> GateDescriptor {
        GateDescriptor {
            kind: self,
            name: self.name().to_string(),
            symbol: self.symbol().to_string(),
            description: self.description().to_string(),
            arity: self.arity(),
            parameterized: self.is_parameterized(),
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GateKind {
    type Err = CircuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H" => Ok(GateKind::H),
            "X" => Ok(GateKind::X),
            "Y" => Ok(GateKind::Y),
            "Z" => Ok(GateKind::Z),
            "S" => Ok(GateKind::S),
            "T" => Ok(GateKind::T),
            "RX" => Ok(GateKind::RX),
            "RY" => Ok(GateKind::RY),
            "RZ" => Ok(GateKind::RZ),
            "CNOT" | "CX" => Ok(GateKind::CNOT),
            _ => Err(CircuitError::UnknownGate(s.to_string())),
        }
    }
}

/// One catalog entry: a gate kind plus its display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDescriptor {
    /// The kind this entry places.
    pub kind: GateKind,
    /// Wire identifier.
    pub name: String,
    /// Grid symbol.
    pub symbol: String,
    /// Human-readable description.
    pub description: String,
    /// Single or two-qubit.
    pub arity: GateArity,
    /// Takes a rotation angle.
    pub parameterized: bool,
}

/// The set of gates a learner may place.
///
/// Built once (either [`GateCatalog::standard`] or from a backend listing)
/// and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GateCatalog {
    entries: Vec<GateDescriptor>,
}

impl GateCatalog {
    /// The full built-in catalog.
    pub fn standard() -> Self {
        Self {
            entries: GateKind::ALL.iter().map(|k| k.descriptor()).collect(),
        }
    }

    /// Build a catalog from `(name, symbol, description)` entries, e.g. as
    /// listed by a backend.
    ///
    /// Names that do not map onto a known [`GateKind`] are skipped, as are
    /// repeated kinds. Symbol and description fall back to the built-in
    /// values when empty.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<String>, Option<String>)>,
        S: AsRef<str>,
    {
        let mut out: Vec<GateDescriptor> = Vec::new();
        for (name, symbol, description) in entries {
            let name = name.as_ref();
            let Ok(kind) = name.parse::<GateKind>() else {
                warn!("Skipping unknown gate in listing: {}", name);
                continue;
            };
            if out.iter().any(|d| d.kind == kind) {
                continue;
            }
            let mut descriptor = kind.descriptor();
            if let Some(symbol) = symbol.filter(|s| !s.is_empty()) {
                descriptor.symbol = symbol;
            }
            if let Some(description) = description.filter(|s| !s.is_empty()) {
                descriptor.description = description;
            }
            out.push(descriptor);
        }
        Self { entries: out }
    }

    /// All entries in catalog order.
    pub fn list_gates(&self) -> &[GateDescriptor] {
        &self.entries
    }

    /// Look up a gate by wire name (case-insensitive).
    ///
    /// Only kinds present in this catalog resolve.
    pub fn resolve(&self, name: &str) -> Option<GateKind> {
        let kind = name.parse::<GateKind>().ok()?;
        self.contains(kind).then_some(kind)
    }

    pub fn contains(&self, kind: GateKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    pub fn get(&self, kind: GateKind) -> Option<&GateDescriptor> {
        self.entries.iter().find(|d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for GateCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
