//! JSON wire types spoken by the simulation backend.
//!
//! Field names follow the backend's JSON exactly (`timeStep`,
//! `target_qubit`, `quantum_state`, ...). Responses are parsed leniently:
//! absent fields fall back to empty values so that partial error bodies
//! still deserialize.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use qcore_circuit::{CircuitSnapshot, GateCatalog, GateInstance, GateKind};

use crate::error::{GatewayError, GatewayResult};

/// Default shot count for simulate requests.
pub const DEFAULT_SHOTS: u32 = 1024;

/// Default comparison tolerance for exercise targets.
pub const DEFAULT_TOLERANCE: f64 = 0.001;

fn default_shots() -> u32 {
    DEFAULT_SHOTS
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

/// A gate as sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireGate {
    /// Catalog identifier, e.g. `"CNOT"`.
    pub name: String,
    /// Qubit (control for two-qubit gates).
    pub qubit: u32,
    /// Column.
    #[serde(rename = "timeStep")]
    pub time_step: u32,
    /// Target for two-qubit gates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_qubit: Option<u32>,
    /// Angle in radians.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&GateInstance> for WireGate {
    fn from(gate: &GateInstance) -> Self {
        Self {
            name: gate.kind.name().to_string(),
            qubit: gate.qubit.0,
            time_step: gate.step.0,
            target_qubit: gate.target.map(|q| q.0),
            parameter: gate.parameter,
            symbol: Some(gate.kind.symbol().to_string()),
            description: Some(gate.kind.description().to_string()),
        }
    }
}

/// Wire gates for a snapshot, in execution order.
///
/// Symbol and description come from the circuit's catalog, so text from a
/// backend listing is sent back unchanged.
pub fn wire_gates(snapshot: &CircuitSnapshot) -> Vec<WireGate> {
    snapshot
        .gates()
        .iter()
        .map(|gate| {
            let mut wire = WireGate::from(gate);
            if let Some(descriptor) = snapshot.descriptor(gate.kind) {
                wire.symbol = Some(descriptor.symbol.clone());
                wire.description = Some(descriptor.description.clone());
            }
            wire
        })
        .collect()
}

/// Check that every two-qubit gate carries a usable target.
///
/// With `num_qubits` the qubit indices are range-checked as well. Names
/// that are not known gate kinds are left for the backend to judge.
pub fn validate_gates(gates: &[WireGate], num_qubits: Option<u32>) -> GatewayResult<()> {
    for (index, gate) in gates.iter().enumerate() {
        let Ok(kind) = gate.name.parse::<GateKind>() else {
            continue;
        };
        if let Some(n) = num_qubits {
            if gate.qubit >= n {
                return Err(GatewayError::InvalidRequest(format!(
                    "gate {index} ({}) uses qubit {} of a {n}-qubit circuit",
                    gate.name, gate.qubit
                )));
            }
        }
        if !kind.is_two_qubit() {
            continue;
        }
        match gate.target_qubit {
            None => {
                return Err(GatewayError::InvalidRequest(format!(
                    "gate {index} ({}) on qubit {} has no target qubit",
                    gate.name, gate.qubit
                )));
            }
            Some(target) if target == gate.qubit => {
                return Err(GatewayError::InvalidRequest(format!(
                    "gate {index} ({}) targets its own control qubit {target}",
                    gate.name
                )));
            }
            Some(target) if num_qubits.is_some_and(|n| target >= n) => {
                return Err(GatewayError::InvalidRequest(format!(
                    "gate {index} ({}) targets qubit {target} outside the register",
                    gate.name
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// `POST /api/algorithms/simulator/run` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub qubits: u32,
    pub gates: Vec<WireGate>,
    /// Predefined algorithm to run instead of `gates`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default = "default_shots")]
    pub shots: u32,
}

impl SimulateRequest {
    /// Request simulating a circuit snapshot.
    pub fn from_snapshot(snapshot: &CircuitSnapshot, shots: u32) -> Self {
        Self {
            qubits: snapshot.num_qubits(),
            gates: wire_gates(snapshot),
            algorithm: None,
            shots,
        }
    }

    /// Request running one of the backend's predefined algorithms.
    pub fn algorithm(name: impl Into<String>, qubits: u32, shots: u32) -> Self {
        Self {
            qubits,
            gates: vec![],
            algorithm: Some(name.into()),
            shots,
        }
    }

    pub fn validate(&self) -> GatewayResult<()> {
        validate_gates(&self.gates, Some(self.qubits))
    }
}

/// One state-vector amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Amplitude {
    pub real: f64,
    pub imag: f64,
}

impl Amplitude {
    pub fn to_complex(self) -> Complex64 {
        Complex64::new(self.real, self.imag)
    }
}

impl From<Complex64> for Amplitude {
    fn from(c: Complex64) -> Self {
        Self {
            real: c.re,
            imag: c.im,
        }
    }
}

/// Ket label for a basis index, most significant qubit first: `|01⟩`.
pub fn basis_label(index: usize, num_qubits: u32) -> String {
    format!("|{:0width$b}⟩", index, width = num_qubits as usize)
}

/// One labelled row of a state vector.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisState {
    pub label: String,
    pub amplitude: Complex64,
    pub probability: f64,
}

/// Simulator response, also used for locally synthesized failures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub qubits: u32,
    #[serde(default)]
    pub quantum_state: Vec<Amplitude>,
    #[serde(default)]
    pub probabilities: Vec<f64>,
    #[serde(default)]
    pub measurement_counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub circuit_depth: u32,
    #[serde(default)]
    pub gate_count: u32,
    #[serde(default)]
    pub circuit_data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SimulationResult {
    /// A failed result carrying `message`; no state data.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Failed when the backend says so or attached an error message.
    pub fn is_failure(&self) -> bool {
        !self.success || self.error_message.is_some()
    }

    pub fn failure_message(&self) -> Option<&str> {
        if !self.is_failure() {
            return None;
        }
        Some(
            self.error_message
                .as_deref()
                .unwrap_or("simulation was not successful"),
        )
    }

    pub fn amplitudes(&self) -> Vec<Complex64> {
        self.quantum_state.iter().map(|a| a.to_complex()).collect()
    }

    /// State vector rows with ket labels.
    ///
    /// Probabilities come from the response when present, otherwise from
    /// the amplitude norms.
    pub fn basis_states(&self) -> Vec<BasisState> {
        self.quantum_state
            .iter()
            .enumerate()
            .map(|(i, amp)| {
                let amplitude = amp.to_complex();
                BasisState {
                    label: basis_label(i, self.qubits),
                    amplitude,
                    probability: self
                        .probabilities
                        .get(i)
                        .copied()
                        .unwrap_or_else(|| amplitude.norm_sqr()),
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Exercises
// ---------------------------------------------------------------------------

/// What an exercise compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    StateVector,
    Probabilities,
    Measurement,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::StateVector => write!(f, "state vector"),
            TargetType::Probabilities => write!(f, "probabilities"),
            TargetType::Measurement => write!(f, "measurement"),
        }
    }
}

/// Exercise difficulty. Unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Other(String),
}

impl Difficulty {
    /// Sort key: beginner first, unknown labels last.
    pub fn rank(&self) -> u8 {
        match self {
            Difficulty::Beginner => 1,
            Difficulty::Intermediate => 2,
            Difficulty::Advanced => 3,
            Difficulty::Other(_) => u8::MAX,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Other(label) => label,
        }
    }
}

impl From<String> for Difficulty {
    fn from(label: String) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "beginner" => Difficulty::Beginner,
            "intermediate" => Difficulty::Intermediate,
            "advanced" => Difficulty::Advanced,
            _ => Difficulty::Other(label),
        }
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> Self {
        d.as_str().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A target state-vector entry: a plain real, a `[re, im]` pair or an
/// `{real, imag}` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateEntry {
    Real(f64),
    Pair([f64; 2]),
    Complex(Amplitude),
}

impl StateEntry {
    pub fn to_complex(self) -> Complex64 {
        match self {
            StateEntry::Real(re) => Complex64::new(re, 0.0),
            StateEntry::Pair([re, im]) => Complex64::new(re, im),
            StateEntry::Complex(amp) => amp.to_complex(),
        }
    }
}

/// Expected outcome of an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_vector: Option<Vec<StateEntry>>,
    /// Bitstring → probability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_probabilities: Option<BTreeMap<String, f64>>,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for TargetData {
    fn default() -> Self {
        Self {
            state_vector: None,
            measurement_probabilities: None,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl TargetData {
    pub fn target_state(&self) -> Option<Vec<Complex64>> {
        self.state_vector
            .as_ref()
            .map(|entries| entries.iter().map(|e| e.to_complex()).collect())
    }
}

/// A read-only exercise definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSpec {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub num_qubits: u32,
    pub target_type: TargetType,
    #[serde(default)]
    pub target_data: TargetData,
    /// Ordered hints, revealed one at a time.
    #[serde(default)]
    pub hints: Vec<String>,
}

/// Sort by difficulty, then id.
pub fn sort_exercises(exercises: &mut [ExerciseSpec]) {
    exercises.sort_by(|a, b| {
        a.difficulty
            .rank()
            .cmp(&b.difficulty.rank())
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// `GET /api/exercises/{id}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExerciseEnvelope {
    pub exercise: ExerciseSpec,
}

/// `GET /api/exercises` envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExerciseList {
    #[serde(default)]
    pub exercises: Vec<ExerciseSpec>,
}

/// `POST /api/exercises/{id}/submit` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub circuit: Vec<WireGate>,
    pub user_id: String,
    /// Register size used for local validation; not transmitted.
    #[serde(skip)]
    pub num_qubits: Option<u32>,
}

impl ScoreRequest {
    pub fn from_snapshot(snapshot: &CircuitSnapshot, user_id: impl Into<String>) -> Self {
        Self {
            circuit: wire_gates(snapshot),
            user_id: user_id.into(),
            num_qubits: Some(snapshot.num_qubits()),
        }
    }

    pub fn validate(&self) -> GatewayResult<()> {
        validate_gates(&self.circuit, self.num_qubits)
    }
}

/// Grading outcome, also used for locally synthesized failures.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<String>,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Set when the score was synthesized from a failed request.
    #[serde(default)]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_data: Option<TargetData>,
}

impl ScoreResult {
    /// A failing score explaining why the submission did not go through.
    pub fn failure(detail: impl fmt::Display) -> Self {
        Self {
            passed: false,
            score: 0.0,
            feedback: Some(format!(
                "Submission failed: {detail}. Please check your circuit and try again."
            )),
            error: true,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog, health, info
// ---------------------------------------------------------------------------

/// `GET /api/algorithms/simulator/gates` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GateListing {
    #[serde(default)]
    pub single_qubit_gates: Vec<GateListingEntry>,
    #[serde(default)]
    pub two_qubit_gates: Vec<GateListingEntry>,
    #[serde(default)]
    pub algorithms: Vec<AlgorithmEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateListingEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub parameterized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl GateListing {
    /// Build a catalog from the listed gates, single-qubit gates first.
    pub fn to_catalog(&self) -> GateCatalog {
        GateCatalog::from_entries(
            self.single_qubit_gates
                .iter()
                .chain(&self.two_qubit_gates)
                .map(|e| (e.name.as_str(), e.symbol.clone(), e.description.clone())),
        )
    }
}

/// `GET /api/health` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub algorithms: Vec<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }

    /// Server timestamp, if present and RFC 3339.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// `GET /api/algorithms/simulator/info` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulatorInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub supported_gates: Vec<String>,
    #[serde(default)]
    pub max_qubits: Option<u32>,
    #[serde(default)]
    pub simulation_method: Option<String>,
}
