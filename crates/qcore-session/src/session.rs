//! One exercise attempt.
//!
//! An [`ExerciseSession`] owns the learner's circuit for a single exercise
//! and tracks what has been shown so far: hints, the last preview and the
//! last score.
//!
//! ```text
//!   open ──→ edit* ──→ preview* ──→ submit ──→ edit* ──→ submit ...
//!              │          │            │
//!              └──────────┴────────────┴──→ revision++ invalidates results
//! ```
//!
//! Requests always carry a [`CircuitSnapshot`](qcore_circuit::CircuitSnapshot)
//! taken when they start, so edits made while a request is in flight never
//! reach its payload. Responses are stored when they arrive (last response
//! wins) together with the revision they were computed for.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use qcore_circuit::{
    CircuitModel, GateCatalog, GateId, GateInstance, GateKind, PlacementPolicy, QubitId, Retarget,
    TimeStep,
};
use qcore_gateway::{
    ExerciseSpec, GatewayConfig, GatewayResult, ScoreRequest, ScoreResult, SimulateRequest,
    SimulationGateway, SimulationResult,
};

use crate::error::{SessionError, SessionResult};

/// Identifier attached to a session's log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-session settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Placement policy for the session's circuit.
    pub policy: PlacementPolicy,
    /// Shots for preview requests.
    pub shots: u32,
    /// User id sent with submissions.
    pub user_id: String,
    /// Gates the learner may place; the built-in catalog when `None`.
    pub catalog: Option<GateCatalog>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            policy: PlacementPolicy::default(),
            shots: qcore_gateway::wire::DEFAULT_SHOTS,
            user_id: "anonymous".to_string(),
            catalog: None,
        }
    }
}

impl SessionOptions {
    /// Shots and user id from a gateway configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            shots: config.shots,
            user_id: config.user_id.clone(),
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: PlacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_catalog(mut self, catalog: GateCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

/// A result and the circuit revision it describes.
#[derive(Debug, Clone)]
struct Stamped<T> {
    revision: u64,
    value: T,
}

/// A preview request captured by [`ExerciseSession::begin_preview`].
#[derive(Debug, Clone)]
pub struct PreviewTicket {
    revision: u64,
    request: SimulateRequest,
}

impl PreviewTicket {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn request(&self) -> &SimulateRequest {
        &self.request
    }
}

/// A submission captured by [`ExerciseSession::begin_submit`].
///
/// Holding a ticket means the session's submit slot is taken. The slot
/// frees when the ticket is dropped, whether or not it reached
/// [`ExerciseSession::finish_submit`].
#[derive(Debug)]
pub struct SubmitTicket {
    revision: u64,
    exercise_id: String,
    request: ScoreRequest,
    _slot: OwnedSemaphorePermit,
}

impl SubmitTicket {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn exercise_id(&self) -> &str {
        &self.exercise_id
    }

    pub fn request(&self) -> &ScoreRequest {
        &self.request
    }
}

/// State of one exercise attempt.
#[derive(Debug)]
pub struct ExerciseSession {
    id: SessionId,
    spec: ExerciseSpec,
    circuit: CircuitModel,
    options: SessionOptions,
    hints_revealed: usize,
    /// Bumped by every successful edit.
    revision: u64,
    last_simulation: Option<Stamped<SimulationResult>>,
    last_score: Option<Stamped<ScoreResult>>,
    /// One permit; a [`SubmitTicket`] holds it while a submission runs.
    submit_slot: Arc<Semaphore>,
}

impl ExerciseSession {
    /// Start an attempt with an empty circuit sized for the exercise.
    pub fn open(spec: ExerciseSpec, options: SessionOptions) -> Self {
        let catalog = options.catalog.clone().unwrap_or_default();
        let circuit = CircuitModel::with_catalog(spec.num_qubits, catalog).with_policy(options.policy);
        let id = SessionId::new();
        info!(
            session = %id,
            exercise = %spec.id,
            qubits = spec.num_qubits,
            "Opened exercise session"
        );
        Self {
            id,
            spec,
            circuit,
            options,
            hints_revealed: 0,
            revision: 0,
            last_simulation: None,
            last_score: None,
            submit_slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Fetch an exercise and open a session for it.
    pub async fn load(
        gateway: &dyn SimulationGateway,
        exercise_id: &str,
        options: SessionOptions,
    ) -> SessionResult<Self> {
        let spec = gateway.exercise(exercise_id).await?;
        Ok(Self::open(spec, options))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn spec(&self) -> &ExerciseSpec {
        &self.spec
    }

    pub fn circuit(&self) -> &CircuitModel {
        &self.circuit
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Edit counter; starts at 0.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn hints_revealed(&self) -> usize {
        self.hints_revealed
    }

    /// Hints shown so far, in order.
    pub fn revealed_hints(&self) -> &[String] {
        &self.spec.hints[..self.hints_revealed]
    }

    pub fn has_more_hints(&self) -> bool {
        self.hints_revealed < self.spec.hints.len()
    }

    pub fn last_simulation(&self) -> Option<&SimulationResult> {
        self.last_simulation.as_ref().map(|s| &s.value)
    }

    pub fn last_score(&self) -> Option<&ScoreResult> {
        self.last_score.as_ref().map(|s| &s.value)
    }

    /// Whether the stored preview was computed for the current circuit.
    pub fn simulation_is_current(&self) -> bool {
        self.last_simulation
            .as_ref()
            .is_some_and(|s| s.revision == self.revision)
    }

    /// Whether the stored score was computed for the current circuit.
    pub fn score_is_current(&self) -> bool {
        self.last_score
            .as_ref()
            .is_some_and(|s| s.revision == self.revision)
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_slot.available_permits() == 0
    }

    // =========================================================================
    // Hints
    // =========================================================================

    /// Reveal the next hint.
    ///
    /// Returns the newly revealed hint, or `None` once every hint is shown.
    pub fn reveal_next_hint(&mut self) -> Option<&str> {
        if !self.has_more_hints() {
            return None;
        }
        self.hints_revealed += 1;
        debug!(session = %self.id, revealed = self.hints_revealed, "Revealed hint");
        self.spec
            .hints
            .get(self.hints_revealed - 1)
            .map(String::as_str)
    }

    // =========================================================================
    // Edits
    // =========================================================================

    fn touch(&mut self) {
        self.revision += 1;
        self.last_simulation = None;
        self.last_score = None;
    }

    /// Place a gate; see [`CircuitModel::place`].
    pub fn place_gate(
        &mut self,
        qubit: impl Into<QubitId>,
        step: impl Into<TimeStep>,
        kind: GateKind,
        explicit_target: Option<QubitId>,
    ) -> SessionResult<GateInstance> {
        let gate = self.circuit.place(qubit, step, kind, explicit_target)?;
        self.touch();
        Ok(gate)
    }

    /// Place a rotation with an explicit angle.
    pub fn place_rotation(
        &mut self,
        qubit: impl Into<QubitId>,
        step: impl Into<TimeStep>,
        kind: GateKind,
        radians: f64,
    ) -> SessionResult<GateInstance> {
        let gate = self.circuit.place_with_parameter(qubit, step, kind, radians)?;
        self.touch();
        Ok(gate)
    }

    /// Place a gate after every existing gate.
    pub fn append_gate(
        &mut self,
        qubit: impl Into<QubitId>,
        kind: GateKind,
        explicit_target: Option<QubitId>,
    ) -> SessionResult<GateInstance> {
        let gate = self.circuit.append(qubit, kind, explicit_target)?;
        self.touch();
        Ok(gate)
    }

    pub fn remove_gate(&mut self, id: GateId) -> Option<GateInstance> {
        let removed = self.circuit.remove(id)?;
        self.touch();
        Some(removed)
    }

    pub fn retarget(&mut self, id: GateId) -> Retarget {
        let outcome = self.circuit.retarget(id);
        if outcome.is_moved() {
            self.touch();
        }
        outcome
    }

    pub fn set_parameter(&mut self, id: GateId, radians: f64) -> SessionResult<GateInstance> {
        let gate = self.circuit.set_parameter(id, radians)?;
        self.touch();
        Ok(gate)
    }

    /// Remove every gate. Hints stay revealed.
    pub fn clear(&mut self) {
        if self.circuit.is_empty() {
            return;
        }
        self.circuit.clear();
        self.touch();
    }

    // =========================================================================
    // Preview
    // =========================================================================

    /// Capture the current circuit for a preview request.
    pub fn begin_preview(&self) -> PreviewTicket {
        PreviewTicket {
            revision: self.revision,
            request: SimulateRequest::from_snapshot(&self.circuit.snapshot(), self.options.shots),
        }
    }

    /// Store the outcome of a preview request.
    ///
    /// Gateway errors become a failed [`SimulationResult`].
    pub fn finish_preview(
        &mut self,
        ticket: PreviewTicket,
        outcome: GatewayResult<SimulationResult>,
    ) -> &SimulationResult {
        let value = match outcome {
            Ok(result) => {
                if let Some(message) = result.failure_message() {
                    warn!(session = %self.id, "Simulation failed: {}", message);
                }
                result
            }
            Err(e) => {
                warn!(session = %self.id, "Simulation request failed: {}", e);
                SimulationResult::failure(e.user_message())
            }
        };
        if ticket.revision != self.revision {
            debug!(
                session = %self.id,
                request_revision = ticket.revision,
                current_revision = self.revision,
                "Storing stale preview"
            );
        }
        &self
            .last_simulation
            .insert(Stamped {
                revision: ticket.revision,
                value,
            })
            .value
    }

    /// Simulate the current circuit and store the result.
    ///
    /// Never fails; backend problems are stored as a failed result.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn request_preview(&mut self, gateway: &dyn SimulationGateway) -> &SimulationResult {
        let ticket = self.begin_preview();
        let outcome = gateway.simulate(ticket.request()).await;
        self.finish_preview(ticket, outcome)
    }

    // =========================================================================
    // Submit
    // =========================================================================

    /// Take the submit slot and capture the current circuit.
    pub fn begin_submit(&mut self) -> SessionResult<SubmitTicket> {
        let slot = Arc::clone(&self.submit_slot)
            .try_acquire_owned()
            .map_err(|_| SessionError::SubmissionInFlight)?;
        info!(
            session = %self.id,
            exercise = %self.spec.id,
            gates = self.circuit.len(),
            "Submitting circuit"
        );
        Ok(SubmitTicket {
            revision: self.revision,
            exercise_id: self.spec.id.clone(),
            request: ScoreRequest::from_snapshot(&self.circuit.snapshot(), self.options.user_id.clone()),
            _slot: slot,
        })
    }

    /// Release the submit slot and store the outcome.
    ///
    /// Gateway errors become a failed [`ScoreResult`].
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        outcome: GatewayResult<ScoreResult>,
    ) -> &ScoreResult {
        let value = match outcome {
            Ok(score) => {
                info!(
                    session = %self.id,
                    passed = score.passed,
                    score = score.score,
                    "Submission graded"
                );
                score
            }
            Err(e) => {
                warn!(session = %self.id, "Submission failed: {}", e);
                ScoreResult::failure(e.user_message())
            }
        };
        &self
            .last_score
            .insert(Stamped {
                revision: ticket.revision,
                value,
            })
            .value
    }

    /// Grade the current circuit and store the score.
    ///
    /// Only fails when another submission is still in flight.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn submit(&mut self, gateway: &dyn SimulationGateway) -> SessionResult<&ScoreResult> {
        let ticket = self.begin_submit()?;
        let outcome = gateway.score(ticket.exercise_id(), ticket.request()).await;
        Ok(self.finish_submit(ticket, outcome))
    }
}

/// Submit from a session shared with an event loop.
///
/// The lock is held only to start and to finish the submission, so the
/// session stays editable while the request is in flight. Dropping the
/// returned future frees the submit slot.
pub async fn submit_shared(
    session: &Mutex<ExerciseSession>,
    gateway: &dyn SimulationGateway,
) -> SessionResult<ScoreResult> {
    let ticket = session.lock().await.begin_submit()?;
    let outcome = gateway.score(ticket.exercise_id(), ticket.request()).await;
    let mut session = session.lock().await;
    Ok(session.finish_submit(ticket, outcome).clone())
}

/// Preview from a session shared with an event loop.
pub async fn preview_shared(
    session: &Mutex<ExerciseSession>,
    gateway: &dyn SimulationGateway,
) -> SimulationResult {
    let ticket = session.lock().await.begin_preview();
    let outcome = gateway.simulate(ticket.request()).await;
    let mut session = session.lock().await;
    session.finish_preview(ticket, outcome).clone()
}
