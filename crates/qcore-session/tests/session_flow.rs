//! End-to-end session flows against an in-process gateway.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::{Mutex, Notify};

use qcore_circuit::{GateKind, QubitId, Retarget};
use qcore_gateway::{
    ExerciseSpec, GateListing, GatewayError, GatewayResult, HealthStatus, ScoreRequest,
    ScoreResult, SimulateRequest, SimulationGateway, SimulationResult,
};
use qcore_session::{
    ExerciseSession, SessionError, SessionOptions, preview_shared, submit_shared,
};

fn spec(id: &str, num_qubits: u32, hints: &[&str]) -> ExerciseSpec {
    serde_json::from_value(json!({
        "id": id,
        "title": id,
        "difficulty": "intermediate",
        "num_qubits": num_qubits,
        "target_type": "probabilities",
        "target_data": {"measurement_probabilities": {"000": 0.5, "111": 0.5}},
        "hints": hints,
    }))
    .unwrap()
}

/// Gateway whose `score` call parks until the test releases it.
#[derive(Default)]
struct GatedGateway {
    entered: Notify,
    release: Notify,
    scored: StdMutex<Vec<ScoreRequest>>,
    simulated: StdMutex<Vec<SimulateRequest>>,
    crash_simulation: bool,
}

#[async_trait]
impl SimulationGateway for GatedGateway {
    async fn simulate(&self, request: &SimulateRequest) -> GatewayResult<SimulationResult> {
        self.simulated.lock().unwrap().push(request.clone());
        if self.crash_simulation {
            return Err(GatewayError::Api {
                status: 500,
                message: "Simulation engine crashed".into(),
            });
        }
        Ok(SimulationResult {
            success: true,
            qubits: request.qubits,
            gate_count: request.gates.len() as u32,
            probabilities: vec![0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5],
            ..SimulationResult::default()
        })
    }

    async fn score(&self, id: &str, request: &ScoreRequest) -> GatewayResult<ScoreResult> {
        self.scored.lock().unwrap().push(request.clone());
        self.entered.notify_one();
        self.release.notified().await;
        Ok(ScoreResult {
            exercise_id: Some(id.to_string()),
            passed: request.circuit.len() >= 3,
            score: 25.0 * request.circuit.len() as f64,
            feedback: Some("graded".into()),
            ..ScoreResult::default()
        })
    }

    async fn exercise(&self, id: &str) -> GatewayResult<ExerciseSpec> {
        match id {
            "ghz" => Ok(spec("ghz", 3, &["Start with H on q0"])),
            _ => Err(GatewayError::NotFound(format!("Exercise {id} not found"))),
        }
    }

    async fn exercises(&self) -> GatewayResult<Vec<ExerciseSpec>> {
        Ok(vec![spec("ghz", 3, &[])])
    }

    async fn gates(&self) -> GatewayResult<GateListing> {
        Ok(GateListing::default())
    }

    async fn health(&self) -> GatewayResult<HealthStatus> {
        Err(GatewayError::InvalidRequest("not served".into()))
    }
}

fn build_ghz(session: &mut ExerciseSession) {
    session.place_gate(0, 0, GateKind::H, None).unwrap();
    session.place_gate(0, 1, GateKind::CNOT, None).unwrap();
    session
        .place_gate(1, 2, GateKind::CNOT, Some(QubitId(2)))
        .unwrap();
}

#[tokio::test]
async fn test_double_submit_is_refused_while_in_flight() {
    let gateway = Arc::new(GatedGateway::default());
    let mut opened = ExerciseSession::open(spec("ghz", 3, &[]), SessionOptions::default());
    build_ghz(&mut opened);
    let session = Arc::new(Mutex::new(opened));

    let first = {
        let session = Arc::clone(&session);
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { submit_shared(&session, gateway.as_ref()).await })
    };
    gateway.entered.notified().await;

    let second = submit_shared(&session, gateway.as_ref()).await;
    assert!(matches!(second, Err(SessionError::SubmissionInFlight)));
    assert!(session.lock().await.is_submitting());

    gateway.release.notify_one();
    let score = first.await.unwrap().unwrap();
    assert!(score.passed);
    assert_eq!(score.exercise_id.as_deref(), Some("ghz"));

    assert_eq!(gateway.scored.lock().unwrap().len(), 1);
    let session = session.lock().await;
    assert!(!session.is_submitting());
    assert!(session.score_is_current());
}

#[tokio::test]
async fn test_abandoned_submit_frees_slot() {
    let gateway = Arc::new(GatedGateway::default());
    let mut opened = ExerciseSession::open(spec("ghz", 3, &[]), SessionOptions::default());
    build_ghz(&mut opened);
    let session = Arc::new(Mutex::new(opened));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        submit_shared(&session, gateway.as_ref()),
    )
    .await;
    assert!(abandoned.is_err());
    assert!(!session.lock().await.is_submitting());

    let retry = {
        let session = Arc::clone(&session);
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { submit_shared(&session, gateway.as_ref()).await })
    };
    gateway.entered.notified().await;
    gateway.release.notify_one();
    let score = retry.await.unwrap().unwrap();
    assert!(score.passed);
    assert_eq!(gateway.scored.lock().unwrap().len(), 2);
    assert!(!session.lock().await.is_submitting());
}

#[tokio::test]
async fn test_edits_during_submit_do_not_reach_payload() {
    let gateway = Arc::new(GatedGateway::default());
    let mut opened = ExerciseSession::open(spec("ghz", 3, &[]), SessionOptions::default());
    opened.place_gate(0, 0, GateKind::H, None).unwrap();
    let session = Arc::new(Mutex::new(opened));

    let task = {
        let session = Arc::clone(&session);
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { submit_shared(&session, gateway.as_ref()).await })
    };
    gateway.entered.notified().await;

    {
        let mut session = session.lock().await;
        session.place_gate(0, 1, GateKind::CNOT, None).unwrap();
        session.place_gate(2, 0, GateKind::X, None).unwrap();
        assert_eq!(session.circuit().len(), 3);
    }

    gateway.release.notify_one();
    let score = task.await.unwrap().unwrap();
    assert!(!score.passed);
    assert_eq!(score.score, 25.0);

    let sent = gateway.scored.lock().unwrap();
    assert_eq!(sent[0].circuit.len(), 1);
    assert_eq!(sent[0].circuit[0].name, "H");

    let session = session.lock().await;
    assert_eq!(session.last_score().map(|s| s.score), Some(25.0));
    assert!(!session.score_is_current());
}

#[tokio::test]
async fn test_preview_shared_snapshots_circuit() {
    let gateway = GatedGateway::default();
    let mut opened = ExerciseSession::open(spec("ghz", 3, &[]), SessionOptions::default());
    build_ghz(&mut opened);
    let session = Mutex::new(opened);

    let result = preview_shared(&session, &gateway).await;
    assert!(result.success);
    assert_eq!(result.gate_count, 3);

    let sent = gateway.simulated.lock().unwrap();
    assert_eq!(sent[0].qubits, 3);
    assert_eq!(sent[0].gates[1].target_qubit, Some(1));
    assert_eq!(sent[0].gates[2].target_qubit, Some(2));
    assert!(session.lock().await.simulation_is_current());
}

#[tokio::test]
async fn test_backend_crash_becomes_failed_preview() {
    let gateway = GatedGateway {
        crash_simulation: true,
        ..GatedGateway::default()
    };
    let mut session = ExerciseSession::open(spec("ghz", 3, &[]), SessionOptions::default());
    build_ghz(&mut session);

    let result = session.request_preview(&gateway).await;
    assert!(result.is_failure());
    assert_eq!(result.failure_message(), Some("Simulation engine crashed"));

    let stored = session.last_simulation().unwrap();
    assert!(!stored.success);
    assert!(!stored.error_message.as_deref().unwrap_or_default().is_empty());
    assert_eq!(session.circuit().len(), 3);
}

#[test]
fn test_last_response_wins() {
    let mut session = ExerciseSession::open(spec("ghz", 3, &[]), SessionOptions::default());
    session.place_gate(0, 0, GateKind::H, None).unwrap();
    let older = session.begin_preview();
    session.place_gate(0, 1, GateKind::CNOT, None).unwrap();
    let newer = session.begin_preview();
    assert!(older.revision() < newer.revision());

    session.finish_preview(
        newer,
        Ok(SimulationResult {
            success: true,
            gate_count: 2,
            ..SimulationResult::default()
        }),
    );
    assert!(session.simulation_is_current());

    session.finish_preview(
        older,
        Ok(SimulationResult {
            success: true,
            gate_count: 1,
            ..SimulationResult::default()
        }),
    );
    assert_eq!(session.last_simulation().map(|r| r.gate_count), Some(1));
    assert!(!session.simulation_is_current());
}

#[tokio::test]
async fn test_load_and_hints() {
    let gateway = GatedGateway::default();
    let mut session = ExerciseSession::load(&gateway, "ghz", SessionOptions::default())
        .await
        .unwrap();
    assert_eq!(session.circuit().num_qubits(), 3);
    assert_eq!(session.reveal_next_hint(), Some("Start with H on q0"));
    assert_eq!(session.reveal_next_hint(), None);
    assert_eq!(session.hints_revealed(), 1);

    // hints survive a clear
    build_ghz(&mut session);
    session.clear();
    assert!(session.circuit().is_empty());
    assert_eq!(session.revealed_hints(), ["Start with H on q0".to_string()]);
}

#[tokio::test]
async fn test_load_unknown_exercise() {
    let gateway = GatedGateway::default();
    let err = ExerciseSession::load(&gateway, "teleport", SessionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Load(GatewayError::NotFound(_))));
    assert!(err.to_string().contains("teleport"));
}

#[test]
fn test_retarget_bumps_revision() {
    let mut session = ExerciseSession::open(spec("ghz", 3, &[]), SessionOptions::default());
    let cnot = session.place_gate(0, 0, GateKind::CNOT, None).unwrap();
    let revision = session.revision();

    match session.retarget(cnot.id) {
        Retarget::Moved(gate) => assert_eq!(gate.target, Some(QubitId(2))),
        Retarget::Unchanged => panic!("expected the target to move"),
    }
    assert_eq!(session.revision(), revision + 1);
}
