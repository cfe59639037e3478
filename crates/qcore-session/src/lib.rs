//! Exercise sessions for QCore.
//!
//! A session ties one [`ExerciseSpec`](qcore_gateway::ExerciseSpec) to the
//! learner's circuit and to a [`SimulationGateway`](qcore_gateway::SimulationGateway)
//! used for previews and grading.
//!
//! # Example
//!
//! ```ignore
//! use qcore_circuit::GateKind;
//! use qcore_gateway::{GatewayConfig, HttpGateway};
//! use qcore_session::{ExerciseSession, SessionOptions};
//!
//! let config = GatewayConfig::load(None)?;
//! let gateway = HttpGateway::new(&config)?;
//! let mut session =
//!     ExerciseSession::load(&gateway, "bell-state", SessionOptions::from_config(&config)).await?;
//!
//! session.place_gate(0, 0, GateKind::H, None)?;
//! session.place_gate(0, 1, GateKind::CNOT, None)?;
//! let score = session.submit(&gateway).await?;
//! println!("passed: {}", score.passed);
//! ```

pub mod error;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use session::{
    ExerciseSession, PreviewTicket, SessionId, SessionOptions, SubmitTicket, preview_shared,
    submit_shared,
};
