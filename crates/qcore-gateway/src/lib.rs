//! QCore simulation gateway
//!
//! The boundary between a learner's circuit and the remote simulation
//! backend. The backend does all the quantum math; this crate only speaks
//! its JSON API.
//!
//! # Core Components
//!
//! - [`SimulationGateway`]: async trait consumed by exercise sessions
//! - [`HttpGateway`]: `reqwest` implementation of the trait
//! - [`wire`]: request and response types (`SimulateRequest`,
//!   `SimulationResult`, `ScoreResult`, `ExerciseSpec`, ...)
//! - [`CatalogCache`]: the backend gate listing, fetched once
//! - [`GatewayConfig`]: base URL, timeouts, shots and user id
//!
//! # Example
//!
//! ```no_run
//! use qcore_circuit::{CircuitModel, GateKind};
//! use qcore_gateway::{GatewayConfig, HttpGateway, SimulateRequest, SimulationGateway};
//!
//! # async fn run() -> Result<(), qcore_gateway::GatewayError> {
//! let gateway = HttpGateway::new(&GatewayConfig::default())?;
//!
//! let mut circuit = CircuitModel::new(2);
//! circuit.place(0, 0, GateKind::H, None).unwrap();
//! circuit.place(0, 1, GateKind::CNOT, None).unwrap();
//!
//! let request = SimulateRequest::from_snapshot(&circuit.snapshot(), 1024);
//! let result = gateway.simulate(&request).await?;
//! for state in result.basis_states() {
//!     println!("{}: {:.3}", state.label, state.probability);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod wire;

pub use client::HttpGateway;
pub use config::{ConfigError, GatewayConfig};
pub use error::{GatewayError, GatewayResult};
pub use gateway::{CatalogCache, SimulationGateway};
pub use wire::{
    Amplitude, BasisState, Difficulty, ExerciseSpec, GateListing, HealthStatus, ScoreRequest,
    ScoreResult, SimulateRequest, SimulationResult, SimulatorInfo, StateEntry, TargetData,
    TargetType, WireGate,
};
