//! The simulation gateway trait.
//!
//! # Lifecycle
//!
//! ```text
//!   gates() ──→ exercise(id) ──→ simulate(req)* ──→ score(id, req)
//!  (catalog)     (read-only)      (previews)         (grading)
//! ```
//!
//! Every method is one request/response exchange: no retries, no
//! cancellation. Callers own the request payload, so nothing the caller
//! edits afterwards can leak into a request already handed over.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use qcore_circuit::GateCatalog;

use crate::error::GatewayResult;
use crate::wire::{
    ExerciseSpec, GateListing, HealthStatus, ScoreRequest, ScoreResult, SimulateRequest,
    SimulationResult,
};

/// Trait for simulation backends.
///
/// `simulate` and `score` return `Ok` for any response the backend
/// produced, including unsuccessful simulations (see
/// [`SimulationResult::is_failure`]). `Err` is reserved for transport
/// failures, non-success statuses and requests refused locally.
#[async_trait]
pub trait SimulationGateway: Send + Sync {
    /// Simulate a circuit.
    async fn simulate(&self, request: &SimulateRequest) -> GatewayResult<SimulationResult>;

    /// Grade a circuit against an exercise.
    async fn score(&self, exercise_id: &str, request: &ScoreRequest) -> GatewayResult<ScoreResult>;

    /// Fetch one exercise definition.
    async fn exercise(&self, id: &str) -> GatewayResult<ExerciseSpec>;

    /// Fetch every exercise, sorted by difficulty then id.
    async fn exercises(&self) -> GatewayResult<Vec<ExerciseSpec>>;

    /// Fetch the backend's gate listing.
    async fn gates(&self) -> GatewayResult<GateListing>;

    /// Check backend liveness.
    async fn health(&self) -> GatewayResult<HealthStatus>;

    /// Fetch the gate listing as a catalog.
    async fn catalog(&self) -> GatewayResult<GateCatalog> {
        Ok(self.gates().await?.to_catalog())
    }
}

/// Process-wide gate catalog, fetched at most once.
///
/// The first successful fetch wins; failed fetches are not cached, so a
/// later call tries again.
#[derive(Debug, Default)]
pub struct CatalogCache {
    cell: OnceCell<GateCatalog>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached catalog, fetching it from `gateway` on first use.
    pub async fn get_or_fetch(&self, gateway: &dyn SimulationGateway) -> GatewayResult<&GateCatalog> {
        self.cell
            .get_or_try_init(|| async {
                debug!("Fetching gate catalog");
                gateway.catalog().await
            })
            .await
    }

    /// The cached catalog, or the built-in one when the fetch fails.
    ///
    /// The fallback is not cached.
    pub async fn get_or_standard(&self, gateway: &dyn SimulationGateway) -> GateCatalog {
        match self.get_or_fetch(gateway).await {
            Ok(catalog) => catalog.clone(),
            Err(e) => {
                warn!("Gate catalog unavailable, using built-in gates: {}", e);
                GateCatalog::standard()
            }
        }
    }

    /// The catalog if it was already fetched.
    pub fn get(&self) -> Option<&GateCatalog> {
        self.cell.get()
    }
}
