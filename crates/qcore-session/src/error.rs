//! Error types for exercise sessions.

use qcore_circuit::CircuitError;
use qcore_gateway::GatewayError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors returned by [`ExerciseSession`](crate::ExerciseSession).
///
/// Backend failures during previews and submissions never show up here;
/// they are stored as failed results instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// A submission for this session has not finished yet.
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// The circuit refused the edit.
    #[error("Invalid placement: {0}")]
    Placement(#[from] CircuitError),

    /// The exercise could not be fetched.
    #[error("Could not load exercise: {0}")]
    Load(#[from] GatewayError),
}
