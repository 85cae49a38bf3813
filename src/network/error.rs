use thiserror::Error;

use crate::Id;

/// Failures reported by a simulated road network.
///
/// Only [`NetworkError::NotRunning`] is ever recovered from, and only at the
/// start/stop boundary. Every other variant invalidates the episode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Simulated network is not running")]
    NotRunning,

    #[error("Simulated network is already running")]
    AlreadyRunning,

    #[error("Simulated network unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown signal: {0}")]
    UnknownSignal(Id),

    #[error("Unknown lane: {0}")]
    UnknownLane(Id),

    #[error("Unknown vehicle: {0}")]
    UnknownVehicle(Id),

    #[error("Phase {phase} out of range for signal {signal} ({len} phases)")]
    PhaseOutOfRange { signal: Id, phase: usize, len: usize },
}
