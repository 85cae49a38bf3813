use thiserror::Error;

use crate::network::NetworkError;
use crate::Id;

/// Errors surfaced by the signal control environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvError {
    #[error("Invalid action {action} for signal {signal}: expected an index below {num_actions}")]
    InvalidAction {
        signal: Id,
        action: usize,
        num_actions: usize,
    },

    #[error("Unknown signal: {0}")]
    UnknownSignal(Id),

    #[error("Malformed phase program for signal {signal}: {reason}")]
    MalformedProgram { signal: Id, reason: String },

    #[error("Signal {signal} shows phase {phase} outside a yellow interval, which is not a green phase of its program")]
    UnexpectedPhase { signal: Id, phase: usize },

    #[error("Environment has not been reset")]
    NotInitialized,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_action_display() {
        let e = EnvError::InvalidAction {
            signal: "tl_1".to_string(),
            action: 3,
            num_actions: 2,
        };
        assert_eq!(
            e.to_string(),
            "Invalid action 3 for signal tl_1: expected an index below 2"
        );
    }

    #[test]
    fn network_errors_are_transparent() {
        let e: EnvError = NetworkError::NotRunning.into();
        assert_eq!(e.to_string(), "Simulated network is not running");
        assert_eq!(e, EnvError::Network(NetworkError::NotRunning));
    }

    #[test]
    fn not_initialized_display() {
        assert_eq!(
            EnvError::NotInitialized.to_string(),
            "Environment has not been reset"
        );
    }
}
