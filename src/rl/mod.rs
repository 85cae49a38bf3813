//! Multi-agent signal control environment.
//!
//! [`TrafficEnvironment`] drives every signal of a [`TrafficNetwork`] one
//! tick at a time: each signal's requested action goes through the
//! [`PhaseController`] state machine, the network advances, and per-signal
//! rewards ([`RewardComputer`]) and observations ([`ObservationBuilder`]) are
//! measured on the post-tick state.
//!
//! [`TrafficNetwork`]: crate::network::TrafficNetwork

pub mod config;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod observation;
pub mod phase;
pub mod policy;
pub mod reward;
pub mod signal;
pub mod types;

pub use config::{DefaultActionPolicy, EnvConfig};
pub use environment::{StepResult, TrafficEnvironment};
pub use error::EnvError;
pub use metrics::EvaluationMetrics;
pub use observation::ObservationBuilder;
pub use phase::{PhaseController, PhaseTransition};
pub use policy::{FixedTimePolicy, Policy, RandomPolicy};
pub use reward::RewardComputer;
pub use signal::SignalState;
pub use types::{PhaseMap, PhasePair, RewardMode, SignalMap};
