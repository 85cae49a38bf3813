//! Simulated road network interface.
//!
//! The environment never models vehicles itself. Everything it knows about
//! lanes, vehicles and signal phases comes through [`TrafficNetwork`], and the
//! only way it moves simulated time forward is
//! [`TrafficNetwork::advance_one_tick`].
//!
//! [`QueueNetwork`] is an in-memory implementation used by the demos and the
//! test suite.

pub mod error;
pub mod queue;

pub use error::NetworkError;
pub use queue::{QueueNetwork, QueueNetworkBuilder};

use crate::units::SimTime;
use crate::Id;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings passed to [`TrafficNetwork::start`] on every episode reset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkConfig {
    /// Scenario the network should load (a configuration file path for
    /// external simulators, a label for in-memory ones).
    pub scenario: String,
    /// Whether the simulator should open its graphical front end.
    pub gui: bool,
}

impl NetworkConfig {
    /// Creates a headless configuration for the given scenario.
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            gui: false,
        }
    }
}

/// One entry of a signal's phase program.
///
/// `state` holds one light character per controlled lane, in lane order:
/// `G`/`g` green, `y` yellow, `r` red.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseDescriptor {
    pub state: String,
    /// Nominal duration in seconds. Ignored while the environment controls the
    /// signal.
    pub duration: f64,
}

impl PhaseDescriptor {
    pub fn new(state: impl Into<String>, duration: f64) -> Self {
        Self {
            state: state.into(),
            duration,
        }
    }

    /// Returns true if the lane at `lane_idx` may discharge in this phase.
    pub fn is_green_for(&self, lane_idx: usize) -> bool {
        matches!(self.state.chars().nth(lane_idx), Some('G') | Some('g'))
    }

    /// Returns true if any light in this phase shows yellow.
    pub fn has_yellow(&self) -> bool {
        self.state.chars().any(|c| c == 'y' || c == 'Y')
    }
}

/// Query/command interface to a simulated road network.
///
/// Every call is fallible. A network that has been stopped answers queries
/// with [`NetworkError::Unavailable`] and a second [`TrafficNetwork::stop`]
/// with [`NetworkError::NotRunning`].
pub trait TrafficNetwork {
    /// Launches the simulation for a new episode.
    fn start(&mut self, config: &NetworkConfig) -> Result<(), NetworkError>;

    /// Tears the simulation down.
    fn stop(&mut self) -> Result<(), NetworkError>;

    /// Ordered ids of every traffic signal in the network.
    fn signal_ids(&self) -> Result<Vec<Id>, NetworkError>;

    /// Ordered ids of the lanes controlled by `signal`.
    fn controlled_lanes(&self, signal: &str) -> Result<Vec<Id>, NetworkError>;

    /// The signal's full phase program.
    fn phase_program(&self, signal: &str) -> Result<Vec<PhaseDescriptor>, NetworkError>;

    /// Index of the phase the signal currently shows.
    fn current_phase(&self, signal: &str) -> Result<usize, NetworkError>;

    /// Switches the signal to `phase` immediately.
    fn set_phase(&mut self, signal: &str, phase: usize) -> Result<(), NetworkError>;

    /// Ticks spent in the current phase.
    fn phase_elapsed_ticks(&self, signal: &str) -> Result<u32, NetworkError>;

    /// Ids of the vehicles on `lane` after the last tick.
    fn lane_vehicle_ids(&self, lane: &str) -> Result<Vec<Id>, NetworkError>;

    /// Accumulated waiting time of a vehicle, in seconds.
    fn vehicle_waiting_time(&self, vehicle: &str) -> Result<f64, NetworkError>;

    /// Current speed of a vehicle.
    fn vehicle_speed(&self, vehicle: &str) -> Result<f64, NetworkError>;

    /// Mean vehicle speed on `lane` during the last tick.
    fn lane_mean_speed(&self, lane: &str) -> Result<f64, NetworkError>;

    /// Number of vehicles on `lane` during the last tick.
    fn lane_vehicle_count(&self, lane: &str) -> Result<usize, NetworkError>;

    /// Fraction of `lane` occupied by vehicles, in `[0, 1]`.
    fn lane_occupancy(&self, lane: &str) -> Result<f64, NetworkError>;

    /// Advances the whole network by one discrete tick. Blocks until done.
    fn advance_one_tick(&mut self) -> Result<(), NetworkError>;

    /// Simulated time elapsed since the network was started.
    fn simulated_time(&self) -> Result<SimTime, NetworkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn green_lanes_follow_state_string() {
        let phase = PhaseDescriptor::new("GgrR", 30.0);
        assert!(phase.is_green_for(0));
        assert!(phase.is_green_for(1));
        assert!(!phase.is_green_for(2));
        assert!(!phase.is_green_for(3));
        // lanes beyond the state string are red
        assert!(!phase.is_green_for(4));
    }

    #[test]
    fn yellow_detection() {
        assert!(PhaseDescriptor::new("yyrr", 3.0).has_yellow());
        assert!(!PhaseDescriptor::new("GGrr", 30.0).has_yellow());
    }

    #[test]
    fn network_config_defaults_headless() {
        let cfg = NetworkConfig::new("grid.sumocfg");
        assert_eq!(cfg.scenario, "grid.sumocfg");
        assert!(!cfg.gui);
    }
}
