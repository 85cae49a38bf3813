//! Configuration for the signal control environment.

use qtty::{Quantity, Second};

use super::error::EnvError;
use super::signal::SignalState;
use super::types::RewardMode;
use crate::network::NetworkConfig;
use crate::units::{convert, seconds, SameDim, SimTime};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Action applied to every signal by the seeding step of a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DefaultActionPolicy {
    pub action: usize,
}

impl DefaultActionPolicy {
    pub fn new(action: usize) -> Self {
        Self { action }
    }

    /// Resolves the default action for one signal.
    ///
    /// Signals with too few actions receive their highest valid action
    /// instead.
    pub fn resolve(&self, signal: &SignalState) -> usize {
        let num_actions = signal.num_actions();
        if self.action < num_actions {
            return self.action;
        }
        let fallback = num_actions.saturating_sub(1);
        log::warn!(
            "Default action {} out of range for signal {} ({} actions); using {}",
            self.action,
            signal.id,
            num_actions,
            fallback
        );
        fallback
    }
}

impl Default for DefaultActionPolicy {
    fn default() -> Self {
        Self { action: 1 }
    }
}

/// Configuration for the signal control environment.
///
/// Fixed when the environment is constructed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvConfig {
    /// Episode ends once simulated time reaches this value.
    #[cfg_attr(feature = "serde", serde(with = "crate::units::seconds_serde"))]
    pub horizon: SimTime,
    /// Minimum green ticks before a signal may begin clearance.
    pub min_green: u32,
    /// Yellow clearance ticks before the pending green is committed.
    pub yellow_time: u32,
    /// Reward formula.
    pub reward_mode: RewardMode,
    /// Action used by the seeding step of every reset.
    pub default_action: DefaultActionPolicy,
    /// Settings passed to the network on every start.
    pub network: NetworkConfig,
}

impl EnvConfig {
    /// Returns a copy with the horizon given in any time unit.
    pub fn with_horizon<U>(mut self, horizon: Quantity<U>) -> Self
    where
        U: SameDim<Second>,
    {
        self.horizon = convert(horizon);
        self
    }

    /// Checks that the configuration can drive an episode.
    pub fn validate(&self) -> Result<(), EnvError> {
        let horizon = self.horizon.value();
        if !horizon.is_finite() || horizon <= 0.0 {
            return Err(EnvError::InvalidConfig(format!(
                "horizon must be a positive number of seconds, got {}",
                horizon
            )));
        }
        Ok(())
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            horizon: seconds(20_000.0),
            min_green: 5,
            yellow_time: 2,
            reward_mode: RewardMode::Individual,
            default_action: DefaultActionPolicy::default(),
            network: NetworkConfig::default(),
        }
    }
}
