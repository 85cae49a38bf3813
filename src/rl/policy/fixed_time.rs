//! Fixed-time cycling policy.

use std::collections::HashMap;

use super::trait_::Policy;
use crate::network::TrafficNetwork;
use crate::rl::environment::TrafficEnvironment;
use crate::rl::types::SignalMap;
use crate::Id;

/// Cycles every signal through its actions, requesting the next one every
/// `period` calls.
///
/// Mirrors a pre-timed controller: demand is ignored, and minimum green and
/// clearance are still enforced by the environment.
pub struct FixedTimePolicy {
    num_actions: HashMap<Id, usize>,
    period: u32,
    calls: u64,
}

impl FixedTimePolicy {
    /// Creates a new fixed-time policy.
    ///
    /// A zero `period` is treated as one.
    pub fn new(num_actions: HashMap<Id, usize>, period: u32) -> Self {
        Self {
            num_actions,
            period: period.max(1),
            calls: 0,
        }
    }

    /// Creates a policy sized for every signal of a reset environment.
    pub fn for_env<N: TrafficNetwork>(env: &TrafficEnvironment<N>, period: u32) -> Self {
        let num_actions = env
            .signals()
            .iter()
            .map(|s| (s.id.clone(), s.num_actions()))
            .collect();
        Self::new(num_actions, period)
    }

    fn current_slot(&self) -> u64 {
        self.calls / u64::from(self.period)
    }
}

impl Policy for FixedTimePolicy {
    fn select_actions(&mut self, observations: &SignalMap<Vec<f64>>) -> HashMap<Id, usize> {
        let slot = self.current_slot();
        self.calls += 1;

        observations
            .ids()
            .filter_map(|id| {
                let n = *self.num_actions.get(id)?;
                if n == 0 {
                    return None;
                }
                Some((id.clone(), (slot % n as u64) as usize))
            })
            .collect()
    }

    fn name(&self) -> &str {
        "fixed-time"
    }
}
