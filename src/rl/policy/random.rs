//! Random policy for testing and baselines.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::trait_::Policy;
use crate::network::TrafficNetwork;
use crate::rl::environment::TrafficEnvironment;
use crate::rl::types::SignalMap;
use crate::Id;

/// Uniformly random action selection.
///
/// Each signal independently selects a random action from
/// `[0, num_actions)`. Used for sanity checks and as a lower-bound baseline.
pub struct RandomPolicy {
    num_actions: HashMap<Id, usize>,
    rng: StdRng,
}

impl RandomPolicy {
    /// Creates a new random policy.
    ///
    /// # Arguments
    ///
    /// * `num_actions` - Number of actions per signal id.
    /// * `seed` - Random seed for reproducible runs.
    pub fn new(num_actions: HashMap<Id, usize>, seed: u64) -> Self {
        Self {
            num_actions,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a policy sized for every signal of a reset environment.
    pub fn for_env<N: TrafficNetwork>(env: &TrafficEnvironment<N>, seed: u64) -> Self {
        let num_actions = env
            .signals()
            .iter()
            .map(|s| (s.id.clone(), s.num_actions()))
            .collect();
        Self::new(num_actions, seed)
    }
}

impl Policy for RandomPolicy {
    fn select_actions(&mut self, observations: &SignalMap<Vec<f64>>) -> HashMap<Id, usize> {
        let mut actions = HashMap::with_capacity(observations.len());
        for id in observations.ids() {
            match self.num_actions.get(id) {
                Some(&n) if n > 0 => {
                    actions.insert(id.clone(), self.rng.gen_range(0..n));
                }
                _ => {}
            }
        }
        actions
    }

    fn name(&self) -> &str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observations(ids: &[&str]) -> SignalMap<Vec<f64>> {
        ids.iter()
            .map(|id| (id.to_string(), vec![0.0; 7]))
            .collect()
    }

    #[test]
    fn random_policy_covers_every_known_signal() {
        let counts = HashMap::from([("a".to_string(), 2), ("b".to_string(), 3)]);
        let mut policy = RandomPolicy::new(counts, 7);
        let actions = policy.select_actions(&observations(&["a", "b", "c"]));
        assert_eq!(actions.len(), 2);
        assert!(!actions.contains_key("c"));
    }

    #[test]
    fn random_policy_actions_in_range() {
        let counts = HashMap::from([("a".to_string(), 2), ("b".to_string(), 3)]);
        let mut policy = RandomPolicy::new(counts, 7);
        let obs = observations(&["a", "b"]);
        for _ in 0..200 {
            let actions = policy.select_actions(&obs);
            assert!(actions["a"] < 2);
            assert!(actions["b"] < 3);
        }
    }

    #[test]
    fn random_policy_is_seeded() {
        let counts = HashMap::from([("a".to_string(), 4)]);
        let obs = observations(&["a"]);
        let mut p1 = RandomPolicy::new(counts.clone(), 99);
        let mut p2 = RandomPolicy::new(counts, 99);
        for _ in 0..20 {
            assert_eq!(p1.select_actions(&obs), p2.select_actions(&obs));
        }
    }
}
