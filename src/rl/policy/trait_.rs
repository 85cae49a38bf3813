//! Policy trait for the signal control environment.

use std::collections::HashMap;

use crate::rl::types::SignalMap;
use crate::Id;

/// A policy that selects one action per signal from observations.
///
/// Actions index a signal's green phases: action `a` requests program
/// phase `2a`. The environment decides whether and when the request is
/// enacted.
pub trait Policy {
    /// Selects actions given per-signal observations.
    ///
    /// # Arguments
    ///
    /// * `observations` - Per-signal observation vectors (from [`ObservationBuilder`](crate::rl::ObservationBuilder))
    ///
    /// # Returns
    ///
    /// A map from signal id to action. Signals left out hold their phase.
    fn select_actions(&mut self, observations: &SignalMap<Vec<f64>>) -> HashMap<Id, usize>;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
