//! Per-signal timing state.

use super::types::PhaseMap;
use crate::Id;

/// Timing and clearance state of one traffic signal.
///
/// Built fresh on every reset and mutated once per tick by the environment.
/// A signal is either green (`is_yellow == false`, `green_timer` counting)
/// or clearing (`is_yellow == true`, `yellow_timer` counting), never both.
#[derive(Debug, Clone)]
pub struct SignalState {
    /// Stable external identifier.
    pub id: Id,
    /// Controlled lanes, in the order the network reports them.
    pub controlled_lanes: Vec<Id>,
    /// Action to program-phase mapping.
    pub phase_map: PhaseMap,
    /// True during a yellow clearance interval.
    pub is_yellow: bool,
    /// Ticks spent in (or holding) the current green phase.
    pub green_timer: u32,
    /// Ticks spent in the current yellow phase.
    pub yellow_timer: u32,
    /// Action committed once the current yellow interval elapses.
    pub pending_action: usize,
    /// Running reward total for the episode.
    pub cumulative_reward: f64,
}

impl SignalState {
    /// Creates a signal in green with fresh timers.
    pub fn new(id: Id, controlled_lanes: Vec<Id>, phase_map: PhaseMap) -> Self {
        Self {
            id,
            controlled_lanes,
            phase_map,
            is_yellow: false,
            green_timer: 0,
            yellow_timer: 0,
            pending_action: 0,
            cumulative_reward: 0.0,
        }
    }

    /// Number of actions this signal accepts.
    pub fn num_actions(&self) -> usize {
        self.phase_map.num_actions()
    }

    /// Length of this signal's observation vector.
    pub fn observation_dim(&self) -> usize {
        2 * self.controlled_lanes.len() + 3
    }

    /// Advances whichever timer matches the current state by one tick.
    pub fn tick_timer(&mut self) {
        if self.is_yellow {
            self.yellow_timer += 1;
        } else {
            self.green_timer += 1;
        }
    }

    /// Adds `instant` to the running reward and returns the new total.
    pub fn accumulate_reward(&mut self, instant: f64) -> f64 {
        self.cumulative_reward += instant;
        self.cumulative_reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::PhaseDescriptor;

    fn make_signal(lanes: usize) -> SignalState {
        let program = vec![
            PhaseDescriptor::new("Gr", 30.0),
            PhaseDescriptor::new("yr", 3.0),
            PhaseDescriptor::new("rG", 30.0),
            PhaseDescriptor::new("ry", 3.0),
        ];
        let map = PhaseMap::from_program("tl", &program).unwrap();
        let lanes = (0..lanes).map(|i| format!("lane_{}", i)).collect();
        SignalState::new("tl".into(), lanes, map)
    }

    #[test]
    fn new_signal_starts_green() {
        let s = make_signal(2);
        assert!(!s.is_yellow);
        assert_eq!(s.green_timer, 0);
        assert_eq!(s.yellow_timer, 0);
        assert_eq!(s.cumulative_reward, 0.0);
        assert_eq!(s.num_actions(), 2);
    }

    #[test]
    fn observation_dim_tracks_lane_count() {
        assert_eq!(make_signal(2).observation_dim(), 7);
        assert_eq!(make_signal(5).observation_dim(), 13);
    }

    #[test]
    fn tick_timer_advances_only_active_timer() {
        let mut s = make_signal(1);
        s.tick_timer();
        assert_eq!((s.green_timer, s.yellow_timer), (1, 0));
        s.is_yellow = true;
        s.tick_timer();
        s.tick_timer();
        assert_eq!((s.green_timer, s.yellow_timer), (1, 2));
    }

    #[test]
    fn reward_accumulates() {
        let mut s = make_signal(1);
        assert_eq!(s.accumulate_reward(-3.0), -3.0);
        assert_eq!(s.accumulate_reward(-1.5), -4.5);
        assert_eq!(s.cumulative_reward, -4.5);
    }
}
