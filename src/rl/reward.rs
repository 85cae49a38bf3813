//! Congestion reward for the signal control environment.
//!
//! Combines a per-signal delay penalty with an optional network-wide
//! occupancy penalty, and accumulates the result per signal.

use super::error::EnvError;
use super::signal::SignalState;
use super::types::RewardMode;
use crate::network::TrafficNetwork;

/// Computes rewards for the signal control environment.
pub struct RewardComputer;

impl RewardComputer {
    /// Vehicles slower than this count as stopped.
    pub const STOPPED_SPEED_THRESHOLD: f64 = 0.1;
    /// Weight of the signal's own delay in collaborative mode.
    pub const INDIVIDUAL_WEIGHT: f64 = 0.75;
    /// Weight of network-wide congestion in collaborative mode.
    pub const COLLECTIVE_WEIGHT: f64 = 1.0;

    /// Delay penalty for one signal.
    ///
    /// Sum of accumulated waiting time over every vehicle on the signal's
    /// controlled lanes, plus one per vehicle moving slower than
    /// [`Self::STOPPED_SPEED_THRESHOLD`].
    pub fn wait_time<N>(signal: &SignalState, network: &N) -> Result<f64, EnvError>
    where
        N: TrafficNetwork + ?Sized,
    {
        let mut waiting = 0.0;
        let mut stopped = 0usize;
        for lane in &signal.controlled_lanes {
            for vehicle in network.lane_vehicle_ids(lane)? {
                waiting += network.vehicle_waiting_time(&vehicle)?;
                if network.vehicle_speed(&vehicle)? < Self::STOPPED_SPEED_THRESHOLD {
                    stopped += 1;
                }
            }
        }
        Ok(waiting + stopped as f64)
    }

    /// Sum of lane occupancy over every controlled lane of every signal.
    pub fn total_congestion<N>(signals: &[SignalState], network: &N) -> Result<f64, EnvError>
    where
        N: TrafficNetwork + ?Sized,
    {
        let mut total = 0.0;
        for signal in signals {
            for lane in &signal.controlled_lanes {
                total += network.lane_occupancy(lane)?;
            }
        }
        Ok(total)
    }

    /// Reward for a single tick, before accumulation.
    ///
    /// # Components
    ///
    /// - `Individual`: `-wait_time`
    /// - `Collaborative`: `0.75 × (-wait_time) + 1.0 × (-total_congestion)`
    pub fn instant(mode: RewardMode, wait_time: f64, total_congestion: f64) -> f64 {
        match mode {
            RewardMode::Individual => -wait_time,
            RewardMode::Collaborative => {
                Self::INDIVIDUAL_WEIGHT * (-wait_time)
                    + Self::COLLECTIVE_WEIGHT * (-total_congestion)
            }
        }
    }

    /// Computes this tick's reward for `signal` and folds it into the
    /// signal's running total, which is returned.
    ///
    /// `total_congestion` is measured once per tick by the caller and shared
    /// by every signal; it is ignored in individual mode.
    pub fn compute<N>(
        signal: &mut SignalState,
        mode: RewardMode,
        network: &N,
        total_congestion: f64,
    ) -> Result<f64, EnvError>
    where
        N: TrafficNetwork + ?Sized,
    {
        let wait = Self::wait_time(signal, network)?;
        let instant = Self::instant(mode, wait, total_congestion);
        Ok(signal.accumulate_reward(instant))
    }
}
