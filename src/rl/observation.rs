//! Observation encoding for the signal control environment.
//!
//! Builds per-signal observation vectors from post-tick lane measurements.

use super::error::EnvError;
use super::signal::SignalState;
use super::types::SignalMap;
use crate::network::TrafficNetwork;

/// Builds observation vectors for signals.
pub struct ObservationBuilder;

impl ObservationBuilder {
    /// Number of trailing phase features appended after the lane features.
    pub const PHASE_FEATURE_DIM: usize = 3; // phase, ticks_in_phase, ready

    /// Builds the observation vector for one signal.
    ///
    /// The observation is a flat `Vec<f64>` with structure:
    /// ```text
    /// [mean_speed(lane_1..n)] ++ [vehicle_count(lane_1..n)] ++ [phase, ticks_in_phase, ready]
    /// ```
    ///
    /// `ready` is 1.0 once the network reports at least `min_green` ticks in
    /// the current phase, 0.0 otherwise.
    pub fn build<N>(
        signal: &SignalState,
        network: &N,
        min_green: u32,
    ) -> Result<Vec<f64>, EnvError>
    where
        N: TrafficNetwork + ?Sized,
    {
        let lanes = &signal.controlled_lanes;
        let mut obs = Vec::with_capacity(Self::dim(lanes.len()));

        for lane in lanes {
            obs.push(network.lane_mean_speed(lane)?);
        }
        for lane in lanes {
            obs.push(network.lane_vehicle_count(lane)? as f64);
        }

        let phase = network.current_phase(&signal.id)?;
        let ticks_in_phase = network.phase_elapsed_ticks(&signal.id)?;
        let ready = ticks_in_phase >= min_green;

        obs.push(phase as f64);
        obs.push(ticks_in_phase as f64);
        obs.push(if ready { 1.0 } else { 0.0 });

        Ok(obs)
    }

    /// Builds observations for all signals, in registry order.
    pub fn build_all<N>(
        signals: &[SignalState],
        network: &N,
        min_green: u32,
    ) -> Result<SignalMap<Vec<f64>>, EnvError>
    where
        N: TrafficNetwork + ?Sized,
    {
        let mut out = SignalMap::with_capacity(signals.len());
        for signal in signals {
            out.push(signal.id.clone(), Self::build(signal, network, min_green)?);
        }
        Ok(out)
    }

    /// Observation length for a signal controlling `n_lanes` lanes.
    pub fn dim(n_lanes: usize) -> usize {
        2 * n_lanes + Self::PHASE_FEATURE_DIM
    }
}
