//! Multi-signal control environment.
//!
//! Implements the per-tick loop:
//! validate → act → tick timers → advance network → reward → observe → done.

use std::collections::HashMap;

use super::config::EnvConfig;
use super::error::EnvError;
use super::observation::ObservationBuilder;
use super::phase::{PhaseController, PhaseTransition};
use super::reward::RewardComputer;
use super::signal::SignalState;
use super::types::{PhaseMap, RewardMode, SignalMap};
use crate::network::{NetworkError, TrafficNetwork};
use crate::units::SimTime;
use crate::Id;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepResult {
    /// Per-signal observations after the tick.
    pub observations: SignalMap<Vec<f64>>,
    /// Per-signal cumulative rewards after the tick.
    pub rewards: SignalMap<f64>,
    /// Whether simulated time has reached the horizon.
    pub done: bool,
    /// Simulated time after the tick.
    #[cfg_attr(feature = "serde", serde(with = "crate::units::seconds_serde"))]
    pub time: SimTime,
    /// Steps taken this episode, including the seeding step of the reset.
    pub step: u64,
}

/// The multi-signal traffic control environment.
///
/// Owns the simulated network for its whole lifetime. Every query and
/// command to the network goes through [`TrafficEnvironment::reset`],
/// [`TrafficEnvironment::step`] or [`TrafficEnvironment::close`].
///
/// # Lifecycle
///
/// 1. Call [`TrafficEnvironment::new`] with configuration and a network.
/// 2. Call [`TrafficEnvironment::reset`] to (re)start the network and seed
///    the first observations.
/// 3. Repeatedly call [`TrafficEnvironment::step`] with per-signal actions
///    until `done`.
/// 4. Call [`TrafficEnvironment::close`], or drop the environment.
#[derive(Debug)]
pub struct TrafficEnvironment<N: TrafficNetwork> {
    config: EnvConfig,
    controller: PhaseController,
    network: N,
    signals: Vec<SignalState>,
    index: HashMap<Id, usize>,
    episode_id: Option<Id>,
    steps: u64,
    done: bool,
}

impl<N: TrafficNetwork> TrafficEnvironment<N> {
    /// Creates an environment around `network`. The network is not started
    /// until the first [`TrafficEnvironment::reset`].
    pub fn new(config: EnvConfig, network: N) -> Result<Self, EnvError> {
        config.validate()?;
        Ok(Self {
            controller: PhaseController::from_config(&config),
            config,
            network,
            signals: Vec::new(),
            index: HashMap::new(),
            episode_id: None,
            steps: 0,
            done: false,
        })
    }

    /// Starts a fresh episode.
    ///
    /// Stops the network (tolerating one that is not running), starts it
    /// again, rebuilds every signal from scratch and performs one step with
    /// the configured default action to seed observations and rewards.
    ///
    /// If any of this fails the network is stopped again and the environment
    /// stays uninitialised.
    pub fn reset(&mut self) -> Result<StepResult, EnvError> {
        self.shutdown()?;

        self.network.start(&self.config.network)?;
        let signals = match self.build_registry() {
            Ok(signals) => signals,
            Err(e) => {
                self.abort_start();
                return Err(e);
            }
        };

        let episode_id = crate::generate_id();
        log::info!(
            "Episode {} started (scenario={:?}, reward={}, min_green={}, yellow_time={})",
            episode_id,
            self.config.network.scenario,
            self.config.reward_mode,
            self.controller.min_green(),
            self.controller.yellow_time()
        );
        self.episode_id = Some(episode_id);
        self.index = signals
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        self.signals = signals;

        let defaults: HashMap<Id, usize> = self
            .signals
            .iter()
            .map(|s| (s.id.clone(), self.config.default_action.resolve(s)))
            .collect();
        match self.step(&defaults) {
            Ok(result) => Ok(result),
            Err(e) => {
                if let Err(stop_err) = self.shutdown() {
                    log::warn!("Failed to stop network after aborted reset: {}", stop_err);
                }
                Err(e)
            }
        }
    }

    /// Executes one environment step.
    ///
    /// Follows the loop:
    /// 1. Validate every action (nothing is mutated if any is rejected)
    /// 2. Apply each signal's action through the phase controller
    /// 3. Advance every signal's active timer
    /// 4. Advance the network by one tick
    /// 5. Compute cumulative rewards
    /// 6. Build observations
    /// 7. Check the horizon
    ///
    /// Signals absent from `actions` keep their phase; their timers still
    /// advance in step 3.
    pub fn step(&mut self, actions: &HashMap<Id, usize>) -> Result<StepResult, EnvError> {
        if self.episode_id.is_none() {
            return Err(EnvError::NotInitialized);
        }

        // 1. Validate
        for (id, &action) in actions {
            let idx = *self
                .index
                .get(id)
                .ok_or_else(|| EnvError::UnknownSignal(id.clone()))?;
            PhaseController::validate(&self.signals[idx], action)?;
        }

        // 2. Act, in registry order
        for signal in self.signals.iter_mut() {
            let Some(&action) = actions.get(&signal.id) else {
                continue;
            };
            let transition = self.controller.apply(signal, action, &mut self.network)?;
            match transition {
                PhaseTransition::BeginClearance {
                    from_phase,
                    yellow_phase,
                } => log::debug!(
                    "Signal {}: green {} -> yellow {} (pending action {})",
                    signal.id,
                    from_phase,
                    yellow_phase,
                    action
                ),
                PhaseTransition::CommitGreen { phase } => {
                    log::debug!("Signal {}: yellow -> green {}", signal.id, phase)
                }
                PhaseTransition::HoldGreen | PhaseTransition::HoldYellow => {}
            }
        }

        // 3. Tick timers
        for signal in self.signals.iter_mut() {
            signal.tick_timer();
        }

        // 4. Advance the network
        self.network.advance_one_tick()?;
        self.steps += 1;

        // 5. Rewards
        let congestion = match self.config.reward_mode {
            RewardMode::Collaborative => {
                RewardComputer::total_congestion(&self.signals, &self.network)?
            }
            RewardMode::Individual => 0.0,
        };
        let mut rewards = SignalMap::with_capacity(self.signals.len());
        for signal in self.signals.iter_mut() {
            let reward = RewardComputer::compute(
                signal,
                self.config.reward_mode,
                &self.network,
                congestion,
            )?;
            rewards.push(signal.id.clone(), reward);
        }

        // 6. Observations
        let observations = ObservationBuilder::build_all(
            &self.signals,
            &self.network,
            self.controller.min_green(),
        )?;

        // 7. Horizon
        let time = self.network.simulated_time()?;
        let done = time.value() >= self.config.horizon.value();
        if done && !self.done {
            log::info!(
                "Episode {} reached horizon after {} steps ({:.1}s)",
                self.episode_id.as_deref().unwrap_or("?"),
                self.steps,
                time.value()
            );
        }
        self.done = done;

        Ok(StepResult {
            observations,
            rewards,
            done,
            time,
            step: self.steps,
        })
    }

    /// Stops the network and discards the signal registry.
    pub fn close(&mut self) -> Result<(), EnvError> {
        self.shutdown()
    }

    /// Ids of all registered signals, in registry order.
    pub fn signal_ids(&self) -> Vec<Id> {
        self.signals.iter().map(|s| s.id.clone()).collect()
    }

    /// Number of actions accepted by `signal`.
    pub fn num_actions(&self, signal: &str) -> Result<usize, EnvError> {
        Ok(self.signal_checked(signal)?.num_actions())
    }

    /// Observation length for `signal`.
    pub fn observation_dim(&self, signal: &str) -> Result<usize, EnvError> {
        Ok(self.signal_checked(signal)?.observation_dim())
    }

    /// Current delay penalty of `signal`, as used by the reward.
    pub fn wait_time(&self, signal: &str) -> Result<f64, EnvError> {
        RewardComputer::wait_time(self.signal_checked(signal)?, &self.network)
    }

    pub fn signal(&self, id: &str) -> Option<&SignalState> {
        self.index.get(id).map(|&i| &self.signals[i])
    }

    pub fn signals(&self) -> &[SignalState] {
        &self.signals
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Read-only view of the owned network.
    pub fn network(&self) -> &N {
        &self.network
    }

    /// Identifier of the running episode, if any.
    pub fn episode_id(&self) -> Option<&str> {
        self.episode_id.as_deref()
    }

    /// Steps taken in the current episode.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn signal_checked(&self, id: &str) -> Result<&SignalState, EnvError> {
        self.signal(id)
            .ok_or_else(|| EnvError::UnknownSignal(id.to_string()))
    }

    fn build_registry(&self) -> Result<Vec<SignalState>, EnvError> {
        let ids = self.network.signal_ids()?;
        let mut signals = Vec::with_capacity(ids.len());
        for id in ids {
            let lanes = self.network.controlled_lanes(&id)?;
            let program = self.network.phase_program(&id)?;
            let phase_map = PhaseMap::from_program(&id, &program)?;
            signals.push(SignalState::new(id, lanes, phase_map));
        }
        Ok(signals)
    }

    /// Stops a network started by a reset that failed before the episode
    /// began.
    fn abort_start(&mut self) {
        match self.network.stop() {
            Ok(()) | Err(NetworkError::NotRunning) => {}
            Err(e) => log::warn!("Failed to stop network after aborted reset: {}", e),
        }
    }

    /// Stops the network, swallowing only [`NetworkError::NotRunning`].
    fn shutdown(&mut self) -> Result<(), EnvError> {
        self.signals.clear();
        self.index.clear();
        self.steps = 0;
        self.done = false;
        let episode = self.episode_id.take();

        match self.network.stop() {
            Ok(()) => {
                if let Some(id) = episode {
                    log::info!("Episode {} stopped", id);
                }
                Ok(())
            }
            Err(NetworkError::NotRunning) => {
                log::warn!("Network is not running; nothing to stop");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<N: TrafficNetwork> Drop for TrafficEnvironment<N> {
    fn drop(&mut self) {
        if self.episode_id.is_none() {
            return;
        }
        if let Err(e) = self.network.stop() {
            log::warn!("Failed to stop network on drop: {}", e);
        }
    }
}
