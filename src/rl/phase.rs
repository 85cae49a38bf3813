//! Phase transition state machine.
//!
//! Enacts one requested action on one signal for one tick, enforcing the
//! minimum green time and the yellow clearance interval:
//!
//! ```text
//!            requested != current && green_timer >= min_green
//!   GREEN ------------------------------------------------------> YELLOW
//!     ^                                                              |
//!     +---------------- yellow_timer >= yellow_time -----------------+
//! ```

use super::config::EnvConfig;
use super::error::EnvError;
use super::signal::SignalState;
use crate::network::TrafficNetwork;

/// Outcome of a single [`PhaseController::apply`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    /// Stayed green; `green_timer` advanced.
    HoldGreen,
    /// Left green; the network now shows `yellow_phase`.
    BeginClearance { from_phase: usize, yellow_phase: usize },
    /// Stayed yellow; `yellow_timer` advanced.
    HoldYellow,
    /// Clearance elapsed; the network now shows green `phase`.
    CommitGreen { phase: usize },
}

/// Minimum-green / yellow-clearance controller shared by all signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseController {
    min_green: u32,
    yellow_time: u32,
}

impl PhaseController {
    pub fn new(min_green: u32, yellow_time: u32) -> Self {
        Self {
            min_green,
            yellow_time,
        }
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self::new(config.min_green, config.yellow_time)
    }

    pub fn min_green(&self) -> u32 {
        self.min_green
    }

    pub fn yellow_time(&self) -> u32 {
        self.yellow_time
    }

    /// Rejects actions outside `[0, num_actions)` for `signal`.
    pub fn validate(signal: &SignalState, action: usize) -> Result<(), EnvError> {
        if signal.phase_map.contains(action) {
            Ok(())
        } else {
            Err(EnvError::InvalidAction {
                signal: signal.id.clone(),
                action,
                num_actions: signal.num_actions(),
            })
        }
    }

    /// Enacts `action` on `signal` for one tick.
    ///
    /// Issues at most one phase command. On error the signal is left exactly
    /// as it was: validation and every network call happen before any timer
    /// or flag is touched.
    ///
    /// Outside a clearance interval the network must show one of the
    /// program's green phases; any other phase fails with
    /// [`EnvError::UnexpectedPhase`].
    pub fn apply<N>(
        &self,
        signal: &mut SignalState,
        action: usize,
        network: &mut N,
    ) -> Result<PhaseTransition, EnvError>
    where
        N: TrafficNetwork + ?Sized,
    {
        Self::validate(signal, action)?;

        if signal.is_yellow {
            if signal.yellow_timer < self.yellow_time {
                signal.yellow_timer += 1;
                return Ok(PhaseTransition::HoldYellow);
            }

            let phase = signal
                .phase_map
                .green_phase(signal.pending_action)
                .ok_or_else(|| EnvError::InvalidAction {
                    signal: signal.id.clone(),
                    action: signal.pending_action,
                    num_actions: signal.num_actions(),
                })?;
            network.set_phase(&signal.id, phase)?;
            signal.is_yellow = false;
            signal.yellow_timer = 0;
            signal.green_timer = 0;
            return Ok(PhaseTransition::CommitGreen { phase });
        }

        let current = network.current_phase(&signal.id)?;
        let current_action = signal.phase_map.action_for_green(current).ok_or_else(|| {
            EnvError::UnexpectedPhase {
                signal: signal.id.clone(),
                phase: current,
            }
        })?;
        if action != current_action && signal.green_timer >= self.min_green {
            let yellow_phase = signal
                .phase_map
                .yellow_phase(current_action)
                .ok_or_else(|| EnvError::UnexpectedPhase {
                    signal: signal.id.clone(),
                    phase: current,
                })?;
            network.set_phase(&signal.id, yellow_phase)?;
            signal.pending_action = action;
            signal.is_yellow = true;
            signal.green_timer = 0;
            return Ok(PhaseTransition::BeginClearance {
                from_phase: current,
                yellow_phase,
            });
        }

        signal.green_timer += 1;
        Ok(PhaseTransition::HoldGreen)
    }
}
