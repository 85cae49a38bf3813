//! Core types for the signal control environment.
//!
//! Defines the green/yellow phase pairing, the reward formula selector and
//! the ordered per-signal result container.

use std::fmt;
use std::str::FromStr;

use super::error::EnvError;
use crate::network::PhaseDescriptor;
use crate::Id;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Green and yellow program indices for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePair {
    pub green: usize,
    pub yellow: usize,
}

/// Validated mapping from action indices to program phases.
///
/// Programs are laid out as alternating green/yellow pairs starting at index
/// 0: action `a` selects green phase `2a`, cleared through yellow phase
/// `2a + 1`. A trailing unpaired phase is not reachable by any action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseMap {
    pairs: Vec<PhasePair>,
}

impl PhaseMap {
    /// Builds the mapping for `signal` from its phase program.
    ///
    /// Fails with [`EnvError::MalformedProgram`] when the program cannot hold
    /// a single green/yellow pair.
    pub fn from_program(signal: &str, program: &[PhaseDescriptor]) -> Result<Self, EnvError> {
        if program.len() < 2 {
            return Err(EnvError::MalformedProgram {
                signal: signal.to_string(),
                reason: format!(
                    "expected alternating green/yellow phases, found {} phase(s)",
                    program.len()
                ),
            });
        }

        let pairs: Vec<PhasePair> = (0..program.len() / 2)
            .map(|a| PhasePair {
                green: 2 * a,
                yellow: 2 * a + 1,
            })
            .collect();

        for pair in &pairs {
            if !program[pair.yellow].has_yellow() {
                log::warn!(
                    "Signal {}: clearance phase {} ({:?}) shows no yellow light",
                    signal,
                    pair.yellow,
                    program[pair.yellow].state
                );
            }
        }

        Ok(Self { pairs })
    }

    /// Number of selectable actions (`floor(program_len / 2)`).
    pub fn num_actions(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if `action` selects a phase pair of this program.
    pub fn contains(&self, action: usize) -> bool {
        action < self.pairs.len()
    }

    /// Program index of the green phase selected by `action`.
    pub fn green_phase(&self, action: usize) -> Option<usize> {
        self.pairs.get(action).map(|p| p.green)
    }

    /// Program index of the yellow phase clearing `action`'s green.
    pub fn yellow_phase(&self, action: usize) -> Option<usize> {
        self.pairs.get(action).map(|p| p.yellow)
    }

    /// The action whose green is program phase `phase`, if any.
    pub fn action_for_green(&self, phase: usize) -> Option<usize> {
        self.pairs.iter().position(|p| p.green == phase)
    }
}

/// Reward formula applied to every signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RewardMode {
    /// Each signal is penalised by its own delay only.
    #[default]
    Individual,
    /// Own delay blended with network-wide congestion.
    Collaborative,
}

impl fmt::Display for RewardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardMode::Individual => write!(f, "individual"),
            RewardMode::Collaborative => write!(f, "collaborative"),
        }
    }
}

impl FromStr for RewardMode {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "individual" => Ok(RewardMode::Individual),
            "collaborative" => Ok(RewardMode::Collaborative),
            other => Err(EnvError::InvalidConfig(format!(
                "unknown reward mode '{}'",
                other
            ))),
        }
    }
}

/// Per-signal values in registry order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SignalMap<T> {
    entries: Vec<(Id, T)>,
}

impl<T> SignalMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends a value. Callers insert in registry order.
    pub fn push(&mut self, id: Id, value: T) {
        self.entries.push((id, value));
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Id, &T)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for SignalMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(Id, T)> for SignalMap<T> {
    fn from_iter<I: IntoIterator<Item = (Id, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for SignalMap<T> {
    type Item = (Id, T);
    type IntoIter = std::vec::IntoIter<(Id, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
