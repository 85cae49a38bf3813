//! Evaluation metrics for the signal control environment.
//!
//! Runs a policy for whole episodes and aggregates delay, reward and
//! switching statistics.

use std::fmt;

use super::environment::TrafficEnvironment;
use super::error::EnvError;
use super::policy::Policy;
use crate::network::TrafficNetwork;

/// Aggregated evaluation metrics over multiple episodes.
#[derive(Debug, Clone)]
pub struct EvaluationMetrics {
    /// Mean over episodes of the per-signal cumulative reward at episode end.
    pub mean_final_reward: f64,
    /// Mean network delay penalty per step (summed over signals).
    pub mean_wait_per_step: f64,
    /// Mean number of yellow clearances started per episode.
    pub mean_clearances: f64,
    /// Mean episode length in steps, including the seeding step.
    pub mean_episode_steps: f64,
    /// Number of episodes evaluated.
    pub n_episodes: usize,
}

/// Tracks per-episode statistics during evaluation.
#[derive(Debug, Default)]
struct EpisodeStats {
    final_reward: f64,
    total_wait: f64,
    clearances: u32,
    steps: u64,
}

impl EvaluationMetrics {
    /// Evaluates a policy over multiple episodes and returns aggregated metrics.
    ///
    /// # Arguments
    ///
    /// * `env` - The environment to evaluate in; reset at the start of every episode
    /// * `policy` - The policy to evaluate
    /// * `n_episodes` - Number of episodes to run
    ///
    /// Fails with [`EnvError::InvalidConfig`] if a step does not advance
    /// simulated time.
    pub fn evaluate<N: TrafficNetwork>(
        env: &mut TrafficEnvironment<N>,
        policy: &mut dyn Policy,
        n_episodes: usize,
    ) -> Result<Self, EnvError> {
        let mut all_stats = Vec::with_capacity(n_episodes);

        for _ in 0..n_episodes {
            let mut result = env.reset()?;
            let mut stats = EpisodeStats::default();

            while !result.done {
                let was_yellow: Vec<bool> = env.signals().iter().map(|s| s.is_yellow).collect();
                let actions = policy.select_actions(&result.observations);
                let before = result.time.value();
                result = env.step(&actions)?;
                if result.time.value() <= before {
                    return Err(EnvError::InvalidConfig(format!(
                        "simulated time stalled at {}s; the horizon can never be reached",
                        before
                    )));
                }

                stats.clearances += env
                    .signals()
                    .iter()
                    .zip(&was_yellow)
                    .filter(|&(s, &before)| s.is_yellow && !before)
                    .count() as u32;
                for id in env.signal_ids() {
                    stats.total_wait += env.wait_time(&id)?;
                }
            }

            stats.steps = result.step;
            let n_signals = result.rewards.len().max(1) as f64;
            stats.final_reward = result.rewards.values().sum::<f64>() / n_signals;
            all_stats.push(stats);
        }

        let n = all_stats.len().max(1) as f64;
        let mean_final_reward = all_stats.iter().map(|s| s.final_reward).sum::<f64>() / n;
        let mean_wait_per_step = all_stats
            .iter()
            .map(|s| {
                if s.steps > 0 {
                    s.total_wait / s.steps as f64
                } else {
                    0.0
                }
            })
            .sum::<f64>()
            / n;
        let mean_clearances = all_stats
            .iter()
            .map(|s| s.clearances as f64)
            .sum::<f64>()
            / n;
        let mean_episode_steps = all_stats.iter().map(|s| s.steps as f64).sum::<f64>() / n;

        Ok(Self {
            mean_final_reward,
            mean_wait_per_step,
            mean_clearances,
            mean_episode_steps,
            n_episodes,
        })
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Evaluation Metrics ({} episodes) ===",
            self.n_episodes
        )?;
        writeln!(f, "  Mean final reward:       {:.2}", self.mean_final_reward)?;
        writeln!(f, "  Mean wait per step:      {:.2}", self.mean_wait_per_step)?;
        writeln!(f, "  Mean clearances:         {:.1}", self.mean_clearances)?;
        writeln!(f, "  Mean episode steps:      {:.1}", self.mean_episode_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::queue::two_approach_program;
    use crate::network::QueueNetwork;
    use crate::rl::{EnvConfig, FixedTimePolicy, RandomPolicy};
    use crate::units::seconds;

    fn make_env() -> TrafficEnvironment<QueueNetwork> {
        let network = QueueNetwork::builder()
            .intersection("tl", &["n", "s", "e", "w"], two_approach_program())
            .arrival_rate(0.4)
            .seed(3)
            .build();
        let config = EnvConfig {
            horizon: seconds(30.0),
            ..EnvConfig::default()
        };
        TrafficEnvironment::new(config, network).unwrap()
    }

    #[test]
    fn evaluate_completes() {
        let mut env = make_env();
        env.reset().unwrap();
        let mut policy = RandomPolicy::for_env(&env, 1);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 3).unwrap();
        assert_eq!(metrics.n_episodes, 3);
        assert_eq!(metrics.mean_episode_steps, 30.0);
        assert!(metrics.mean_final_reward <= 0.0);
    }

    #[test]
    fn fixed_time_policy_switches() {
        let mut env = make_env();
        env.reset().unwrap();
        let mut policy = FixedTimePolicy::for_env(&env, 10);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 1).unwrap();
        assert!(metrics.mean_clearances >= 1.0);
        assert!(metrics.to_string().contains("1 episodes"));
    }

    #[test]
    fn zero_tick_length_still_terminates() {
        let network = QueueNetwork::builder()
            .intersection("tl", &["n", "s"], two_approach_program())
            .tick_length(0.0)
            .build();
        let config = EnvConfig {
            horizon: seconds(10.0),
            ..EnvConfig::default()
        };
        let mut env = TrafficEnvironment::new(config, network).unwrap();
        env.reset().unwrap();
        let mut policy = FixedTimePolicy::for_env(&env, 3);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 2).unwrap();
        assert_eq!(metrics.mean_episode_steps, 10.0);
    }
}
