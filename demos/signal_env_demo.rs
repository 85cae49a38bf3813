// Demonstration: run the signal control environment on a two-intersection
// queue network and evaluate a baseline policy.
//
// Build/run from this repo root:
//   cargo run --example signal_env_demo -- --policy fixed --episodes 10 --reward collaborative

use std::env;

use greenwave::network::queue::two_approach_program;
use greenwave::network::{NetworkConfig, QueueNetwork};
use greenwave::rl::{
    EnvConfig, EvaluationMetrics, FixedTimePolicy, Policy, RandomPolicy, RewardMode,
    TrafficEnvironment,
};
use greenwave::units::seconds;

fn main() {
    let args: Vec<String> = env::args().collect();
    let policy_name = arg_value(&args, "--policy").unwrap_or("fixed");
    let episodes: usize = arg_value(&args, "--episodes")
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let horizon: f64 = arg_value(&args, "--horizon")
        .and_then(|s| s.parse().ok())
        .unwrap_or(600.0);
    let reward_mode: RewardMode = match arg_value(&args, "--reward").unwrap_or("individual").parse() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let network = QueueNetwork::builder()
        .intersection("west", &["w_n", "w_s", "w_e", "w_w"], two_approach_program())
        .intersection("east", &["e_n", "e_s", "e_e", "e_w"], two_approach_program())
        .arrival_rate(0.25)
        .seed(seed)
        .build();
    let config = EnvConfig {
        horizon: seconds(horizon),
        reward_mode,
        network: NetworkConfig::new("two_intersections"),
        ..EnvConfig::default()
    };

    let mut env = match TrafficEnvironment::new(config, network) {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    // Populates the signal registry the policies size themselves from.
    if let Err(e) = env.reset() {
        eprintln!("Reset failed: {}", e);
        std::process::exit(1);
    }

    let mut policy: Box<dyn Policy> = match policy_name {
        "random" => Box::new(RandomPolicy::for_env(&env, seed)),
        "fixed" => Box::new(FixedTimePolicy::for_env(&env, 30)),
        other => {
            eprintln!("Unknown --policy '{}'; expected 'fixed' or 'random'.", other);
            std::process::exit(2);
        }
    };

    match EvaluationMetrics::evaluate(&mut env, policy.as_mut(), episodes) {
        Ok(metrics) => {
            println!("Policy: {} (reward: {})", policy.name(), reward_mode);
            println!("{}", metrics);
        }
        Err(e) => {
            eprintln!("Evaluation failed: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = env.close() {
        eprintln!("Close failed: {}", e);
    }
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
