//! Configuration and step results as JSON (requires the `serde` feature).
#![cfg(feature = "serde")]

use std::collections::HashMap;

use greenwave::network::queue::two_approach_program;
use greenwave::network::QueueNetwork;
use greenwave::rl::{EnvConfig, RewardMode, StepResult, TrafficEnvironment};

#[test]
fn config_reads_horizon_as_seconds() {
    let json = r#"{
        "horizon": 3600.0,
        "min_green": 10,
        "yellow_time": 3,
        "reward_mode": "collaborative",
        "default_action": { "action": 0 },
        "network": { "scenario": "grid.sumocfg", "gui": false }
    }"#;
    let config: EnvConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.horizon.value(), 3600.0);
    assert_eq!(config.min_green, 10);
    assert_eq!(config.reward_mode, RewardMode::Collaborative);
    assert_eq!(config.default_action.action, 0);
    assert_eq!(config.network.scenario, "grid.sumocfg");
    config.validate().unwrap();
}

#[test]
fn step_result_serializes_in_registry_order() {
    let network = QueueNetwork::builder()
        .intersection("b", &["b0"], two_approach_program())
        .intersection("a", &["a0"], two_approach_program())
        .arrival_rate(0.0)
        .build();
    let mut env = TrafficEnvironment::new(EnvConfig::default(), network).unwrap();
    env.reset().unwrap();
    let result = env.step(&HashMap::new()).unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["time"], 2.0);
    assert_eq!(value["step"], 2);
    assert_eq!(value["done"], false);

    let back: StepResult = serde_json::from_value(value).unwrap();
    assert_eq!(back.rewards, result.rewards);
    assert_eq!(back.observations.len(), 2);
    assert_eq!(back.rewards.ids().cloned().collect::<Vec<_>>(), vec!["b", "a"]);
}
