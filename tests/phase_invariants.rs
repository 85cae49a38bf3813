//! Property tests for the phase transition state machine and the per-tick
//! environment loop.

use std::collections::HashMap;

use proptest::prelude::*;

use greenwave::network::{NetworkConfig, PhaseDescriptor, QueueNetwork, TrafficNetwork};
use greenwave::rl::{
    EnvConfig, PhaseController, PhaseMap, PhaseTransition, SignalState, TrafficEnvironment,
};
use greenwave::units::seconds;

fn three_action_program() -> Vec<PhaseDescriptor> {
    vec![
        PhaseDescriptor::new("GGrrrr", 20.0),
        PhaseDescriptor::new("yyrrrr", 3.0),
        PhaseDescriptor::new("rrGGrr", 20.0),
        PhaseDescriptor::new("rryyrr", 3.0),
        PhaseDescriptor::new("rrrrGG", 20.0),
        PhaseDescriptor::new("rrrryy", 3.0),
    ]
}

const LANES: [&str; 6] = ["l0", "l1", "l2", "l3", "l4", "l5"];

fn started_signal() -> (SignalState, QueueNetwork) {
    let mut network = QueueNetwork::builder()
        .intersection("tl", &LANES, three_action_program())
        .arrival_rate(0.0)
        .build();
    network.start(&NetworkConfig::default()).unwrap();
    let map = PhaseMap::from_program("tl", &network.phase_program("tl").unwrap()).unwrap();
    let lanes = network.controlled_lanes("tl").unwrap();
    (SignalState::new("tl".into(), lanes, map), network)
}

proptest! {
    #[test]
    fn clearance_respects_min_green(
        min_green in 0u32..8,
        yellow_time in 0u32..4,
        actions in prop::collection::vec(0usize..3, 1..200),
    ) {
        let controller = PhaseController::new(min_green, yellow_time);
        let (mut signal, mut network) = started_signal();

        for action in actions {
            let before = signal.clone();
            let transition = controller.apply(&mut signal, action, &mut network).unwrap();
            if let PhaseTransition::BeginClearance { from_phase, yellow_phase } = transition {
                prop_assert!(!before.is_yellow);
                prop_assert!(before.green_timer >= min_green);
                prop_assert_eq!(yellow_phase, from_phase + 1);
                prop_assert_eq!(signal.pending_action, action);
            }
            prop_assert!(!(signal.is_yellow && signal.green_timer > 0));
        }
    }

    #[test]
    fn yellow_lasts_exactly_yellow_time(
        min_green in 0u32..6,
        yellow_time in 0u32..5,
        actions in prop::collection::vec(0usize..3, 1..200),
    ) {
        let controller = PhaseController::new(min_green, yellow_time);
        let (mut signal, mut network) = started_signal();
        let mut holds_in_clearance: Option<u32> = None;

        for action in actions {
            let pending = signal.pending_action;
            match controller.apply(&mut signal, action, &mut network).unwrap() {
                PhaseTransition::BeginClearance { .. } => {
                    prop_assert!(holds_in_clearance.is_none());
                    holds_in_clearance = Some(0);
                }
                PhaseTransition::HoldYellow => {
                    let holds = holds_in_clearance.as_mut().unwrap();
                    *holds += 1;
                    prop_assert!(*holds <= yellow_time);
                }
                PhaseTransition::CommitGreen { phase } => {
                    prop_assert_eq!(holds_in_clearance.take(), Some(yellow_time));
                    prop_assert_eq!(Some(phase), signal.phase_map.green_phase(pending));
                    prop_assert_eq!(network.current_phase("tl").unwrap(), phase);
                }
                PhaseTransition::HoldGreen => {
                    prop_assert!(holds_in_clearance.is_none());
                }
            }
        }
    }

    #[test]
    fn network_shows_green_or_matching_yellow(
        actions in prop::collection::vec(0usize..3, 1..150),
    ) {
        let controller = PhaseController::new(3, 2);
        let (mut signal, mut network) = started_signal();

        for action in actions {
            controller.apply(&mut signal, action, &mut network).unwrap();
            let phase = network.current_phase("tl").unwrap();
            if signal.is_yellow {
                prop_assert_eq!(phase % 2, 1);
            } else {
                prop_assert_eq!(phase % 2, 0);
            }
        }
    }

    #[test]
    fn rejected_step_leaves_environment_untouched(
        warmup in prop::collection::vec(0usize..2, 0..20),
        bad_action in 2usize..10,
    ) {
        let network = QueueNetwork::builder()
            .intersection("a", &["a0", "a1"], greenwave::network::queue::two_approach_program())
            .intersection("b", &["b0", "b1"], greenwave::network::queue::two_approach_program())
            .arrival_rate(0.3)
            .seed(11)
            .build();
        let config = EnvConfig {
            min_green: 2,
            yellow_time: 1,
            horizon: seconds(1000.0),
            ..EnvConfig::default()
        };
        let mut env = TrafficEnvironment::new(config, network).unwrap();
        env.reset().unwrap();
        for action in warmup {
            let acts: HashMap<String, usize> =
                env.signal_ids().into_iter().map(|id| (id, action)).collect();
            env.step(&acts).unwrap();
        }

        let before: Vec<_> = env
            .signals()
            .iter()
            .map(|s| (s.is_yellow, s.green_timer, s.yellow_timer, s.pending_action))
            .collect();
        let steps = env.steps();
        let time = env.network().simulated_time().unwrap().value();

        let acts = HashMap::from([("a".to_string(), 0), ("b".to_string(), bad_action)]);
        prop_assert!(env.step(&acts).is_err());

        let after: Vec<_> = env
            .signals()
            .iter()
            .map(|s| (s.is_yellow, s.green_timer, s.yellow_timer, s.pending_action))
            .collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(env.steps(), steps);
        prop_assert_eq!(env.network().simulated_time().unwrap().value(), time);
    }
}
