//! In-memory queueing road network.
//!
//! Each controlled lane is a FIFO queue in front of its signal. Per tick:
//! 1. Lanes whose signal shows green discharge up to `discharge_per_tick`
//!    vehicles from the front of the queue.
//! 2. Every vehicle still queued is stopped and accrues one tick of waiting.
//! 3. New vehicles arrive per lane with probability `arrival_rate`, moving at
//!    free-flow speed.
//!
//! Phases never advance on their own: the program only changes when
//! [`TrafficNetwork::set_phase`] is called.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{NetworkConfig, NetworkError, PhaseDescriptor, TrafficNetwork};
use crate::units::{seconds, SimTime};
use crate::Id;

/// Static description of one signalised intersection.
#[derive(Debug, Clone)]
pub struct IntersectionTemplate {
    pub id: Id,
    pub lanes: Vec<Id>,
    pub program: Vec<PhaseDescriptor>,
    pub initial_phase: usize,
}

/// Four-lane program alternating between two approaches.
///
/// Lanes 0-1 are served by phase 0 and lanes 2-3 by phase 2; phases 1 and 3
/// are their yellow clearances.
pub fn two_approach_program() -> Vec<PhaseDescriptor> {
    vec![
        PhaseDescriptor::new("GGrr", 30.0),
        PhaseDescriptor::new("yyrr", 3.0),
        PhaseDescriptor::new("rrGG", 30.0),
        PhaseDescriptor::new("rryy", 3.0),
    ]
}

/// Blueprint for a [`QueueNetwork`].
///
/// The blueprint is kept by the network and replayed on every
/// [`TrafficNetwork::start`], so each episode begins from the same layout.
#[derive(Debug, Clone)]
pub struct QueueNetworkBuilder {
    intersections: Vec<IntersectionTemplate>,
    initial_queues: Vec<(Id, usize)>,
    tick_length: f64,
    arrival_rate: f64,
    discharge_per_tick: usize,
    free_flow_speed: f64,
    vehicle_length: f64,
    lane_length: f64,
    seed: u64,
}

impl Default for QueueNetworkBuilder {
    fn default() -> Self {
        Self {
            intersections: Vec::new(),
            initial_queues: Vec::new(),
            tick_length: 1.0,
            arrival_rate: 0.1,
            discharge_per_tick: 1,
            free_flow_speed: 13.89,
            vehicle_length: 7.5,
            lane_length: 100.0,
            seed: 0,
        }
    }
}

impl QueueNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an intersection controlling `lanes` with the given program.
    pub fn intersection(mut self, id: &str, lanes: &[&str], program: Vec<PhaseDescriptor>) -> Self {
        self.intersections.push(IntersectionTemplate {
            id: id.to_string(),
            lanes: lanes.iter().map(|l| l.to_string()).collect(),
            program,
            initial_phase: 0,
        });
        self
    }

    /// Sets the phase an intersection shows when the network starts.
    pub fn initial_phase(mut self, signal: &str, phase: usize) -> Self {
        if let Some(t) = self.intersections.iter_mut().find(|t| t.id == signal) {
            t.initial_phase = phase;
        }
        self
    }

    /// Places `count` stopped vehicles on `lane` when the network starts.
    pub fn initial_queue(mut self, lane: &str, count: usize) -> Self {
        self.initial_queues.push((lane.to_string(), count));
        self
    }

    /// Simulated seconds per tick.
    ///
    /// Simulated time must advance every tick: a non-positive or non-finite
    /// value is ignored and the current tick length kept.
    pub fn tick_length(mut self, seconds: f64) -> Self {
        if seconds.is_finite() && seconds > 0.0 {
            self.tick_length = seconds;
        } else {
            log::warn!(
                "Ignoring tick length {}; keeping {}s",
                seconds,
                self.tick_length
            );
        }
        self
    }

    /// Per-lane, per-tick arrival probability.
    pub fn arrival_rate(mut self, rate: f64) -> Self {
        self.arrival_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn discharge_per_tick(mut self, vehicles: usize) -> Self {
        self.discharge_per_tick = vehicles;
        self
    }

    pub fn free_flow_speed(mut self, speed: f64) -> Self {
        self.free_flow_speed = speed;
        self
    }

    /// Vehicle length plus minimum gap, used for occupancy.
    pub fn vehicle_length(mut self, length: f64) -> Self {
        self.vehicle_length = length;
        self
    }

    pub fn lane_length(mut self, length: f64) -> Self {
        self.lane_length = length;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> QueueNetwork {
        QueueNetwork {
            blueprint: self,
            runtime: None,
            starts: 0,
            last_config: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Vehicle {
    id: Id,
    speed: f64,
    waiting_time: f64,
}

#[derive(Debug)]
struct LaneState {
    id: Id,
    /// Owning signal and the lane's position in its state string.
    signal: usize,
    slot: usize,
    vehicles: VecDeque<Vehicle>,
}

#[derive(Debug)]
struct SignalRuntime {
    id: Id,
    lanes: Vec<usize>,
    program: Vec<PhaseDescriptor>,
    phase: usize,
    phase_elapsed: u32,
}

#[derive(Debug)]
struct Runtime {
    signals: Vec<SignalRuntime>,
    signal_index: HashMap<Id, usize>,
    lanes: Vec<LaneState>,
    lane_index: HashMap<Id, usize>,
    vehicle_lane: HashMap<Id, usize>,
    ticks: u64,
    rng: StdRng,
    next_vehicle: u64,
}

impl Runtime {
    fn from_blueprint(bp: &QueueNetworkBuilder, seed: u64) -> Self {
        let mut runtime = Self {
            signals: Vec::with_capacity(bp.intersections.len()),
            signal_index: HashMap::new(),
            lanes: Vec::new(),
            lane_index: HashMap::new(),
            vehicle_lane: HashMap::new(),
            ticks: 0,
            rng: StdRng::seed_from_u64(seed),
            next_vehicle: 0,
        };

        for template in &bp.intersections {
            let signal_idx = runtime.signals.len();
            let mut lanes = Vec::with_capacity(template.lanes.len());
            for (slot, lane_id) in template.lanes.iter().enumerate() {
                // A lane listed by two signals is owned by the first one.
                let lane_idx = match runtime.lane_index.get(lane_id) {
                    Some(&idx) => idx,
                    None => {
                        let idx = runtime.lanes.len();
                        runtime.lanes.push(LaneState {
                            id: lane_id.clone(),
                            signal: signal_idx,
                            slot,
                            vehicles: VecDeque::new(),
                        });
                        runtime.lane_index.insert(lane_id.clone(), idx);
                        idx
                    }
                };
                lanes.push(lane_idx);
            }

            let phase = if template.initial_phase < template.program.len() {
                template.initial_phase
            } else {
                0
            };
            runtime.signal_index.insert(template.id.clone(), signal_idx);
            runtime.signals.push(SignalRuntime {
                id: template.id.clone(),
                lanes,
                program: template.program.clone(),
                phase,
                phase_elapsed: 0,
            });
        }

        for (lane_id, count) in &bp.initial_queues {
            match runtime.lane_index.get(lane_id).copied() {
                Some(lane_idx) => {
                    for _ in 0..*count {
                        runtime.spawn_vehicle(lane_idx, 0.0);
                    }
                }
                None => log::warn!("Initial queue for unknown lane {} ignored", lane_id),
            }
        }

        runtime
    }

    fn spawn_vehicle(&mut self, lane_idx: usize, speed: f64) {
        let id = format!("veh_{}", self.next_vehicle);
        self.next_vehicle += 1;
        self.vehicle_lane.insert(id.clone(), lane_idx);
        self.lanes[lane_idx].vehicles.push_back(Vehicle {
            id,
            speed,
            waiting_time: 0.0,
        });
    }

    fn signal(&self, id: &str) -> Result<&SignalRuntime, NetworkError> {
        self.signal_index
            .get(id)
            .map(|&idx| &self.signals[idx])
            .ok_or_else(|| NetworkError::UnknownSignal(id.to_string()))
    }

    fn lane(&self, id: &str) -> Result<&LaneState, NetworkError> {
        self.lane_index
            .get(id)
            .map(|&idx| &self.lanes[idx])
            .ok_or_else(|| NetworkError::UnknownLane(id.to_string()))
    }

    fn vehicle(&self, id: &str) -> Result<&Vehicle, NetworkError> {
        self.vehicle_lane
            .get(id)
            .and_then(|&lane_idx| self.lanes[lane_idx].vehicles.iter().find(|v| v.id == id))
            .ok_or_else(|| NetworkError::UnknownVehicle(id.to_string()))
    }

    fn advance(&mut self, bp: &QueueNetworkBuilder) {
        let Runtime {
            signals,
            lanes,
            vehicle_lane,
            ticks,
            rng,
            next_vehicle,
            ..
        } = self;

        // 1-2. Discharge green queues, stop everything left behind
        for lane in lanes.iter_mut() {
            let signal = &signals[lane.signal];
            let green = signal
                .program
                .get(signal.phase)
                .map_or(false, |p| p.is_green_for(lane.slot));
            if green {
                for _ in 0..bp.discharge_per_tick {
                    match lane.vehicles.pop_front() {
                        Some(v) => {
                            vehicle_lane.remove(&v.id);
                        }
                        None => break,
                    }
                }
            }
            for v in lane.vehicles.iter_mut() {
                v.speed = 0.0;
                v.waiting_time += bp.tick_length;
            }
        }

        // 3. Arrivals
        if bp.arrival_rate > 0.0 {
            for (lane_idx, lane) in lanes.iter_mut().enumerate() {
                if rng.gen::<f64>() >= bp.arrival_rate {
                    continue;
                }
                let id = format!("veh_{}", next_vehicle);
                *next_vehicle += 1;
                vehicle_lane.insert(id.clone(), lane_idx);
                lane.vehicles.push_back(Vehicle {
                    id,
                    speed: bp.free_flow_speed,
                    waiting_time: 0.0,
                });
            }
        }

        for signal in signals.iter_mut() {
            signal.phase_elapsed += 1;
        }
        *ticks += 1;
    }
}

/// In-memory [`TrafficNetwork`] built from a [`QueueNetworkBuilder`].
///
/// # Example
///
/// ```ignore
/// use greenwave::network::queue::{two_approach_program, QueueNetwork};
///
/// let network = QueueNetwork::builder()
///     .intersection("tl_a", &["n", "s", "e", "w"], two_approach_program())
///     .arrival_rate(0.2)
///     .seed(7)
///     .build();
/// ```
#[derive(Debug)]
pub struct QueueNetwork {
    blueprint: QueueNetworkBuilder,
    runtime: Option<Runtime>,
    starts: u64,
    last_config: Option<NetworkConfig>,
}

impl QueueNetwork {
    pub fn builder() -> QueueNetworkBuilder {
        QueueNetworkBuilder::new()
    }

    /// Returns true between a successful `start` and the next `stop`.
    pub fn is_running(&self) -> bool {
        self.runtime.is_some()
    }

    /// Number of times the network has been started.
    pub fn starts(&self) -> u64 {
        self.starts
    }

    /// Configuration passed to the most recent `start`.
    pub fn last_config(&self) -> Option<&NetworkConfig> {
        self.last_config.as_ref()
    }

    /// Total number of vehicles currently in the network.
    pub fn vehicle_count(&self) -> usize {
        self.runtime
            .as_ref()
            .map_or(0, |rt| rt.vehicle_lane.len())
    }

    fn runtime(&self) -> Result<&Runtime, NetworkError> {
        self.runtime
            .as_ref()
            .ok_or_else(|| NetworkError::Unavailable("network is not running".into()))
    }

    fn runtime_mut(&mut self) -> Result<&mut Runtime, NetworkError> {
        self.runtime
            .as_mut()
            .ok_or_else(|| NetworkError::Unavailable("network is not running".into()))
    }
}

impl TrafficNetwork for QueueNetwork {
    fn start(&mut self, config: &NetworkConfig) -> Result<(), NetworkError> {
        if self.runtime.is_some() {
            return Err(NetworkError::AlreadyRunning);
        }
        // Vary arrivals across episodes while staying reproducible.
        let seed = self.blueprint.seed.wrapping_add(self.starts);
        self.runtime = Some(Runtime::from_blueprint(&self.blueprint, seed));
        self.starts += 1;
        self.last_config = Some(config.clone());
        log::debug!(
            "Queue network started (scenario={:?}, gui={}, seed={})",
            config.scenario,
            config.gui,
            seed
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<(), NetworkError> {
        self.runtime
            .take()
            .map(|_| ())
            .ok_or(NetworkError::NotRunning)
    }

    fn signal_ids(&self) -> Result<Vec<Id>, NetworkError> {
        Ok(self.runtime()?.signals.iter().map(|s| s.id.clone()).collect())
    }

    fn controlled_lanes(&self, signal: &str) -> Result<Vec<Id>, NetworkError> {
        let rt = self.runtime()?;
        let signal = rt.signal(signal)?;
        Ok(signal.lanes.iter().map(|&idx| rt.lanes[idx].id.clone()).collect())
    }

    fn phase_program(&self, signal: &str) -> Result<Vec<PhaseDescriptor>, NetworkError> {
        Ok(self.runtime()?.signal(signal)?.program.clone())
    }

    fn current_phase(&self, signal: &str) -> Result<usize, NetworkError> {
        Ok(self.runtime()?.signal(signal)?.phase)
    }

    fn set_phase(&mut self, signal: &str, phase: usize) -> Result<(), NetworkError> {
        let rt = self.runtime_mut()?;
        let idx = *rt
            .signal_index
            .get(signal)
            .ok_or_else(|| NetworkError::UnknownSignal(signal.to_string()))?;
        let state = &mut rt.signals[idx];
        if phase >= state.program.len() {
            return Err(NetworkError::PhaseOutOfRange {
                signal: signal.to_string(),
                phase,
                len: state.program.len(),
            });
        }
        state.phase = phase;
        state.phase_elapsed = 0;
        Ok(())
    }

    fn phase_elapsed_ticks(&self, signal: &str) -> Result<u32, NetworkError> {
        Ok(self.runtime()?.signal(signal)?.phase_elapsed)
    }

    fn lane_vehicle_ids(&self, lane: &str) -> Result<Vec<Id>, NetworkError> {
        Ok(self
            .runtime()?
            .lane(lane)?
            .vehicles
            .iter()
            .map(|v| v.id.clone())
            .collect())
    }

    fn vehicle_waiting_time(&self, vehicle: &str) -> Result<f64, NetworkError> {
        Ok(self.runtime()?.vehicle(vehicle)?.waiting_time)
    }

    fn vehicle_speed(&self, vehicle: &str) -> Result<f64, NetworkError> {
        Ok(self.runtime()?.vehicle(vehicle)?.speed)
    }

    fn lane_mean_speed(&self, lane: &str) -> Result<f64, NetworkError> {
        let lane = self.runtime()?.lane(lane)?;
        if lane.vehicles.is_empty() {
            return Ok(self.blueprint.free_flow_speed);
        }
        let total: f64 = lane.vehicles.iter().map(|v| v.speed).sum();
        Ok(total / lane.vehicles.len() as f64)
    }

    fn lane_vehicle_count(&self, lane: &str) -> Result<usize, NetworkError> {
        Ok(self.runtime()?.lane(lane)?.vehicles.len())
    }

    fn lane_occupancy(&self, lane: &str) -> Result<f64, NetworkError> {
        let lane = self.runtime()?.lane(lane)?;
        if self.blueprint.lane_length <= 0.0 {
            return Ok(0.0);
        }
        let occupied = lane.vehicles.len() as f64 * self.blueprint.vehicle_length;
        Ok((occupied / self.blueprint.lane_length).min(1.0))
    }

    fn advance_one_tick(&mut self) -> Result<(), NetworkError> {
        let runtime = self
            .runtime
            .as_mut()
            .ok_or_else(|| NetworkError::Unavailable("network is not running".into()))?;
        runtime.advance(&self.blueprint);
        Ok(())
    }

    fn simulated_time(&self) -> Result<SimTime, NetworkError> {
        let ticks = self.runtime()?.ticks;
        Ok(seconds(ticks as f64 * self.blueprint.tick_length))
    }
}
