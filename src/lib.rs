//! greenwave - Multi-agent traffic signal control environment
//!
//! Enacts per-signal phase actions under a minimum-green guarantee and a
//! mandatory yellow clearance interval, then measures observations and
//! congestion rewards from a simulated road network.

pub mod network;
pub mod rl;
pub mod units;

// Re-export unit conversion traits for ergonomic use
pub use units::{convert, SameDim, SimTime};

/// Identifier type used for signals, lanes, vehicles and episodes.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
