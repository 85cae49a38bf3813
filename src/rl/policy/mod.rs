//! Policy trait and baseline implementations.

pub mod fixed_time;
pub mod random;
pub mod trait_;

pub use fixed_time::FixedTimePolicy;
pub use random::RandomPolicy;
pub use trait_::Policy;
