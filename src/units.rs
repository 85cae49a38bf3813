//! Simulated-time units.
//!
//! Simulated time and the episode horizon are carried as
//! [`qtty::Quantity<Second>`]. Horizons may be specified in any time unit
//! (minutes, hours) and are converted to seconds through [`convert`].

use qtty::{Quantity, Second, Unit};

/// Simulated clock reading, in seconds since network start.
pub type SimTime = Quantity<Second>;

/// Marker trait for units that share the same physical dimension.
///
/// Automatically implemented for any pair of units where
/// `From::Dim == To::Dim`, so a horizon given in hours is accepted wherever
/// seconds are expected while a length unit is rejected at compile time.
pub trait SameDim<To: Unit>: Unit<Dim = To::Dim> {}

impl<From, To> SameDim<To> for From
where
    From: Unit,
    To: Unit<Dim = From::Dim>,
{
}

/// Converts a quantity from one unit to another unit of the same dimension.
///
/// # Example
///
/// ```ignore
/// use qtty::{Quantity, Minute, Second};
/// use greenwave::units::convert;
///
/// let horizon = Quantity::<Minute>::new(2.0);
/// let seconds: Quantity<Second> = convert(horizon);
/// assert!((seconds.value() - 120.0).abs() < 1e-12);
/// ```
#[inline]
pub const fn convert<From, To>(q: Quantity<From>) -> Quantity<To>
where
    From: SameDim<To>,
    To: Unit,
{
    q.to_const::<To>()
}

/// Creates a [`SimTime`] from a raw number of seconds.
#[inline]
pub fn seconds(value: f64) -> SimTime {
    Quantity::new(value)
}

/// Serde helpers storing a [`SimTime`] as a plain number of seconds.
#[cfg(feature = "serde")]
pub mod seconds_serde {
    use super::SimTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &SimTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.value())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SimTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(super::seconds)
    }
}
