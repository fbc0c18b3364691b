//! ## Polymorphic time
//!
//! #### Model:
//! - A totally ordered scalar time type with addition, subtraction and a
//!   saturating `infinity` sentinel.
//! - Two concrete instantiations are provided: [`DiscreteTime`] (a 64-bit
//!   integer, for problems expressed in integer time units) and
//!   [`DenseTime`] (an ordered 64-bit float, for continuous/rational-like
//!   time). All algorithms in this crate are generic over [`TimeValue`]
//!   and never leak which instantiation is in use.
//!
//! Serialization follows the unit-suffixed string convention (`"10 ms"`,
//! `"500 ns"`) rather than a bare number, so problem files stay readable.

use ordered_float::OrderedFloat;

/// Capability set required of a time scalar: total order, saturating
/// addition/subtraction, and a saturating infinity.
pub trait TimeValue:
    Copy + Clone + PartialEq + Eq + PartialOrd + Ord + std::fmt::Debug + Send + Sync + 'static
{
    fn zero() -> Self;

    /// A sentinel larger than every finite value; saturates under addition.
    fn infinity() -> Self;

    fn is_infinite(self) -> bool {
        self == Self::infinity()
    }

    /// Saturating addition: `infinity + x == infinity` for any finite `x`.
    fn saturating_add(self, rhs: Self) -> Self;

    /// Saturating subtraction: clamps at zero, and `infinity - x == infinity`.
    fn saturating_sub(self, rhs: Self) -> Self;

    fn min(self, other: Self) -> Self {
        std::cmp::min(self, other)
    }

    fn max(self, other: Self) -> Self {
        std::cmp::max(self, other)
    }

    /// The midpoint between two finite values; used only by the interval
    /// tree to pick a split point, never by the scheduling algorithms.
    fn midpoint(self, other: Self) -> Self;
}

/// 64-bit discrete (integer) time. `u64::MAX` represents infinity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiscreteTime(pub u64);

impl DiscreteTime {
    pub fn from_units(units: u64) -> Self {
        Self(units)
    }

    pub fn as_units(self) -> u64 {
        self.0
    }
}

impl TimeValue for DiscreteTime {
    fn zero() -> Self {
        Self(0)
    }

    fn infinity() -> Self {
        Self(u64::MAX)
    }

    fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    fn saturating_sub(self, rhs: Self) -> Self {
        if self.is_infinite() {
            self
        } else {
            Self(self.0.saturating_sub(rhs.0))
        }
    }

    fn midpoint(self, other: Self) -> Self {
        Self(self.0 / 2 + other.0 / 2 + (self.0 % 2 + other.0 % 2) / 2)
    }
}

impl serde::Serialize for DiscreteTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.is_infinite() {
            "inf".serialize(serializer)
        } else {
            format!("{} u", self.0).serialize(serializer)
        }
    }
}

impl<'de> serde::Deserialize<'de> for DiscreteTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("inf") || raw.eq_ignore_ascii_case("infinity") {
            return Ok(Self::infinity());
        }

        let pieces: Vec<_> = raw.split_whitespace().collect();
        let value: u64 = pieces[0]
            .parse()
            .map_err(|err| serde::de::Error::custom(format!("invalid discrete time: {err}")))?;
        Ok(Self(value))
    }
}

/// Dense (rational/float-like) time, backed by an ordered `f64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DenseTime(pub OrderedFloat<f64>);

impl DenseTime {
    pub fn from_f64(value: f64) -> Self {
        Self(OrderedFloat(value))
    }

    pub fn as_f64(self) -> f64 {
        self.0.into_inner()
    }
}

impl TimeValue for DenseTime {
    fn zero() -> Self {
        Self::from_f64(0.0)
    }

    fn infinity() -> Self {
        Self::from_f64(f64::INFINITY)
    }

    fn saturating_add(self, rhs: Self) -> Self {
        Self::from_f64(self.as_f64() + rhs.as_f64())
    }

    fn saturating_sub(self, rhs: Self) -> Self {
        if self.is_infinite() {
            self
        } else {
            Self::from_f64((self.as_f64() - rhs.as_f64()).max(0.0))
        }
    }

    fn midpoint(self, other: Self) -> Self {
        Self::from_f64((self.as_f64() + other.as_f64()) / 2.0)
    }
}

impl serde::Serialize for DenseTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if self.is_infinite() {
            "inf".serialize(serializer)
        } else {
            format!("{} u", self.as_f64()).serialize(serializer)
        }
    }
}

impl<'de> serde::Deserialize<'de> for DenseTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("inf") || raw.eq_ignore_ascii_case("infinity") {
            return Ok(Self::infinity());
        }

        let pieces: Vec<_> = raw.split_whitespace().collect();
        let value: f64 = pieces[0]
            .parse()
            .map_err(|err| serde::de::Error::custom(format!("invalid dense time: {err}")))?;
        Ok(Self::from_f64(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrete_saturates_at_infinity() {
        let inf = DiscreteTime::infinity();
        assert_eq!(inf.saturating_add(DiscreteTime(5)), inf);
        assert_eq!(DiscreteTime(5).saturating_add(inf), inf);
    }

    #[test]
    fn discrete_subtraction_clamps_at_zero() {
        assert_eq!(DiscreteTime(3).saturating_sub(DiscreteTime(10)), DiscreteTime(0));
    }

    #[test]
    fn dense_orders_totally() {
        assert!(DenseTime::from_f64(1.5) < DenseTime::from_f64(2.0));
        assert!(DenseTime::from_f64(2.0) < DenseTime::infinity());
    }

    #[test]
    fn roundtrip_serde_discrete() {
        let t = DiscreteTime(42);
        let json = serde_json::to_string(&t).unwrap();
        let back: DiscreteTime = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);

        let inf = DiscreteTime::infinity();
        let json = serde_json::to_string(&inf).unwrap();
        let back: DiscreteTime = serde_json::from_str(&json).unwrap();
        assert_eq!(inf, back);
    }
}
