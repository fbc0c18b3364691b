//! Closed interval `[from, until]` over a [`TimeValue`](crate::time::TimeValue).

use crate::time::TimeValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Interval<T> {
    from: T,
    until: T,
}

impl<T: TimeValue> Interval<T> {
    /// Builds a closed interval, asserting `from <= until`.
    pub fn new(from: T, until: T) -> Self {
        assert!(from <= until, "interval lower bound must not exceed upper bound");
        Self { from, until }
    }

    pub fn from(&self) -> T {
        self.from
    }

    pub fn until(&self) -> T {
        self.until
    }

    pub fn min(&self) -> T {
        self.from
    }

    pub fn max(&self) -> T {
        self.until
    }

    pub fn length(&self) -> T {
        self.until.saturating_sub(self.from)
    }

    /// Returns the smallest interval containing both `self` and `t`.
    pub fn extend_to(&self, t: T) -> Self {
        Self {
            from: self.from.min(t),
            until: self.until.max(t),
        }
    }

    /// The lower bound clamped to be at least `t`.
    pub fn lower_bound(&self, t: T) -> T {
        self.from.max(t)
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.from <= other.until && other.from <= self.until
    }

    pub fn contains(&self, t: T) -> bool {
        self.from <= t && t <= self.until
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::DiscreteTime as D;

    #[test]
    fn extend_to_grows_either_side() {
        let i = Interval::new(D(5), D(10));
        assert_eq!(i.extend_to(D(2)), Interval::new(D(2), D(10)));
        assert_eq!(i.extend_to(D(20)), Interval::new(D(5), D(20)));
        assert_eq!(i.extend_to(D(7)), i);
    }

    #[test]
    fn overlap_is_symmetric_and_inclusive() {
        let a = Interval::new(D(0), D(10));
        let b = Interval::new(D(10), D(20));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        let c = Interval::new(D(11), D(20));
        assert!(!a.overlaps(&c));
    }
}
