//! Rank windows: the canonical form of a slice.

use std::fmt::Display;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use super::error::CombiError;

/// Python-style slice request: optional bounds that may be negative, and an
/// optional step that must be 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceSpec {
    pub start: Option<BigInt>,
    pub stop: Option<BigInt>,
    pub step: Option<BigInt>,
}

impl SliceSpec {
    /// The full slice `[:]`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, start: impl Into<BigInt>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn stop(mut self, stop: impl Into<BigInt>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    pub fn step(mut self, step: impl Into<BigInt>) -> Self {
        self.step = Some(step.into());
        self
    }

    /// Resolves against a space of `length`, clamping like Python does.
    ///
    /// Returns local `(start, stop)` with `start <= stop <= length`.
    pub(crate) fn canonical(&self, length: &BigUint) -> Result<(BigUint, BigUint), CombiError> {
        if let Some(step) = &self.step {
            if !step.is_one() {
                return Err(CombiError::Unsupported("slice step other than 1"));
            }
        }
        let start = clamp(self.start.as_ref(), length, BigUint::zero());
        let stop = clamp(self.stop.as_ref(), length, length.clone());
        let stop = if stop < start { start.clone() } else { stop };
        Ok((start, stop))
    }
}

fn clamp(bound: Option<&BigInt>, length: &BigUint, default: BigUint) -> BigUint {
    let Some(bound) = bound else {
        return default;
    };
    let absolute = if bound.sign() == Sign::Minus {
        BigInt::from(length.clone()) + bound
    } else {
        bound.clone()
    };
    match absolute.to_biguint() {
        Some(value) if &value > length => length.clone(),
        Some(value) => value,
        None => BigUint::zero(),
    }
}

impl From<RangeFull> for SliceSpec {
    fn from(_: RangeFull) -> Self {
        Self::new()
    }
}

impl From<Range<i64>> for SliceSpec {
    fn from(range: Range<i64>) -> Self {
        Self::new().start(range.start).stop(range.end)
    }
}

impl From<RangeFrom<i64>> for SliceSpec {
    fn from(range: RangeFrom<i64>) -> Self {
        Self::new().start(range.start)
    }
}

impl From<RangeTo<i64>> for SliceSpec {
    fn from(range: RangeTo<i64>) -> Self {
        Self::new().stop(range.end)
    }
}

impl From<Range<BigInt>> for SliceSpec {
    fn from(range: Range<BigInt>) -> Self {
        Self::new().start(range.start).stop(range.end)
    }
}

/// Half-open interval `[start, stop)` of ranks in the unsliced ancestor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    start: BigUint,
    stop: BigUint,
}

impl Window {
    pub(crate) fn new(start: BigUint, stop: BigUint) -> Self {
        debug_assert!(start <= stop, "Window start must be <= stop");
        Self { start, stop }
    }

    pub fn start(&self) -> &BigUint {
        &self.start
    }

    pub fn stop(&self) -> &BigUint {
        &self.stop
    }

    pub fn len(&self) -> BigUint {
        &self.stop - &self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// Returns true if ancestor rank `rank` ∈ `[start, stop)`.
    pub fn contains(&self, rank: &BigUint) -> bool {
        &self.start <= rank && rank < &self.stop
    }

    /// Narrows to local `[start, stop)`, expressed relative to this window.
    pub(crate) fn narrow(&self, start: &BigUint, stop: &BigUint) -> Self {
        Self::new(&self.start + start, &self.start + stop)
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn canonical(bounds: impl Into<SliceSpec>, length: u64) -> (BigUint, BigUint) {
        bounds.into().canonical(&big(length)).unwrap()
    }

    #[test]
    fn omitted_bounds_cover_everything() {
        assert_eq!(canonical(.., 24), (big(0), big(24)));
    }

    #[test]
    fn negative_bounds_count_from_the_end() {
        assert_eq!(canonical(2..-2, 24), (big(2), big(22)));
        assert_eq!(canonical(-2.., 24), (big(22), big(24)));
        assert_eq!(canonical(..-30, 24), (big(0), big(0)));
    }

    #[test]
    fn bounds_are_clamped() {
        assert_eq!(canonical(10..100, 24), (big(10), big(24)));
        assert_eq!(canonical(30.., 24), (big(24), big(24)));
        assert_eq!(canonical(3..2, 24), (big(3), big(3)));
    }

    #[test]
    fn non_unit_step_is_unsupported() {
        let err = SliceSpec::new().step(2).canonical(&big(10)).unwrap_err();
        assert_eq!(err, CombiError::Unsupported("slice step other than 1"));
        assert!(SliceSpec::new().step(1).canonical(&big(10)).is_ok());
        assert!(SliceSpec::new().step(0).canonical(&big(10)).is_err());
    }

    #[test]
    fn narrowing_is_relative() {
        let window = Window::new(big(2), big(6));
        let narrowed = window.narrow(&big(1), &big(3));
        assert_eq!(narrowed, Window::new(big(3), big(5)));
        assert_eq!(narrowed.len(), big(2));
        assert!(narrowed.contains(&big(3)));
        assert!(!narrowed.contains(&big(5)));
        assert_eq!(narrowed.to_string(), "[3, 5)");
    }
}
