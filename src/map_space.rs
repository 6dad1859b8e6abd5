//! Lazy projection of a space through a function.

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

use crate::space::{resolve_index, CombiError, Space, SpaceIter};

/// A space whose member at rank `i` is `function(inner[i])`.
///
/// Nothing is cached; the function runs on every access.
#[derive(Debug, Clone)]
pub struct MapSpace<S, F> {
    inner: S,
    function: F,
}

impl<S, F> MapSpace<S, F> {
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S, F, U> MapSpace<S, F>
where
    S: Space,
    F: Fn(S::Item) -> U,
{
    pub fn new(inner: S, function: F) -> Self {
        Self { inner, function }
    }

    pub fn len(&self) -> BigUint {
        self.inner.length()
    }

    pub fn is_empty(&self) -> bool {
        self.len().is_zero()
    }

    /// Mapped member at `index`; negative indices count from the end.
    pub fn get(&self, index: impl Into<BigInt>) -> Result<U, CombiError> {
        let rank = resolve_index(index.into(), &self.len())?;
        self.item_at(&rank)
            .ok_or_else(|| CombiError::IndexOutOfRange {
                index: rank.clone().into(),
                length: self.len(),
            })
    }

    pub fn iter(&self) -> SpaceIter<'_, Self> {
        SpaceIter::new(self)
    }
}

impl<S, F, U> Space for MapSpace<S, F>
where
    S: Space,
    F: Fn(S::Item) -> U,
{
    type Item = U;

    fn length(&self) -> BigUint {
        self.inner.length()
    }

    fn item_at(&self, rank: &BigUint) -> Option<U> {
        self.inner.item_at(rank).map(&self.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::PermSpace;

    #[test]
    fn maps_lazily_by_rank() {
        let words = MapSpace::new(PermSpace::new("abc"), |perm| {
            perm.values().collect::<String>()
        });
        assert_eq!(words.len(), BigUint::from(6u32));
        assert_eq!(words.get(0).unwrap(), "abc");
        assert_eq!(words.get(-1).unwrap(), "cba");
        let all: Vec<String> = words.iter().collect();
        assert_eq!(all, vec!["abc", "acb", "bac", "bca", "cab", "cba"]);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let ranks = MapSpace::new(PermSpace::of_len(3), |perm| perm.rank().clone());
        assert!(matches!(
            ranks.get(6),
            Err(CombiError::IndexOutOfRange { .. })
        ));
        assert_eq!(ranks.get(4).unwrap(), BigUint::from(4u32));
    }

    #[test]
    fn maps_compose() {
        let lengths = MapSpace::new(
            MapSpace::new(PermSpace::of_len(3), |perm| perm.positions().to_vec()),
            |positions: Vec<usize>| positions.len(),
        );
        assert!(lengths.iter().all(|len| len == 3));
    }
}
