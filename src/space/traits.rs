//! Space trait: the rank-addressable collection shared by [`PermSpace`],
//! [`ChainSpace`] and [`MapSpace`].
//!
//! [`PermSpace`]: super::PermSpace
//! [`ChainSpace`]: crate::chain::ChainSpace
//! [`MapSpace`]: crate::map_space::MapSpace

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_traits::{ToPrimitive, Zero};
use rand::Rng;

use super::error::CombiError;

/// A finite, lazily materialized collection addressed by rank.
///
/// Implementors only describe how big they are and how to build the member
/// at a rank; iteration and sampling come for free.
pub trait Space {
    type Item;

    /// Number of members.
    fn length(&self) -> BigUint;

    /// Member at `rank`, or `None` if `rank >= length()`.
    fn item_at(&self, rank: &BigUint) -> Option<Self::Item>;

    /// Uniformly random member, or `None` for an empty space.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Self::Item> {
        let length = self.length();
        if length.is_zero() {
            return None;
        }
        self.item_at(&rng.gen_biguint_below(&length))
    }
}

/// Converts a possibly negative index into a rank below `length`.
pub(crate) fn resolve_index(index: BigInt, length: &BigUint) -> Result<BigUint, CombiError> {
    let absolute = if index.sign() == Sign::Minus {
        BigInt::from(length.clone()) + &index
    } else {
        index.clone()
    };
    absolute
        .to_biguint()
        .filter(|rank| rank < length)
        .ok_or_else(|| CombiError::IndexOutOfRange {
            index,
            length: length.clone(),
        })
}

/// Ascending-rank iterator over a [`Space`].
///
/// Holds only a borrow and a cursor, so several iterators over one space can
/// run side by side.
#[derive(Debug)]
pub struct SpaceIter<'a, S: ?Sized> {
    space: &'a S,
    next: BigUint,
    end: BigUint,
}

impl<'a, S: Space + ?Sized> SpaceIter<'a, S> {
    pub fn new(space: &'a S) -> Self {
        Self {
            space,
            next: BigUint::zero(),
            end: space.length(),
        }
    }
}

impl<S: Space + ?Sized> Iterator for SpaceIter<'_, S> {
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        if self.next >= self.end {
            return None;
        }
        let item = self.space.item_at(&self.next);
        self.next += 1u32;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (&self.end - &self.next).to_usize() {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Squares(u32);

    impl Space for Squares {
        type Item = u64;

        fn length(&self) -> BigUint {
            BigUint::from(self.0)
        }

        fn item_at(&self, rank: &BigUint) -> Option<u64> {
            let r = rank.to_u64()?;
            (r < u64::from(self.0)).then_some(r * r)
        }
    }

    #[test]
    fn iterates_in_rank_order() {
        let items: Vec<u64> = SpaceIter::new(&Squares(4)).collect();
        assert_eq!(items, vec![0, 1, 4, 9]);
        assert_eq!(SpaceIter::new(&Squares(4)).size_hint(), (4, Some(4)));
    }

    #[test]
    fn empty_space_yields_nothing() {
        assert_eq!(SpaceIter::new(&Squares(0)).next(), None);
        assert_eq!(Squares(0).sample(&mut StdRng::seed_from_u64(7)), None);
    }

    #[test]
    fn sampling_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let sample = Squares(5).sample(&mut rng).unwrap();
            assert!([0, 1, 4, 9, 16].contains(&sample));
        }
    }

    #[test]
    fn negative_indices_wrap_once() {
        let length = BigUint::from(24u32);
        assert_eq!(resolve_index(BigInt::from(-1), &length).unwrap(), BigUint::from(23u32));
        assert_eq!(resolve_index(BigInt::from(5), &length).unwrap(), BigUint::from(5u32));
        assert_eq!(
            resolve_index(BigInt::from(-25), &length).unwrap_err(),
            CombiError::IndexOutOfRange {
                index: BigInt::from(-25),
                length: length.clone(),
            }
        );
        assert!(resolve_index(BigInt::from(24), &length).is_err());
    }
}
