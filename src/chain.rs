//! Concatenation of spaces into one rank-addressable sequence.

use std::fmt::{self, Display};

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

use crate::perm::Perm;
use crate::space::{resolve_index, CombiError, PermSpace, Space, SpaceIter};

/// Several spaces laid end to end.
///
/// Component `i` occupies ranks `[ends[i - 1], ends[i])`. Components may
/// overlap; [`index`](ChainSpace::index) reports the first occurrence.
#[derive(Debug)]
pub struct ChainSpace<T = usize, K = usize> {
    spaces: Vec<PermSpace<T, K>>,
    /// Cumulative lengths, one per component.
    ends: Vec<BigUint>,
}

impl<T, K> Clone for ChainSpace<T, K> {
    fn clone(&self) -> Self {
        Self {
            spaces: self.spaces.clone(),
            ends: self.ends.clone(),
        }
    }
}

impl<T, K> ChainSpace<T, K> {
    pub fn new(spaces: impl IntoIterator<Item = PermSpace<T, K>>) -> Self {
        let spaces: Vec<PermSpace<T, K>> = spaces.into_iter().collect();
        let mut total = BigUint::zero();
        let ends = spaces
            .iter()
            .map(|space| {
                total += space.len();
                total.clone()
            })
            .collect();
        Self { spaces, ends }
    }

    pub fn spaces(&self) -> &[PermSpace<T, K>] {
        &self.spaces
    }

    pub fn len(&self) -> BigUint {
        self.ends.last().cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len().is_zero()
    }

    /// Component holding chain rank `rank`, and the rank inside it.
    pub fn locate(&self, rank: &BigUint) -> Option<(usize, BigUint)> {
        let component = self.ends.partition_point(|end| end <= rank);
        if component == self.spaces.len() {
            return None;
        }
        let start = self.start_of(component);
        Some((component, rank - start))
    }

    fn start_of(&self, component: usize) -> BigUint {
        match component {
            0 => BigUint::zero(),
            i => self.ends[i - 1].clone(),
        }
    }

    /// Member at `index`; negative indices count from the end.
    pub fn get(&self, index: impl Into<BigInt>) -> Result<Perm<T, K>, CombiError> {
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

impl<T: PartialEq, K: PartialEq> ChainSpace<T, K> {
    /// Chain rank of the first component containing `perm`.
    pub fn index(&self, perm: &Perm<T, K>) -> Result<BigUint, CombiError> {
        self.first_match(|space| space.index(perm))
    }

    pub fn contains(&self, perm: &Perm<T, K>) -> bool {
        self.index(perm).is_ok()
    }

    /// Chain rank of the first member whose slots hold `values`.
    pub fn index_of(&self, values: &[T]) -> Result<BigUint, CombiError> {
        self.first_match(|space| space.index_of(values))
    }

    pub fn contains_values(&self, values: &[T]) -> bool {
        self.index_of(values).is_ok()
    }

    fn first_match(
        &self,
        lookup: impl Fn(&PermSpace<T, K>) -> Result<BigUint, CombiError>,
    ) -> Result<BigUint, CombiError> {
        self.spaces
            .iter()
            .enumerate()
            .find_map(|(i, space)| lookup(space).ok().map(|local| self.start_of(i) + local))
            .ok_or(CombiError::NotMember)
    }
}

impl<T, K> Space for ChainSpace<T, K> {
    type Item = Perm<T, K>;

    fn length(&self) -> BigUint {
        self.len()
    }

    fn item_at(&self, rank: &BigUint) -> Option<Perm<T, K>> {
        let (component, local) = self.locate(rank)?;
        self.spaces[component].item_at(&local)
    }
}

impl<'a, T, K> IntoIterator for &'a ChainSpace<T, K> {
    type Item = Perm<T, K>;
    type IntoIter = SpaceIter<'a, ChainSpace<T, K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Display, K: Display> Display for ChainSpace<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ChainSpace: ")?;
        for (i, space) in self.spaces.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{space}")?;
        }
        write!(f, ">")
    }
}
