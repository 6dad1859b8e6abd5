//! Individual members of a space.
//!
//! A [`Perm`] is an immutable value object: the sequence positions chosen for
//! each slot, plus the space it came from. Labels are looked up through the
//! space's sequence and domain, so relabeling views are O(1).

mod neighbors;


use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use num_bigint::BigUint;

use crate::sequence::Sequence;
use crate::space::{CombiError, DegreeMetric, PermSpace};

pub use neighbors::cayley_graph;

/// One member of a [`PermSpace`].
///
/// Slot `i` (keyed by `domain[i]`) holds `sequence[positions[i]]`. The rank is
/// local to the space the perm was produced by, slice included.
#[derive(Debug)]
pub struct Perm<T = usize, K = usize> {
    space: PermSpace<T, K>,
    positions: Arc<[usize]>,
    rank: Arc<OnceLock<BigUint>>,
}

/// A member of a combination space. Slots hold ascending positions.
pub type Comb<T = usize, K = usize> = Perm<T, K>;

impl<T, K> Clone for Perm<T, K> {
    fn clone(&self) -> Self {
        Self {
            space: self.space.clone(),
            positions: Arc::clone(&self.positions),
            rank: Arc::clone(&self.rank),
        }
    }
}

impl<T, K> Perm<T, K> {
    pub(crate) fn from_parts(
        space: PermSpace<T, K>,
        positions: Arc<[usize]>,
        rank: Option<BigUint>,
    ) -> Self {
        let cell = OnceLock::new();
        if let Some(rank) = rank {
            let _ = cell.set(rank);
        }
        Self {
            space,
            positions,
            rank: Arc::new(cell),
        }
    }

    pub fn space(&self) -> &PermSpace<T, K> {
        &self.space
    }

    /// Sequence position held by each slot.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Rank within the originating space.
    pub fn rank(&self) -> &BigUint {
        self.rank
            .get_or_init(|| self.space.local_rank(&self.positions).unwrap_or_default())
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_combination(&self) -> bool {
        self.space.is_combination()
    }

    pub fn is_rapplied(&self) -> bool {
        self.space.is_rapplied()
    }

    pub fn is_dapplied(&self) -> bool {
        self.space.is_dapplied()
    }

    /// Values in slot order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        let sequence = self.space.sequence();
        self.positions.iter().map(move |&p| &sequence[p])
    }

    /// Slot keys in slot order.
    pub fn keys(&self) -> &[K] {
        self.space.domain()
    }

    /// `(key, value)` pairs in slot order.
    pub fn items(&self) -> impl Iterator<Item = (&K, &T)> + '_ {
        self.keys().iter().zip(self.values())
    }

    /// Value in slot `index`.
    pub fn value_at(&self, index: usize) -> Option<&T> {
        self.positions
            .get(index)
            .map(|&p| &self.space.sequence()[p])
    }

    /// Degree under the space's metric.
    ///
    /// `None` when the metric is undefined, e.g. transpositions of a partial
    /// permutation.
    pub fn degree(&self) -> Option<usize> {
        self.degree_by(self.space.degree_metric())
    }

    pub fn degree_by(&self, metric: DegreeMetric) -> Option<usize> {
        metric.degree_of(&self.positions, self.space.sequence_length())
    }

    /// The same member with values shown as sequence positions.
    pub fn unrapplied(&self) -> Perm<usize, K> {
        Perm {
            space: self.space.unrapplied(),
            positions: Arc::clone(&self.positions),
            rank: Arc::clone(&self.rank),
        }
    }

    /// The same member with slots keyed by index.
    pub fn undapplied(&self) -> Perm<T, usize> {
        Perm {
            space: self.space.undapplied(),
            positions: Arc::clone(&self.positions),
            rank: Arc::clone(&self.rank),
        }
    }

    /// The same positions over a different sequence of equal length.
    pub fn get_rapplied<U>(&self, sequence: impl Into<Sequence<U>>) -> Result<Perm<U, K>, CombiError> {
        Ok(Perm {
            space: self.space.get_rapplied(sequence)?,
            positions: Arc::clone(&self.positions),
            rank: Arc::clone(&self.rank),
        })
    }

    fn is_full(&self) -> bool {
        self.positions.len() == self.space.sequence_length()
    }

    /// The permutation undoing this one, in the same space.
    pub fn inverse(&self) -> Result<Self, CombiError> {
        if !self.is_full() {
            return Err(CombiError::Unsupported("inverse of a partial permutation"));
        }
        self.space.perm_from_positions(invert(&self.positions))
    }

    /// `other` after `self`: slot `i` of the result holds what `other` holds
    /// in slot `self.positions()[i]`.
    ///
    /// The result lives in `other`'s space.
    pub fn compose<U, L>(&self, other: &Perm<U, L>) -> Result<Perm<U, L>, CombiError> {
        if !self.is_full() {
            return Err(CombiError::Unsupported("composing a partial permutation"));
        }
        if other.positions.len() != self.positions.len() {
            return Err(CombiError::LengthMismatch {
                expected: self.positions.len(),
                found: other.positions.len(),
            });
        }
        let composed = self
            .positions
            .iter()
            .map(|&p| other.positions[p])
            .collect();
        other.space.perm_from_positions(composed)
    }

    /// Repeated composition with itself; negative exponents use the inverse.
    pub fn pow(&self, exponent: i64) -> Result<Self, CombiError> {
        if !self.is_full() {
            return Err(CombiError::Unsupported("powers of a partial permutation"));
        }
        let mut base: Vec<usize> = if exponent < 0 {
            invert(&self.positions)
        } else {
            self.positions.to_vec()
        };
        let mut result: Vec<usize> = (0..self.positions.len()).collect();
        let mut remaining = exponent.unsigned_abs();
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.iter().map(|&p| base[p]).collect();
            }
            base = base.iter().map(|&p| base[p]).collect();
            remaining >>= 1;
        }
        self.space.perm_from_positions(result)
    }

    /// Rearranges `items` the way this perm rearranges its sequence.
    pub fn apply<U: Clone>(&self, items: &[U]) -> Result<Vec<U>, CombiError> {
        let n = self.space.sequence_length();
        if items.len() != n {
            return Err(CombiError::LengthMismatch {
                expected: n,
                found: items.len(),
            });
        }
        Ok(self.positions.iter().map(|&p| items[p].clone()).collect())
    }

    /// Slots in reverse order, if that is still a member of the space.
    pub fn reversed(&self) -> Result<Self, CombiError> {
        let reversed = self.positions.iter().rev().copied().collect();
        self.space.perm_from_positions(reversed)
    }
}

impl<T: Clone, K> Perm<T, K> {
    /// Values in slot order, cloned out.
    pub fn to_vec(&self) -> Vec<T> {
        self.values().cloned().collect()
    }
}

impl<T: PartialEq, K> Perm<T, K> {
    pub fn contains_value(&self, value: &T) -> bool {
        self.values().any(|v| v == value)
    }
}

impl<T, K: PartialEq> Perm<T, K> {
    /// Value in the slot keyed by `key`.
    pub fn get(&self, key: &K) -> Option<&T> {
        let slot = self.keys().iter().position(|k| k == key)?;
        self.value_at(slot)
    }
}

/// Perms are equal when they hold the same positions of the same unsliced
/// space; the slice they were read from does not matter.
impl<T: PartialEq, K: PartialEq> PartialEq for Perm<T, K> {
    fn eq(&self, other: &Self) -> bool {
        self.positions == other.positions && self.space.same_unsliced(&other.space)
    }
}

impl<T: Eq, K: Eq> Eq for Perm<T, K> {}

impl<T, K> Hash for Perm<T, K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.positions.hash(state);
    }
}

impl<T: Display, K: Display> Display for Perm<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_combination() { "Comb" } else { "Perm" };
        write!(f, "<{kind}: (")?;
        for (i, (key, value)) in self.items().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if self.is_dapplied() {
                write!(f, "{key} => {value}")?;
            } else {
                write!(f, "{value}")?;
            }
        }
        write!(f, ")>")
    }
}

fn invert(positions: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; positions.len()];
    for (slot, &p) in positions.iter().enumerate() {
        inverse[p] = slot;
    }
    inverse
}
