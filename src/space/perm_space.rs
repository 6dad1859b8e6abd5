//! The permutation space itself: an indexable, sliceable, virtual collection
//! of every arrangement satisfying a resolved configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};
use std::sync::Arc;

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use rand::Rng;

use super::builder::{resolve_fixes, SpaceBuilder};
use super::codec;
use super::config::{DegreeMetric, SelectionMode, SpaceConfig};
use super::error::CombiError;
use super::resolver::Resolved;
use super::traits::{resolve_index, Space, SpaceIter};
use super::window::{SliceSpec, Window};
use crate::perm::Perm;
use crate::sequence::Sequence;

/// Virtual collection of permutations (or combinations) of a sequence.
///
/// Members are ordered lexicographically by sequence position and addressed
/// by rank; nothing is materialized, so spaces of size `100!` behave the same
/// as spaces of size `6`. All views share one resolved configuration and
/// clone in O(1).
///
/// `T` labels the values (the "range"), `K` labels the slots (the "domain").
#[derive(Debug)]
pub struct PermSpace<T = usize, K = usize> {
    core: Arc<Resolved>,
    sequence: Sequence<T>,
    domain: Sequence<K>,
    window: Option<Window>,
}

impl<T, K> Clone for PermSpace<T, K> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            sequence: self.sequence.clone(),
            domain: self.domain.clone(),
            window: self.window.clone(),
        }
    }
}

impl PermSpace<usize, usize> {
    /// The pure space of all `n!` orderings of `0..n`.
    pub fn of_len(n: usize) -> Self {
        let core = Arc::new(Resolved::pure(n));
        let sequence = Sequence::from_shared(Arc::clone(&core.positions), true);
        let domain = Sequence::from_shared(Arc::clone(&core.slots), true);
        Self::from_parts(core, sequence, domain, None)
    }
}

impl<T> PermSpace<T, usize> {
    /// All orderings of `sequence`, with no further constraints.
    pub fn new(sequence: impl Into<Sequence<T>>) -> Self {
        let sequence = sequence.into();
        let core = Arc::new(Resolved::pure(sequence.len()));
        let domain = Sequence::from_shared(Arc::clone(&core.slots), true);
        Self::from_parts(core, sequence, domain, None)
    }

    pub fn builder(sequence: impl Into<Sequence<T>>) -> SpaceBuilder<T, usize> {
        SpaceBuilder::new(sequence)
    }
}

impl<T, K> PermSpace<T, K> {
    pub(crate) fn from_parts(
        core: Arc<Resolved>,
        sequence: Sequence<T>,
        domain: Sequence<K>,
        window: Option<Window>,
    ) -> Self {
        Self {
            core,
            sequence,
            domain,
            window,
        }
    }

    /// Number of members, after slicing.
    pub fn len(&self) -> BigUint {
        match &self.window {
            Some(window) => window.len(),
            None => self.core.length().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len().is_zero()
    }

    pub fn sequence(&self) -> &Sequence<T> {
        &self.sequence
    }

    pub fn domain(&self) -> &Sequence<K> {
        &self.domain
    }

    /// Selection length `k`.
    pub fn n_elements(&self) -> usize {
        self.core.k
    }

    pub fn sequence_length(&self) -> usize {
        self.core.n
    }

    pub fn mode(&self) -> SelectionMode {
        self.core.mode
    }

    pub fn degree_metric(&self) -> DegreeMetric {
        self.core.metric
    }

    /// Effective degree filter, after dropping unattainable degrees.
    pub fn degrees(&self) -> Option<&BTreeSet<usize>> {
        self.core.degrees.as_ref()
    }

    /// Resolved fixes as slot index to sequence position.
    pub fn fixed_positions(&self) -> &BTreeMap<usize, usize> {
        &self.core.fixed
    }

    /// Scalar knobs this space was resolved from.
    pub fn config(&self) -> SpaceConfig {
        self.core.config()
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    pub fn is_rapplied(&self) -> bool {
        !self.sequence.is_identity()
    }

    pub fn is_dapplied(&self) -> bool {
        !self.domain.is_identity()
    }

    pub fn is_fixed(&self) -> bool {
        !self.core.fixed.is_empty() || !self.core.labels_consistent()
    }

    pub fn is_degreed(&self) -> bool {
        self.core.degrees.is_some()
    }

    pub fn is_sliced(&self) -> bool {
        self.window.is_some()
    }

    pub fn is_partial(&self) -> bool {
        self.core.k < self.core.n
    }

    pub fn is_combination(&self) -> bool {
        self.core.is_combination()
    }

    /// True when no constraint, relabeling or slice applies.
    pub fn is_pure(&self) -> bool {
        !(self.is_rapplied()
            || self.is_dapplied()
            || self.is_fixed()
            || self.is_degreed()
            || self.is_sliced()
            || self.is_partial()
            || self.is_combination())
    }

    /// Member at `index`; negative indices count from the end.
    pub fn get(&self, index: impl Into<BigInt>) -> Result<Perm<T, K>, CombiError> {
        let rank = resolve_index(index.into(), &self.len())?;
        Ok(self.perm_at(&rank))
    }

    /// Member at local `rank`, which must be below [`len`](Self::len).
    pub(crate) fn perm_at(&self, rank: &BigUint) -> Perm<T, K> {
        let ancestor = match &self.window {
            Some(window) => window.start() + rank,
            None => rank.clone(),
        };
        let positions = codec::unrank(&self.core, &ancestor);
        Perm::from_parts(self.clone(), positions.into(), Some(rank.clone()))
    }

    /// Contiguous sub-range of this space, with Python slice semantics.
    ///
    /// Slicing a slice composes: `s.slice(2..6)?.slice(1..-1)?` equals
    /// `s.slice(3..5)?`.
    pub fn slice(&self, bounds: impl Into<SliceSpec>) -> Result<Self, CombiError> {
        let (start, stop) = bounds.into().canonical(&self.len())?;
        let window = match &self.window {
            Some(window) => window.narrow(&start, &stop),
            None => Window::new(start, stop),
        };
        // A window spanning the whole ancestor is no slice at all.
        let whole = window.start().is_zero() && window.stop() == self.core.length();
        Ok(Self {
            window: (!whole).then_some(window),
            ..self.clone()
        })
    }

    pub fn unsliced(&self) -> Self {
        Self {
            window: None,
            ..self.clone()
        }
    }

    /// Rank of `positions` within this (possibly sliced) space.
    pub(crate) fn local_rank(&self, positions: &[usize]) -> Option<BigUint> {
        if !codec::is_member(&self.core, positions) {
            return None;
        }
        let rank = codec::rank(&self.core, positions);
        match &self.window {
            None => Some(rank),
            Some(window) if window.contains(&rank) => Some(rank - window.start()),
            Some(_) => None,
        }
    }

    /// Wraps raw sequence positions (one per slot) as a member.
    pub fn perm_from_positions(&self, positions: Vec<usize>) -> Result<Perm<T, K>, CombiError> {
        if !codec::is_member(&self.core, &positions) {
            return Err(CombiError::NotMember);
        }
        let rank = match &self.window {
            None => None,
            Some(_) => Some(self.local_rank(&positions).ok_or(CombiError::NotMember)?),
        };
        Ok(Perm::from_parts(self.clone(), positions.into(), rank))
    }

    pub fn iter(&self) -> SpaceIter<'_, Self> {
        SpaceIter::new(self)
    }

    /// Uniformly random member, or `None` for an empty space.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Perm<T, K>> {
        Space::sample(self, rng)
    }

    /// The same space with values relabeled as sequence positions.
    pub fn unrapplied(&self) -> PermSpace<usize, K> {
        PermSpace::from_parts(
            Arc::clone(&self.core),
            Sequence::from_shared(Arc::clone(&self.core.positions), true),
            self.domain.clone(),
            self.window.clone(),
        )
    }

    /// The same space with slots keyed by index.
    pub fn undapplied(&self) -> PermSpace<T, usize> {
        PermSpace::from_parts(
            Arc::clone(&self.core),
            self.sequence.clone(),
            Sequence::from_shared(Arc::clone(&self.core.slots), true),
            self.window.clone(),
        )
    }

    /// The pure space over the same sequence length.
    pub fn purified(&self) -> PermSpace {
        PermSpace::of_len(self.core.n)
    }

    /// The same space over a different sequence of equal length.
    pub fn get_rapplied<U>(
        &self,
        sequence: impl Into<Sequence<U>>,
    ) -> Result<PermSpace<U, K>, CombiError> {
        let sequence = sequence.into();
        if sequence.len() != self.core.n {
            return Err(CombiError::LengthMismatch {
                expected: self.core.n,
                found: sequence.len(),
            });
        }
        Ok(PermSpace::from_parts(
            Arc::clone(&self.core),
            sequence,
            self.domain.clone(),
            self.window.clone(),
        ))
    }

    /// The same space with slots keyed by `domain`.
    pub fn get_dapplied<L: PartialEq>(
        &self,
        domain: impl Into<Sequence<L>>,
    ) -> Result<PermSpace<T, L>, CombiError> {
        let domain = domain.into();
        if domain.len() != self.core.k {
            return Err(CombiError::DomainLengthMismatch {
                expected: self.core.k,
                found: domain.len(),
            });
        }
        if domain
            .iter()
            .enumerate()
            .any(|(i, key)| domain[..i].contains(key))
        {
            return Err(CombiError::DuplicateDomainKey);
        }
        Ok(PermSpace::from_parts(
            Arc::clone(&self.core),
            self.sequence.clone(),
            domain,
            self.window.clone(),
        ))
    }

    /// Unsliced space without the degree filter.
    pub fn undegreed(&self) -> Result<Self, CombiError> {
        self.rederive(
            self.core.fixed.clone(),
            None,
            self.core.labels_consistent(),
        )
    }

    /// Unsliced space without fixes.
    pub fn unfixed(&self) -> Result<Self, CombiError> {
        self.rederive(BTreeMap::new(), self.core.degrees.clone(), true)
    }

    /// Unsliced space restricted to `degrees`, replacing any previous filter.
    pub fn get_degreed(&self, degrees: impl IntoIterator<Item = usize>) -> Result<Self, CombiError> {
        self.rederive(
            self.core.fixed.clone(),
            Some(degrees.into_iter().collect()),
            self.core.labels_consistent(),
        )
    }

    fn rederive(
        &self,
        fixed: BTreeMap<usize, usize>,
        degrees: Option<BTreeSet<usize>>,
        labels_consistent: bool,
    ) -> Result<Self, CombiError> {
        let core = self.core.derive(fixed, degrees, labels_consistent)?;
        Ok(Self::from_parts(
            Arc::new(core),
            self.sequence.clone(),
            self.domain.clone(),
            None,
        ))
    }
}

impl<T: PartialEq + Clone, K: PartialEq> PermSpace<T, K> {
    /// Unsliced space with `fixes` added to the existing fixed map.
    pub fn get_fixed(&self, fixes: impl IntoIterator<Item = (K, T)>) -> Result<Self, CombiError> {
        let existing = self
            .core
            .fixed
            .iter()
            .map(|(&slot, &position)| (Some(slot), self.sequence[position].clone()));
        let added = fixes
            .into_iter()
            .map(|(key, value)| (self.domain.iter().position(|d| *d == key), value));
        let (fixed, consistent) = resolve_fixes(&self.sequence, existing.chain(added));
        self.rederive(
            fixed,
            self.core.degrees.clone(),
            consistent && self.core.labels_consistent(),
        )
    }
}

impl<T: PartialEq, K: PartialEq> PermSpace<T, K> {
    /// Rank of `perm` in this space.
    ///
    /// `perm` must share this space's sequence and domain and satisfy every
    /// constraint, including the slice window.
    pub fn index(&self, perm: &Perm<T, K>) -> Result<BigUint, CombiError> {
        let other = perm.space();
        if self.sequence != other.sequence || self.domain != other.domain {
            return Err(CombiError::NotMember);
        }
        if Arc::ptr_eq(&self.core, &other.core) && self.window == other.window {
            return Ok(perm.rank().clone());
        }
        self.local_rank(perm.positions())
            .ok_or(CombiError::NotMember)
    }

    pub fn contains(&self, perm: &Perm<T, K>) -> bool {
        self.index(perm).is_ok()
    }

    /// Maps labels to positions, giving each label the smallest position
    /// not yet taken.
    fn positions_of(&self, values: &[T]) -> Option<Vec<usize>> {
        if values.len() != self.core.k {
            return None;
        }
        let mut taken = vec![false; self.core.n];
        values
            .iter()
            .map(|value| {
                let position = self
                    .sequence
                    .iter()
                    .enumerate()
                    .position(|(p, item)| !taken[p] && item == value)?;
                taken[position] = true;
                Some(position)
            })
            .collect()
    }

    /// Rank of the member whose slots hold `values`, in slot order.
    pub fn index_of(&self, values: &[T]) -> Result<BigUint, CombiError> {
        let positions = self.positions_of(values).ok_or(CombiError::NotMember)?;
        self.local_rank(&positions).ok_or(CombiError::NotMember)
    }

    pub fn contains_values(&self, values: &[T]) -> bool {
        self.index_of(values).is_ok()
    }

    /// The member whose slots hold `values`, in slot order.
    pub fn perm_from(&self, values: &[T]) -> Result<Perm<T, K>, CombiError> {
        let positions = self.positions_of(values).ok_or(CombiError::NotMember)?;
        self.perm_from_positions(positions)
    }
}

impl<T: PartialEq, K: PartialEq> PermSpace<T, K> {
    /// Equality ignoring the slice window.
    pub(crate) fn same_unsliced(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.core, &other.core) || *self.core == *other.core)
            && self.sequence == other.sequence
            && self.domain == other.domain
    }
}

impl<T: PartialEq, K: PartialEq> PartialEq for PermSpace<T, K> {
    fn eq(&self, other: &Self) -> bool {
        self.same_unsliced(other) && self.window == other.window
    }
}

impl<T: Eq, K: Eq> Eq for PermSpace<T, K> {}

impl<T, K> Space for PermSpace<T, K> {
    type Item = Perm<T, K>;

    fn length(&self) -> BigUint {
        self.len()
    }

    fn item_at(&self, rank: &BigUint) -> Option<Perm<T, K>> {
        (rank < &self.len()).then(|| self.perm_at(rank))
    }
}

impl<'a, T, K> IntoIterator for &'a PermSpace<T, K> {
    type Item = Perm<T, K>;
    type IntoIter = SpaceIter<'a, PermSpace<T, K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Display, K: Display> Display for PermSpace<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_combination() {
            "CombSpace"
        } else {
            "PermSpace"
        };
        write!(f, "<{kind}: ")?;
        if self.is_dapplied() {
            write!(f, "{} => ", self.domain)?;
        }
        write!(f, "{}", self.sequence)?;
        if self.is_partial() {
            write!(f, ", n_elements={}", self.core.k)?;
        }
        if !self.core.fixed.is_empty() {
            write!(f, ", fixed={{")?;
            for (i, (&slot, &position)) in self.core.fixed.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", self.domain[slot], self.sequence[position])?;
            }
            write!(f, "}}")?;
        }
        if let Some(degrees) = &self.core.degrees {
            let degrees: Vec<String> = degrees.iter().map(ToString::to_string).collect();
            write!(f, ", degrees=({})", degrees.join(", "))?;
        }
        if let Some(window) = &self.window {
            write!(f, "{window}")?;
        }
        write!(f, ">")
    }
}
