//! Fluent construction of a [`PermSpace`].
//!
//! Label-typed inputs (sequence, domain, fixed map) are translated here into
//! positional form before the resolver sees them.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use super::config::{DegreeMetric, SelectionMode, SpaceConfig};
use super::error::CombiError;
use super::perm_space::PermSpace;
use super::resolver::Resolved;
use crate::sequence::Sequence;

/// Builder for a [`PermSpace`] over `sequence`.
///
/// Until [`domain`](SpaceBuilder::domain) is called, slots are keyed by their
/// index and `K = usize`.
#[derive(Debug, Clone)]
pub struct SpaceBuilder<T, K = usize> {
    sequence: Sequence<T>,
    domain: Option<Sequence<K>>,
    default_domain: fn(usize) -> Option<Sequence<K>>,
    /// Fixes keyed by slot index, recorded before a domain was attached.
    fixed_slots: Vec<(usize, T)>,
    fixed: Vec<(K, T)>,
    config: SpaceConfig,
}

impl<T> SpaceBuilder<T, usize> {
    pub fn new(sequence: impl Into<Sequence<T>>) -> Self {
        Self {
            sequence: sequence.into(),
            domain: None,
            default_domain: |k| Some(Sequence::range(k)),
            fixed_slots: Vec::new(),
            fixed: Vec::new(),
            config: SpaceConfig::default(),
        }
    }

    /// Labels the slots with `keys` instead of `0..k`.
    ///
    /// Fixes already recorded keep referring to slot indices.
    pub fn domain<K>(self, keys: impl Into<Sequence<K>>) -> SpaceBuilder<T, K> {
        let mut fixed_slots = self.fixed_slots;
        fixed_slots.extend(self.fixed);
        SpaceBuilder {
            sequence: self.sequence,
            domain: Some(keys.into()),
            default_domain: |_| None,
            fixed_slots,
            fixed: Vec::new(),
            config: self.config,
        }
    }
}

impl<T, K> SpaceBuilder<T, K> {
    /// Pins slots (by domain key) to values (by label).
    pub fn fixed_map(mut self, fixes: impl IntoIterator<Item = (K, T)>) -> Self {
        self.fixed.extend(fixes);
        self
    }

    /// Pins a single slot, addressed by index regardless of the domain.
    pub fn fixed_slot(mut self, slot: usize, value: T) -> Self {
        self.fixed_slots.push((slot, value));
        self
    }

    pub fn degrees(mut self, degrees: impl IntoIterator<Item = usize>) -> Self {
        self.config.degrees = Some(degrees.into_iter().collect());
        self
    }

    pub fn degree_metric(mut self, metric: DegreeMetric) -> Self {
        self.config.degree_metric = metric;
        self
    }

    pub fn n_elements(mut self, k: usize) -> Self {
        self.config.n_elements = Some(k);
        self
    }

    pub fn combination(self) -> Self {
        self.is_combination(true)
    }

    pub fn is_combination(mut self, combination: bool) -> Self {
        self.config.mode = if combination {
            SelectionMode::Combination
        } else {
            SelectionMode::Permutation
        };
        self
    }

    /// Replaces every scalar knob at once.
    pub fn config(mut self, config: SpaceConfig) -> Self {
        self.config = config;
        self
    }
}

impl<T: PartialEq, K: PartialEq> SpaceBuilder<T, K> {
    /// Validates the configuration and resolves it into a space.
    ///
    /// Structural mistakes are errors. A fixed map that cannot be satisfied
    /// (unknown key, value missing from the sequence, two keys competing for
    /// one value) yields an empty space instead.
    pub fn build(self) -> Result<PermSpace<T, K>, CombiError> {
        let n = self.sequence.len();
        let k = self.config.n_elements.unwrap_or(n);
        if k > n {
            return Err(CombiError::InvalidPartialSelection {
                requested: k,
                available: n,
            });
        }

        let domain = match self.domain {
            Some(domain) => domain,
            None => (self.default_domain)(k).ok_or(CombiError::DomainLengthMismatch {
                expected: k,
                found: 0,
            })?,
        };
        if domain.len() != k {
            return Err(CombiError::DomainLengthMismatch {
                expected: k,
                found: domain.len(),
            });
        }
        if has_duplicates(&domain) {
            return Err(CombiError::DuplicateDomainKey);
        }

        let keyed = self
            .fixed
            .into_iter()
            .map(|(key, value)| (domain.iter().position(|d| *d == key), value));
        let requests = self
            .fixed_slots
            .into_iter()
            .map(|(slot, value)| (Some(slot), value))
            .chain(keyed);
        let (fixed, labels_consistent) = resolve_fixes(&self.sequence, requests);

        let core = Resolved::resolve(n, &self.config, fixed, labels_consistent)?;
        Ok(PermSpace::from_parts(
            Arc::new(core),
            self.sequence,
            domain,
            None,
        ))
    }
}

fn has_duplicates<K: PartialEq>(keys: &[K]) -> bool {
    keys.iter()
        .enumerate()
        .any(|(i, key)| keys[..i].contains(key))
}

/// Maps `(slot, label)` requests to `slot → position`.
///
/// Each label takes the smallest matching position not already claimed, so
/// duplicate labels in the sequence can be fixed to several slots.
pub(crate) fn resolve_fixes<T: PartialEq>(
    sequence: &[T],
    requests: impl Iterator<Item = (Option<usize>, T)>,
) -> (BTreeMap<usize, usize>, bool) {
    let mut fixed = BTreeMap::new();
    let mut taken = vec![false; sequence.len()];
    let mut consistent = true;

    for (slot, value) in requests {
        let Some(slot) = slot else {
            trace!("fixed key missing from domain");
            consistent = false;
            continue;
        };
        if let Some(&existing) = fixed.get(&slot) {
            if sequence[existing] != value {
                trace!(slot, "slot fixed to two different values");
                consistent = false;
            }
            continue;
        }
        let free = sequence
            .iter()
            .enumerate()
            .position(|(p, item)| !taken[p] && *item == value);
        match free {
            Some(position) => {
                taken[position] = true;
                fixed.insert(slot, position);
            }
            None => {
                trace!(slot, "fixed value has no unclaimed position");
                consistent = false;
            }
        }
    }
    (fixed, consistent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn partial_selection_is_validated() {
        let err = SpaceBuilder::new(Sequence::range(3))
            .n_elements(4)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            CombiError::InvalidPartialSelection {
                requested: 4,
                available: 3
            }
        );
    }

    #[test]
    fn domain_length_must_match_selection() {
        let err = SpaceBuilder::new("meow")
            .domain("cat")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            CombiError::DomainLengthMismatch {
                expected: 4,
                found: 3
            }
        );
        assert!(SpaceBuilder::new("meow")
            .n_elements(3)
            .domain("cat")
            .build()
            .is_ok());
    }

    #[test]
    fn domain_keys_must_be_distinct() {
        let err = SpaceBuilder::new("meow")
            .domain("look")
            .build()
            .unwrap_err();
        assert_eq!(err, CombiError::DuplicateDomainKey);
    }

    #[test]
    fn duplicate_labels_claim_distinct_positions() {
        let (fixed, consistent) = resolve_fixes(
            &['a', 'b', 'a'],
            [(Some(0), 'a'), (Some(2), 'a')].into_iter(),
        );
        assert!(consistent);
        assert_eq!(fixed, [(0, 0), (2, 2)].into_iter().collect());

        let (_, consistent) = resolve_fixes(
            &['a', 'b', 'a'],
            [(Some(0), 'a'), (Some(1), 'a'), (Some(2), 'a')].into_iter(),
        );
        assert!(!consistent);
    }

    #[test]
    fn unknown_fixed_key_empties_the_space() {
        let space = SpaceBuilder::new("meow")
            .domain("abcd")
            .fixed_map([('z', 'm')])
            .build()
            .unwrap();
        assert_eq!(space.len(), BigUint::from(0u32));
    }

    #[test]
    fn fixed_slots_survive_attaching_a_domain() {
        let space = SpaceBuilder::new("meow")
            .fixed_slot(0, 'w')
            .domain("abcd")
            .fixed_map([('b', 'o')])
            .build()
            .unwrap();
        assert_eq!(space.len(), BigUint::from(2u32));
        for perm in space.iter() {
            assert_eq!(perm.get(&'a'), Some(&'w'));
            assert_eq!(perm.get(&'b'), Some(&'o'));
        }
    }
}
