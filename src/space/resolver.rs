//! Constraint resolution: turns a configuration into the effective degrees of
//! freedom of a space and memoizes its length.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use num_bigint::BigUint;
use tracing::debug;

use super::codec;
use super::config::{DegreeMetric, SelectionMode, SpaceConfig};
use super::error::CombiError;
use crate::math::{FactorialTable, StirlingTable};

/// Lookup tables a resolved space needs for counting completions.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) factorials: Option<FactorialTable>,
    pub(crate) stirling: Option<StirlingTable>,
}

/// A validated, immutable space configuration shared by every view derived
/// from it.
///
/// Slots are `0..k`, values are sequence positions `0..n`. `fixed` maps slots
/// to positions. When `consistent` is false the space is empty.
#[derive(Debug)]
pub(crate) struct Resolved {
    pub(crate) n: usize,
    pub(crate) k: usize,
    pub(crate) mode: SelectionMode,
    pub(crate) metric: DegreeMetric,
    pub(crate) fixed: BTreeMap<usize, usize>,
    pub(crate) degrees: Option<BTreeSet<usize>>,
    pub(crate) consistent: bool,
    /// Label-level verdict on the fixed map, kept for derived spaces.
    labels_consistent: bool,
    pub(crate) tables: Tables,
    /// Identity label tables, shared by the peel-off views.
    pub(crate) positions: Arc<[usize]>,
    pub(crate) slots: Arc<[usize]>,
    length: OnceLock<BigUint>,
}

impl Resolved {
    /// Validates and resolves a configuration over a sequence of length `n`.
    ///
    /// `fixed_consistent` carries label-level problems already detected by the
    /// caller (unknown keys, values missing from the sequence, duplicates).
    pub(crate) fn resolve(
        n: usize,
        config: &SpaceConfig,
        fixed: BTreeMap<usize, usize>,
        fixed_consistent: bool,
    ) -> Result<Self, CombiError> {
        let k = config.n_elements.unwrap_or(n);
        if k > n {
            return Err(CombiError::InvalidPartialSelection {
                requested: k,
                available: n,
            });
        }

        let metric = config.degree_metric;
        let degrees = match &config.degrees {
            None => None,
            Some(requested) => {
                if config.mode == SelectionMode::Combination {
                    return Err(CombiError::Unsupported(
                        "degree filtering of a combination space",
                    ));
                }
                if metric == DegreeMetric::Transpositions && k < n {
                    return Err(CombiError::Unsupported(
                        "transposition degrees of a partial permutation space",
                    ));
                }
                normalize_degrees(requested, metric.max_degree(n, k))
            }
        };

        Ok(Self::assemble(n, k, config.mode, metric, fixed, degrees, fixed_consistent))
    }

    /// The unconstrained space of all `n!` orderings.
    pub(crate) fn pure(n: usize) -> Self {
        Self::assemble(
            n,
            n,
            SelectionMode::Permutation,
            DegreeMetric::default(),
            BTreeMap::new(),
            None,
            true,
        )
    }

    /// Re-resolves with a different fixed map and degree filter, keeping the
    /// other knobs.
    pub(crate) fn derive(
        &self,
        fixed: BTreeMap<usize, usize>,
        degrees: Option<BTreeSet<usize>>,
        labels_consistent: bool,
    ) -> Result<Self, CombiError> {
        let config = SpaceConfig {
            degrees,
            ..self.config()
        };
        Self::resolve(self.n, &config, fixed, labels_consistent)
    }

    pub(crate) fn labels_consistent(&self) -> bool {
        self.labels_consistent
    }

    fn assemble(
        n: usize,
        k: usize,
        mode: SelectionMode,
        metric: DegreeMetric,
        fixed: BTreeMap<usize, usize>,
        degrees: Option<BTreeSet<usize>>,
        labels_consistent: bool,
    ) -> Self {
        let consistent = labels_consistent && fixed_is_consistent(n, k, mode, &fixed);

        let mut tables = Tables::default();
        if mode == SelectionMode::Combination {
            tables.factorials = Some(FactorialTable::new(n));
        } else if degrees.is_some() {
            match metric {
                DegreeMetric::Transpositions => {
                    tables.stirling = Some(StirlingTable::new(k.saturating_sub(fixed.len())));
                }
                DegreeMetric::Displacements => {
                    tables.factorials = Some(FactorialTable::new(n));
                }
            }
        }

        debug!(
            n,
            k,
            mode = ?mode,
            fixed = fixed.len(),
            degrees = ?degrees,
            consistent,
            "resolved space configuration"
        );

        Self {
            n,
            k,
            mode,
            metric,
            fixed,
            degrees,
            consistent,
            labels_consistent,
            tables,
            positions: (0..n).collect(),
            slots: (0..k).collect(),
            length: OnceLock::new(),
        }
    }

    /// Total number of members, computed once.
    pub(crate) fn length(&self) -> &BigUint {
        self.length.get_or_init(|| {
            let length = codec::count_all(self);
            debug!(n = self.n, k = self.k, %length, "computed space length");
            length
        })
    }

    /// Unfixed slots in ascending order.
    pub(crate) fn free_slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.k).filter(move |slot| !self.fixed.contains_key(slot))
    }

    pub(crate) fn is_combination(&self) -> bool {
        self.mode == SelectionMode::Combination
    }

    /// The same constraints re-expressed as a configuration, for deriving
    /// sibling spaces.
    pub(crate) fn config(&self) -> SpaceConfig {
        SpaceConfig {
            n_elements: Some(self.k),
            mode: self.mode,
            degrees: self.degrees.clone(),
            degree_metric: self.metric,
        }
    }
}

impl PartialEq for Resolved {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
            && self.k == other.k
            && self.mode == other.mode
            && self.metric == other.metric
            && self.fixed == other.fixed
            && self.degrees == other.degrees
            && self.consistent == other.consistent
    }
}

impl Eq for Resolved {}

/// Drops unattainable degrees; a filter admitting every attainable degree is
/// no filter at all.
fn normalize_degrees(requested: &BTreeSet<usize>, max: usize) -> Option<BTreeSet<usize>> {
    let kept: BTreeSet<usize> = requested.iter().copied().filter(|d| *d <= max).collect();
    if kept.len() == max + 1 {
        None
    } else {
        Some(kept)
    }
}

fn fixed_is_consistent(
    n: usize,
    k: usize,
    mode: SelectionMode,
    fixed: &BTreeMap<usize, usize>,
) -> bool {
    let mut seen = BTreeSet::new();
    for (&slot, &position) in fixed {
        if slot >= k || position >= n || !seen.insert(position) {
            return false;
        }
    }
    if mode == SelectionMode::Combination {
        // BTreeMap iterates slots in order, so positions must rise with them.
        let positions: Vec<usize> = fixed.values().copied().collect();
        if positions.windows(2).any(|w| w[0] >= w[1]) {
            return false;
        }
    }
    true
}
