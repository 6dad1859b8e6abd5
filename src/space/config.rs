//! Declarative configuration of a space, before resolution.

use std::collections::BTreeSet;

/// Whether order matters in a selection.
///
/// Combinations are stored and read in ascending sequence-position order;
/// the rank codec is the only place that enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionMode {
    #[default]
    Permutation,
    Combination,
}

/// How the degree of a permutation is measured against the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DegreeMetric {
    /// Minimum number of transpositions turning the identity into the
    /// permutation, i.e. `n - cycles`. Only defined for full permutations.
    #[default]
    Transpositions,
    /// Number of slots whose value is not their home position.
    Displacements,
}

impl DegreeMetric {
    /// Degree of `positions` (slot → sequence position) drawn from a sequence
    /// of length `n`.
    ///
    /// Returns `None` when the metric is undefined for this shape, e.g. the
    /// transposition distance of a partial permutation.
    pub fn degree_of(self, positions: &[usize], n: usize) -> Option<usize> {
        match self {
            DegreeMetric::Displacements => Some(
                positions
                    .iter()
                    .enumerate()
                    .filter(|(slot, position)| slot != *position)
                    .count(),
            ),
            DegreeMetric::Transpositions => {
                if positions.len() != n {
                    return None;
                }
                let mut visited = vec![false; n];
                let mut cycles = 0;
                for start in 0..n {
                    if visited[start] {
                        continue;
                    }
                    cycles += 1;
                    let mut current = start;
                    while !visited[current] {
                        visited[current] = true;
                        current = *positions.get(current)?;
                        if current >= n {
                            return None;
                        }
                    }
                }
                Some(n - cycles)
            }
        }
    }

    /// Largest attainable degree for `k` slots drawn from `n` values.
    pub(crate) fn max_degree(self, n: usize, k: usize) -> usize {
        match self {
            DegreeMetric::Transpositions => n.saturating_sub(1),
            DegreeMetric::Displacements => k,
        }
    }
}

/// Scalar knobs of a space.
///
/// Sequence, domain and fixed map live on [`SpaceBuilder`](super::SpaceBuilder)
/// because they carry the caller's label types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpaceConfig {
    /// Selection length `k`; `None` selects the whole sequence.
    pub n_elements: Option<usize>,
    pub mode: SelectionMode,
    /// Allowed degrees; `None` disables the filter.
    pub degrees: Option<BTreeSet<usize>>,
    pub degree_metric: DegreeMetric,
}

impl SpaceConfig {
    pub fn is_combination(&self) -> bool {
        self.mode == SelectionMode::Combination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_pure() {
        let cfg = SpaceConfig::default();
        assert_eq!(cfg.n_elements, None);
        assert!(!cfg.is_combination());
        assert!(cfg.degrees.is_none());
        assert_eq!(cfg.degree_metric, DegreeMetric::Transpositions);
    }

    #[test]
    fn transposition_degree_counts_cycles() {
        let m = DegreeMetric::Transpositions;
        assert_eq!(m.degree_of(&[0, 1, 2, 3], 4), Some(0));
        assert_eq!(m.degree_of(&[1, 0, 2, 3], 4), Some(1));
        assert_eq!(m.degree_of(&[1, 2, 0, 3], 4), Some(2));
        assert_eq!(m.degree_of(&[3, 2, 0, 1], 4), Some(3));
        assert_eq!(m.degree_of(&[0, 1], 4), None);
    }

    #[test]
    fn displacement_degree_counts_moved_slots() {
        let m = DegreeMetric::Displacements;
        assert_eq!(m.degree_of(&[0, 1, 2], 3), Some(0));
        assert_eq!(m.degree_of(&[1, 0, 2], 3), Some(2));
        assert_eq!(m.degree_of(&[0, 3], 4), Some(1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_serde_shape() {
        let cfg = SpaceConfig {
            n_elements: Some(3),
            mode: SelectionMode::Combination,
            degrees: None,
            degree_metric: DegreeMetric::Displacements,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"Combination\""));
        let back: SpaceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
