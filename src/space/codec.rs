//! Rank codec: the bijection between ranks and slot assignments.
//!
//! Ranks follow lexicographic order of the position tuple. Three strategies
//! share that order:
//!
//! - plain permutations use the factorial number system, one division per
//!   free slot;
//! - combinations use the combinatorial number system inside each run of free
//!   slots delimited by fixed slots;
//! - degree-filtered permutations weight every candidate value by the number
//!   of completions it admits and walk the blocks.
//!
//! Every function here expects its input to be valid: ranks below the space
//! length and positions that passed [`is_member`].

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use super::config::DegreeMetric;
use super::resolver::Resolved;
use crate::math::falling_factorial;

/// Work-in-progress assignment of slots to sequence positions.
struct Assignment {
    slots: Vec<Option<usize>>,
    used: Vec<bool>,
    filled: usize,
}

impl Assignment {
    fn seeded(core: &Resolved) -> Self {
        let mut assignment = Self {
            slots: vec![None; core.k],
            used: vec![false; core.n],
            filled: 0,
        };
        for (&slot, &position) in &core.fixed {
            assignment.assign(slot, position);
        }
        assignment
    }

    fn assign(&mut self, slot: usize, position: usize) {
        self.slots[slot] = Some(position);
        self.used[position] = true;
        self.filled += 1;
    }

    fn unassign(&mut self, slot: usize) {
        if let Some(position) = self.slots[slot].take() {
            self.used[position] = false;
            self.filled -= 1;
        }
    }

    fn unused(&self) -> Vec<usize> {
        (0..self.used.len()).filter(|p| !self.used[*p]).collect()
    }

    fn into_positions(self) -> Vec<usize> {
        self.slots.into_iter().map(|p| p.unwrap_or_default()).collect()
    }

    /// Cycles entirely made of assigned slots. Only meaningful when `k == n`.
    fn closed_cycles(&self) -> usize {
        let mut visited = vec![false; self.slots.len()];
        let mut closed = 0;
        for start in 0..self.slots.len() {
            if visited[start] || self.slots[start].is_none() {
                continue;
            }
            let mut current = start;
            loop {
                visited[current] = true;
                match self.slots[current] {
                    Some(next) if next == start => {
                        closed += 1;
                        break;
                    }
                    Some(next) if next < visited.len() && !visited[next] => current = next,
                    _ => break,
                }
            }
        }
        closed
    }
}

/// Number of members of the whole space.
pub(crate) fn count_all(core: &Resolved) -> BigUint {
    if !core.consistent {
        return BigUint::zero();
    }
    if core.is_combination() {
        return combination_runs(core)
            .iter()
            .map(|run| run.count(core))
            .product();
    }
    completions(core, &Assignment::seeded(core))
}

/// Number of ways to finish a (permutation-mode) partial assignment.
fn completions(core: &Resolved, assignment: &Assignment) -> BigUint {
    let unassigned = core.k - assignment.filled;
    let unused = core.n - assignment.filled;
    let Some(degrees) = &core.degrees else {
        return falling_factorial(unused, unassigned);
    };
    match core.metric {
        DegreeMetric::Transpositions => {
            let Some(stirling) = &core.tables.stirling else {
                return BigUint::zero();
            };
            let closed = assignment.closed_cycles();
            degrees
                .iter()
                .filter(|d| core.n >= **d + closed)
                .filter_map(|d| stirling.get(unassigned, core.n - d - closed))
                .sum()
        }
        DegreeMetric::Displacements => {
            let mut displaced = 0;
            let mut homeable = 0;
            for (slot, position) in assignment.slots.iter().enumerate() {
                match position {
                    Some(p) if *p != slot => displaced += 1,
                    Some(_) => {}
                    None if slot < core.n && !assignment.used[slot] => homeable += 1,
                    None => {}
                }
            }
            degrees
                .iter()
                .filter(|d| **d >= displaced && **d - displaced <= unassigned)
                .map(|d| unassigned - (d - displaced))
                .filter(|home| *home <= homeable)
                .map(|home| with_fixed_points(core, unassigned, unused, homeable, home))
                .sum()
        }
    }
}

/// Injections of `u` slots into `m` values in which exactly `j` of the `h`
/// slots that could go home do so:
/// `C(h, j) · Σ_i (-1)^i C(h-j, i) · P(m-j-i, u-j-i)`.
fn with_fixed_points(core: &Resolved, u: usize, m: usize, h: usize, j: usize) -> BigUint {
    let Some(table) = &core.tables.factorials else {
        return BigUint::zero();
    };
    let mut sum = BigInt::zero();
    for i in 0..=(h - j) {
        let term = BigInt::from(table.binomial(h - j, i) * table.falling(m - j - i, u - j - i));
        if i % 2 == 0 {
            sum += term;
        } else {
            sum -= term;
        }
    }
    table.binomial(h, j) * sum.to_biguint().unwrap_or_default()
}

/// Maximal stretch of free slots between fixed slots, for combinations.
///
/// Its slots must take ascending positions in `low..high`.
struct Run {
    slots: Vec<usize>,
    low: usize,
    high: usize,
}

impl Run {
    fn count(&self, core: &Resolved) -> BigUint {
        binomial(core, self.high - self.low, self.slots.len())
    }
}

fn combination_runs(core: &Resolved) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current = Run {
        slots: Vec::new(),
        low: 0,
        high: core.n,
    };
    for slot in 0..core.k {
        match core.fixed.get(&slot) {
            Some(&position) => {
                let next = Run {
                    slots: Vec::new(),
                    low: position + 1,
                    high: core.n,
                };
                let mut done = std::mem::replace(&mut current, next);
                if !done.slots.is_empty() {
                    done.high = position;
                    runs.push(done);
                }
            }
            None => current.slots.push(slot),
        }
    }
    if !current.slots.is_empty() {
        runs.push(current);
    }
    runs
}

fn binomial(core: &Resolved, n: usize, k: usize) -> BigUint {
    match &core.tables.factorials {
        Some(table) => table.binomial(n, k),
        None => crate::math::binomial(n, k),
    }
}

/// Product of the run counts after each run, so a run's blocks can be scaled
/// by everything that follows it.
fn later_products(core: &Resolved, runs: &[Run]) -> Vec<BigUint> {
    let mut later = vec![BigUint::from(1u32); runs.len()];
    for i in (0..runs.len().saturating_sub(1)).rev() {
        later[i] = &later[i + 1] * runs[i + 1].count(core);
    }
    later
}

/// Positions for `rank`, which must be below the unsliced length.
pub(crate) fn unrank(core: &Resolved, rank: &BigUint) -> Vec<usize> {
    if core.is_combination() {
        unrank_combination(core, rank)
    } else if core.degrees.is_none() {
        unrank_plain(core, rank)
    } else {
        unrank_weighted(core, rank)
    }
}

/// Rank of `positions`, which must be a member.
pub(crate) fn rank(core: &Resolved, positions: &[usize]) -> BigUint {
    if core.is_combination() {
        rank_combination(core, positions)
    } else if core.degrees.is_none() {
        rank_plain(core, positions)
    } else {
        rank_weighted(core, positions)
    }
}

fn unrank_plain(core: &Resolved, rank: &BigUint) -> Vec<usize> {
    let mut assignment = Assignment::seeded(core);
    let mut unused = assignment.unused();
    let free: Vec<usize> = core.free_slots().collect();
    let mut block = falling_factorial(unused.len(), free.len());
    let mut residual = rank.clone();
    for slot in free {
        let choices = unused.len();
        block /= BigUint::from(choices);
        let (quotient, remainder) = residual.div_rem(&block);
        let index = quotient.to_usize().map_or(choices - 1, |q| q.min(choices - 1));
        assignment.assign(slot, unused.remove(index));
        residual = remainder;
    }
    assignment.into_positions()
}

fn rank_plain(core: &Resolved, positions: &[usize]) -> BigUint {
    let assignment = Assignment::seeded(core);
    let mut unused = assignment.unused();
    let free: Vec<usize> = core.free_slots().collect();
    let mut block = falling_factorial(unused.len(), free.len());
    let mut rank = BigUint::zero();
    for slot in free {
        block /= BigUint::from(unused.len());
        let index = unused.partition_point(|p| *p < positions[slot]);
        rank += &block * BigUint::from(index);
        unused.remove(index);
    }
    rank
}

fn unrank_combination(core: &Resolved, rank: &BigUint) -> Vec<usize> {
    let mut assignment = Assignment::seeded(core);
    let runs = combination_runs(core);
    let later = later_products(core, &runs);
    let mut residual = rank.clone();
    for (run, scale) in runs.iter().zip(&later) {
        // Earlier runs are fully decided, so only this run's choices and the
        // runs after it remain in the residual.
        let run_block = scale.clone();
        let mut low = run.low;
        for (t, &slot) in run.slots.iter().enumerate() {
            let after = run.slots.len() - t - 1;
            let mut chosen = run.high - after - 1;
            for candidate in low..(run.high - after) {
                let count = &run_block * binomial(core, run.high - candidate - 1, after);
                if residual < count {
                    chosen = candidate;
                    break;
                }
                residual -= count;
            }
            assignment.assign(slot, chosen);
            low = chosen + 1;
        }
    }
    assignment.into_positions()
}

fn rank_combination(core: &Resolved, positions: &[usize]) -> BigUint {
    let runs = combination_runs(core);
    let later = later_products(core, &runs);
    let mut rank = BigUint::zero();
    for (run, scale) in runs.iter().zip(&later) {
        let mut low = run.low;
        for (t, &slot) in run.slots.iter().enumerate() {
            let after = run.slots.len() - t - 1;
            let actual = positions[slot];
            for candidate in low..actual {
                rank += scale * binomial(core, run.high - candidate - 1, after);
            }
            low = actual + 1;
        }
    }
    rank
}

fn unrank_weighted(core: &Resolved, rank: &BigUint) -> Vec<usize> {
    let mut assignment = Assignment::seeded(core);
    let free: Vec<usize> = core.free_slots().collect();
    let mut residual = rank.clone();
    for slot in free {
        let mut last = None;
        for candidate in assignment.unused() {
            assignment.assign(slot, candidate);
            let count = completions(core, &assignment);
            if residual < count {
                last = None;
                break;
            }
            residual -= count;
            assignment.unassign(slot);
            last = Some(candidate);
        }
        // Only reachable with an out-of-range rank; keep the shape well formed.
        if let Some(candidate) = last {
            assignment.assign(slot, candidate);
        }
    }
    assignment.into_positions()
}

fn rank_weighted(core: &Resolved, positions: &[usize]) -> BigUint {
    let mut assignment = Assignment::seeded(core);
    let free: Vec<usize> = core.free_slots().collect();
    let mut rank = BigUint::zero();
    for slot in free {
        let actual = positions[slot];
        for candidate in assignment.unused() {
            if candidate >= actual {
                break;
            }
            assignment.assign(slot, candidate);
            rank += completions(core, &assignment);
            assignment.unassign(slot);
        }
        assignment.assign(slot, actual);
    }
    rank
}

/// Whether `positions` satisfies every constraint of the space.
pub(crate) fn is_member(core: &Resolved, positions: &[usize]) -> bool {
    if !core.consistent || positions.len() != core.k {
        return false;
    }
    let mut used = vec![false; core.n];
    for &position in positions {
        if position >= core.n || used[position] {
            return false;
        }
        used[position] = true;
    }
    if core
        .fixed
        .iter()
        .any(|(&slot, &position)| positions[slot] != position)
    {
        return false;
    }
    if core.is_combination() && positions.windows(2).any(|w| w[0] >= w[1]) {
        return false;
    }
    match &core.degrees {
        None => true,
        Some(degrees) => core
            .metric
            .degree_of(positions, core.n)
            .is_some_and(|d| degrees.contains(&d)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::space::config::{SelectionMode, SpaceConfig};

    fn resolve(
        n: usize,
        k: Option<usize>,
        mode: SelectionMode,
        fixed: &[(usize, usize)],
        degrees: Option<&[usize]>,
        metric: DegreeMetric,
    ) -> Resolved {
        let config = SpaceConfig {
            n_elements: k,
            mode,
            degrees: degrees.map(|d| d.iter().copied().collect::<BTreeSet<_>>()),
            degree_metric: metric,
        };
        let fixed: BTreeMap<usize, usize> = fixed.iter().copied().collect();
        Resolved::resolve(n, &config, fixed, true).unwrap()
    }

    fn pure(n: usize) -> Resolved {
        resolve(n, None, SelectionMode::Permutation, &[], None, DegreeMetric::Transpositions)
    }

    /// Unranks every rank, checking order, membership and the round trip.
    fn assert_bijection(core: &Resolved) -> Vec<Vec<usize>> {
        let length = core.length().to_usize().unwrap();
        let mut all = Vec::with_capacity(length);
        for r in 0..length {
            let positions = unrank(core, &BigUint::from(r));
            assert!(is_member(core, &positions), "rank {r} -> {positions:?}");
            assert_eq!(rank(core, &positions), BigUint::from(r));
            if let Some(previous) = all.last() {
                assert!(previous < &positions, "order broken at rank {r}");
            }
            all.push(positions);
        }
        all
    }

    /// Brute-force count of members among all k-arrangements of n.
    fn brute_force(core: &Resolved) -> usize {
        fn walk(core: &Resolved, prefix: &mut Vec<usize>, count: &mut usize) {
            if prefix.len() == core.k {
                if is_member(core, prefix) {
                    *count += 1;
                }
                return;
            }
            for p in 0..core.n {
                if !prefix.contains(&p) {
                    prefix.push(p);
                    walk(core, prefix, count);
                    prefix.pop();
                }
            }
        }
        let mut count = 0;
        walk(core, &mut Vec::new(), &mut count);
        count
    }

    #[test]
    fn pure_permutations_are_lexicographic() {
        let core = pure(4);
        assert_eq!(core.length(), &BigUint::from(24u32));
        let all = assert_bijection(&core);
        assert_eq!(all[0], vec![0, 1, 2, 3]);
        assert_eq!(all[7], vec![1, 0, 3, 2]);
        assert_eq!(all[23], vec![3, 2, 1, 0]);
    }

    #[test]
    fn partial_permutations() {
        let core = resolve(5, Some(2), SelectionMode::Permutation, &[], None, DegreeMetric::Transpositions);
        assert_eq!(core.length(), &BigUint::from(20u32));
        let all = assert_bijection(&core);
        assert_eq!(all[0], vec![0, 1]);
        assert_eq!(all[19], vec![4, 3]);
    }

    #[test]
    fn combinations_use_combinatorial_number_system() {
        let core = resolve(5, Some(2), SelectionMode::Combination, &[], None, DegreeMetric::Transpositions);
        assert_eq!(core.length(), &BigUint::from(10u32));
        let all = assert_bijection(&core);
        assert_eq!(all[0], vec![0, 1]);
        assert_eq!(all[4], vec![1, 2]);
        assert_eq!(all[9], vec![3, 4]);
    }

    #[test]
    fn combinations_with_fixed_slots() {
        let core = resolve(
            7,
            Some(4),
            SelectionMode::Combination,
            &[(1, 2), (3, 5)],
            None,
            DegreeMetric::Transpositions,
        );
        // slot 0 from {0, 1}, slot 2 from {3, 4}
        assert_eq!(core.length(), &BigUint::from(4u32));
        let all = assert_bijection(&core);
        assert_eq!(all, vec![vec![0, 2, 3, 5], vec![0, 2, 4, 5], vec![1, 2, 3, 5], vec![1, 2, 4, 5]]);
    }

    #[test]
    fn fixed_permutations() {
        let core = resolve(
            5,
            None,
            SelectionMode::Permutation,
            &[(0, 0), (2, 2), (4, 4)],
            None,
            DegreeMetric::Transpositions,
        );
        let all = assert_bijection(&core);
        assert_eq!(all, vec![vec![0, 1, 2, 3, 4], vec![0, 3, 2, 1, 4]]);
    }

    #[test]
    fn transposition_degrees_match_brute_force() {
        for degrees in [&[0usize][..], &[1], &[2], &[1, 3], &[0, 2, 4]] {
            let core = resolve(5, None, SelectionMode::Permutation, &[], Some(degrees), DegreeMetric::Transpositions);
            assert_eq!(core.length().to_usize().unwrap(), brute_force(&core), "{degrees:?}");
            assert_bijection(&core);
        }
    }

    #[test]
    fn transposition_degrees_with_fixed_slots() {
        let cases: [(&[(usize, usize)], usize, usize); 8] = [
            (&[(0, 0), (1, 1), (2, 2)], 1, 0),
            (&[(0, 0), (1, 1)], 1, 1),
            (&[(0, 0)], 1, 3),
            (&[(0, 1), (1, 0)], 1, 1),
            (&[(0, 1), (1, 2)], 1, 0),
            (&[(0, 1), (1, 2)], 2, 1),
            (&[(0, 1), (1, 2)], 3, 1),
            (&[(2, 3)], 3, 2),
        ];
        for (fixed, degree, expected) in cases {
            let core = resolve(4, None, SelectionMode::Permutation, fixed, Some(&[degree]), DegreeMetric::Transpositions);
            assert_eq!(core.length(), &BigUint::from(expected), "{fixed:?} degree {degree}");
            assert_bijection(&core);
        }
    }

    #[test]
    fn displacement_degrees_are_rencontres_numbers() {
        let expected = [1u32, 0, 6, 8, 9];
        for (d, count) in expected.iter().enumerate() {
            let core = resolve(4, None, SelectionMode::Permutation, &[], Some(&[d]), DegreeMetric::Displacements);
            assert_eq!(core.length(), &BigUint::from(*count), "degree {d}");
            assert_bijection(&core);
        }
    }

    #[test]
    fn displacement_degrees_on_partial_and_fixed_spaces() {
        let partial = resolve(4, Some(2), SelectionMode::Permutation, &[], Some(&[1]), DegreeMetric::Displacements);
        assert_eq!(partial.length(), &BigUint::from(4u32));
        assert_bijection(&partial);

        for degrees in [&[0usize][..], &[1], &[2, 3], &[3]] {
            let core = resolve(
                5,
                Some(4),
                SelectionMode::Permutation,
                &[(1, 3)],
                Some(degrees),
                DegreeMetric::Displacements,
            );
            assert_eq!(core.length().to_usize().unwrap(), brute_force(&core), "{degrees:?}");
            assert_bijection(&core);
        }
    }

    #[test]
    fn closed_cycles_ignore_open_chains() {
        let core = pure(5);
        let mut assignment = Assignment::seeded(&core);
        assignment.assign(0, 1);
        assignment.assign(1, 0);
        assignment.assign(2, 3);
        assert_eq!(assignment.closed_cycles(), 1);
        assignment.assign(3, 2);
        assert_eq!(assignment.closed_cycles(), 2);
        assignment.unassign(3);
        assignment.assign(4, 4);
        assert_eq!(assignment.closed_cycles(), 2);
    }

    #[test]
    fn membership_rejects_constraint_violations() {
        let core = resolve(
            4,
            None,
            SelectionMode::Permutation,
            &[(0, 0)],
            Some(&[1]),
            DegreeMetric::Transpositions,
        );
        assert!(is_member(&core, &[0, 2, 1, 3]));
        assert!(!is_member(&core, &[1, 0, 2, 3]));
        assert!(!is_member(&core, &[0, 2, 3, 1]));
        assert!(!is_member(&core, &[0, 1, 1, 3]));
        assert!(!is_member(&core, &[0, 1, 2]));
        assert!(!is_member(&core, &[0, 1, 2, 9]));
    }

    #[test]
    fn large_space_round_trips() {
        let core = resolve(
            150,
            None,
            SelectionMode::Permutation,
            &[(1, 5), (70, 3)],
            Some(&[3, 5]),
            DegreeMetric::Transpositions,
        );
        let samples = [
            BigUint::from(10u64.pow(10)),
            BigUint::from(3 * 11u64.pow(9) - 344),
            BigUint::from(4 * 12u64.pow(8) - 5),
            BigUint::from(5 * 3u64.pow(20) + 4),
        ];
        for r in samples {
            assert!(&r < core.length());
            let positions = unrank(&core, &r);
            assert!(is_member(&core, &positions));
            assert_eq!(rank(&core, &positions), r);
        }
    }

    #[test]
    fn huge_pure_space_round_trips() {
        let core = pure(100);
        let r = core.length() - BigUint::from(12345u32);
        let positions = unrank(&core, &r);
        assert_eq!(rank(&core, &positions), r);
    }
}
