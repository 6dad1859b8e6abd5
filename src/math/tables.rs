//! Precomputed lookup tables used by the rank codec's inner loops.

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Factorials `0!..=max!`, so binomials and falling factorials cost one or two
/// big-integer divisions instead of a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorialTable(Vec<BigUint>);

impl FactorialTable {
    pub fn new(max: usize) -> Self {
        let mut facts = Vec::with_capacity(max + 1);
        facts.push(BigUint::one());
        for i in 1..=max {
            let next = &facts[i - 1] * BigUint::from(i);
            facts.push(next);
        }
        Self(facts)
    }

    pub fn max(&self) -> usize {
        self.0.len() - 1
    }

    /// `n!`
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the table size.
    pub fn factorial(&self, n: usize) -> &BigUint {
        &self.0[n]
    }

    /// `n! / (n-k)!`, zero when `k > n`.
    pub fn falling(&self, n: usize, k: usize) -> BigUint {
        if k > n {
            return BigUint::zero();
        }
        &self.0[n] / &self.0[n - k]
    }

    /// `C(n, k)`, zero when `k > n`.
    pub fn binomial(&self, n: usize, k: usize) -> BigUint {
        if k > n {
            return BigUint::zero();
        }
        &self.0[n] / (&self.0[k] * &self.0[n - k])
    }
}

/// Triangle of unsigned Stirling numbers of the first kind, rows `0..=max`.
///
/// `get(m, c)` is the number of permutations of `m` items with exactly `c`
/// cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StirlingTable(Vec<Vec<BigUint>>);

impl StirlingTable {
    pub fn new(max: usize) -> Self {
        let mut rows: Vec<Vec<BigUint>> = Vec::with_capacity(max + 1);
        rows.push(vec![BigUint::one()]);
        for m in 1..=max {
            let prev = &rows[m - 1];
            let mut row = vec![BigUint::zero(); m + 1];
            for (c, slot) in row.iter_mut().enumerate().skip(1) {
                // s(m, c) = s(m-1, c-1) + (m-1) * s(m-1, c)
                let mut value = prev[c - 1].clone();
                if let Some(same) = prev.get(c) {
                    value += same * BigUint::from(m - 1);
                }
                *slot = value;
            }
            rows.push(row);
        }
        Self(rows)
    }

    pub fn max(&self) -> usize {
        self.0.len() - 1
    }

    /// `None` outside the table; zero entries are returned as zero.
    pub fn get(&self, m: usize, c: usize) -> Option<&BigUint> {
        self.0.get(m).and_then(|row| row.get(c))
    }
}
