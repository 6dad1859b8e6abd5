//! Exact combinatorial counting over arbitrary precision integers.
//!
//! Every count the engine produces (space lengths, block sizes during
//! unranking) goes through these helpers, so nothing here ever touches a
//! fixed-width integer for a result.

mod tables;

pub use tables::{FactorialTable, StirlingTable};

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

/// `n!`
pub fn factorial(n: usize) -> BigUint {
    (2..=n).fold(BigUint::one(), |acc, i| acc * BigUint::from(i))
}

/// `n · (n-1) · … · (n-k+1)`, the number of ordered selections of `k` out of `n`.
///
/// Zero when `k > n`; one when `k == 0`.
pub fn falling_factorial(n: usize, k: usize) -> BigUint {
    if k > n {
        return BigUint::zero();
    }
    ((n - k + 1)..=n).fold(BigUint::one(), |acc, i| acc * BigUint::from(i))
}

/// Binomial coefficient `C(n, k)`, zero when `k > n`.
pub fn binomial(n: usize, k: usize) -> BigUint {
    if k > n {
        return BigUint::zero();
    }
    let k = k.min(n - k);
    let mut result = BigUint::one();
    for i in 0..k {
        // Exact at every step: the running value is C(n, i + 1) after the division.
        result = result * BigUint::from(n - i) / BigUint::from(i + 1);
    }
    result
}

/// Number of derangements of `n` items, by inclusion–exclusion.
pub fn derangements(n: usize) -> BigUint {
    let mut total = BigInt::zero();
    for i in 0..=n {
        let term = BigInt::from(binomial(n, i) * factorial(n - i));
        if i % 2 == 0 {
            total += term;
        } else {
            total -= term;
        }
    }
    // Inclusion–exclusion over a finite set never goes negative.
    total.to_biguint().unwrap_or_default()
}

/// Rencontres number: permutations of `n` items with exactly `k` fixed points.
///
/// Equivalently, the permutations of `n` items with exactly `n - k` displaced
/// items.
pub fn rencontres(n: usize, k: usize) -> BigUint {
    if k > n {
        return BigUint::zero();
    }
    binomial(n, k) * derangements(n - k)
}

/// Unsigned Stirling number of the first kind: permutations of `n` items with
/// exactly `k` cycles.
pub fn stirling_first(n: usize, k: usize) -> BigUint {
    StirlingTable::new(n).get(n, k).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn factorial_small_values() {
        assert_eq!(factorial(0), big(1));
        assert_eq!(factorial(1), big(1));
        assert_eq!(factorial(5), big(120));
        assert_eq!(factorial(20), big(2_432_902_008_176_640_000));
    }

    #[test]
    fn factorial_exceeds_machine_words() {
        let f = factorial(100);
        assert_eq!(f.to_string().len(), 158);
    }

    #[test]
    fn falling_factorial_edges() {
        assert_eq!(falling_factorial(5, 0), big(1));
        assert_eq!(falling_factorial(5, 2), big(20));
        assert_eq!(falling_factorial(5, 5), big(120));
        assert_eq!(falling_factorial(5, 6), big(0));
    }

    #[test]
    fn binomial_matches_pascal() {
        for n in 1..12 {
            for k in 1..n {
                assert_eq!(binomial(n, k), binomial(n - 1, k - 1) + binomial(n - 1, k));
            }
        }
        assert_eq!(binomial(5, 2), big(10));
        assert_eq!(binomial(3, 4), big(0));
    }

    #[test]
    fn derangement_sequence() {
        let expected = [1u64, 0, 1, 2, 9, 44, 265, 1854];
        for (n, value) in expected.iter().enumerate() {
            assert_eq!(derangements(n), big(*value), "D({n})");
        }
    }

    #[test]
    fn rencontres_rows_sum_to_factorial() {
        for n in 0..9 {
            let sum = (0..=n).fold(BigUint::zero(), |acc, k| acc + rencontres(n, k));
            assert_eq!(sum, factorial(n));
        }
        assert_eq!(rencontres(4, 1), big(8));
        assert_eq!(rencontres(4, 3), big(0));
    }

    #[test]
    fn stirling_first_known_values() {
        assert_eq!(stirling_first(3, 1), big(2));
        assert_eq!(stirling_first(3, 2), big(3));
        assert_eq!(stirling_first(5, 2), big(50));
        assert_eq!(stirling_first(5, 4), big(10));
        assert_eq!(stirling_first(5, 0), big(0));
        assert_eq!(stirling_first(0, 0), big(1));
    }
}
