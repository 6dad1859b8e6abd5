use num_bigint::{BigInt, BigUint};
use thiserror::Error;

/// Errors raised while building or querying a space.
///
/// Logically contradictory constraints are not errors: they produce a valid
/// space of length zero.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CombiError {
    #[error("Cannot select {requested} elements from a sequence of length {available}")]
    InvalidPartialSelection { requested: usize, available: usize },

    #[error("Domain has {found} keys but the space selects {expected} elements")]
    DomainLengthMismatch { expected: usize, found: usize },

    #[error("Domain keys must be distinct")]
    DuplicateDomainKey,

    #[error("Expected {expected} items, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Index {index} is out of range for a space of length {length}")]
    IndexOutOfRange { index: BigInt, length: BigUint },

    #[error("Value is not a member of this space")]
    NotMember,

    #[error("Unsupported: {0}")]
    Unsupported(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_partial_selection_display() {
        let e = CombiError::InvalidPartialSelection {
            requested: 6,
            available: 5,
        };
        assert_eq!(
            e.to_string(),
            "Cannot select 6 elements from a sequence of length 5"
        );
    }

    #[test]
    fn index_out_of_range_display() {
        let e = CombiError::IndexOutOfRange {
            index: BigInt::from(-30),
            length: BigUint::from(24u32),
        };
        assert_eq!(
            e.to_string(),
            "Index -30 is out of range for a space of length 24"
        );
    }

    #[test]
    fn unsupported_display() {
        let e = CombiError::Unsupported("slice step other than 1");
        assert_eq!(e.to_string(), "Unsupported: slice step other than 1");
    }

    #[test]
    fn error_equality() {
        assert_eq!(CombiError::NotMember, CombiError::NotMember);
        assert_ne!(CombiError::NotMember, CombiError::DuplicateDomainKey);
    }
}
