//! The ground sequence every space draws its values from.

use std::fmt::{self, Display};
use std::ops::{Deref, Range};
use std::sync::Arc;

/// Immutable, positional sequence of values shared by every space built on it.
///
/// Duplicate values are allowed; positions stay distinguishable, so a
/// sequence like `"aab"` still yields `3!` permutations. Cloning is O(1).
///
/// Read access is transparent through `Deref<Target = [T]>`.
#[derive(Debug)]
pub struct Sequence<T> {
    items: Arc<[T]>,
    identity: bool,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            identity: self.identity,
        }
    }
}

impl<T> Sequence<T> {
    pub(crate) fn from_shared(items: Arc<[T]>, identity: bool) -> Self {
        Self { items, identity }
    }

    /// True for the canonical range `0..n`.
    ///
    /// Set by [`Sequence::range`], `0..n` and [`Sequence::canonicalized`].
    /// A `Vec` or iterator that happens to hold `0..n` is not inspected and
    /// counts as relabeled. Spaces over an identity sequence are not
    /// "range-applied".
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// True if both sequences share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl Sequence<usize> {
    /// The canonical sequence `0..n`.
    pub fn range(n: usize) -> Self {
        Self {
            items: (0..n).collect(),
            identity: true,
        }
    }

    /// Marks the sequence as the identity when it holds exactly `0..n`.
    pub fn canonicalized(self) -> Self {
        let identity = self.identity || self.items.iter().enumerate().all(|(i, &v)| i == v);
        Self {
            items: self.items,
            identity,
        }
    }
}

impl<T> Deref for Sequence<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T: PartialEq> PartialEq for Sequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.items[..] == other.items[..]
    }
}

impl<T: Eq> Eq for Sequence<T> {}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
            identity: false,
        }
    }
}

impl<T: Clone> From<&[T]> for Sequence<T> {
    fn from(items: &[T]) -> Self {
        Self {
            items: items.into(),
            identity: false,
        }
    }
}

impl From<&str> for Sequence<char> {
    fn from(text: &str) -> Self {
        text.chars().collect()
    }
}

impl From<Range<usize>> for Sequence<usize> {
    fn from(range: Range<usize>) -> Self {
        if range.start == 0 {
            Self::range(range.end)
        } else {
            range.collect()
        }
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
            identity: false,
        }
    }
}

impl<T: Display> Display for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.identity {
            return write!(f, "range(0, {})", self.items.len());
        }
        write!(f, "(")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_identity() {
        let seq = Sequence::range(4);
        assert!(seq.is_identity());
        assert_eq!(&seq[..], &[0, 1, 2, 3]);
        assert_eq!(Sequence::from(0..4), seq);
        assert!(Sequence::from(0..4).is_identity());
    }

    #[test]
    fn labels_are_not_identity() {
        let seq = Sequence::from("meow");
        assert!(!seq.is_identity());
        assert_eq!(seq.len(), 4);
        assert_eq!(seq[2], 'o');
        assert!(!Sequence::from(2..5).is_identity());
    }

    #[test]
    fn clones_share_storage() {
        let seq = Sequence::from(vec![1, 1, 2]);
        let other = seq.clone();
        assert!(seq.ptr_eq(&other));
        assert_eq!(seq, Sequence::from(vec![1, 1, 2]));
    }

    #[test]
    fn canonicalized_detects_identity() {
        let seq = Sequence::from(vec![0, 1, 2, 3]);
        assert!(!seq.is_identity());
        let seq = seq.canonicalized();
        assert!(seq.is_identity());
        assert_eq!(seq.to_string(), "range(0, 4)");
        assert!(!Sequence::from(vec![0, 2, 1]).canonicalized().is_identity());
    }

    #[test]
    fn display_forms() {
        assert_eq!(Sequence::range(3).to_string(), "range(0, 3)");
        assert_eq!(Sequence::from("ab").to_string(), "(a, b)");
    }
}
