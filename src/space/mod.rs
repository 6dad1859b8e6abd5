//! Permutation and combination spaces.
//!
//! A [`PermSpace`] is built from a sequence plus optional constraints
//! (partial length, combination mode, fixed slots, degree filter, relabeled
//! slots) and behaves like an immutable, indexable collection whose members
//! are computed on demand by the rank codec.

mod builder;
mod codec;
mod config;
mod error;
mod perm_space;
mod resolver;
mod traits;
mod window;


pub use builder::SpaceBuilder;
pub use config::{DegreeMetric, SelectionMode, SpaceConfig};
pub use error::CombiError;
pub use perm_space::PermSpace;
pub use traits::{Space, SpaceIter};
pub use window::{SliceSpec, Window};

pub(crate) use traits::resolve_index;

/// `PermSpace` in combination mode; members are stored in ascending
/// sequence-position order.
pub type CombSpace<T = usize, K = usize> = PermSpace<T, K>;
