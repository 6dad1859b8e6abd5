//! combi - Virtual permutation and combination spaces
//!
//! Indexable, sliceable collections of every arrangement of a sequence under
//! optional constraints (partial selection, combinations, fixed slots, degree
//! filters, relabeled slots). Members are computed from their rank on demand,
//! so spaces far beyond `u64` behave like small ones.

pub mod chain;
pub mod map_space;
pub mod math;
pub mod perm;
pub mod sequence;
pub mod space;

pub use chain::ChainSpace;
pub use map_space::MapSpace;
pub use perm::{cayley_graph, Comb, Perm};
pub use sequence::Sequence;
pub use space::{
    CombSpace, CombiError, DegreeMetric, PermSpace, SelectionMode, SliceSpec, Space, SpaceBuilder,
    SpaceConfig, SpaceIter, Window,
};
