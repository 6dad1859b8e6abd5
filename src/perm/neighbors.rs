//! Neighborhoods: members reachable by rearranging a few slots.

use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

use num_traits::ToPrimitive;
use petgraph::graph::{NodeIndex, UnGraph};
use tracing::{debug, trace};

use super::Perm;
use crate::sequence::Sequence;
use crate::space::{CombiError, PermSpace};

impl<T: Clone + Eq + Hash, K> Perm<T, K> {
    /// Members of the originating space whose slots are a rearrangement of
    /// this perm's slots at one of the given transposition distances.
    ///
    /// Level 0 yields `self`. Results are deduplicated by value, ordered by
    /// level and then by the rank of the rearrangement.
    pub fn neighbors(
        &self,
        levels: impl IntoIterator<Item = usize>,
    ) -> Result<Vec<Self>, CombiError> {
        let levels: BTreeSet<usize> = levels.into_iter().collect();
        let k = self.len();
        let mut seen: HashSet<Vec<T>> = HashSet::new();
        seen.insert(self.to_vec());
        let mut found = Vec::new();
        if levels.contains(&0) {
            found.push(self.clone());
        }

        for &level in levels.iter().filter(|&&level| level > 0) {
            let rearrangements = PermSpace::builder(Sequence::range(k))
                .degrees([level])
                .build()?;
            let before = found.len();
            for sigma in &rearrangements {
                let candidate = sigma
                    .positions()
                    .iter()
                    .map(|&slot| self.positions[slot])
                    .collect();
                let Ok(neighbor) = self.space.perm_from_positions(candidate) else {
                    continue;
                };
                if seen.insert(neighbor.to_vec()) {
                    found.push(neighbor);
                }
            }
            trace!(level, added = found.len() - before, "collected neighbors");
        }
        Ok(found)
    }
}

/// Graph of a whole space where an edge joins two members that are
/// neighbors at one of `levels`; the edge weight is that level.
///
/// Node `i` holds the member of rank `i`. Only spaces small enough to
/// materialize are accepted.
pub fn cayley_graph<T, K>(
    space: &PermSpace<T, K>,
    levels: impl IntoIterator<Item = usize>,
) -> Result<UnGraph<Perm<T, K>, usize>, CombiError>
where
    T: Clone + Eq + Hash,
    K: PartialEq,
{
    let levels: BTreeSet<usize> = levels.into_iter().filter(|&level| level > 0).collect();
    let length = space
        .len()
        .to_usize()
        .ok_or(CombiError::Unsupported("graph of a space too large to materialize"))?;

    let mut graph = UnGraph::with_capacity(length, 0);
    let nodes: Vec<NodeIndex> = space.iter().map(|perm| graph.add_node(perm)).collect();

    for (i, &node) in nodes.iter().enumerate() {
        let perm = graph[node].clone();
        for &level in &levels {
            for neighbor in perm.neighbors([level])? {
                let j = space
                    .index(&neighbor)?
                    .to_usize()
                    .ok_or(CombiError::NotMember)?;
                if j > i {
                    graph.add_edge(node, nodes[j], level);
                }
            }
        }
    }
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built neighbor graph"
    );
    Ok(graph)
}
