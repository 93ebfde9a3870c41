use std::hash::Hash;

use crate::canon::coloured_search;
use crate::error::CanonError;
use crate::group::PermutationGroup;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use petgraph::{
    graph::{Graph, IndexType},
    Undirected,
};

/// Information on automorphism group of a graph
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct AutomStats {
    /// The exact size of the automorphism group
    pub group_order: BigUint,
    /// Number of orbits of the automorphism group
    pub num_orbits: usize,
    /// Number of stored non-trivial coset representatives
    pub num_generators: usize,
}

impl AutomStats {
    /// The size of the automorphism group, as a floating-point number
    pub fn grpsize(&self) -> f64 {
        self.group_order.to_f64().unwrap_or(f64::INFINITY)
    }
}

impl From<&PermutationGroup> for AutomStats {
    fn from(group: &PermutationGroup) -> Self {
        Self {
            group_order: group.order(),
            num_orbits: group.orbits().len(),
            num_generators: group.generators().count(),
        }
    }
}

/// Statistics for a graph's automorphism group
///
/// Automorphisms have to preserve node weights.
pub trait TryIntoAutomStats {
    type Error;

    fn try_into_autom_stats(self) -> Result<AutomStats, Self::Error>;
}

impl<N, Ix> TryIntoAutomStats for Graph<N, (), Undirected, Ix>
where
    N: Ord + Hash,
    Ix: IndexType,
{
    type Error = CanonError;

    fn try_into_autom_stats(self) -> Result<AutomStats, Self::Error> {
        let (_, group) = coloured_search(&self)?;
        Ok(AutomStats::from(&group))
    }
}
