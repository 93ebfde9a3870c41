use crate::error::CanonError;
use crate::group::PermutationGroup;
use crate::partition::Partition;
use crate::perm::Permutation;
use crate::search::CanonicalForm;

use std::cmp::Ord;
use std::fmt::Debug;
use std::hash::Hash;

use ahash::AHashMap;
use log::trace;
use petgraph::{
    graph::{Graph, IndexType, NodeIndex},
    visit::EdgeRef,
    Undirected,
};

/// Find the canonical labelling for a graph
pub trait IntoCanon {
    fn into_canon(self) -> Self;
}

/// Try to find the canonical labelling for a graph
pub trait TryIntoCanon {
    type Error;

    fn try_into_canon(self) -> Result<Self, Self::Error>
    where
        Self: Sized;
}

impl<N, E, Ix: IndexType> IntoCanon for Graph<N, E, Undirected, Ix>
where
    Graph<N, E, Undirected, Ix>: TryIntoCanon,
    <Graph<N, E, Undirected, Ix> as TryIntoCanon>::Error: Debug,
{
    fn into_canon(self) -> Self {
        self.try_into_canon().unwrap()
    }
}

impl<N, Ix: IndexType> TryIntoCanon for Graph<N, (), Undirected, Ix>
where
    N: Ord + Hash,
{
    type Error = CanonError;

    fn try_into_canon(self) -> Result<Self, Self::Error> {
        if self.node_count() == 0 {
            return Ok(self);
        }
        let (best, _) = coloured_search(&self)?;
        Ok(relabel(self, &best))
    }
}

/// Run the search on `g`, starting from the partition into vertices
/// with the same weight and number of self-loops
pub(crate) fn coloured_search<N, Ix>(
    g: &Graph<N, (), Undirected, Ix>,
) -> Result<(Permutation, PermutationGroup), CanonError>
where
    N: Ord + Hash,
    Ix: IndexType,
{
    let mut loops = vec![0usize; g.node_count()];
    for e in g.edge_references() {
        if e.source() == e.target() {
            loops[e.source().index()] += 1;
        }
    }
    let colours = Partition::from_invariant(g.node_count(), |v| {
        (&g[NodeIndex::new(v)], loops[v])
    });
    trace!("initial colouring: {colours}");
    let mut form = CanonicalForm::new(g);
    let best = form.canon(colours)?.clone();
    Ok((best, form.into_automorphism_group()))
}

/// Move vertex `best[i]` to index `i`
///
/// Edges are emitted sorted by their new endpoints, so relabelling two
/// graphs that are identical up to edge order gives identical results.
fn relabel<N, Ix: IndexType>(
    g: Graph<N, (), Undirected, Ix>,
    best: &Permutation,
) -> Graph<N, (), Undirected, Ix> {
    let pos = best.invert();
    let mut multiplicity: AHashMap<(usize, usize), usize> = AHashMap::new();
    for e in g.edge_references() {
        let (a, b) = (pos[e.source().index()], pos[e.target().index()]);
        *multiplicity.entry((a.min(b), a.max(b))).or_default() += 1;
    }
    let mut edges = Vec::from_iter(multiplicity);
    edges.sort_unstable();

    let (nodes, _) = g.into_nodes_edges();
    let mut weights = Vec::from_iter(nodes.into_iter().map(|n| n.weight).enumerate());
    weights.sort_unstable_by_key(|(v, _)| pos[*v]);

    let nedges = edges.iter().map(|(_, m)| m).sum();
    let mut res = Graph::with_capacity(weights.len(), nedges);
    for (_, w) in weights {
        res.add_node(w);
    }
    for ((a, b), m) in edges {
        for _ in 0..m {
            res.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
        }
    }
    res
}
