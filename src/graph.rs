use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::Index;

use num_bigint::BigUint;
use petgraph::{
    graph::{
        DefaultIx, EdgeIndex, EdgeReference, EdgeReferences, Graph, IndexType,
        Neighbors, NodeIndex, NodeIndices, UnGraph,
    },
    visit::{
        Data, EdgeCount, EdgeRef, GraphBase, GraphProp, IntoEdgeReferences,
        IntoNeighbors, IntoNodeIdentifiers, NodeCount, NodeIndexable,
    },
    Undirected,
};

use crate::{
    search::{Adjacency, CanonicalForm},
    IntoCanon, IsIdentical, Permutation,
};

/// Undirected petgraph graphs, with parallel edges counted separately
impl<N, E, Ix: IndexType> Adjacency for Graph<N, E, Undirected, Ix> {
    fn vertex_count(&self) -> usize {
        self.node_count()
    }

    fn neighbours_in_block(&self, block: &[usize], v: usize) -> usize {
        self.neighbors(NodeIndex::new(v))
            .filter(|u| block.binary_search(&u.index()).is_ok())
            .count()
    }

    fn connectivity(&self, i: usize, j: usize) -> usize {
        let (a, b) = (NodeIndex::new(i), NodeIndex::new(j));
        self.edges(a)
            .filter(|e| {
                let other = if e.source() == a { e.target() } else { e.source() };
                other == b
            })
            .count()
    }
}

/// Canonically labelled undirected graph
///
/// Only read access is offered, since any mutation could destroy the
/// canonical labelling. Two `CanonGraph`s compare equal iff the
/// graphs they were built from are isomorphic (respecting node
/// weights).
///
/// # Example
///
/// ```rust
/// use std::collections::HashSet;
/// use petgraph::graph::UnGraph;
/// use canon_refine::prelude::*;
///
/// let g1 = CanonGraph::from(UnGraph::<(), ()>::from_edges([(0, 1), (1, 2)]));
/// let g2 = CanonGraph::from(UnGraph::<(), ()>::from_edges([(2, 0), (1, 2)]));
/// assert_eq!(g1, g2);
///
/// let mut graphs = HashSet::new();
/// graphs.insert(g1);
/// assert!(graphs.contains(&g2));
/// ```
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct CanonGraph<N, Ix: IndexType = DefaultIx>(UnGraph<N, (), Ix>);

impl<N, Ix: IndexType> CanonGraph<N, Ix> {
    /// Gets a reference to the underlying `petgraph::Graph`
    pub fn get(&self) -> &UnGraph<N, (), Ix> {
        &self.0
    }

    pub fn node_count(&self) -> usize {
        self.0.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.0.edge_count()
    }

    pub fn node_weight(&self, a: NodeIndex<Ix>) -> Option<&N> {
        self.0.node_weight(a)
    }

    pub fn neighbors(&self, a: NodeIndex<Ix>) -> Neighbors<'_, (), Ix> {
        self.0.neighbors(a)
    }

    pub fn contains_edge(&self, a: NodeIndex<Ix>, b: NodeIndex<Ix>) -> bool {
        self.0.contains_edge(a, b)
    }

    pub fn node_indices(&self) -> NodeIndices<Ix> {
        self.0.node_indices()
    }

    pub fn node_weights(&self) -> impl Iterator<Item = &N> {
        self.0.node_weights()
    }

    pub fn edge_references(&self) -> EdgeReferences<'_, (), Ix> {
        self.0.edge_references()
    }

    /// The certificate of the canonical labelling
    ///
    /// The certificate only encodes which vertex pairs are adjacent,
    /// but the labelling itself depends on the node weights. Graphs
    /// that are isomorphic with matching weights share a certificate;
    /// the same structure with different weights may not.
    pub fn certificate(&self) -> BigUint {
        let form = CanonicalForm::new(&self.0);
        form.certificate_of(&Permutation::identity(self.node_count()))
    }
}

impl<N, Ix> From<UnGraph<N, (), Ix>> for CanonGraph<N, Ix>
where
    UnGraph<N, (), Ix>: IntoCanon,
    Ix: IndexType,
{
    fn from(g: UnGraph<N, (), Ix>) -> Self {
        Self(g.into_canon())
    }
}

impl<N, Ix: IndexType> From<CanonGraph<N, Ix>> for UnGraph<N, (), Ix> {
    fn from(g: CanonGraph<N, Ix>) -> Self {
        g.0
    }
}

impl<N, Ix: IndexType> AsRef<UnGraph<N, (), Ix>> for CanonGraph<N, Ix> {
    fn as_ref(&self) -> &UnGraph<N, (), Ix> {
        &self.0
    }
}

impl<N, Ix: IndexType> Adjacency for CanonGraph<N, Ix> {
    fn vertex_count(&self) -> usize {
        self.0.vertex_count()
    }

    fn neighbours_in_block(&self, block: &[usize], v: usize) -> usize {
        self.0.neighbours_in_block(block, v)
    }

    fn connectivity(&self, i: usize, j: usize) -> usize {
        self.0.connectivity(i, j)
    }
}

impl<N, Ix: IndexType> GraphBase for CanonGraph<N, Ix> {
    type NodeId = NodeIndex<Ix>;
    type EdgeId = EdgeIndex<Ix>;
}

impl<N, Ix: IndexType> GraphProp for CanonGraph<N, Ix> {
    type EdgeType = Undirected;
}

impl<N, Ix: IndexType> Data for CanonGraph<N, Ix> {
    type NodeWeight = N;
    type EdgeWeight = ();
}

impl<N, Ix: IndexType> NodeCount for CanonGraph<N, Ix> {
    fn node_count(&self) -> usize {
        self.0.node_count()
    }
}

impl<N, Ix: IndexType> EdgeCount for CanonGraph<N, Ix> {
    fn edge_count(&self) -> usize {
        self.0.edge_count()
    }
}

impl<N, Ix: IndexType> NodeIndexable for CanonGraph<N, Ix> {
    fn node_bound(&self) -> usize {
        self.0.node_bound()
    }

    fn to_index(&self, ix: NodeIndex<Ix>) -> usize {
        NodeIndexable::to_index(&self.0, ix)
    }

    fn from_index(&self, ix: usize) -> Self::NodeId {
        NodeIndexable::from_index(&self.0, ix)
    }
}

impl<'a, N, Ix: IndexType> IntoNeighbors for &'a CanonGraph<N, Ix> {
    type Neighbors = Neighbors<'a, (), Ix>;

    fn neighbors(self, n: NodeIndex<Ix>) -> Self::Neighbors {
        self.0.neighbors(n)
    }
}

impl<'a, N, Ix: IndexType> IntoNodeIdentifiers for &'a CanonGraph<N, Ix> {
    type NodeIdentifiers = NodeIndices<Ix>;

    fn node_identifiers(self) -> Self::NodeIdentifiers {
        self.0.node_indices()
    }
}

impl<'a, N, Ix: IndexType> IntoEdgeReferences for &'a CanonGraph<N, Ix> {
    type EdgeRef = EdgeReference<'a, (), Ix>;
    type EdgeReferences = EdgeReferences<'a, (), Ix>;

    fn edge_references(self) -> Self::EdgeReferences {
        self.0.edge_references()
    }
}

impl<N, Ix: IndexType> Index<NodeIndex<Ix>> for CanonGraph<N, Ix> {
    type Output = N;

    fn index(&self, index: NodeIndex<Ix>) -> &N {
        &self.0[index]
    }
}

impl<N: Eq, Ix: IndexType> PartialEq for CanonGraph<N, Ix> {
    fn eq(&self, other: &Self) -> bool {
        self.0.is_identical(&other.0)
    }
}

impl<N: Eq, Ix: IndexType> Eq for CanonGraph<N, Ix> {}

impl<N: Hash, Ix: IndexType> Hash for CanonGraph<N, Ix> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.node_count().hash(state);
        for w in self.0.node_weights() {
            w.hash(state)
        }
        for e in self.0.edge_references() {
            e.source().hash(state);
            e.target().hash(state);
        }
    }
}

impl<N: Ord, Ix: IndexType> Ord for CanonGraph<N, Ix> {
    fn cmp(&self, other: &Self) -> Ordering {
        let edges = |g: &Self| {
            g.0.edge_references()
                .map(|e| (e.source().index(), e.target().index()))
                .collect::<Vec<_>>()
        };
        self.0
            .node_weights()
            .cmp(other.0.node_weights())
            .then_with(|| edges(self).cmp(&edges(other)))
    }
}

impl<N: Ord, Ix: IndexType> PartialOrd for CanonGraph<N, Ix> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
