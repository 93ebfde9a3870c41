use itertools::equal;
use petgraph::{graph::IndexType, visit::EdgeRef, EdgeType, Graph};

/// Check if two objects are identical, labels included
pub trait IsIdentical {
    fn is_identical(&self, other: &Self) -> bool;
}

impl<N: Eq, E: Eq, Ty: EdgeType, Ix: IndexType> IsIdentical
    for Graph<N, E, Ty, Ix>
{
    fn is_identical(&self, other: &Self) -> bool {
        self.node_count() == other.node_count()
            && self.edge_count() == other.edge_count()
            && equal(self.node_weights(), other.node_weights())
            && equal(
                self.edge_references()
                    .map(|e| (e.source(), e.target(), e.weight())),
                other
                    .edge_references()
                    .map(|e| (e.source(), e.target(), e.weight())),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::UnGraph;

    #[test]
    fn ident() {
        let g1 = UnGraph::<(), ()>::from_edges([(0, 1), (0, 2)]);
        let g2 = UnGraph::<(), ()>::from_edges([(0, 1), (1, 2)]);
        assert!(g1.is_identical(&g1));
        assert!(g2.is_identical(&g2));
        assert!(!g1.is_identical(&g2));
    }

    #[test]
    fn ident_edge_count() {
        let g1 = UnGraph::<(), ()>::from_edges([(0, 1)]);
        let g2 = UnGraph::<(), ()>::from_edges([(0, 1), (0, 1)]);
        assert!(!g1.is_identical(&g2));
        assert!(!g2.is_identical(&g1));
    }

    #[test]
    fn ident_node_wt() {
        use petgraph::visit::NodeIndexable;

        let g1 = UnGraph::<u8, ()>::from_edges([(0, 1), (0, 1)]);
        let mut g2 = UnGraph::<u8, ()>::from_edges([(0, 1), (0, 1)]);
        assert!(g1.is_identical(&g2));
        *g2.node_weight_mut(g2.from_index(0)).unwrap() = 1;
        assert!(!g1.is_identical(&g2));
    }

    #[test]
    fn ident_isolated_vertex() {
        let g1 = UnGraph::<(), ()>::from_edges([(0, 1)]);
        let mut g2 = g1.clone();
        g2.add_node(());
        assert!(!g1.is_identical(&g2));
    }
}
