use petgraph::{
    algo::connected_components,
    graph::{Graph, IndexType, NodeIndex, UnGraph},
    visit::EdgeRef,
    EdgeType,
};
use rand::{
    distributions::Uniform,
    prelude::*
};
use rand_distr::Normal;
use rand_xoshiro::Xoshiro256Plus;

/// Endless supply of random connected simple graphs
///
/// Vertices carry small weights. There are no self-loops and at most
/// one edge between any two vertices.
pub struct GraphIter {
    rng: Xoshiro256Plus,
    node_distr: Uniform<usize>,
    pub node_wt_distr: Uniform<u8>,
    edge_distr: Normal<f64>,
}

impl Default for GraphIter {
    fn default() -> Self {
        Self {
            rng: Xoshiro256Plus::seed_from_u64(0),
            node_distr: Uniform::from(1..10),
            node_wt_distr: Uniform::from(0..3),
            edge_distr: Normal::new(0.5, 1.0).unwrap(),
        }
    }
}

impl Iterator for GraphIter {
    type Item = UnGraph<u8, ()>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut rng = &mut self.rng;
            let mut g = Graph::default();
            let nnodes = self.node_distr.sample(&mut rng);
            for _ in 0..nnodes {
                g.add_node(self.node_wt_distr.sample(&mut rng));
            }
            for i in 0..nnodes {
                for j in (i + 1)..nnodes {
                    let connected = self.edge_distr.sample(&mut rng)
                        .clamp(0.0, 1.0)
                        .round() > 0.;
                    if connected {
                        g.add_edge(NodeIndex::new(i), NodeIndex::new(j), ());
                    }
                }
            }
            if connected_components(&g) == 1 {
                return Some(g)
            }
        }
    }
}

/// Apply a uniformly random vertex relabelling
///
/// Edges keep their weights and are inserted in random order.
pub fn randomize_labels<N, E, Ty, Ix>(
    g: Graph<N, E, Ty, Ix>,
    rng: &mut impl Rng,
) -> Graph<N, E, Ty, Ix>
where
    E: Clone,
    Ty: EdgeType,
    Ix: IndexType,
{
    let mut perm = Vec::from_iter(0..g.node_count());
    perm.shuffle(rng);
    let mut edges = Vec::from_iter(g.edge_references().map(|e| {
        (perm[e.source().index()], perm[e.target().index()], e.weight().clone())
    }));
    edges.shuffle(rng);

    let (nodes, _) = g.into_nodes_edges();
    let mut nodes = Vec::from_iter(nodes.into_iter().map(|n| n.weight).enumerate());
    nodes.sort_unstable_by_key(|(v, _)| perm[*v]);

    let mut res = Graph::with_capacity(nodes.len(), edges.len());
    for (_, w) in nodes {
        res.add_node(w);
    }
    for (source, target, w) in edges {
        res.add_edge(NodeIndex::new(source), NodeIndex::new(target), w);
    }
    res
}

/// Random simple 3-regular graph on `n` vertices
///
/// Three points per vertex are paired up at random until the pairing
/// has neither self-loops nor parallel edges. `n` has to be even.
pub fn random_cubic(n: usize, rng: &mut impl Rng) -> UnGraph<(), ()> {
    assert!(n % 2 == 0 && n >= 4);
    loop {
        let mut points = Vec::from_iter((0..n).flat_map(|v| [v; 3]));
        points.shuffle(rng);
        let mut edges = Vec::from_iter(
            points.chunks(2).map(|p| (p[0].min(p[1]), p[0].max(p[1])))
        );
        edges.sort_unstable();
        let simple = edges.iter().all(|(a, b)| a != b)
            && edges.windows(2).all(|w| w[0] != w[1]);
        if simple {
            return UnGraph::from_edges(
                edges.into_iter().map(|(a, b)| (a as u32, b as u32))
            )
        }
    }
}
