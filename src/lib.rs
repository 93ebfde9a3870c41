//! Canonical graph labelling.
//!
//! Finds [canonical
//! labellings](https://en.wikipedia.org/wiki/Graph_canonization) by
//! individualisation and refinement, pruning the search with the
//! automorphisms discovered along the way, and applies them to
//! [petgraph](https://github.com/petgraph/petgraph) graphs.
//!
//! # Example
//!
//! ```rust
//! use petgraph::graph::UnGraph;
//! use canon_refine::prelude::*;
//! use canon_refine::iso::are_isomorphic;
//!
//! // Two different vertex labellings for the tree graph with two edges
//! let g1 = UnGraph::<(), ()>::from_edges([(0, 1), (1, 2)]);
//! let g2 = UnGraph::<(), ()>::from_edges([(0, 1), (0, 2)]);
//!
//! // There are two equivalent labellings
//! let automorphism_info = g1.clone().try_into_autom_stats().unwrap();
//! assert_eq!(automorphism_info.grpsize(), 2.);
//!
//! // Both graphs have the same certificate
//! assert!(are_isomorphic(&g1, &g2));
//!
//! // The canonical forms are identical
//! let c1 = g1.clone().into_canon();
//! let c2 = g2.clone().into_canon();
//! assert!(c1.is_identical(&c2));
//!
//! // Alternatively, we can use a dedicated `struct` for canonically
//! // labelled graphs
//! let c1 = CanonGraph::from(g1);
//! let c2 = CanonGraph::from(g2);
//! assert_eq!(c1, c2);
//! ```
//!
//! The search itself only needs the [Adjacency](search::Adjacency)
//! queries and can run on any graph representation implementing them.
//!
//! # Features
//!
//! * `serde-1`: Enables serialisation of
//!              [CanonGraph](graph::CanonGraph),
//!              [Permutation](perm::Permutation), and
//!              [Partition](partition::Partition) objects using
//!              [serde](https://crates.io/crates/serde).
//!
//! To enable features `feature1`, `feature2` add the following to
//! your Cargo.toml:
//! ```toml
//! [dependencies]
//! canon-refine = { version = "0.1", features = ["feature1", "feature2"] }
//! ```
pub mod autom;
pub mod canon;
mod cmp;
pub mod error;
pub mod graph;
pub mod group;
pub mod iso;
pub mod partition;
pub mod perm;
pub mod prelude;
pub mod search;

pub use canon::{IntoCanon, TryIntoCanon};
pub use cmp::IsIdentical;
pub use error::CanonError;
pub use group::PermutationGroup;
pub use partition::Partition;
pub use perm::Permutation;
pub use search::{Adjacency, CanonicalForm, Comparison};
