pub use crate::autom::TryIntoAutomStats;
pub use crate::canon::{IntoCanon, TryIntoCanon};
pub use crate::cmp::IsIdentical;
pub use crate::graph::CanonGraph;
pub use crate::search::Adjacency;
