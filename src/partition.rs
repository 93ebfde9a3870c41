use std::fmt::{self, Display};
use std::hash::Hash;

use ahash::AHashMap;
use itertools::Itertools;

use crate::error::CanonError;
use crate::perm::Permutation;
use crate::search::Adjacency;

/// An ordered partition of the vertices `0..n`
///
/// Each cell is kept in ascending order. The order of the cells is
/// significant: a discrete partition, where every cell is a
/// singleton, reads as a permutation.
///
/// The structural edits do not check that the cells stay disjoint
/// and keep covering `0..n`; use [Partition::validate] at the
/// boundary.
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Partition {
    cells: Vec<Vec<usize>>,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    /// The coarsest partition: one cell holding all of `0..n`
    pub fn unit(n: usize) -> Self {
        let mut p = Self::new();
        if n > 0 {
            p.add_cell(0..n);
        }
        p
    }

    /// Group the vertices `0..n` by `key`, cells ordered by ascending key
    pub fn from_invariant<K, F>(n: usize, mut key: F) -> Self
    where
        K: Ord + Hash,
        F: FnMut(usize) -> K,
    {
        let mut classes: AHashMap<K, Vec<usize>> = AHashMap::new();
        for v in 0..n {
            classes.entry(key(v)).or_default().push(v);
        }
        let cells = classes
            .into_iter()
            .sorted_unstable_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, cell)| cell)
            .collect();
        Self { cells }
    }

    /// Vertices of `g` grouped by degree, lowest degree first
    pub fn by_degree<G: Adjacency + ?Sized>(g: &G) -> Self {
        let all = Vec::from_iter(0..g.vertex_count());
        Self::from_invariant(all.len(), |v| g.neighbours_in_block(&all, v))
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, idx: usize) -> &[usize] {
        &self.cells[idx]
    }

    pub fn cells(&self) -> impl Iterator<Item = &[usize]> {
        self.cells.iter().map(|c| c.as_slice())
    }

    pub fn first_in_cell(&self, idx: usize) -> usize {
        self.cells[idx][0]
    }

    /// Append a cell holding `elements`
    pub fn add_cell(&mut self, elements: impl IntoIterator<Item = usize>) {
        let mut cell = Vec::from_iter(elements);
        cell.sort_unstable();
        cell.dedup();
        self.cells.push(cell);
    }

    pub fn remove_cell(&mut self, idx: usize) -> Vec<usize> {
        self.cells.remove(idx)
    }

    /// Insert a cell at `idx`, shifting all later cells back by one
    ///
    /// The cell has to be sorted.
    pub fn insert_cell(&mut self, idx: usize, cell: Vec<usize>) {
        debug_assert!(cell.windows(2).all(|w| w[0] < w[1]));
        self.cells.insert(idx, cell);
    }

    pub fn is_discrete_cell(&self, idx: usize) -> bool {
        self.cells[idx].len() == 1
    }

    pub fn is_discrete(&self) -> bool {
        self.cells.iter().all(|c| c.len() == 1)
    }

    pub fn index_of_first_non_discrete_cell(&self) -> Option<usize> {
        self.cells.iter().position(|c| c.len() != 1)
    }

    /// Copy with the cell at `idx` split in two: `elements` first,
    /// followed by the remaining elements of the cell
    pub fn split_before(&self, idx: usize, elements: &[usize]) -> Self {
        self.split(idx, elements, true)
    }

    /// Copy with the cell at `idx` split in two: the remaining
    /// elements of the cell first, followed by `elements`
    pub fn split_after(&self, idx: usize, elements: &[usize]) -> Self {
        self.split(idx, elements, false)
    }

    fn split(&self, idx: usize, elements: &[usize], before: bool) -> Self {
        debug_assert!(elements.iter().all(|e| self.cells[idx].contains(e)));
        let mut split_off = elements.to_vec();
        split_off.sort_unstable();
        let rest = Vec::from_iter(
            self.cells[idx]
                .iter()
                .copied()
                .filter(|e| !split_off.contains(e)),
        );
        let (first, second) = if before {
            (split_off, rest)
        } else {
            (rest, split_off)
        };
        let mut cells = Vec::with_capacity(self.len() + 1);
        cells.extend_from_slice(&self.cells[..idx]);
        cells.push(first);
        cells.push(second);
        cells.extend_from_slice(&self.cells[idx + 1..]);
        Self { cells }
    }

    /// The smallest element of each of the first `up_to` cells
    ///
    /// For a partition whose first `up_to` cells are singletons this
    /// is the partial labelling fixed so far.
    pub fn set_as_permutation(&self, up_to: usize) -> Vec<usize> {
        self.cells[..up_to].iter().map(|c| c[0]).collect()
    }

    /// Read a discrete partition as a permutation
    pub fn to_permutation(&self) -> Permutation {
        debug_assert!(self.is_discrete());
        Permutation::from(self.set_as_permutation(self.len()))
    }

    /// Check that the cells are non-empty, sorted, and cover `0..n`
    /// exactly once
    pub fn validate(&self, n: usize) -> Result<(), CanonError> {
        let mut seen = vec![false; n];
        let mut count = 0;
        for cell in &self.cells {
            if cell.is_empty() || !cell.windows(2).all(|w| w[0] < w[1]) {
                return Err(CanonError::InvalidPartition(n));
            }
            for &v in cell {
                if v >= n || std::mem::replace(&mut seen[v], true) {
                    return Err(CanonError::InvalidPartition(n));
                }
                count += 1;
            }
        }
        if count == n {
            Ok(())
        } else {
            Err(CanonError::InvalidPartition(n))
        }
    }
}

impl FromIterator<Vec<usize>> for Partition {
    fn from_iter<I: IntoIterator<Item = Vec<usize>>>(iter: I) -> Self {
        let mut p = Self::new();
        for cell in iter {
            p.add_cell(cell);
        }
        p
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (n, cell) in self.cells.iter().enumerate() {
            if n > 0 {
                write!(f, "|")?;
            }
            for e in cell {
                write!(f, "{e}")?;
            }
        }
        write!(f, ")")
    }
}
