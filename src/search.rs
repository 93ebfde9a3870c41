//! Canonical labelling by individualisation and refinement.
//!
//! The search refines an ordered vertex partition until no cell can
//! be split any further, then individualises each vertex of the first
//! non-singleton cell in turn and recurses. Every discrete partition
//! reached is a labelling of the graph; the search keeps the best one
//! seen so far under a row-wise comparison of the relabelled
//! adjacency matrices. Two leaves that compare equal differ by an
//! automorphism, which is entered into a [PermutationGroup] and used
//! to skip individualisations equivalent to ones already explored.
use std::collections::VecDeque;

use ahash::AHashMap;
use log::{debug, trace};
use num_bigint::BigUint;

use crate::error::CanonError;
use crate::group::PermutationGroup;
use crate::partition::Partition;
use crate::perm::Permutation;

/// The graph queries needed by the search
///
/// Vertices are the integers `0..vertex_count()`.
pub trait Adjacency {
    fn vertex_count(&self) -> usize;

    /// Number of edges (with multiplicity) between `v` and the
    /// vertices in `block`
    ///
    /// `block` is sorted in ascending order.
    fn neighbours_in_block(&self, block: &[usize], v: usize) -> usize;

    /// Multiplicity of the edge between `i` and `j`, 0 if there is none
    fn connectivity(&self, i: usize, j: usize) -> usize;
}

impl<A: Adjacency + ?Sized> Adjacency for &A {
    fn vertex_count(&self) -> usize {
        (**self).vertex_count()
    }

    fn neighbours_in_block(&self, block: &[usize], v: usize) -> usize {
        (**self).neighbours_in_block(block, v)
    }

    fn connectivity(&self, i: usize, j: usize) -> usize {
        (**self).connectivity(i, j)
    }
}

/// Outcome of comparing a candidate labelling with the best one
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// The candidate replaces the current best
    Better,
    /// Both labellings give the same relabelled graph
    Equal,
    /// The candidate and everything below it can be discarded
    Worse,
}

/// State of a canonical labelling run over one graph
///
/// A run owns its automorphism group, the refinement work queue, and
/// the best and first labellings found. [setup](Self::setup) resets
/// it for reuse.
#[derive(Debug)]
pub struct CanonicalForm<'a, G: ?Sized> {
    graph: &'a G,
    group: PermutationGroup,
    queue: VecDeque<Vec<usize>>,
    cursor: usize,
    best: Option<Permutation>,
    first: Option<Permutation>,
}

impl<'a, G: Adjacency + ?Sized> CanonicalForm<'a, G> {
    /// Prepare a run with a trivial automorphism group
    pub fn new(graph: &'a G) -> Self {
        let group = PermutationGroup::new(graph.vertex_count());
        Self {
            graph,
            group,
            queue: VecDeque::new(),
            cursor: 0,
            best: None,
            first: None,
        }
    }

    /// Reset the run, starting from `group` as the known automorphisms
    pub fn setup(&mut self, group: PermutationGroup) {
        self.group = group;
        self.queue.clear();
        self.cursor = 0;
        self.best = None;
        self.first = None;
    }

    /// The smallest labelling under
    /// [compare_rowwise](Self::compare_rowwise) found by the last
    /// [canon](Self::canon) run
    pub fn best(&self) -> Option<&Permutation> {
        self.best.as_ref()
    }

    /// The first labelling reached by the last [canon](Self::canon) run
    pub fn first(&self) -> Option<&Permutation> {
        self.first.as_ref()
    }

    pub fn automorphism_group(&self) -> &PermutationGroup {
        &self.group
    }

    pub fn into_automorphism_group(self) -> PermutationGroup {
        self.group
    }

    /// Certificate of the best labelling of the last run
    pub fn certificate(&self) -> Option<BigUint> {
        self.best.as_ref().map(|best| self.certificate_of(best))
    }

    /// Refine `partition` until no cell is split by its neighbour
    /// counts into any other cell
    ///
    /// A split cell is replaced in place by its parts, ordered by
    /// ascending neighbour count, and each part is queued as a new
    /// splitting target.
    pub fn refine(&mut self, partition: &Partition) -> Partition {
        let n = self.graph.vertex_count();
        let mut finer = partition.clone();
        self.queue.clear();
        self.queue.extend(finer.cells().map(|c| c.to_vec()));
        while let Some(target) = self.queue.pop_front() {
            self.cursor = 0;
            while self.cursor < finer.len() && finer.len() < n {
                if !finer.is_discrete_cell(self.cursor) {
                    self.split_current(&mut finer, &target);
                }
                self.cursor += 1;
            }
            if finer.len() == n {
                break;
            }
        }
        finer
    }

    fn split_current(&mut self, partition: &mut Partition, target: &[usize]) {
        let mut by_count: AHashMap<usize, Vec<usize>> = AHashMap::new();
        for &u in partition.cell(self.cursor) {
            let count = self.graph.neighbours_in_block(target, u);
            by_count.entry(count).or_default().push(u);
        }
        if by_count.len() < 2 {
            return;
        }
        let mut parts = Vec::from_iter(by_count);
        parts.sort_unstable_by_key(|(count, _)| *count);
        trace!("split {:?} by {target:?}: {parts:?}", partition.cell(self.cursor));

        partition.remove_cell(self.cursor);
        let nparts = parts.len();
        for (k, (_, part)) in parts.into_iter().enumerate() {
            self.queue.push_back(part.clone());
            partition.insert_cell(self.cursor + k, part);
        }
        self.cursor += nparts - 1;
    }

    /// Encode the graph relabelled by `perm` as a bit string
    ///
    /// Bit `k` is set iff the `k`-th vertex pair is connected, with
    /// pairs `(perm[i], perm[j])` enumerated by descending `j` and,
    /// for each `j`, descending `i < j`.
    pub fn certificate_of(&self, perm: &Permutation) -> BigUint {
        let n = self.graph.vertex_count();
        let nbits = n * n.saturating_sub(1) / 2;
        let mut digits = vec![0u32; nbits.div_ceil(32)];
        let mut k = 0;
        for j in (1..n).rev() {
            for i in (0..j).rev() {
                if self.graph.connectivity(perm[i], perm[j]) > 0 {
                    digits[k / 32] |= 1 << (k % 32);
                }
                k += 1;
            }
        }
        BigUint::new(digits)
    }

    /// Compare the (partial) labelling `candidate` against the best
    /// labelling found so far
    ///
    /// Pairs `(i, j)` with `i < j < candidate.len()` are visited by
    /// ascending `j`, then ascending `i`. At the first pair with a
    /// different connectivity, the labelling with fewer connections
    /// wins. Without a best labelling, every candidate is
    /// [Better](Comparison::Better).
    ///
    /// The pairs of a prefix of length `m` are exactly the first
    /// `m * (m - 1) / 2` pairs of any full labelling extending it, so a
    /// prefix that is [Worse](Comparison::Worse) rules out every
    /// labelling below it.
    pub fn compare_rowwise(&self, candidate: &[usize]) -> Comparison {
        use std::cmp::Ordering;
        let Some(best) = &self.best else {
            return Comparison::Better;
        };
        let m = candidate.len();
        for j in 1..m {
            for i in 0..j {
                let x = self.graph.connectivity(best[i], best[j]);
                let y = self.graph.connectivity(candidate[i], candidate[j]);
                match x.cmp(&y) {
                    Ordering::Greater => return Comparison::Better,
                    Ordering::Less => return Comparison::Worse,
                    Ordering::Equal => {}
                }
            }
        }
        Comparison::Equal
    }

    /// Search for the canonical labelling, starting from `partition`
    ///
    /// The starting partition may already separate vertices by cheap
    /// invariants such as colours or degrees. Automorphisms found
    /// along the way are added to the group given to
    /// [setup](Self::setup).
    pub fn canon(
        &mut self,
        partition: Partition,
    ) -> Result<&Permutation, CanonError> {
        let n = self.graph.vertex_count();
        if self.group.degree() != n {
            return Err(CanonError::SizeMismatch {
                expected: n,
                found: self.group.degree(),
            });
        }
        partition.validate(n)?;
        Ok(self.run(&partition))
    }

    /// [canon](Self::canon) without checking the partition and the
    /// group size
    pub(crate) fn run(&mut self, partition: &Partition) -> &Permutation {
        debug!(
            "canonical labelling of {} vertices from {partition}",
            self.graph.vertex_count()
        );
        self.best = None;
        self.first = None;
        self.search(partition);
        debug!(
            "best labelling: {:?}, automorphism group order {}",
            self.best,
            self.group.order()
        );
        match &self.best {
            Some(best) => best,
            None => unreachable!("the first branch always reaches a leaf"),
        }
    }

    fn search(&mut self, partition: &Partition) {
        let n = self.graph.vertex_count();
        let finer = self.refine(partition);
        let target = finer.index_of_first_non_discrete_cell().unwrap_or(n);

        let prefix = finer.set_as_permutation(target);
        let result = self.compare_rowwise(&prefix);

        if target == n {
            self.leaf(Permutation::from(prefix), result);
        } else if result != Comparison::Worse {
            let cell = finer.cell(target).to_vec();
            let mut pruned = vec![false; n];
            for v in cell {
                if pruned[v] {
                    continue;
                }
                let next = finer.split_before(target, &[v]);
                self.search(&next);

                let base = base_from_prefix(&next, target, n);
                self.group.change_base(&base);
                for g in self.group.level(target) {
                    pruned[g[v]] = true;
                }
            }
        }
    }

    fn leaf(&mut self, labelling: Permutation, result: Comparison) {
        let Some(best) = &self.best else {
            debug!("first labelling: {labelling}");
            self.first = Some(labelling.clone());
            self.best = Some(labelling);
            return;
        };
        match result {
            Comparison::Better => {
                debug!("new best labelling: {labelling}");
                self.best = Some(labelling);
            }
            Comparison::Equal => {
                let automorphism = labelling.multiply(&best.invert());
                debug!("automorphism: {automorphism}");
                self.group.enter(automorphism);
            }
            Comparison::Worse => {}
        }
    }

    /// Whether the unit partition refines along the first-choice path
    /// to the identity labelling
    pub fn is_canonical(&mut self) -> bool {
        let unit = Partition::unit(self.graph.vertex_count());
        self.follow_first_path(&unit).is_identity()
    }

    /// Whether `partition` refines along the first-choice path to the
    /// identity labelling
    pub fn is_canonical_from(
        &mut self,
        partition: &Partition,
    ) -> Result<bool, CanonError> {
        partition.validate(self.graph.vertex_count())?;
        Ok(self.follow_first_path(partition).is_identity())
    }

    fn follow_first_path(&mut self, partition: &Partition) -> Permutation {
        let mut finer = self.refine(partition);
        while let Some(idx) = finer.index_of_first_non_discrete_cell() {
            let first = finer.first_in_cell(idx);
            finer = self.refine(&finer.split_before(idx, &[first]));
        }
        finer.to_permutation()
    }
}

/// A permutation of `0..n` starting with the first element of each of
/// the first `depth + 1` cells of `partition`
fn base_from_prefix(partition: &Partition, depth: usize, n: usize) -> Permutation {
    let mut perm = Vec::from_iter(0..n);
    let mut pos = Vec::from_iter(0..n);
    for j in 0..=depth {
        let x = partition.first_in_cell(j);
        let i = pos[x];
        let displaced = perm[j];
        perm[j] = x;
        perm[i] = displaced;
        pos[displaced] = i;
        pos[x] = j;
    }
    Permutation::from(perm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::UnGraph;

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn graph76() -> UnGraph<(), ()> {
        UnGraph::from_edges([
            (0, 1),
            (0, 3),
            (0, 7),
            (1, 2),
            (1, 4),
            (2, 3),
            (2, 6),
            (3, 4),
            (4, 5),
            (5, 6),
            (5, 7),
            (6, 7),
        ])
    }

    // same graph as `graph76`, labelled differently
    fn graph76_relabelled() -> UnGraph<(), ()> {
        UnGraph::from_edges([
            (0, 5),
            (0, 1),
            (0, 6),
            (1, 6),
            (1, 2),
            (2, 3),
            (2, 4),
            (3, 5),
            (3, 7),
            (4, 5),
            (4, 7),
            (6, 7),
        ])
    }

    fn graph78() -> UnGraph<(), ()> {
        UnGraph::from_edges([
            (0, 6),
            (1, 4),
            (1, 5),
            (2, 3),
            (2, 5),
            (3, 4),
            (3, 5),
            (3, 6),
            (4, 5),
            (4, 6),
            (5, 6),
        ])
    }

    fn partition78() -> Partition {
        Partition::from_iter([vec![0], vec![1, 2], vec![3, 4, 6], vec![5]])
    }

    #[test]
    fn refine() {
        log_init();

        let g = graph76();
        let mut form = CanonicalForm::new(&g);
        let p = Partition::from_iter([vec![0], vec![1, 2, 3, 4, 5, 6, 7]]);
        assert_eq!(form.refine(&p).to_string(), "(0|24|56|7|13)");
    }

    #[test]
    fn refine_individualised() {
        log_init();

        let g = graph78();
        let mut form = CanonicalForm::new(&g);
        let p = form.refine(&partition78());
        assert_eq!(p.to_string(), "(0|12|34|6|5)");

        let b1 = form.refine(&p.split_before(1, &[1]));
        assert_eq!(b1.to_string(), "(0|1|2|3|4|6|5)");
        let b2 = form.refine(&p.split_before(1, &[2]));
        assert_eq!(b2.to_string(), "(0|2|1|4|3|6|5)");
    }

    #[test]
    fn refine_discrete_is_fixpoint() {
        let g = graph78();
        let mut form = CanonicalForm::new(&g);
        let p = Partition::from_iter((0..7).rev().map(|v| vec![v]));
        assert_eq!(form.refine(&p), p);
    }

    #[test]
    fn canon_seeded() {
        log_init();

        let g = graph78();
        let mut form = CanonicalForm::new(&g);
        let best = form.canon(partition78()).unwrap().clone();
        assert_eq!(best.images(), &[0, 1, 2, 3, 4, 6, 5]);
        assert_eq!(form.first(), Some(&best));
        assert_eq!(form.certificate(), Some(BigUint::from(44255u32)));
        // swapping 1 <-> 2 and 3 <-> 4 is the only symmetry
        assert_eq!(form.automorphism_group().order(), BigUint::from(2u32));
        assert!(form
            .automorphism_group()
            .contains(&Permutation::from(vec![0, 2, 1, 4, 3, 5, 6])));
    }

    #[test]
    fn canon_unit() {
        log_init();

        let g1 = graph76();
        let mut form1 = CanonicalForm::new(&g1);
        form1.canon(Partition::unit(8)).unwrap();
        assert_eq!(form1.automorphism_group().order(), BigUint::from(12u32));

        let g2 = graph76_relabelled();
        let mut form2 = CanonicalForm::new(&g2);
        form2.canon(Partition::unit(8)).unwrap();
        assert_eq!(form2.automorphism_group().order(), BigUint::from(12u32));

        assert_eq!(form1.certificate(), form2.certificate());
        assert_eq!(form1.certificate(), Some(BigUint::from(5192304u32)));
    }

    #[test]
    fn automorphisms_preserve_adjacency() {
        log_init();

        let g = graph76();
        let mut form = CanonicalForm::new(&g);
        form.canon(Partition::unit(8)).unwrap();
        let group = form.automorphism_group();
        assert!(group.generators().count() > 0);
        for a in group.generators() {
            for i in 0..8 {
                for j in 0..8 {
                    assert_eq!(
                        g.connectivity(i, j),
                        g.connectivity(a[i], a[j])
                    );
                }
            }
        }
    }

    #[test]
    fn deterministic() {
        log_init();

        let g = graph76();
        let certs = Vec::from_iter((0..2).map(|_| {
            let mut form = CanonicalForm::new(&g);
            form.canon(Partition::unit(8)).unwrap();
            form.certificate().unwrap()
        }));
        assert_eq!(certs[0], certs[1]);
    }

    #[test]
    fn setup_resets() {
        let g = graph78();
        let mut form = CanonicalForm::new(&g);
        assert!(form.best().is_none());
        assert!(form.certificate().is_none());
        form.canon(Partition::unit(7)).unwrap();
        assert!(form.best().is_some());
        form.setup(PermutationGroup::new(7));
        assert!(form.best().is_none());
        assert!(form.first().is_none());
        assert_eq!(form.automorphism_group().order(), BigUint::from(1u32));
    }

    #[test]
    fn compare() {
        let g = UnGraph::<(), ()>::from_edges([(0, 1), (1, 2)]);
        let mut form = CanonicalForm::new(&g);
        assert_eq!(form.compare_rowwise(&[0, 1, 2]), Comparison::Better);
        form.canon(Partition::unit(3)).unwrap();
        // path 0 - 2 - 1 in the best labelling
        assert_eq!(form.best().unwrap().images(), &[0, 2, 1]);
        assert_eq!(form.compare_rowwise(&[2, 0, 1]), Comparison::Equal);
        assert_eq!(form.compare_rowwise(&[0, 1, 2]), Comparison::Worse);
        assert_eq!(form.compare_rowwise(&[0, 2]), Comparison::Equal);
        assert_eq!(form.compare_rowwise(&[]), Comparison::Equal);
    }

    #[test]
    fn certificate_bits() {
        let g = UnGraph::<(), ()>::from_edges([(0, 1), (1, 2)]);
        let form = CanonicalForm::new(&g);
        // pairs in bit order: (1,2), (0,2), (0,1)
        let id = Permutation::identity(3);
        assert_eq!(form.certificate_of(&id), BigUint::from(0b101u32));
        let p = Permutation::from(vec![0, 2, 1]);
        assert_eq!(form.certificate_of(&p), BigUint::from(0b011u32));
    }

    #[test]
    fn large_certificate() {
        // too many vertex pairs for any fixed-width integer
        let n: u32 = 40;
        let g = UnGraph::<(), ()>::from_edges((0..n).map(|i| (i, (i + 1) % n)));
        let mut form = CanonicalForm::new(&g);
        form.canon(Partition::unit(n as usize)).unwrap();
        let cert = form.certificate().unwrap();
        assert_eq!(cert.count_ones(), n as u64);
        assert!(cert.bits() > 128);
        // dihedral group of the cycle
        assert_eq!(form.automorphism_group().order(), BigUint::from(80u32));
    }

    #[test]
    fn is_canonical() {
        // star with centre 2
        let g = UnGraph::<(), ()>::from_edges([(0, 2), (1, 2)]);
        assert!(CanonicalForm::new(&g).is_canonical());
        let g = UnGraph::<(), ()>::from_edges([(0, 1), (1, 2)]);
        assert!(!CanonicalForm::new(&g).is_canonical());
        let p = Partition::from_iter([vec![1], vec![0, 2]]);
        assert!(!CanonicalForm::new(&g).is_canonical_from(&p).unwrap());
        assert!(CanonicalForm::new(&g)
            .is_canonical_from(&Partition::unit(2))
            .is_err());
    }

    #[test]
    fn invalid_input() {
        let g = graph78();
        let mut form = CanonicalForm::new(&g);
        assert_eq!(
            form.canon(Partition::unit(6)),
            Err(CanonError::InvalidPartition(7))
        );
        form.setup(PermutationGroup::new(5));
        assert_eq!(
            form.canon(Partition::unit(7)),
            Err(CanonError::SizeMismatch {
                expected: 7,
                found: 5
            })
        );
    }

    #[test]
    fn empty() {
        let g = UnGraph::<(), ()>::default();
        let mut form = CanonicalForm::new(&g);
        assert!(form.canon(Partition::unit(0)).unwrap().is_empty());
        assert_eq!(form.certificate(), Some(BigUint::from(0u32)));
    }

    #[test]
    fn prefix_base() {
        let p = Partition::from_iter([vec![3], vec![1], vec![0, 2]]);
        let base = base_from_prefix(&p, 1, 4);
        assert_eq!(base.images(), &[3, 1, 2, 0]);
    }
}
