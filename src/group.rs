//! Permutation groups as stabilizer chains.
//!
//! A group acting on `0..n` is stored relative to a base `b_0, ...,
//! b_{n-1}`. Level `i` of the table holds, for each point `x` in the
//! orbit of `b_i` under the pointwise stabilizer of `b_0, ...,
//! b_{i-1}`, one representative mapping `b_i` to `x`. Every group
//! element is then a unique product of one representative per level,
//! which makes membership testing a matter of sifting through the
//! levels.
use std::fmt::{self, Display};

use log::trace;
use num_bigint::BigUint;

use crate::perm::Permutation;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermutationGroup {
    base: Permutation,
    table: Vec<Vec<Option<Permutation>>>,
}

impl PermutationGroup {
    /// The trivial group on `0..n` with the identity as base
    pub fn new(n: usize) -> Self {
        Self::with_base(Permutation::identity(n))
    }

    /// The trivial group with the given base
    pub fn with_base(base: Permutation) -> Self {
        let n = base.len();
        let mut table = vec![vec![None; n]; n];
        for (level, b) in base.iter().enumerate() {
            table[level][b] = Some(Permutation::identity(n));
        }
        Self { base, table }
    }

    /// Number of points the group acts on
    pub fn degree(&self) -> usize {
        self.base.len()
    }

    pub fn base(&self) -> &Permutation {
        &self.base
    }

    /// The representative at `level` mapping the base point of that
    /// level to `image`
    pub fn get(&self, level: usize, image: usize) -> Option<&Permutation> {
        self.table[level][image].as_ref()
    }

    /// All representatives stored at `level`
    pub fn level(&self, level: usize) -> impl Iterator<Item = &Permutation> {
        self.table[level].iter().flatten()
    }

    /// Reduce `g` by the stored representatives, level by level
    ///
    /// Returns the first level where no representative matches, or
    /// [degree](Self::degree) if `g` reduces to the identity and so
    /// is already a member. The second entry is what remains of `g`
    /// after the reduction.
    pub fn sift(&self, mut g: Permutation) -> (usize, Permutation) {
        for (level, reps) in self.table.iter().enumerate() {
            let x = g[self.base[level]];
            match &reps[x] {
                Some(h) => g = h.invert().multiply(&g),
                None => return (level, g),
            }
        }
        (self.degree(), g)
    }

    pub fn contains(&self, g: &Permutation) -> bool {
        self.sift(g.clone()).0 == self.degree()
    }

    /// Add `g` to the group
    ///
    /// Whenever a new representative is stored, its products with the
    /// representatives it has to be combined with are queued and
    /// entered in turn, until every product sifts through.
    pub fn enter(&mut self, g: Permutation) {
        debug_assert_eq!(g.len(), self.degree());
        let mut pending = vec![g];
        while let Some(g) = pending.pop() {
            let (level, g) = self.sift(g);
            if level == self.degree() {
                continue;
            }
            let image = g[self.base[level]];
            trace!("new representative at level {level}: {g}");
            self.table[level][image] = Some(g.clone());

            let lower = self.table[..=level]
                .iter()
                .flatten()
                .flatten()
                .map(|h| g.multiply(h));
            let higher = self.table[level..]
                .iter()
                .flatten()
                .flatten()
                .map(|h| h.multiply(&g));
            let products = Vec::from_iter(lower.chain(higher));
            pending.extend(products.into_iter().rev());
        }
    }

    /// Rebuild the table relative to `new_base`
    ///
    /// Levels before the first point where the bases differ keep
    /// their representatives; all later levels are recomputed by
    /// entering their representatives into a fresh chain.
    pub fn change_base(&mut self, new_base: &Permutation) {
        debug_assert_eq!(new_base.len(), self.degree());
        let r = self.base.first_index_of_difference(new_base);
        if r == self.degree() {
            return;
        }
        trace!("change base at level {r}: {} -> {new_base}", self.base);
        let mut h = Self::with_base(new_base.clone());
        for g in self.table[r..].iter().flatten().flatten() {
            h.enter(g.clone());
        }
        for (level, reps) in self.table[..r].iter().enumerate() {
            let b = h.base[level];
            for g in reps.iter().flatten() {
                h.table[level][g[b]] = Some(g.clone());
            }
        }
        *self = h;
    }

    /// Product of the number of representatives over all levels
    pub fn order(&self) -> BigUint {
        self.table
            .iter()
            .map(|reps| BigUint::from(reps.iter().flatten().count()))
            .product()
    }

    /// The stored representatives other than the identity
    pub fn generators(&self) -> impl Iterator<Item = &Permutation> {
        self.table
            .iter()
            .flatten()
            .flatten()
            .filter(|g| !g.is_identity())
    }

    /// Orbits of the points `0..n`, each sorted, ordered by their
    /// smallest point
    pub fn orbits(&self) -> Vec<Vec<usize>> {
        let n = self.degree();
        let mut root = Vec::from_iter(0..n);
        fn find(root: &mut [usize], mut x: usize) -> usize {
            while root[x] != x {
                root[x] = root[root[x]];
                x = root[x];
            }
            x
        }
        for g in self.generators() {
            for (x, y) in g.iter().enumerate() {
                let (a, b) = (find(&mut root, x), find(&mut root, y));
                if a != b {
                    root[a.max(b)] = a.min(b);
                }
            }
        }
        let mut orbits: Vec<Vec<usize>> = Vec::new();
        let mut orbit_of_root = vec![usize::MAX; n];
        for x in 0..n {
            let r = find(&mut root, x);
            if orbit_of_root[r] == usize::MAX {
                orbit_of_root[r] = orbits.len();
                orbits.push(Vec::new());
            }
            orbits[orbit_of_root[r]].push(x);
        }
        orbits
    }
}

impl Display for PermutationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Base = {}", self.base)?;
        for (level, reps) in self.table.iter().enumerate() {
            write!(f, "U{level} =")?;
            for g in reps.iter().flatten() {
                write!(f, " {g}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;
    use itertools::Itertools;
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256Plus;

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn perm(images: &[usize]) -> Permutation {
        Permutation::from(images.to_vec())
    }

    fn all_perms(n: usize) -> impl Iterator<Item = Permutation> {
        (0..n).permutations(n).map(Permutation::from)
    }

    #[test]
    fn trivial() {
        log_init();

        let g = PermutationGroup::new(4);
        for i in 0..4 {
            assert!(g.get(i, i).unwrap().is_identity());
            assert_eq!(g.level(i).count(), 1);
        }
        assert!(g.get(0, 1).is_none());
        assert_eq!(g.order(), BigUint::from(1u32));
        assert_eq!(g.generators().count(), 0);
        assert_eq!(g.orbits(), [[0], [1], [2], [3]]);
        let (level, residual) = g.sift(perm(&[1, 0, 2, 3]));
        assert_eq!(level, 0);
        assert_eq!(residual, perm(&[1, 0, 2, 3]));
        assert_eq!(g.sift(Permutation::identity(4)).0, 4);
    }

    #[test]
    fn transposition() {
        log_init();

        let mut g = PermutationGroup::new(3);
        g.enter(perm(&[1, 0, 2]));
        assert_eq!(g.order(), BigUint::from(2u32));
        assert!(g.contains(&perm(&[1, 0, 2])));
        assert!(!g.contains(&perm(&[0, 2, 1])));
        assert_eq!(g.get(0, 1), Some(&perm(&[1, 0, 2])));
        assert_eq!(g.orbits(), vec![vec![0, 1], vec![2]]);

        // entering a known element changes nothing
        let before = g.clone();
        g.enter(Permutation::identity(3));
        g.enter(perm(&[1, 0, 2]));
        assert_eq!(g, before);
    }

    #[test]
    fn symmetric() {
        log_init();

        let mut g = PermutationGroup::new(3);
        g.enter(perm(&[1, 0, 2]));
        g.enter(perm(&[1, 2, 0]));
        assert_eq!(g.order(), BigUint::from(6u32));
        assert!(all_perms(3).all(|p| g.contains(&p)));
        assert_eq!(g.orbits(), vec![vec![0, 1, 2]]);

        let mut g = PermutationGroup::new(5);
        g.enter(perm(&[1, 0, 2, 3, 4]));
        g.enter(perm(&[1, 2, 3, 4, 0]));
        assert_eq!(g.order(), BigUint::from(120u32));
        assert!(all_perms(5).all(|p| g.contains(&p)));
    }

    #[test]
    fn cyclic() {
        log_init();

        let mut g = PermutationGroup::new(4);
        g.enter(perm(&[1, 2, 3, 0]));
        assert_eq!(g.order(), BigUint::from(4u32));
        assert_eq!(all_perms(4).filter(|p| g.contains(p)).count(), 4);
        assert!(!g.contains(&perm(&[1, 0, 2, 3])));
    }

    #[test]
    fn change_base() {
        log_init();

        let mut g = PermutationGroup::new(4);
        // dihedral group of the square 0-1-2-3
        g.enter(perm(&[1, 2, 3, 0]));
        g.enter(perm(&[0, 3, 2, 1]));
        assert_eq!(g.order(), BigUint::from(8u32));
        let members = Vec::from_iter(all_perms(4).filter(|p| g.contains(p)));
        assert_eq!(members.len(), 8);

        let new_base = perm(&[0, 2, 1, 3]);
        g.change_base(&new_base);
        assert_eq!(g.base(), &new_base);
        for (level, b) in new_base.iter().enumerate() {
            assert!(g.get(level, b).unwrap().is_identity());
        }
        assert_eq!(g.order(), BigUint::from(8u32));
        assert!(members.iter().all(|p| g.contains(p)));
        assert_eq!(all_perms(4).filter(|p| g.contains(p)).count(), 8);

        let new_base = perm(&[3, 1, 0, 2]);
        g.change_base(&new_base);
        assert_eq!(g.base(), &new_base);
        assert_eq!(g.order(), BigUint::from(8u32));
        assert!(members.iter().all(|p| g.contains(p)));

        // same base is a no-op
        let before = g.clone();
        g.change_base(&new_base);
        assert_eq!(g, before);
    }

    // all products of the generators, by breadth-first search
    fn closure(n: usize, generators: &[Permutation]) -> AHashSet<Permutation> {
        let mut elements = AHashSet::from_iter([Permutation::identity(n)]);
        let mut pending = vec![Permutation::identity(n)];
        while let Some(p) = pending.pop() {
            for x in generators {
                let q = x.multiply(&p);
                if elements.insert(q.clone()) {
                    pending.push(q);
                }
            }
        }
        elements
    }

    #[test]
    fn random_generators() {
        log_init();

        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        for _ in 0..300 {
            let n = rng.gen_range(3..=6);
            let generators = Vec::from_iter((0..2).map(|_| {
                let mut images = Vec::from_iter(0..n);
                images.shuffle(&mut rng);
                Permutation::from(images)
            }));
            let mut g = PermutationGroup::new(n);
            for x in &generators {
                g.enter(x.clone());
            }
            let elements = closure(n, &generators);
            assert_eq!(g.order(), BigUint::from(elements.len()));
            assert!(elements.iter().all(|p| g.contains(p)));
            assert_eq!(all_perms(n).filter(|p| g.contains(p)).count(), elements.len());

            let mut base = Vec::from_iter(0..n);
            base.shuffle(&mut rng);
            g.change_base(&Permutation::from(base));
            assert_eq!(g.order(), BigUint::from(elements.len()));
            assert!(elements.iter().all(|p| g.contains(p)));
        }
    }

    #[test]
    fn display() {
        let mut g = PermutationGroup::new(2);
        g.enter(perm(&[1, 0]));
        assert_eq!(
            g.to_string(),
            "Base = [0, 1]\nU0 = [0, 1] [1, 0]\nU1 = [0, 1]\n"
        );
    }
}
