use std::fmt::{self, Display};
use std::ops::{Index, Mul};

use crate::error::CanonError;

/// A bijection on `0..n`, stored as its image array
///
/// Composition follows function notation: `(a * b)[i] == a[b[i]]`,
/// i.e. `b` is applied first.
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Build a permutation from its images, checking that they form
    /// a bijection
    pub fn new(images: Vec<usize>) -> Result<Self, CanonError> {
        if is_bijection(&images) {
            Ok(Self(images))
        } else {
            Err(CanonError::NotAPermutation(images))
        }
    }

    pub fn identity(n: usize) -> Self {
        Self(Vec::from_iter(0..n))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Image of `i`
    pub fn get(&self, i: usize) -> usize {
        self.0[i]
    }

    pub fn images(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// `self ∘ other`: apply `other`, then `self`
    pub fn multiply(&self, other: &Self) -> Self {
        debug_assert_eq!(self.len(), other.len());
        Self(other.0.iter().map(|&i| self.0[i]).collect())
    }

    pub fn invert(&self) -> Self {
        let mut inv = vec![0; self.len()];
        for (i, &x) in self.0.iter().enumerate() {
            inv[x] = i;
        }
        Self(inv)
    }

    pub fn is_identity(&self) -> bool {
        self.iter().enumerate().all(|(i, x)| i == x)
    }

    /// Smallest index at which the images differ, or `self.len()` if
    /// there is none
    pub fn first_index_of_difference(&self, other: &Self) -> usize {
        self.0
            .iter()
            .zip(&other.0)
            .position(|(a, b)| a != b)
            .unwrap_or(self.len())
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

fn is_bijection(images: &[usize]) -> bool {
    let mut seen = vec![false; images.len()];
    images.iter().all(|&x| {
        x < seen.len() && !std::mem::replace(&mut seen[x], true)
    })
}

/// Unchecked construction; the images must form a bijection
impl From<Vec<usize>> for Permutation {
    fn from(images: Vec<usize>) -> Self {
        debug_assert!(is_bijection(&images), "not a permutation: {images:?}");
        Self(images)
    }
}

impl Index<usize> for Permutation {
    type Output = usize;

    fn index(&self, i: usize) -> &usize {
        &self.0[i]
    }
}

impl Mul for &Permutation {
    type Output = Permutation;

    fn mul(self, rhs: Self) -> Permutation {
        self.multiply(rhs)
    }
}

impl Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
