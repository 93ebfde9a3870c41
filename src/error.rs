use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CanonError {
    #[error("Not a permutation: {0:?}")]
    NotAPermutation(Vec<usize>),
    #[error("Expected {expected} vertices, found {found}")]
    SizeMismatch { expected: usize, found: usize },
    #[error("Partition cells do not cover 0..{0} exactly once")]
    InvalidPartition(usize),
}
