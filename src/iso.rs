//! Isomorphism testing through certificates.
//!
//! Each graph is labelled canonically on its own, starting from the
//! partition with a single cell, and the certificates of the resulting
//! labellings are compared. Only vertices and edges enter the
//! certificate: vertex weights and edge multiplicities are ignored, so
//! the answer is exact for simple graphs.
use log::debug;
use num_bigint::BigUint;

use crate::partition::Partition;
use crate::search::{Adjacency, CanonicalForm};

/// The certificate of the canonical labelling of `g`
///
/// Two simple graphs are isomorphic iff their certificates agree.
pub fn certificate<G: Adjacency + ?Sized>(g: &G) -> BigUint {
    let mut form = CanonicalForm::new(g);
    let best = form.run(&Partition::unit(g.vertex_count())).clone();
    form.certificate_of(&best)
}

/// Check whether `a` and `b` are isomorphic
pub fn are_isomorphic<A, B>(a: &A, b: &B) -> bool
where
    A: Adjacency + ?Sized,
    B: Adjacency + ?Sized,
{
    let (na, nb) = (a.vertex_count(), b.vertex_count());
    if na != nb {
        debug!("vertex counts differ: {na} != {nb}");
        return false;
    }
    let (ca, cb) = (certificate(a), certificate(b));
    debug!("certificates: {ca} and {cb}");
    ca == cb
}
