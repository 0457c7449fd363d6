//! Finalized k-NN results.

use std::cmp::Ordering;

use crate::distance::{distance_list_ids, DistanceIdList, DistanceIdPair};
use crate::error::{IdError, Result};
use crate::ids::IdArray;

/// Read interface of a finalized k-NN result.
pub trait KnnResult: DistanceIdList {
    /// The `k` this result was computed for.
    fn k(&self) -> usize;

    /// Distance of the k-th neighbor, or `f64::INFINITY` when fewer than `k`
    /// neighbors were found.
    fn k_distance(&self) -> f64 {
        let pairs = self.as_pairs();
        let k = self.k();
        if pairs.len() >= k {
            pairs[k - 1].distance
        } else {
            f64::INFINITY
        }
    }

    /// Result for a smaller `k`, sharing storage with `self`.
    ///
    /// Entries tied with the k-th distance are all kept, so the view may be
    /// longer than `k`. Requesting `k` at or above the current `k` returns
    /// the whole result.
    fn sub_list(&self, k: usize) -> Result<KnnSubList<'_>> {
        if k == 0 {
            return Err(IdError::InvalidArgument("sub-list k must be positive".into()));
        }
        let pairs = self.as_pairs();
        if k >= self.k() {
            return Ok(KnnSubList { k: self.k(), pairs });
        }
        Ok(KnnSubList {
            k,
            pairs: &pairs[..tied_end(pairs, k)],
        })
    }

    /// Identities of the neighbors, nearest first.
    fn to_id_array(&self) -> IdArray {
        self.as_pairs().iter().map(|p| p.id).collect()
    }
}

/// End of the prefix holding the first `k` pairs plus everything tied with
/// the k-th distance.
fn tied_end(pairs: &[DistanceIdPair], k: usize) -> usize {
    if k >= pairs.len() {
        return pairs.len();
    }
    let kdist = pairs[k - 1].distance;
    let mut end = k;
    while end < pairs.len() && pairs[end].distance.total_cmp(&kdist) != Ordering::Greater {
        end += 1;
    }
    end
}

/// Immutable k-NN result, ascending by distance.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnList {
    k: usize,
    pairs: Vec<DistanceIdPair>,
}

impl KnnList {
    /// Wrap already ascending pairs.
    pub(crate) fn from_sorted(k: usize, pairs: Vec<DistanceIdPair>) -> Self {
        debug_assert!(pairs.windows(2).all(|w| w[0] <= w[1]), "k-NN list not sorted");
        Self { k, pairs }
    }

    /// Take ownership of the pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<DistanceIdPair> {
        self.pairs
    }
}

impl DistanceIdList for KnnList {
    #[inline]
    fn as_pairs(&self) -> &[DistanceIdPair] {
        &self.pairs
    }
}

impl KnnResult for KnnList {
    #[inline]
    fn k(&self) -> usize {
        self.k
    }
}

distance_list_ids!(KnnList);

/// Borrowed prefix of a [`KnnList`], see [`KnnResult::sub_list`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnnSubList<'a> {
    k: usize,
    pairs: &'a [DistanceIdPair],
}

impl DistanceIdList for KnnSubList<'_> {
    #[inline]
    fn as_pairs(&self) -> &[DistanceIdPair] {
        self.pairs
    }
}

impl KnnResult for KnnSubList<'_> {
    #[inline]
    fn k(&self) -> usize {
        self.k
    }
}

distance_list_ids!(KnnSubList<'l>, 'l);
