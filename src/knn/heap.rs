//! Capacity-bounded max-heap for online top-k maintenance.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::list::{KnnList, KnnResult};
use crate::distance::{DistanceIdList, DistanceIdPair};
use crate::error::{IdError, Result};
use crate::ids::IdRef;

/// Heap of the `k` closest pairs seen so far.
///
/// The maximum sits at the top, so both the k-distance lookup and the
/// "is this candidate good enough" test are O(1); accepted insertions cost
/// O(log k).
#[derive(Debug, Clone)]
pub struct KnnHeap {
    k: usize,
    heap: BinaryHeap<DistanceIdPair>,
}

impl KnnHeap {
    /// Empty heap of capacity `k`.
    ///
    /// Fails with [`IdError::InvalidArgument`] if `k` is zero.
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(IdError::InvalidArgument(
                "k-NN heap capacity must be positive".into(),
            ));
        }
        Ok(Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        })
    }

    /// Heap re-seeded from a finalized list, keeping its `k`.
    ///
    /// Tied entries beyond `k` are subject to the usual bounded policy.
    pub fn from_knn_list(list: &KnnList) -> Self {
        let mut heap = Self {
            k: list.k(),
            heap: BinaryHeap::with_capacity(list.k() + 1),
        };
        for pair in list.as_pairs() {
            heap.insert_pair(*pair);
        }
        heap
    }

    #[inline]
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// Distance of the k-th nearest neighbor found so far.
    ///
    /// `f64::INFINITY` until the heap holds `k` pairs, so it can be used as
    /// a pruning bound from the very first candidate.
    #[inline]
    #[must_use]
    pub fn k_distance(&self) -> f64 {
        if self.heap.len() < self.k {
            return f64::INFINITY;
        }
        self.heap.peek().map_or(f64::INFINITY, |top| top.distance)
    }

    /// Offer a candidate. Returns the k-distance after the insertion.
    #[inline]
    pub fn insert(&mut self, distance: f64, id: &impl IdRef) -> f64 {
        self.insert_pair(DistanceIdPair::new(distance, id))
    }

    /// Offer a candidate pair. Returns the k-distance after the insertion.
    ///
    /// Below capacity the pair is always kept. At capacity it is dropped if
    /// its distance is strictly greater than the k-distance; otherwise it
    /// replaces the current maximum.
    pub fn insert_pair(&mut self, pair: DistanceIdPair) -> f64 {
        if self.heap.len() < self.k {
            self.heap.push(pair);
        } else if let Some(mut top) = self.heap.peek_mut() {
            if pair.distance.total_cmp(&top.distance) != Ordering::Greater {
                // Dropping the PeekMut guard restores the heap order.
                *top = pair;
            }
        }
        self.k_distance()
    }

    /// Current maximum, without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<DistanceIdPair> {
        self.heap.peek().copied()
    }

    /// Remove and return the current maximum.
    pub fn poll(&mut self) -> Option<DistanceIdPair> {
        self.heap.pop()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Drain into an ascending, immutable list.
    #[must_use]
    pub fn into_knn_list(self) -> KnnList {
        KnnList::from_sorted(self.k, self.heap.into_sorted_vec())
    }
}
