//! Bounded k-nearest-neighbor accumulation and finalized neighbor lists.
//!
//! # Lifecycle
//!
//! A query scans candidates, inserting `(distance, id)` pairs into a
//! [`KnnHeap`] of capacity `k`. The heap keeps the `k` best pairs seen so far
//! and exposes the current k-distance as a pruning threshold. Once the scan
//! is over, [`KnnHeap::into_knn_list`] drains the heap into an ascending,
//! immutable [`KnnList`]. The transition is one-way.
//!
//! ```rust
//! use vicinity_ids::distance::DistanceIdList;
//! use vicinity_ids::ids::{Id, IdArray, IdCursor, IdRef, Ids};
//! use vicinity_ids::knn::KnnHeap;
//!
//! let points: [f64; 4] = [0.9, 0.1, 0.5, 0.3];
//! let ids = IdArray::from(vec![0, 1, 2, 3]);
//! let query = 0.25;
//!
//! let mut heap = KnnHeap::new(2).unwrap();
//! let mut it = ids.iter();
//! while it.valid() {
//!     let d = (points[it.internal_index() as usize] - query).abs();
//!     if d <= heap.k_distance() {
//!         heap.insert(d, &it);
//!     }
//!     it.advance();
//! }
//! let knn = heap.into_knn_list();
//! assert_eq!(knn.len(), 2);
//! assert_eq!(knn.pair(0).unwrap().id, Id::from(3));
//! ```
//!
//! # Ties
//!
//! Two different tie policies coexist on purpose:
//!
//! - **Online (bounded)**: a full heap accepts a pair whose distance equals
//!   the current k-distance by evicting the current maximum. Ties at the
//!   boundary are therefore truncated to exactly `k` entries.
//! - **Finalized (exact)**: [`KnnResult::sub_list`] on an already finalized,
//!   larger list extends the requested `k` over every entry tied with the
//!   k-th distance, stopping before the next strictly larger distance.

mod heap;
mod list;

pub use heap::KnnHeap;
pub use list::{KnnList, KnnResult, KnnSubList};
