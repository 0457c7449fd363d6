//! vicinity-ids: record identities, identity collections and k-NN primitives.
//!
//! The substrate that distance-based data-mining algorithms (clustering,
//! outlier detection, neighbor search) run on top of:
//!
//! - `ids/`: identities, cursors and the collection family (array, hash set,
//!   static range, read-only wrappers)
//! - `factory`: allocation of identities and ranges, construction hub
//! - `distance`: `(distance, identity)` pairs and lists
//! - `knn/`: bounded top-k heap and its finalized sorted list
//! - `select`: in-place quickselect for medians and quantiles
//! - `util`: capability adapters, set algebra and random sampling
//!
//! # Critical Nuances
//!
//! ## Ties at the k-th distance
//!
//! A [`KnnHeap`] holds exactly `k` candidates while accumulating, so of
//! several candidates tied at the k-th distance only one survives online
//! insertion. A finalized list behaves differently: [`KnnResult::sub_list`]
//! keeps every entry tied with the k-th distance and may return more than
//! `k` entries. The two policies are intentionally distinct.
//!
//! ## References versus identities
//!
//! A cursor *is* a reference to its current element and is invalidated by
//! advancing. Call [`IdRef::id`] to obtain an [`Id`] that outlives it.
//!
//! ## Capabilities are probed, not assumed
//!
//! Generic helpers accept any [`Ids`] and ask at runtime whether it is
//! array-backed ([`Ids::as_array`]) or set-like ([`Ids::is_set_like`]),
//! copying only when the capability is missing.
//!
//! # Example
//!
//! ```rust
//! use vicinity_ids::{ArrayIds, IdFactory, KnnResult};
//!
//! let mut factory = IdFactory::default();
//! let objects = factory.generate_range(5).unwrap();
//!
//! let mut heap = factory.new_heap(2).unwrap();
//! for (offset, distance) in [0.9, 0.2, 0.4, 0.2, 0.7].into_iter().enumerate() {
//!     heap.insert(distance, &objects.get(offset).unwrap());
//! }
//! let knn = heap.into_knn_list();
//! assert_eq!(knn.k_distance(), 0.2);
//! ```

pub mod distance;
pub mod error;
pub mod factory;
pub mod ids;
pub mod knn;
pub mod select;
pub mod util;

// Re-exports
pub use distance::{DistanceIdArray, DistanceIdList, DistanceIdPair};
pub use error::{IdError, Result};
pub use factory::{FactoryConfig, IdFactory, IdScheme};
pub use ids::{
    AnyModifiable, ArrayIds, ArrayModifiableIds, Id, IdArray, IdCursor, IdHashSet, IdPair,
    IdRange, IdRef, IdVar, Ids, ModifiableIds, SetIds,
};
pub use knn::{KnnHeap, KnnList, KnnResult, KnnSubList};
