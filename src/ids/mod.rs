//! Record identities and identity collections.
//!
//! Records in a dataset are named by small integer handles rather than by
//! materialized objects. Three flavours exist:
//!
//! - [`IdRef`]: anything that can *currently* name a record. Cursors are
//!   references too, but only until their next `advance()`.
//! - [`Id`]: a stable, hashable, totally ordered identity. Obtain one with
//!   [`IdRef::id`] whenever a reference must outlive the cursor it came from.
//! - [`IdVar`]: a single reassignable slot, used as a movable pointer in
//!   accumulator loops (best candidate so far, sampled element, ...).
//!
//! Collections are described by small capability traits (see [`traits`])
//! rather than one type hierarchy: arrays are ordered and random access,
//! hash sets answer membership in O(1), ranges are static contiguous blocks
//! with O(1) offset arithmetic.
//!
//! # Cursor protocol
//!
//! ```rust
//! use vicinity_ids::ids::{IdArray, IdCursor, IdRef, Ids};
//!
//! let ids = IdArray::from(vec![4, 8, 15]);
//! let mut sum = 0;
//! let mut it = ids.iter();
//! while it.valid() {
//!     sum += it.internal_index();
//!     it.advance();
//! }
//! assert_eq!(sum, 27);
//! ```

use std::fmt;

use crate::error::{IdError, Result};

pub mod array;
pub mod cursor;
pub mod hashset;
pub mod range;
pub mod traits;
pub mod unmodifiable;

pub use array::{IdArray, IdArrayCursorMut, SliceIter};
pub use cursor::{ArrayCursor, IdCursor, IdCursorMut};
pub use hashset::{IdHashSet, IdHashSetCursorMut};
pub use range::{IdRange, RangeIter};
pub use traits::{
    AnyModifiable, ArrayIds, ArrayModifiableIds, ArrayView, Ids, ModifiableIds, SetIds, ViewIter,
};
pub use unmodifiable::{EmptyIds, UnmodifiableIds};

/// A possibly transient reference to a record.
///
/// The only thing a reference exposes is its internal index. References
/// handed out by cursors are invalidated by the next `advance()`, so they
/// must not be stored, hashed or compared directly; call [`IdRef::id`] to
/// obtain a stable [`Id`] first.
pub trait IdRef {
    /// Internal index of the referenced record.
    fn internal_index(&self) -> u32;

    /// Dereference into a stable identity.
    #[inline]
    fn id(&self) -> Id {
        Id(self.internal_index())
    }
}

/// Stable identity of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(pub(crate) u32);

impl Id {
    /// Raw index of this identity.
    #[inline]
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl IdRef for Id {
    #[inline]
    fn internal_index(&self) -> u32 {
        self.0
    }

    #[inline]
    fn id(&self) -> Id {
        *self
    }
}

impl<R: IdRef + ?Sized> IdRef for &R {
    #[inline]
    fn internal_index(&self) -> u32 {
        (**self).internal_index()
    }
}

impl From<u32> for Id {
    fn from(index: u32) -> Self {
        Id(index)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered pair of identities, e.g. an edge or a candidate merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdPair {
    pub first: Id,
    pub second: Id,
}

impl IdPair {
    #[must_use]
    pub fn new(first: Id, second: Id) -> Self {
        Self { first, second }
    }
}

/// A single mutable identity slot.
///
/// Reassigning a variable never allocates, which makes it the tool of
/// choice for "best so far" tracking inside scans:
///
/// ```rust
/// use vicinity_ids::ids::{IdArray, IdCursor, IdRef, IdVar, Ids};
///
/// let ids = IdArray::from(vec![3, 1, 2]);
/// let mut best = IdVar::new();
/// let mut best_score = f64::INFINITY;
/// let mut it = ids.iter();
/// while it.valid() {
///     let score = f64::from(it.id().index());
///     if score < best_score {
///         best_score = score;
///         best.set(&it);
///     }
///     it.advance();
/// }
/// assert_eq!(best.get().unwrap().index(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IdVar {
    slot: Option<Id>,
}

impl IdVar {
    /// An unset variable.
    #[must_use]
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// A variable holding `value`.
    #[must_use]
    pub fn with(value: &impl IdRef) -> Self {
        Self {
            slot: Some(value.id()),
        }
    }

    /// Point the variable at `value`.
    #[inline]
    pub fn set(&mut self, value: &impl IdRef) {
        self.slot = Some(value.id());
    }

    #[inline]
    pub fn unset(&mut self) {
        self.slot = None;
    }

    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.slot.is_some()
    }

    /// Current value of the variable.
    ///
    /// Fails with [`IdError::InvalidReference`] when the variable is unset.
    #[inline]
    pub fn get(&self) -> Result<Id> {
        self.slot
            .ok_or_else(|| IdError::InvalidReference("variable is not set".into()))
    }

    /// Assign the first component of `pair`.
    #[inline]
    pub fn set_first(&mut self, pair: &IdPair) {
        self.slot = Some(pair.first);
    }

    /// Assign the second component of `pair`.
    #[inline]
    pub fn set_second(&mut self, pair: &IdPair) {
        self.slot = Some(pair.second);
    }
}
