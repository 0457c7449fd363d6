//! Capability traits for identity collections.
//!
//! Instead of one fat interface, each collection implements the subset of
//! capabilities it can honour efficiently:
//!
//! | type             | `Ids` | `ArrayIds` | `SetIds` | `ModifiableIds` | `ArrayModifiableIds` |
//! |------------------|:-----:|:----------:|:--------:|:---------------:|:--------------------:|
//! | [`IdArray`]      |   x   |     x      |          |        x        |          x           |
//! | [`IdHashSet`]    |   x   |            |    x     |        x        |                      |
//! | [`IdRange`]      |   x   |     x      |    x     |                 |                      |
//! | [`ArrayView`]    |   x   |     x      |          |                 |                      |
//! | [`Id`]           |   x   |     x      |    x     |                 |                      |
//!
//! Generic code that wants to exploit a capability it cannot name statically
//! probes for it at runtime through [`Ids::as_array`], [`Ids::as_hash_set`]
//! and [`Ids::is_set_like`].

use std::cmp::Ordering;

use super::array::{IdArray, SliceIter};
use super::cursor::{ArrayCursor, IdCursor};
use super::hashset::IdHashSet;
use super::range::{IdRange, RangeIter};
use super::{Id, IdRef, IdVar};
use crate::error::Result;

/// A collection of identities.
pub trait Ids {
    /// Cursor type returned by [`Ids::iter`].
    type Iter<'a>: IdCursor
    where
        Self: 'a;

    /// Cursor positioned on the first element.
    fn iter(&self) -> Self::Iter<'_>;

    /// Number of identities.
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Membership test. O(1) for set-like collections, O(n) otherwise.
    fn contains(&self, id: &impl IdRef) -> bool;

    /// Whether [`Ids::contains`] runs in O(1).
    #[inline]
    fn is_set_like(&self) -> bool {
        false
    }

    /// Zero-copy array view, if the collection is array-backed.
    #[inline]
    fn as_array(&self) -> Option<ArrayView<'_>> {
        None
    }

    /// The backing hash set, if the collection is one.
    #[inline]
    fn as_hash_set(&self) -> Option<&IdHashSet> {
        None
    }

    /// Convert into a modifiable collection, moving instead of copying when
    /// the collection already is one.
    fn into_modifiable(self) -> AnyModifiable
    where
        Self: Sized,
    {
        AnyModifiable::Array(IdArray::from_ids(&self))
    }
}

/// Ordered, random-access collection.
pub trait ArrayIds: Ids {
    /// Random-access cursor type.
    type Cursor<'a>: ArrayCursor
    where
        Self: 'a;

    /// Random-access cursor positioned at offset 0.
    fn array_iter(&self) -> Self::Cursor<'_>;

    /// Identity at `offset`.
    fn get(&self, offset: usize) -> Result<Id>;

    /// Store the identity at `offset` in `var`.
    #[inline]
    fn assign_var(&self, offset: usize, var: &mut IdVar) -> Result<()> {
        var.set(&self.get(offset)?);
        Ok(())
    }

    /// Binary search on a sorted collection.
    ///
    /// Same contract as [`slice::binary_search`]: `Ok(offset)` on a hit,
    /// `Err(insertion_point)` otherwise.
    fn binary_search(&self, key: &impl IdRef) -> std::result::Result<usize, usize>;

    /// View of `begin..end` that shares storage with `self`.
    fn slice(&self, begin: usize, end: usize) -> Result<ArrayView<'_>>;
}

/// Collection with O(1) membership tests.
pub trait SetIds: Ids {}

/// Collection that supports insertion and removal.
pub trait ModifiableIds: Ids {
    /// Add `id`. Returns whether the collection changed.
    fn add(&mut self, id: &impl IdRef) -> bool;

    /// Remove one occurrence of `id`. Returns whether the collection changed.
    fn remove(&mut self, id: &impl IdRef) -> bool;

    fn clear(&mut self);

    /// Remove some element and store it in `var`.
    ///
    /// Arrays pop from the end; sets pop an unspecified element.
    fn pop(&mut self, var: &mut IdVar) -> Result<()>;

    /// Add every element of `other`.
    fn add_all<C: Ids + ?Sized>(&mut self, other: &C) -> bool {
        let mut changed = false;
        let mut it = other.iter();
        while it.valid() {
            changed |= self.add(&it);
            it.advance();
        }
        changed
    }

    /// Remove every element of `other`.
    fn remove_all<C: Ids + ?Sized>(&mut self, other: &C) -> bool {
        let mut changed = false;
        let mut it = other.iter();
        while it.valid() {
            changed |= self.remove(&it);
            it.advance();
        }
        changed
    }
}

/// Array that supports positional edits.
pub trait ArrayModifiableIds: ArrayIds + ModifiableIds {
    /// Replace the identity at `offset`, returning the previous one.
    fn set(&mut self, offset: usize, id: &impl IdRef) -> Result<Id>;

    /// Insert at `offset`, shifting later elements. O(n).
    fn insert(&mut self, offset: usize, id: &impl IdRef) -> Result<()>;

    /// Remove at `offset`, preserving order. O(n).
    fn remove_at(&mut self, offset: usize) -> Result<Id>;

    /// Remove at `offset` by moving the last element into its place. O(1).
    fn remove_swap(&mut self, offset: usize) -> Result<Id>;

    fn swap(&mut self, a: usize, b: usize) -> Result<()>;

    /// Sort ascending by identity.
    fn sort(&mut self);

    /// Sort with a caller-supplied comparator.
    fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(Id, Id) -> Ordering;
}

/// Borrowed array view: either a slice of stored identities or a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayView<'a> {
    Slice(&'a [Id]),
    Range(IdRange),
}

impl<'v> ArrayView<'v> {
    /// Cursor that borrows the underlying storage rather than the view.
    pub fn into_cursor(self) -> ViewIter<'v> {
        match self {
            Self::Slice(s) => ViewIter::Slice(SliceIter::new(s)),
            Self::Range(r) => ViewIter::Range(r.array_iter()),
        }
    }

    /// Narrow the view to `begin..end` without tying it to a borrow of `self`.
    pub fn sub_view(self, begin: usize, end: usize) -> Result<ArrayView<'v>> {
        check_slice_bounds(begin, end, self.len())?;
        Ok(match self {
            Self::Slice(s) => Self::Slice(&s[begin..end]),
            Self::Range(r) => Self::Range(IdRange::new(
                r.start() + begin as u32,
                (end - begin) as u32,
            )?),
        })
    }
}

/// Cursor over an [`ArrayView`].
#[derive(Debug, Clone)]
pub enum ViewIter<'a> {
    Slice(SliceIter<'a>),
    Range(RangeIter),
}

impl IdRef for ViewIter<'_> {
    #[inline]
    fn internal_index(&self) -> u32 {
        match self {
            Self::Slice(it) => it.internal_index(),
            Self::Range(it) => it.internal_index(),
        }
    }
}

impl IdCursor for ViewIter<'_> {
    #[inline]
    fn valid(&self) -> bool {
        match self {
            Self::Slice(it) => it.valid(),
            Self::Range(it) => it.valid(),
        }
    }

    #[inline]
    fn advance(&mut self) -> &mut Self {
        match self {
            Self::Slice(it) => {
                it.advance();
            }
            Self::Range(it) => {
                it.advance();
            }
        }
        self
    }
}

impl ArrayCursor for ViewIter<'_> {
    #[inline]
    fn offset(&self) -> isize {
        match self {
            Self::Slice(it) => it.offset(),
            Self::Range(it) => it.offset(),
        }
    }

    #[inline]
    fn seek(&mut self, offset: isize) -> &mut Self {
        match self {
            Self::Slice(it) => {
                it.seek(offset);
            }
            Self::Range(it) => {
                it.seek(offset);
            }
        }
        self
    }
}

impl<'v> Ids for ArrayView<'v> {
    type Iter<'a>
        = ViewIter<'a>
    where
        Self: 'a;

    fn iter(&self) -> Self::Iter<'_> {
        self.array_iter()
    }

    #[inline]
    fn len(&self) -> usize {
        match self {
            Self::Slice(s) => s.len(),
            Self::Range(r) => r.len(),
        }
    }

    fn contains(&self, id: &impl IdRef) -> bool {
        match self {
            Self::Slice(s) => s.contains(&id.id()),
            Self::Range(r) => r.contains(id),
        }
    }

    fn is_set_like(&self) -> bool {
        matches!(self, Self::Range(_))
    }

    fn as_array(&self) -> Option<ArrayView<'_>> {
        Some(*self)
    }
}

impl<'v> ArrayIds for ArrayView<'v> {
    type Cursor<'a>
        = ViewIter<'a>
    where
        Self: 'a;

    fn array_iter(&self) -> Self::Cursor<'_> {
        self.into_cursor()
    }

    fn get(&self, offset: usize) -> Result<Id> {
        match self {
            Self::Slice(s) => s
                .get(offset)
                .copied()
                .ok_or_else(|| crate::IdError::out_of_range(offset, s.len())),
            Self::Range(r) => r.get(offset),
        }
    }

    fn binary_search(&self, key: &impl IdRef) -> std::result::Result<usize, usize> {
        match self {
            Self::Slice(s) => s.binary_search(&key.id()),
            Self::Range(r) => r.binary_search(key),
        }
    }

    fn slice(&self, begin: usize, end: usize) -> Result<ArrayView<'_>> {
        self.sub_view(begin, end)
    }
}

/// Validate `begin..end` against a collection of length `len`.
pub(crate) fn check_slice_bounds(begin: usize, end: usize, len: usize) -> Result<()> {
    if end > len {
        return Err(crate::IdError::out_of_range(end, len));
    }
    if begin > end {
        return Err(crate::IdError::InvalidArgument(format!(
            "slice start {begin} is after slice end {end}"
        )));
    }
    Ok(())
}

/// An owned modifiable collection of either flavour.
///
/// Returned by operations whose natural result type depends on the input
/// (e.g. sampling, which builds a set for small samples and an array for
/// large ones).
#[derive(Debug, Clone, PartialEq)]
pub enum AnyModifiable {
    Array(IdArray),
    HashSet(IdHashSet),
}

impl AnyModifiable {
    /// Identities in storage order.
    #[must_use]
    pub fn as_slice(&self) -> &[Id] {
        match self {
            Self::Array(a) => a.as_slice(),
            Self::HashSet(s) => s.as_slice(),
        }
    }
}

impl Ids for AnyModifiable {
    type Iter<'a>
        = SliceIter<'a>
    where
        Self: 'a;

    fn iter(&self) -> Self::Iter<'_> {
        SliceIter::new(self.as_slice())
    }

    fn len(&self) -> usize {
        match self {
            Self::Array(a) => a.len(),
            Self::HashSet(s) => s.len(),
        }
    }

    fn contains(&self, id: &impl IdRef) -> bool {
        match self {
            Self::Array(a) => a.contains(id),
            Self::HashSet(s) => s.contains(id),
        }
    }

    fn is_set_like(&self) -> bool {
        matches!(self, Self::HashSet(_))
    }

    fn as_array(&self) -> Option<ArrayView<'_>> {
        match self {
            Self::Array(a) => a.as_array(),
            Self::HashSet(_) => None,
        }
    }

    fn as_hash_set(&self) -> Option<&IdHashSet> {
        match self {
            Self::Array(_) => None,
            Self::HashSet(s) => Some(s),
        }
    }

    fn into_modifiable(self) -> AnyModifiable {
        self
    }
}

impl ModifiableIds for AnyModifiable {
    fn add(&mut self, id: &impl IdRef) -> bool {
        match self {
            Self::Array(a) => a.add(id),
            Self::HashSet(s) => s.add(id),
        }
    }

    fn remove(&mut self, id: &impl IdRef) -> bool {
        match self {
            Self::Array(a) => a.remove(id),
            Self::HashSet(s) => s.remove(id),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Array(a) => a.clear(),
            Self::HashSet(s) => s.clear(),
        }
    }

    fn pop(&mut self, var: &mut IdVar) -> Result<()> {
        match self {
            Self::Array(a) => a.pop(var),
            Self::HashSet(s) => s.pop(var),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_over_slice_and_range_agree() {
        let stored: Vec<Id> = (10..15).map(Id).collect();
        let a = ArrayView::Slice(&stored);
        let b = ArrayView::Range(IdRange::new(10, 5).unwrap());

        assert_eq!(a.len(), b.len());
        for i in 0..5 {
            assert_eq!(a.get(i), b.get(i));
        }
        assert_eq!(a.binary_search(&Id(12)), b.binary_search(&Id(12)));
        assert_eq!(a.binary_search(&Id(99)), b.binary_search(&Id(99)));
    }

    #[test]
    fn view_cursor_seek_and_retract() {
        let stored: Vec<Id> = (0..4).map(Id).collect();
        let view = ArrayView::Slice(&stored);
        let mut it = view.array_iter();
        it.seek(3);
        assert_eq!(it.id(), Id(3));
        it.retract();
        assert_eq!(it.id(), Id(2));
        it.advance_by(-2);
        assert_eq!(it.id(), Id(0));
        it.retract();
        assert!(!it.valid());
        assert!(it.try_id().is_err());
    }

    #[test]
    fn slice_bounds_are_checked() {
        let stored: Vec<Id> = (0..4).map(Id).collect();
        let view = ArrayView::Slice(&stored);
        assert!(view.slice(1, 3).is_ok());
        assert!(view.slice(3, 1).is_err());
        assert!(view.slice(0, 5).is_err());
    }
}
